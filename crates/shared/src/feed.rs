use anyhow::{Context, Result};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

use crate::error::PipelineError;
use crate::models::FeedItem;

pub struct FeedReader {
    client: Client,
}

impl FeedReader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("news-teasers/0.1")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Downloads and parses the feed. Any failure here is fatal for the run.
    pub async fn fetch(
        &self,
        feed_url: &str,
        max_items: usize,
    ) -> Result<Vec<FeedItem>, PipelineError> {
        let response = self
            .client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| PipelineError::Precondition(format!("feed unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Precondition(format!(
                "feed returned HTTP {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Precondition(format!("failed to read feed body: {}", e)))?;

        let items = parse_feed(&bytes, max_items)?;
        info!(feed_url, items = items.len(), "feed: parsed successfully");
        Ok(items)
    }
}

/// RSS, Atom, or JSON Feed bytes to deduplicated items in feed order.
pub fn parse_feed(bytes: &[u8], max_items: usize) -> Result<Vec<FeedItem>, PipelineError> {
    let feed = feed_rs::parser::parse(bytes)
        .map_err(|e| PipelineError::Precondition(format!("failed to parse feed: {}", e)))?;

    let mut seen = HashSet::new();
    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            if !seen.insert(link.clone()) {
                return None;
            }

            let excerpt = entry
                .summary
                .map(|s| flatten_html(&s.content))
                .filter(|s| !s.is_empty());

            let section = entry
                .categories
                .first()
                .map(|c| c.label.clone().unwrap_or_else(|| c.term.clone()));

            Some(FeedItem {
                title: entry
                    .title
                    .map(|t| t.content.trim().to_string())
                    .unwrap_or_default(),
                link,
                excerpt,
                section,
                author: entry.authors.first().map(|p| p.name.clone()),
                published: entry.published.or(entry.updated),
            })
        })
        .take(max_items)
        .collect();

    Ok(items)
}

/// Tag-free text of an HTML excerpt.
fn flatten_html(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
