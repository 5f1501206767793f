use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::PipelineError;
use crate::models::ExtractedContent;

const MIN_PARAGRAPH_CHARS: usize = 40;

/// Fetches an article page and returns its main text and lead image.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, PipelineError>;
}

pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; NewsTeasers/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl ContentSource for ContentExtractor {
    async fn extract(&self, url: &str) -> Result<ExtractedContent, PipelineError> {
        let html = self
            .fetch_html(url)
            .await
            .map_err(|e| PipelineError::extraction(url, format!("{:#}", e)))?;
        Ok(parse_page(&html, url))
    }
}

/// Readability-style pass over a fetched page.
///
/// Body text is the substantial paragraphs under `<article>`, else `<main>`, else the
/// whole document; a page with none falls back to a plain-text rendering.
pub fn parse_page(html: &str, page_url: &str) -> ExtractedContent {
    let document = Html::parse_document(html);

    let text = ["article p", "main p", "p"]
        .iter()
        .find_map(|css| {
            let selector = Selector::parse(css).ok()?;
            let paragraphs: Vec<String> = document
                .select(&selector)
                .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
                .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
                .collect();
            (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
        })
        .unwrap_or_else(|| html2text::from_read(html.as_bytes(), 100).trim().to_string());

    let image = meta_content(
        &document,
        &["meta[property=\"og:image\"]", "meta[name=\"twitter:image\"]"],
    )
    .map(|src| resolve_url(page_url, &src));

    let author = meta_content(
        &document,
        &["meta[name=\"author\"]", "meta[property=\"article:author\"]"],
    );

    ExtractedContent {
        text,
        image,
        author,
    }
}

fn meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}

fn resolve_url(base: &str, src: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(src))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| src.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <meta property="og:image" content="/images/lead.jpg">
        <meta name="author" content="Jane Reporter">
        </head><body>
        <nav><p>Subscribe to our newsletter for daily updates and more news.</p></nav>
        <article>
          <p>Short caption.</p>
          <p>The Select Board voted 4-1 on Tuesday to approve the town budget.</p>
          <p>Residents packed the hall   for three hours before the final vote.</p>
        </article>
        </body></html>"#;

    #[test]
    fn test_parse_page_prefers_article_paragraphs() {
        let content = parse_page(PAGE, "https://news.example.com/town/budget");
        assert_eq!(
            content.text,
            "The Select Board voted 4-1 on Tuesday to approve the town budget.\n\n\
             Residents packed the hall for three hours before the final vote."
        );
    }

    #[test]
    fn test_parse_page_resolves_image_and_author() {
        let content = parse_page(PAGE, "https://news.example.com/town/budget");
        assert_eq!(
            content.image.as_deref(),
            Some("https://news.example.com/images/lead.jpg")
        );
        assert_eq!(content.author.as_deref(), Some("Jane Reporter"));
    }

    #[test]
    fn test_parse_page_without_paragraphs_falls_back_to_text() {
        let content = parse_page(
            "<html><body><div>Plain page content without paragraph tags</div></body></html>",
            "not a url",
        );
        assert!(content.text.contains("Plain page content"));
        assert_eq!(content.image, None);
    }
}
