use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::compose::TEMPLATE_TABLE_VERSION;
use crate::error::PipelineError;
use crate::extractor::ContentSource;
use crate::guard::{HistoryState, RepetitionGuard};
use crate::hooks;
use crate::models::{Article, DigestItem, ExtractedContent, FeedItem, Teaser};
use crate::summarizer::{fallback_bullets, BulletGenerator, FILLER_BULLETS};

/// Drives each feed item through extraction, hooks, classification, bullet generation,
/// and the repetition guard, strictly one article at a time.
pub struct Orchestrator<'a> {
    content: &'a dyn ContentSource,
    generator: &'a dyn BulletGenerator,
    guard: RepetitionGuard,
    pace: Duration,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        content: &'a dyn ContentSource,
        generator: &'a dyn BulletGenerator,
        guard: RepetitionGuard,
        pace: Duration,
    ) -> Self {
        Self {
            content,
            generator,
            guard,
            pace,
        }
    }

    /// Results come back in arrival order. An article that fails outright is logged and
    /// left out; the rest of the batch still runs.
    pub async fn run_batch(
        &mut self,
        items: &[FeedItem],
        history: &mut HistoryState,
    ) -> Vec<DigestItem> {
        info!(
            items = items.len(),
            template_table = TEMPLATE_TABLE_VERSION,
            "batch starting"
        );
        let mut results = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            if index > 0 && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }

            match self.process(item, history).await {
                Ok(entry) => results.push(entry),
                Err(e) => warn!(link = %item.link, error = %e, "skipping article"),
            }
        }

        info!(
            processed = results.len(),
            total = items.len(),
            "batch complete"
        );
        results
    }

    async fn process(
        &mut self,
        item: &FeedItem,
        history: &mut HistoryState,
    ) -> Result<DigestItem, PipelineError> {
        if item.link.trim().is_empty() && item.title.trim().is_empty() {
            return Err(PipelineError::MalformedItem);
        }

        let extracted = if item.link.trim().is_empty() {
            ExtractedContent::default()
        } else {
            match self.content.extract(&item.link).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(link = %item.link, error = %e, "extraction failed, using feed text");
                    ExtractedContent::default()
                }
            }
        };

        let article = Article {
            title: item.title.trim().to_string(),
            link: item.link.clone(),
            body: extracted.text,
            excerpt: item.excerpt.clone(),
            section: item.section.clone().unwrap_or_default(),
            author: item.author.clone().or(extracted.author),
            published: item.published,
            image: extracted.image,
        };

        let text = article.working_text();
        let hooks = hooks::extract(text, &article.title);
        let domain = classify(text, &article.section);
        debug!(
            link = %article.link,
            domain = %domain,
            actors = hooks.actors.len(),
            numbers = hooks.numbers.len(),
            "hooks extracted"
        );

        let factual = match self.generator.factual_bullets(&article.title, text).await {
            Ok(bullets) => bullets,
            Err(e) => {
                warn!(
                    link = %article.link,
                    error = %e,
                    "bullet generation failed, splitting sentences"
                );
                fallback_bullets(text)
            }
        };

        let teaser = self
            .guard
            .finalize(&hooks, domain, &article.title, history);
        debug!(
            link = %article.link,
            chosen_move = %teaser.chosen_move,
            opener = %teaser.opener,
            "teaser accepted"
        );

        Ok(assemble(&article, factual, &teaser))
    }
}

/// Exactly three non-empty bullets: two factual lines, then the teaser.
fn assemble(article: &Article, factual: Vec<String>, teaser: &Teaser) -> DigestItem {
    let mut bullets: Vec<String> = factual
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .take(2)
        .collect();
    for filler in FILLER_BULLETS.iter().skip(bullets.len()) {
        bullets.push(filler.to_string());
    }
    bullets.push(teaser.text.clone());

    DigestItem {
        title: article.title.clone(),
        url: article.link.clone(),
        author: article.author.clone().unwrap_or_default(),
        section: article.section.clone(),
        published: article
            .published
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        image: article.image.clone(),
        bullets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose;
    use crate::models::{Domain, Move};
    use crate::summarizer::parse_bullets;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeContent {
        pages: HashMap<String, ExtractedContent>,
    }

    impl FakeContent {
        fn with_page(mut self, url: &str, text: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                ExtractedContent {
                    text: text.to_string(),
                    image: Some(format!("{}/lead.jpg", url)),
                    author: Some("Desk Reporter".to_string()),
                },
            );
            self
        }
    }

    #[async_trait]
    impl ContentSource for FakeContent {
        async fn extract(&self, url: &str) -> Result<ExtractedContent, PipelineError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| PipelineError::extraction(url, "404"))
        }
    }

    /// Replies with canned model output; titles containing "garbled" get invalid JSON.
    struct FakeGenerator;

    #[async_trait]
    impl BulletGenerator for FakeGenerator {
        async fn factual_bullets(
            &self,
            title: &str,
            _text: &str,
        ) -> Result<Vec<String>, PipelineError> {
            let raw = if title.contains("garbled") {
                "{\"bullets\": [\"unterminated".to_string()
            } else {
                format!(r#"{{"bullets": ["{} happened.", "More detail followed."]}}"#, title)
            };
            parse_bullets(&raw)
        }
    }

    struct DownGenerator;

    #[async_trait]
    impl BulletGenerator for DownGenerator {
        async fn factual_bullets(
            &self,
            _title: &str,
            _text: &str,
        ) -> Result<Vec<String>, PipelineError> {
            Err(PipelineError::Generation("service unavailable".to_string()))
        }
    }

    fn item(title: &str, link: &str, section: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: link.to_string(),
            section: Some(section.to_string()),
            ..Default::default()
        }
    }

    fn assert_well_formed(entry: &DigestItem) {
        assert_eq!(entry.bullets.len(), 3);
        assert!(entry.bullets.iter().all(|b| !b.trim().is_empty()));
        assert!(!compose::is_question(&entry.bullets[2]));
        assert!(!compose::contains_banned_phrase(&entry.bullets[2]));
    }

    #[tokio::test]
    async fn test_sports_contract_end_to_end() {
        let url = "https://news.example.com/sports/tatum";
        let content = FakeContent::default().with_page(
            url,
            "The Celtics agreed to a five-year deal worth $314 million on Tuesday.",
        );
        let generator = FakeGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(1), Duration::ZERO);
        let mut history = HistoryState::new(3);

        let results = orchestrator
            .run_batch(
                &[item("Celtics sign Jayson Tatum to extension", url, "Sports")],
                &mut history,
            )
            .await;

        assert_eq!(results.len(), 1);
        let entry = &results[0];
        assert_well_formed(entry);
        assert_eq!(entry.bullets[0], "Celtics sign Jayson Tatum to extension happened.");
        assert!(entry.bullets[2].contains("$314 million"));
        assert_eq!(entry.author, "Desk Reporter");
        assert_eq!(entry.image.as_deref(), Some("https://news.example.com/sports/tatum/lead.jpg"));
        assert!(history.contains_opener(&compose::opener_key(&entry.bullets[2])));
    }

    #[tokio::test]
    async fn test_invalid_generation_output_degrades_and_batch_continues() {
        let content = FakeContent::default()
            .with_page(
                "https://a.example.com",
                "The select board voted to close the transfer station early. Residents objected loudly at the meeting.",
            )
            .with_page(
                "https://b.example.com",
                "The museum extended its hours for the summer season.",
            );
        let generator = FakeGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(2), Duration::ZERO);
        let mut history = HistoryState::new(3);

        let results = orchestrator
            .run_batch(
                &[
                    item("A garbled reply", "https://a.example.com", "Local"),
                    item("Museum hours", "https://b.example.com", "Arts"),
                ],
                &mut history,
            )
            .await;

        assert_eq!(results.len(), 2);
        assert_well_formed(&results[0]);
        assert_eq!(
            results[0].bullets[0],
            "The select board voted to close the transfer station early."
        );
        assert_eq!(results[0].bullets[1], "Residents objected loudly at the meeting.");
        assert_eq!(results[1].bullets[0], "Museum hours happened.");
    }

    #[tokio::test]
    async fn test_everything_down_still_yields_three_bullets() {
        let content = FakeContent::default();
        let generator = DownGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(3), Duration::ZERO);
        let mut history = HistoryState::new(3);

        let mut bare = item("Short", "https://gone.example.com", "");
        bare.section = None;
        let mut with_excerpt = item("Road work", "https://also-gone.example.com", "Local");
        with_excerpt.excerpt =
            Some("Crews will repave Main Street starting next week, the city said.".to_string());

        let results = orchestrator.run_batch(&[bare, with_excerpt], &mut history).await;

        assert_eq!(results.len(), 2);
        for entry in &results {
            assert_well_formed(entry);
        }
        assert_eq!(results[0].bullets[0], FILLER_BULLETS[0]);
        assert_eq!(
            results[1].bullets[0],
            "Crews will repave Main Street starting next week, the city said."
        );
    }

    #[tokio::test]
    async fn test_malformed_item_is_skipped() {
        let content = FakeContent::default();
        let generator = FakeGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(4), Duration::ZERO);
        let mut history = HistoryState::new(3);

        let results = orchestrator
            .run_batch(
                &[
                    item("", "", ""),
                    item("Budget vote delayed", "https://c.example.com", "Politics"),
                ],
                &mut history,
            )
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Budget vote delayed");
    }

    #[tokio::test]
    async fn test_back_to_back_gov_articles_get_distinct_openers() {
        let content = FakeContent::default()
            .with_page("https://d.example.com", "officials met again this week.")
            .with_page("https://e.example.com", "officials met once more this week.");
        let generator = FakeGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(5), Duration::ZERO);
        let mut history = HistoryState::new(3);

        let results = orchestrator
            .run_batch(
                &[
                    item("budget talks resume", "https://d.example.com", "Politics"),
                    item("budget talks continue", "https://e.example.com", "Politics"),
                ],
                &mut history,
            )
            .await;

        let first = compose::opener_key(&results[0].bullets[2]);
        let second = compose::opener_key(&results[1].bullets[2]);
        assert_ne!(first, second);
        assert!(compose::NEUTRAL_FALLBACKS.contains(&results[1].bullets[2].as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_waits_between_articles_only() {
        let content = FakeContent::default();
        let generator = FakeGenerator;
        let pace = Duration::from_millis(1500);
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(8), pace);
        let mut history = HistoryState::new(3);

        let start = tokio::time::Instant::now();
        orchestrator
            .run_batch(
                &[item("Budget vote delayed", "https://g.example.com", "Politics")],
                &mut history,
            )
            .await;
        assert!(start.elapsed() < pace);

        let start = tokio::time::Instant::now();
        let results = orchestrator
            .run_batch(
                &[
                    item("Library hours expand", "https://h.example.com", "Local"),
                    item("Bridge repairs begin", "https://i.example.com", "Local"),
                ],
                &mut history,
            )
            .await;
        let elapsed = start.elapsed();

        assert_eq!(results.len(), 2);
        assert!(elapsed >= pace);
        assert!(elapsed < pace * 2);
    }

    #[tokio::test]
    async fn test_seeded_openers_are_not_reused() {
        let content = FakeContent::default();
        let generic_gov = compose::compose(&Default::default(), Domain::Gov, "");
        let mut history = HistoryState::seeded(vec![compose::opener_key(&generic_gov)], 200, 3);
        let generator = FakeGenerator;
        let mut orchestrator =
            Orchestrator::new(&content, &generator, RepetitionGuard::with_seed(6), Duration::ZERO);

        let results = orchestrator
            .run_batch(&[item("budget talks", "https://f.example.com", "Politics")], &mut history)
            .await;

        assert_ne!(results[0].bullets[2], generic_gov);
        let teaser = &results[0].bullets[2];
        assert_eq!(
            compose::select_move(&Default::default(), Domain::Gov, ""),
            Move::GenericAnalysis
        );
        assert!(compose::NEUTRAL_FALLBACKS.contains(&teaser.as_str()));
    }
}
