use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

const MAX_INPUT_BYTES: usize = 8000;
const MIN_SENTENCE_CHARS: usize = 20;
const MAX_BULLET_CHARS: usize = 220;

/// Used when there is no text at all to split.
pub const FILLER_BULLETS: [&str; 2] = [
    "Details on this story are still developing.",
    "The full article has more on what happened.",
];

/// Produces the two factual bullets for an article.
#[async_trait]
pub trait BulletGenerator: Send + Sync {
    async fn factual_bullets(&self, title: &str, text: &str) -> Result<Vec<String>, PipelineError>;
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

#[derive(Deserialize)]
struct BulletsPayload {
    bullets: Vec<String>,
}

pub struct ClaudeSummarizer {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeSummarizer {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    async fn try_generate(&self, title: &str, text: &str) -> Result<String> {
        let prompt = format!(
            r#"You are a news desk editor. Write exactly 2 factual bullet points about the article below.

RULES:
1. Each bullet must be one sentence under 25 words
2. Use ONLY facts stated in the article - no external knowledge, no opinion
3. Do not ask questions and do not tease; state facts plainly
4. Respond with JSON only, no commentary

Title: {}

Article:
{}

Format your response as:
{{"bullets": ["First fact.", "Second fact."]}}"#,
            title,
            truncate_on_char_boundary(text, MAX_INPUT_BYTES)
        );

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 300,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error: {}", error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        Ok(claude_response
            .content
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl BulletGenerator for ClaudeSummarizer {
    async fn factual_bullets(&self, title: &str, text: &str) -> Result<Vec<String>, PipelineError> {
        let raw = self
            .try_generate(title, text)
            .await
            .map_err(|e| PipelineError::Generation(format!("{:#}", e)))?;
        parse_bullets(&raw)
    }
}

/// Pulls `{"bullets": [...]}` out of a model reply, tolerating code fences and prose
/// around the object. Fewer than two non-empty bullets is an error.
pub fn parse_bullets(raw: &str) -> Result<Vec<String>, PipelineError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return Err(PipelineError::Generation("no JSON object in reply".to_string())),
    };

    let payload: BulletsPayload = serde_json::from_str(json)
        .map_err(|e| PipelineError::Generation(format!("malformed bullets JSON: {}", e)))?;

    let bullets: Vec<String> = payload
        .bullets
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .take(2)
        .collect();

    if bullets.len() < 2 {
        return Err(PipelineError::Generation(format!(
            "expected 2 bullets, got {}",
            bullets.len()
        )));
    }
    Ok(bullets)
}

/// Naive extractive stand-in: the first two substantial sentences, then filler.
pub fn fallback_bullets(text: &str) -> Vec<String> {
    let mut bullets: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .take(2)
        .map(|s| clip(&s, MAX_BULLET_CHARS))
        .collect();

    for filler in FILLER_BULLETS.iter().skip(bullets.len()) {
        bullets.push(filler.to_string());
    }
    bullets
}

pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let sentence = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Shortens to a word boundary under `max` characters.
fn clip(sentence: &str, max: usize) -> String {
    if sentence.chars().count() <= max {
        return sentence.to_string();
    }
    let head: String = sentence.chars().take(max).collect();
    let cut = head.rfind(' ').unwrap_or(head.len());
    format!("{}...", head[..cut].trim_end_matches([',', ';', ':']))
}

fn truncate_on_char_boundary(content: &str, max: usize) -> &str {
    if content.len() <= max {
        return content;
    }
    let mut end = max;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bullets_plain_json() {
        let bullets =
            parse_bullets(r#"{"bullets": ["The council approved it.", "It takes effect in May."]}"#)
                .unwrap();
        assert_eq!(bullets, vec!["The council approved it.", "It takes effect in May."]);
    }

    #[test]
    fn test_parse_bullets_with_fences_and_prose() {
        let raw = "Sure, here you go:\n```json\n{\"bullets\": [\" One. \", \"Two.\", \"Three.\"]}\n```";
        assert_eq!(parse_bullets(raw).unwrap(), vec!["One.", "Two."]);
    }

    #[test]
    fn test_parse_bullets_rejects_malformed() {
        assert!(matches!(
            parse_bullets("not json at all"),
            Err(PipelineError::Generation(_))
        ));
        assert!(parse_bullets(r#"{"bullets": ["only one"]}"#).is_err());
        assert!(parse_bullets(r#"{"bullets": ["ok", "  "]}"#).is_err());
        assert!(parse_bullets(r#"{"points": ["a", "b"]}"#).is_err());
    }

    #[test]
    fn test_fallback_uses_first_substantial_sentences() {
        let text = "Short. The select board voted 4-1 to approve the budget. \
                    Residents packed the hall for three hours! A final line here too.";
        let bullets = fallback_bullets(text);
        assert_eq!(
            bullets,
            vec![
                "The select board voted 4-1 to approve the budget.",
                "Residents packed the hall for three hours!"
            ]
        );
    }

    #[test]
    fn test_fallback_pads_with_filler() {
        assert_eq!(fallback_bullets(""), FILLER_BULLETS.to_vec());
        let one = fallback_bullets("Only one sentence is long enough here.");
        assert_eq!(one[0], "Only one sentence is long enough here.");
        assert_eq!(one[1], FILLER_BULLETS[1]);
    }

    #[test]
    fn test_split_keeps_decimals_together() {
        let sentences = split_sentences("Prices rose 3.5 percent. Then fell.");
        assert_eq!(sentences, vec!["Prices rose 3.5 percent.", "Then fell."]);
    }

    #[test]
    fn test_clip_long_sentence() {
        let long = "word ".repeat(100);
        let clipped = clip(long.trim(), MAX_BULLET_CHARS);
        assert!(clipped.chars().count() <= MAX_BULLET_CHARS + 3);
        assert!(clipped.ends_with("..."));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "é".repeat(10);
        let cut = truncate_on_char_boundary(&text, 5);
        assert_eq!(cut, "éé");
    }
}
