use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_MAX_ARTICLES: usize = 12;
pub const DEFAULT_PACE_MS: u64 = 1500;
pub const DEFAULT_HISTORY_LIMIT: usize = 200;
pub const DEFAULT_FIRST_WORD_CAP: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub feed_url: String,
    pub model: String,
    pub max_articles: usize,
    pub pace: Duration,
    pub history_limit: usize,
    pub first_word_cap: usize,
    pub digest_path: PathBuf,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let anthropic_api_key = env::var("ANTHROPIC_API_KEY").context(
            "ANTHROPIC_API_KEY not found.\n\n\
            To fix this, create ~/.config/news-teasers/.env with:\n  \
            ANTHROPIC_API_KEY=your_key_here\n  \
            FEED_URL=https://example.com/feed",
        )?;

        let feed_url = env::var("FEED_URL").context(
            "FEED_URL not found. Set it as an environment variable or in ~/.config/news-teasers/.env",
        )?;

        let digest_path = match env::var("DIGEST_PATH") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_digest_path()?,
        };

        Ok(Self {
            anthropic_api_key,
            feed_url,
            model: env::var("TEASER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_articles: parse_var("MAX_ARTICLES", DEFAULT_MAX_ARTICLES)?,
            pace: Duration::from_millis(parse_var("PACE_MS", DEFAULT_PACE_MS)?),
            history_limit: parse_var("HISTORY_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            first_word_cap: parse_var("FIRST_WORD_CAP", DEFAULT_FIRST_WORD_CAP)?.max(1),
            digest_path,
            seed: parse_optional_var("TEASER_SEED")?,
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-teasers/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("news-teasers").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

/// `<data_local_dir>/news-teasers/digest.json`
pub fn default_digest_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("news-teasers");
    Ok(data_dir.join("digest.json"))
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional_var(name)?.unwrap_or(default))
}

fn parse_optional_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{} must be a number, got {:?}", name, raw)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_var_missing_is_none() {
        let value: Option<u64> = parse_optional_var("NEWS_TEASERS_TEST_UNSET_VAR").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("NEWS_TEASERS_TEST_BAD_NUMBER", "twelve");
        let result: Result<usize> = parse_var("NEWS_TEASERS_TEST_BAD_NUMBER", 3);
        assert!(result.is_err());
        env::remove_var("NEWS_TEASERS_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_parse_var_reads_value() {
        env::set_var("NEWS_TEASERS_TEST_GOOD_NUMBER", " 20 ");
        let value: usize = parse_var("NEWS_TEASERS_TEST_GOOD_NUMBER", 3).unwrap();
        assert_eq!(value, 20);
        env::remove_var("NEWS_TEASERS_TEST_GOOD_NUMBER");
    }
}
