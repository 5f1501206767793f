use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::compose::opener_key;
use crate::guard::HistoryState;
use crate::models::DigestItem;

/// Index of the teaser within each entry's bullets.
pub const TEASER_INDEX: usize = 2;

/// Overwrites the digest at `path` with this run's entries.
pub fn save_digest(path: &Path, items: &[DigestItem]) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create digest directory")?;
    }

    let json = serde_json::to_string_pretty(items).context("Failed to serialize digest")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write digest file: {}", path.display()))?;

    Ok(path.to_path_buf())
}

/// `Ok(None)` when no digest has been written yet.
pub fn load_digest(path: &Path) -> Result<Option<Vec<DigestItem>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read digest file: {}", path.display()))?;

    let items: Vec<DigestItem> = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse digest JSON from {}. The file may be corrupted.",
            path.display()
        )
    })?;

    Ok(Some(items))
}

/// Teaser openers of the first `limit` entries, in artifact order.
pub fn seed_openers(items: &[DigestItem], limit: usize) -> Vec<String> {
    items
        .iter()
        .take(limit)
        .filter_map(|item| item.bullets.get(TEASER_INDEX))
        .map(|teaser| opener_key(teaser))
        .filter(|opener| !opener.is_empty())
        .collect()
}

/// Builds the run's history from the previous digest. A missing or unreadable digest
/// seeds an empty history.
pub fn seed_history(path: &Path, limit: usize, first_word_cap: usize) -> HistoryState {
    let previous = match load_digest(path) {
        Ok(Some(items)) => items,
        Ok(None) => {
            info!(path = %path.display(), "no previous digest, starting with empty history");
            Vec::new()
        }
        Err(e) => {
            warn!(
                error = %format!("{:#}", e),
                "previous digest unreadable, starting with empty history"
            );
            Vec::new()
        }
    };

    HistoryState::seeded(seed_openers(&previous, limit), limit, first_word_cap)
}
