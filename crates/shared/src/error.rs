use thiserror::Error;

/// Failures the pipeline distinguishes. Only `Precondition` aborts a run; the rest are
/// absorbed per article.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("content extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("bullet generation failed: {0}")]
    Generation(String),

    #[error("feed item has neither link nor title")]
    MalformedItem,

    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl PipelineError {
    pub fn extraction(url: &str, reason: impl ToString) -> Self {
        PipelineError::Extraction {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
