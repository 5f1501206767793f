// Public modules
pub mod classify;
pub mod compose;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feed;
pub mod guard;
pub mod hooks;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod summarizer;

// Re-export commonly used types
pub use config::Config;
pub use error::PipelineError;
pub use extractor::{ContentExtractor, ContentSource};
pub use feed::FeedReader;
pub use guard::{HistoryState, RepetitionGuard};
pub use hooks::HookSet;
pub use io::{load_digest, save_digest, seed_history};
pub use models::{Article, DigestItem, Domain, FeedItem, Move, Teaser};
pub use pipeline::Orchestrator;
pub use summarizer::{BulletGenerator, ClaudeSummarizer};
