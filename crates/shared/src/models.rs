use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry pulled from the syndication feed, before any content is fetched.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub excerpt: Option<String>,
    pub section: Option<String>,
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// Main content pulled out of an article page.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub text: String,
    pub image: Option<String>,
    pub author: Option<String>,
}

/// A feed item joined with its extracted body. Read-only once built.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub section: String,
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

impl Article {
    /// Text the hook extractor and bullet generator work from: the extracted body,
    /// else the feed excerpt, else the title.
    pub fn working_text(&self) -> &str {
        if !self.body.trim().is_empty() {
            return &self.body;
        }
        match self.excerpt.as_deref() {
            Some(excerpt) if !excerpt.trim().is_empty() => excerpt,
            _ => &self.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Sports,
    Entertainment,
    Gov,
    Courts,
    RealEstate,
    General,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Sports,
        Domain::Entertainment,
        Domain::Gov,
        Domain::Courts,
        Domain::RealEstate,
        Domain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Sports => "sports",
            Domain::Entertainment => "entertainment",
            Domain::Gov => "gov",
            Domain::Courts => "courts",
            Domain::RealEstate => "realestate",
            Domain::General => "general",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rhetorical template category used to build a teaser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    StatisticReference,
    QuoteReference,
    NextStep,
    MapReference,
    BoardReference,
    DocketReference,
    ComparisonReference,
    ActorSpotlight,
    GenericAnalysis,
    NeutralFallback,
}

impl Move {
    pub fn as_str(&self) -> &'static str {
        match self {
            Move::StatisticReference => "statistic-reference",
            Move::QuoteReference => "quote-reference",
            Move::NextStep => "next-step",
            Move::MapReference => "map-reference",
            Move::BoardReference => "board-reference",
            Move::DocketReference => "docket-reference",
            Move::ComparisonReference => "comparison-reference",
            Move::ActorSpotlight => "actor-spotlight",
            Move::GenericAnalysis => "generic-analysis",
            Move::NeutralFallback => "neutral-fallback",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The accepted third bullet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teaser {
    pub text: String,
    pub domain: Domain,
    pub chosen_move: Move,
    pub opener: String,
}

/// One record of the persisted digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestItem {
    pub title: String,
    pub url: String,
    pub author: String,
    pub section: String,
    pub published: String,
    pub image: Option<String>,
    pub bullets: Vec<String>,
}
