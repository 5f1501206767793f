//! Move selection and teaser rendering.
//!
//! Selection walks [`TEMPLATES`] in row order for the article's domain and takes the first
//! row whose required hook is present. Every template is a single declarative or
//! imperative sentence; rendered text is still screened by [`is_question`] and
//! [`contains_banned_phrase`] before the guard accepts it.

use crate::hooks::{self, HookSet};
use crate::models::{Domain, Move};

/// Bumped whenever a row is added, removed, or reworded.
pub const TEMPLATE_TABLE_VERSION: u32 = 3;

/// Phrases that are never allowed in a teaser, matched case-insensitively anywhere.
pub const BANNED_PHRASES: &[&str] = &[
    "discover",
    "find out",
    "learn",
    "see how",
    "see why",
    "reveal",
    "unveil",
    "uncover",
    "here's how",
    "here’s how",
    "here's why",
    "here’s why",
    "here is how",
    "here is why",
];

/// Domain-agnostic sentences used when nothing in the table clears the filters. Each
/// starts with a distinct word.
pub const NEUTRAL_FALLBACKS: &[&str] = &[
    "Worth a closer look before the next update lands.",
    "Details beyond the headline shape how this plays out.",
    "Several threads in this story remain unresolved.",
    "Much of the impact lands after the headline fades.",
    "Nobody involved expects this to be the final word.",
    "Plenty remains in motion on this story.",
    "Follow-up reporting will fill in the fuller picture.",
    "Stakeholders are still weighing the next move.",
    "Background matters here more than the first paragraph suggests.",
    "Reactions to this are only starting to take shape.",
];

/// Hook a template row needs before it can be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    None,
    Actor,
    Number,
    Quote,
    Comparison,
    /// An impact phrase or a dated event; dates gate the move but are never rendered.
    NextStepSignal,
}

impl Requirement {
    fn satisfied_by(&self, hooks: &HookSet) -> bool {
        match self {
            Requirement::None => true,
            Requirement::Actor => !hooks.actors.is_empty(),
            Requirement::Number => !hooks.numbers.is_empty(),
            Requirement::Quote => !hooks.quotes.is_empty(),
            Requirement::Comparison => !hooks.comparisons.is_empty(),
            Requirement::NextStepSignal => !hooks.impacts.is_empty() || !hooks.dates.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateRow {
    pub domain: Domain,
    pub chosen_move: Move,
    pub requires: Requirement,
    pub template: &'static str,
}

const fn row(
    domain: Domain,
    chosen_move: Move,
    requires: Requirement,
    template: &'static str,
) -> TemplateRow {
    TemplateRow {
        domain,
        chosen_move,
        requires,
        template,
    }
}

/// `{actor}` is the best actor or the domain's stand-in noun; `{number}` is the first
/// numeric hook. Rows are in priority order within a domain and each domain ends with an
/// unconditional generic-analysis row.
#[rustfmt::skip]
pub static TEMPLATES: &[TemplateRow] = &[
    // sports
    row(Domain::Sports, Move::StatisticReference, Requirement::Number,
        "Keep {number} in mind when weighing what comes next for {actor}."),
    row(Domain::Sports, Move::QuoteReference, Requirement::Quote,
        "One remark from {actor} sets the tone for the stretch ahead."),
    row(Domain::Sports, Move::ActorSpotlight, Requirement::Actor,
        "{actor} now carries real pressure into the next stretch of games."),
    row(Domain::Sports, Move::GenericAnalysis, Requirement::None,
        "The bigger storyline for {actor} sits beyond the final score."),
    // entertainment
    row(Domain::Entertainment, Move::QuoteReference, Requirement::Quote,
        "A single comment from {actor} frames the reaction to this project."),
    row(Domain::Entertainment, Move::ActorSpotlight, Requirement::Actor,
        "{actor} sits at the center of the buzz around this release."),
    row(Domain::Entertainment, Move::StatisticReference, Requirement::Number,
        "Attention centers on {number} as the yardstick for this release."),
    row(Domain::Entertainment, Move::GenericAnalysis, Requirement::None,
        "Behind the announcement sits a longer arc for {actor}."),
    // gov
    row(Domain::Gov, Move::NextStep, Requirement::NextStepSignal,
        "Residents should track the next vote, since the consequences reach past {actor}."),
    row(Domain::Gov, Move::BoardReference, Requirement::Actor,
        "Watch the next meeting agenda, where {actor} takes up the follow-through."),
    row(Domain::Gov, Move::StatisticReference, Requirement::Number,
        "Budget watchers will focus on {number} as the debate continues."),
    row(Domain::Gov, Move::GenericAnalysis, Requirement::None,
        "Policy details for {actor} matter more than the initial headline."),
    // courts
    row(Domain::Courts, Move::DocketReference, Requirement::Actor,
        "Court filings involving {actor} set the schedule for what happens next."),
    row(Domain::Courts, Move::NextStep, Requirement::NextStepSignal,
        "Legal exposure remains the key thread as {actor} moves through the process."),
    row(Domain::Courts, Move::QuoteReference, Requirement::Quote,
        "Courtroom remarks from {actor} point to the strategy ahead."),
    row(Domain::Courts, Move::GenericAnalysis, Requirement::None,
        "Next filings will shape how things unfold for {actor}."),
    // realestate
    row(Domain::RealEstate, Move::MapReference, Requirement::Actor,
        "Mark {actor} on the map as a place to watch for housing changes."),
    row(Domain::RealEstate, Move::StatisticReference, Requirement::Number,
        "Buyers and renters should weigh {number} against local trends."),
    row(Domain::RealEstate, Move::ComparisonReference, Requirement::Comparison,
        "Regional comparisons put {actor} in a sharper light."),
    row(Domain::RealEstate, Move::GenericAnalysis, Requirement::None,
        "Housing pressure around {actor} extends beyond this single project."),
    // general
    row(Domain::General, Move::StatisticReference, Requirement::Number,
        "Consider {number} the figure to keep in view as this develops."),
    row(Domain::General, Move::ComparisonReference, Requirement::Comparison,
        "Side-by-side comparisons put {actor} in a different light."),
    row(Domain::General, Move::QuoteReference, Requirement::Quote,
        "Direct remarks from {actor} add weight to this story."),
    row(Domain::General, Move::NextStep, Requirement::NextStepSignal,
        "Consequences for {actor} will play out over the coming weeks."),
    row(Domain::General, Move::GenericAnalysis, Requirement::None,
        "Context around {actor} matters more than the headline alone."),
];

/// Stand-in for `{actor}` when no usable actor was extracted.
fn domain_noun(domain: Domain) -> &'static str {
    match domain {
        Domain::Sports => "the team",
        Domain::Entertainment => "the production",
        Domain::Gov => "local officials",
        Domain::Courts => "the parties",
        Domain::RealEstate => "the local market",
        Domain::General => "the people involved",
    }
}

pub fn rows_for(domain: Domain) -> impl Iterator<Item = &'static TemplateRow> {
    TEMPLATES.iter().filter(move |row| row.domain == domain)
}

/// First move in the domain's priority order that can be rendered from these hooks.
pub fn select_move(hooks: &HookSet, domain: Domain, title: &str) -> Move {
    rows_for(domain)
        .find(|row| render(row, hooks, title).is_some())
        .map(|row| row.chosen_move)
        .unwrap_or(Move::GenericAnalysis)
}

/// Renders the selected move into one sentence.
pub fn compose(hooks: &HookSet, domain: Domain, title: &str) -> String {
    rows_for(domain)
        .find_map(|row| render(row, hooks, title))
        .unwrap_or_else(|| NEUTRAL_FALLBACKS[0].to_string())
}

/// Every candidate in the order the guard should try them: each applicable move in
/// priority order, and for each move the original hooks followed by successive
/// rotations. Duplicate sentences are dropped.
pub fn drafts(hooks: &HookSet, domain: Domain, title: &str) -> Vec<(Move, String)> {
    let mut rotations = vec![hooks.clone()];
    for _ in 0..hooks.rotation_depth() {
        let next = rotations[rotations.len() - 1].rotated();
        rotations.push(next);
    }

    let mut out: Vec<(Move, String)> = Vec::new();
    for row in rows_for(domain) {
        for rotation in &rotations {
            if let Some(text) = render(row, rotation, title) {
                if !out.iter().any(|(_, existing)| *existing == text) {
                    out.push((row.chosen_move, text));
                }
            }
        }
    }
    out
}

/// `None` when the row's requirement is unmet or no substitution is possible.
pub fn render(row: &TemplateRow, hooks: &HookSet, title: &str) -> Option<String> {
    if !row.requires.satisfied_by(hooks) {
        return None;
    }

    let mut text = row.template.to_string();

    if text.contains("{actor}") {
        let actor = hooks.actors.iter().find(|actor| !restates_title(actor, title));
        let actor = match (actor, row.requires) {
            (Some(actor), _) => actor.as_str(),
            (None, Requirement::Actor) => return None,
            (None, _) => domain_noun(row.domain),
        };
        text = text.replace("{actor}", actor);
    }

    if text.contains("{number}") {
        text = text.replace("{number}", hooks.first_number()?);
    }

    Some(capitalize_first(&text))
}

fn restates_title(actor: &str, title: &str) -> bool {
    let title = title.trim().trim_end_matches(['.', '!', '?']);
    !title.is_empty() && actor.eq_ignore_ascii_case(title)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

/// Lowercased first two words, the key used to detect repeated phrasing.
pub fn opener_key(text: &str) -> String {
    text.split_whitespace()
        .map(normalize_word)
        .filter(|word| !word.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn first_word(text: &str) -> String {
    text.split_whitespace()
        .map(normalize_word)
        .find(|word| !word.is_empty())
        .unwrap_or_default()
}

/// True for an explicit `?` or any sentence led by an interrogative word.
pub fn is_question(text: &str) -> bool {
    if text.contains('?') {
        return true;
    }
    text.split(['.', '!', ';'])
        .any(|sentence| hooks::is_interrogative(&first_word(sentence)))
}

pub fn contains_banned_phrase(text: &str) -> bool {
    let lower = text.to_lowercase();
    BANNED_PHRASES.iter().any(|phrase| lower.contains(phrase))
}
