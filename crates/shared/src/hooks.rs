//! Hook extraction: actors, figures, quotes, dates, and consequence/comparison phrases
//! mined from an article with fixed regular expressions.
//!
//! Everything here is pure. The same `(text, title)` always yields the same [`HookSet`].

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub const MAX_NUMBERS: usize = 4;
pub const MAX_QUOTES: usize = 2;
pub const MAX_DATES: usize = 2;
pub const MAX_ACTORS: usize = 4;
pub const MAX_IMPACTS: usize = 2;
pub const MAX_COMPARISONS: usize = 1;

/// Words that turn a sentence into a question when they lead it.
pub const INTERROGATIVES: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "whose", "whom",
];

/// Contractions that can hang off an interrogative ("who's", "how’d").
const CONTRACTION_SUFFIXES: &[&str] = &[
    "'s", "’s", "'re", "’re", "'d", "’d", "'ll", "’ll",
];

/// True when `word` is an interrogative, including contracted forms.
pub fn is_interrogative(word: &str) -> bool {
    let lower = word.to_lowercase();
    let base = CONTRACTION_SUFFIXES
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(&lower);
    INTERROGATIVES.contains(&base)
}

/// UI chrome and byline boilerplate that looks like a proper noun but never is one.
const ACTOR_STOP_LIST: &[&str] = &[
    "advertisement",
    "all rights reserved",
    "associated press",
    "click here",
    "comments",
    "contributed",
    "copyright",
    "credit",
    "email",
    "facebook",
    "getty images",
    "instagram",
    "newsletter",
    "photo",
    "posted",
    "privacy policy",
    "read more",
    "related",
    "share",
    "sign up",
    "staff writer",
    "subscribe",
    "terms of use",
    "twitter",
    "updated",
];

/// Leading words dropped from an actor candidate before it is tested.
const LEADING_FILLER: &[&str] = &[
    "the", "a", "an", "and", "but", "in", "on", "at", "for", "after", "before", "as", "if",
    "this", "that", "it", "he", "she", "they", "we", "i",
];

/// Capitalized runs of one to four tokens.
static ACTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z'’&.\-]*(?:[ \t]+[A-Z][A-Za-z'’&.\-]*){0,3}").unwrap()
});

/// Currency amounts (with optional magnitude word), percentages, thousands-grouped numbers.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d(?:[\d,]*\d)?(?:\.\d+)?(?:\s?(?:million|billion|trillion|thousand)\b|[mbk]\b)?|\b\d+(?:\.\d+)?(?:%|\s?percent\b)|\b\d{1,3}(?:,\d{3})+(?:\.\d+)?\b",
    )
    .unwrap()
});

/// Curly-quoted spans of 10 to 140 characters.
static QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"“([^“”]{10,140})”").unwrap());

/// Month-name phrases with optional day, year, and clock suffix.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\b\.?(?:\s+\d{1,2}(?:st|nd|rd|th)?\b)?(?:,?\s+\d{4}\b)?(?:,?\s+at\s+\d{1,2}(?::\d{2})?\s*(?:a\.m\.|p\.m\.|am\b|pm\b))?",
    )
    .unwrap()
});

/// Consequence vocabulary plus up to 60 trailing characters within the sentence.
static IMPACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:could|would|faces?|penalty|penalties|bans?|costs?|delays?|risks?|cuts?|tax(?:es)?|fees?|fines?|closures?|layoffs?|suspend(?:s|ed|ing)?|probation)\b[^.!?\n]{0,60}",
    )
    .unwrap()
});

/// Comparison connectives plus up to 60 trailing characters within the sentence.
static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bvs\.|\bversus\b|\bcompared (?:with|to)\b|\bmore than\b|\bless than\b|\btops\b|\blags\b|\branks\b)[^.!?\n]{0,60}",
    )
    .unwrap()
});

/// A whole candidate that is only a month or weekday, optionally with day and year.
static DATE_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?|mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:rs(?:day)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)\.?(?:\s+\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?$",
    )
    .unwrap()
});

static CLOCK_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}(?::\d{2})?\s*(?:a\.?m\.?|p\.?m\.?)?$|^\d{1,2}:\d{2}").unwrap()
});

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Bounded hooks mined from one article. Discarded once its teaser is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSet {
    pub numbers: Vec<String>,
    pub quotes: Vec<String>,
    /// Kept for the decision logic only; never rendered into a teaser.
    pub dates: Vec<String>,
    pub actors: Vec<String>,
    pub impacts: Vec<String>,
    pub comparisons: Vec<String>,
}

impl HookSet {
    pub fn best_actor(&self) -> Option<&str> {
        self.actors.first().map(String::as_str)
    }

    pub fn first_number(&self) -> Option<&str> {
        self.numbers.first().map(String::as_str)
    }

    /// Copy with the leading actor and number dropped, used to re-derive a teaser.
    pub fn rotated(&self) -> HookSet {
        let mut next = self.clone();
        if !next.actors.is_empty() {
            next.actors.remove(0);
        }
        if !next.numbers.is_empty() {
            next.numbers.remove(0);
        }
        next
    }

    /// How many distinct rotations are worth trying.
    pub fn rotation_depth(&self) -> usize {
        self.actors.len().max(self.numbers.len())
    }
}

pub fn extract(text: &str, title: &str) -> HookSet {
    let scan = if title.is_empty() {
        text.to_string()
    } else {
        format!("{}\n{}", title, text)
    };

    HookSet {
        numbers: collect_matches(&NUMBER_RE, &scan, MAX_NUMBERS),
        quotes: collect_captures(&QUOTE_RE, &scan, MAX_QUOTES),
        dates: collect_matches(&DATE_RE, &scan, MAX_DATES),
        actors: extract_actors(text, title),
        impacts: collect_matches(&IMPACT_RE, &scan, MAX_IMPACTS),
        comparisons: collect_matches(&COMPARISON_RE, &scan, MAX_COMPARISONS),
    }
}

/// Title-derived actors first, then body-derived, deduped in discovery order.
pub fn extract_actors(text: &str, title: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut actors = Vec::new();

    for source in [title, text] {
        for m in ACTOR_RE.find_iter(source) {
            for segment in split_at_punctuation(m.as_str()) {
                let Some(actor) = clean_actor(&segment) else {
                    continue;
                };
                if seen.insert(actor.to_lowercase()) {
                    actors.push(actor);
                    if actors.len() == MAX_ACTORS {
                        return actors;
                    }
                }
            }
        }
    }

    actors
}

/// Splits a capitalized run where a token closes a clause ("Smith. The Council").
fn split_at_punctuation(candidate: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in candidate.split_whitespace() {
        current.push(token);
        let closes = token.ends_with(['.', ',', ';', ':'])
            && !is_initialism(token.trim_end_matches([',', ';', ':']));
        if closes {
            segments.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        segments.push(current.join(" "));
    }
    segments
}

/// "U.S." or "J." style tokens keep their dots.
fn is_initialism(token: &str) -> bool {
    let letters: Vec<&str> = token.split('.').filter(|s| !s.is_empty()).collect();
    token.ends_with('.') && !letters.is_empty() && letters.iter().all(|s| s.chars().count() == 1)
}

/// Applies the actor cleaning rules; `None` means the candidate is rejected.
pub fn clean_actor(candidate: &str) -> Option<String> {
    let trimmed = candidate
        .trim()
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '!' | '?' | '\'' | '’' | '"'));
    let trimmed = if is_initialism(trimmed) {
        trimmed
    } else {
        trimmed.trim_end_matches('.')
    };
    if trimmed.is_empty() || is_stop_listed(trimmed) {
        return None;
    }

    let trimmed = trimmed
        .strip_suffix("'s")
        .or_else(|| trimmed.strip_suffix("’s"))
        .unwrap_or(trimmed);

    // Interrogatives and articles are peeled off and the remainder re-tested.
    let mut words: Vec<&str> = trimmed.split_whitespace().collect();
    while let Some(first) = words.first() {
        let lower = first.to_lowercase();
        if is_interrogative(&lower) || LEADING_FILLER.contains(&lower.as_str()) {
            words.remove(0);
        } else {
            break;
        }
    }
    if words.is_empty() {
        return None;
    }

    let actor = words.join(" ");
    if DATE_LIKE_RE.is_match(&actor) || CLOCK_TIME_RE.is_match(&actor) || YEAR_RE.is_match(&actor)
    {
        return None;
    }
    if words.len() == 1 && actor.chars().count() < 4 {
        return None;
    }
    if is_stop_listed(&actor) {
        return None;
    }

    Some(actor)
}

/// Phrase entries match anywhere on word boundaries; single words only match the whole
/// candidate.
fn is_stop_listed(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    let padded = format!(" {} ", lower);
    ACTOR_STOP_LIST.iter().any(|stop| {
        if stop.contains(' ') {
            padded.contains(&format!(" {} ", stop))
        } else {
            lower == *stop
        }
    })
}

fn collect_matches(re: &Regex, haystack: &str, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in re.find_iter(haystack) {
        let value = m.as_str().trim().trim_end_matches(',').trim().to_string();
        if value.is_empty() || !seen.insert(value.clone()) {
            continue;
        }
        out.push(value);
        if out.len() == cap {
            break;
        }
    }
    out
}

fn collect_captures(re: &Regex, haystack: &str, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for caps in re.captures_iter(haystack) {
        let Some(inner) = caps.get(1) else { continue };
        let value = inner.as_str().trim().to_string();
        if value.is_empty() || !seen.insert(value.clone()) {
            continue;
        }
        out.push(value);
        if out.len() == cap {
            break;
        }
    }
    out
}
