use regex::Regex;
use std::sync::LazyLock;

use crate::models::Domain;

static SPORTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:sports?|nba|nfl|mlb|nhl|mls|wnba|playoffs?|postseason|coach(?:es)?|quarterback|touchdown|innings?|championship|tournament|athletes?|roster|free agen(?:t|cy)|celtics|patriots|red sox|bruins|revolution|marathon|super bowl|world series|stanley cup)\b",
    )
    .unwrap()
});

static ENTERTAINMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:entertainment|arts|movies?|films?|music|album|concert|celebrit(?:y|ies)|actor|actress|tv|television|netflix|hbo|broadway|theat(?:er|re)|box office|streaming series|singer|songwriter|grammys?|oscars?|emmys?)\b",
    )
    .unwrap()
});

static GOV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:politics|government|governor|mayor|city council|councilors?|legislature|lawmakers?|state house|senate|senators?|congress(?:ional)?|select board|town meeting|ballot|election|budget|ordinance|white house|administration|public officials)\b",
    )
    .unwrap()
});

static COURTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:courts?|courthouse|judge|jury|trial|lawsuits?|sued|sues|indict(?:ed|ment)|arraign(?:ed|ment)|pleaded|plea deal|sentenced|sentencing|prosecutors?|district attorney|verdict|appeals court|docket|defendants?|convicted)\b",
    )
    .unwrap()
});

static REALESTATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:real estate|housing|home prices?|homebuyers?|mortgages?|rents?|renters|landlords?|tenants?|condos?|apartments?|zoning|developers?|listing price|property values?|sq\.? ?ft|square feet)\b",
    )
    .unwrap()
});

/// Priority order; the first matching rule wins.
fn rules() -> [(Domain, &'static Regex); 5] {
    [
        (Domain::Sports, &*SPORTS_RE),
        (Domain::Entertainment, &*ENTERTAINMENT_RE),
        (Domain::Gov, &*GOV_RE),
        (Domain::Courts, &*COURTS_RE),
        (Domain::RealEstate, &*REALESTATE_RE),
    ]
}

/// Assigns exactly one domain from the section label plus body text.
pub fn classify(text: &str, section: &str) -> Domain {
    let haystack = format!("{} {}", section, text);
    rules()
        .into_iter()
        .find(|(_, re)| re.is_match(&haystack))
        .map(|(domain, _)| domain)
        .unwrap_or(Domain::General)
}
