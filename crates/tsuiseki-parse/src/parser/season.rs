use regex::Regex;
use std::sync::LazyLock;

/// `S2`, `S01`.
static RE_S_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^S(\d{1,2})$").unwrap());

/// `2nd`, `3rd`, used as `2nd Season`.
static RE_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{1,2})(?:st|nd|rd|th)$").unwrap());

/// `第2期`, `2期`.
static RE_JAPANESE_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第?(\d{1,2})期$").unwrap());

pub fn s_prefix(text: &str) -> Option<u32> {
    RE_S_PREFIX.captures(text)?[1].parse().ok()
}

pub fn ordinal(text: &str) -> Option<u32> {
    RE_ORDINAL.captures(text)?[1].parse().ok()
}

pub fn japanese(text: &str) -> Option<u32> {
    RE_JAPANESE_SEASON.captures(text)?[1].parse().ok()
}

pub fn is_season_word(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "season" | "saison")
}

/// `Part 2`, `Cour 2`.
pub fn is_part_word(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "part" | "cour")
}

/// A small decimal or roman numeral (`2`, `II`, `iv`).
pub fn number_or_roman(text: &str) -> Option<u32> {
    if let Ok(n) = text.parse::<u32>() {
        return (n < 100).then_some(n);
    }
    match text.to_uppercase().as_str() {
        "I" => Some(1),
        "II" => Some(2),
        "III" => Some(3),
        "IV" => Some(4),
        "V" => Some(5),
        "VI" => Some(6),
        "VII" => Some(7),
        "VIII" => Some(8),
        "IX" => Some(9),
        "X" => Some(10),
        _ => None,
    }
}
