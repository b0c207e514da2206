use regex::Regex;
use std::sync::LazyLock;

/// An episode number read from a single word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeNumber {
    pub number: u32,
    /// Release revision such as `v2`.
    pub version: Option<String>,
}

/// `S01E05`, `S01E05v2`.
static RE_COMBINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^S(\d{1,2})E(\d{1,4})(?:v(\d))?$").unwrap());

/// `01x05`.
static RE_COMBINED_X: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[xX](\d{1,4})$").unwrap());

/// `EP05`, `E05`, `Ep.05`, `#05`, optionally with a revision.
static RE_PREFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:EPS|EP|E|#)\.?(\d{1,4})(?:v(\d))?$").unwrap());

/// `第05話`, `第05集`.
static RE_JAPANESE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^第(\d{1,4})[話集]$").unwrap());

/// `05`, `05v2`, `07.5` (integer part kept).
static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})(?:\.\d)?(?:[vV](\d))?$").unwrap());

/// `01-03`; only the first number is kept.
static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,4})[-~](\d{1,4})$").unwrap());

const MAX_EPISODE: u32 = 1999;

/// Four-digit numbers in the plausible release-year window.
pub fn is_year(text: &str) -> bool {
    text.len() == 4
        && text.chars().all(|c| c.is_ascii_digit())
        && text
            .parse::<u32>()
            .is_ok_and(|year| (1950..=2050).contains(&year))
}

fn build(number: &str, version: Option<regex::Match<'_>>) -> Option<EpisodeNumber> {
    let number: u32 = number.parse().ok()?;
    if number > MAX_EPISODE {
        return None;
    }
    Some(EpisodeNumber {
        number,
        version: version.map(|v| format!("v{}", v.as_str())),
    })
}

/// Season and episode from one word: `S01E05` or `01x05`.
pub fn combined(text: &str) -> Option<(u32, EpisodeNumber)> {
    if let Some(caps) = RE_COMBINED.captures(text) {
        let season = caps[1].parse().ok()?;
        return Some((season, build(&caps[2], caps.get(3))?));
    }
    let caps = RE_COMBINED_X.captures(text)?;
    let season = caps[1].parse().ok()?;
    Some((season, build(&caps[2], None)?))
}

/// Explicitly marked episodes: `EP05`, `E05`, `#05`, `第05話`.
pub fn prefixed(text: &str) -> Option<EpisodeNumber> {
    if let Some(caps) = RE_PREFIXED.captures(text) {
        return build(&caps[1], caps.get(2));
    }
    let caps = RE_JAPANESE_COUNTER.captures(text)?;
    build(&caps[1], None)
}

/// A bare number that could be an episode. Years are rejected.
pub fn number(text: &str) -> Option<EpisodeNumber> {
    if is_year(text) {
        return None;
    }
    if let Some(caps) = RE_NUMBER.captures(text) {
        return build(&caps[1], caps.get(2));
    }
    let caps = RE_RANGE.captures(text)?;
    build(&caps[1], None)
}

/// `Episode` / `Ep` written as a separate word before the number.
pub fn is_episode_word(text: &str) -> bool {
    matches!(text.to_lowercase().as_str(), "episode" | "ep" | "eps")
}
