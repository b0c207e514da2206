//! Per-title corrections for names the tagger is known to get wrong.
//!
//! Kept as data so new cases are a one-line addition.

use regex::Regex;
use std::sync::LazyLock;

/// Titles whose path component is re-tagged with punctuation replaced by spaces.
pub const PUNCTUATION_SENSITIVE_TITLES: &[&str] = &["Ranma", "Chi", "Bleach", "Link Click"];

/// A literal rewrite of the path component for one exact title and episode.
pub struct TitleRewrite {
    pub title: &'static str,
    pub episode: u32,
    pub replacements: &'static [(&'static str, &'static str)],
}

pub const TITLE_REWRITES: &[TitleRewrite] = &[TitleRewrite {
    // "5 Centimeters per Second": the leading 5 is tagged as the episode.
    title: "Centimeters per Second",
    episode: 5,
    replacements: &[(" 5 ", " Five "), ("per Second", "per Second 3")],
}];

static RE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:!*?"<>|._-]"#).unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_EPISODE_REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(E\d+)v\d").unwrap());

/// Apply every correction that matches `title` to the path component `text`.
pub fn apply(text: &str, title: &str, episode: Option<u32>) -> String {
    let mut text = text.to_string();

    if PUNCTUATION_SENSITIVE_TITLES
        .iter()
        .any(|needle| title.contains(needle))
    {
        let spaced = RE_PUNCTUATION.replace_all(&text, " ");
        text = RE_WHITESPACE.replace_all(&spaced, " ").trim().to_string();
    }

    for rewrite in TITLE_REWRITES {
        if title == rewrite.title && episode == Some(rewrite.episode) {
            for (from, to) in rewrite.replacements {
                text = text.replace(from, to);
            }
        }
    }

    strip_episode_revision(&text)
}

/// `E05v2` → `E05`.
fn strip_episode_revision(text: &str) -> String {
    let Some(caps) = RE_EPISODE_REVISION.captures(text) else {
        return text.to_string();
    };
    text.replace(&caps[0], &caps[1])
}
