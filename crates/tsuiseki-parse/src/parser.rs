mod episode;
mod season;
mod title;

use regex::Regex;
use std::sync::LazyLock;

use crate::elements::{ElementKind, Elements};
use crate::keyword::{self, KeywordEntry, KeywordKind};
use crate::options::{Exclude, ParseOptions};
use crate::tokenizer::{self, Token, TokenKind};

use episode::EpisodeNumber;

static RE_RESOLUTION_WXH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3,4}[xX](\d{3,4})$").unwrap());

static RE_RESOLUTION_P: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)(\d{3,4})([pi])$").unwrap());

/// Parse with default options.
///
/// # Example
/// ```
/// let e = tsuiseki_parse::parse("[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv");
/// assert_eq!(e.title.as_deref(), Some("Sousou no Frieren"));
/// assert_eq!(e.episode.first(), Some(&5));
/// assert_eq!(e.release_group.as_deref(), Some("SubsPlease"));
/// assert_eq!(e.checksum.as_deref(), Some("ABCD1234"));
/// ```
pub fn parse(input: &str) -> Elements {
    parse_with(input, &ParseOptions::default())
}

/// Parse a filename or folder name into its elements.
pub fn parse_with(input: &str, options: &ParseOptions) -> Elements {
    let (tokens, extension) = tokenizer::tokenize(input);
    let mut scan = Scan {
        identified: vec![false; tokens.len()],
        tokens: &tokens,
        options,
        elements: Elements::default(),
        last_episode: None,
    };

    scan.enclosed_metadata();
    scan.release_group();
    scan.free_keywords();
    scan.markers();
    scan.dash_episodes();
    if options.episode_type {
        scan.bare_numbers();
    }
    scan.enclosed_episode();
    scan.titles();

    let mut elements = scan.elements;
    if let Some(ext) = extension {
        elements.file_extension = Some(ext);
        elements.mark(ElementKind::FileExtension, usize::MAX);
    }
    tracing::trace!(input, ?elements, "parsed");
    elements
}

struct Scan<'a> {
    tokens: &'a [Token],
    identified: Vec<bool>,
    options: &'a ParseOptions,
    elements: Elements,
    /// Index of the right-most episode token.
    last_episode: Option<usize>,
}

impl Scan<'_> {
    fn claim(&mut self, index: usize, kind: ElementKind) {
        self.identified[index] = true;
        self.elements.mark(kind, index);
    }

    /// Next word after `index`, skipping delimiters only.
    fn next_word(&self, index: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, t)| t.kind != TokenKind::Delimiter)
            .filter(|(_, t)| t.is_word())
            .map(|(i, _)| i)
    }

    fn unclaimed_words(&self) -> Vec<usize> {
        let tokens = self.tokens;
        (0..self.tokens.len())
            .filter(|&i| !self.identified[i] && tokens[i].is_word())
            .collect()
    }

    fn push_episode(&mut self, index: usize, episode: EpisodeNumber) {
        self.elements.episode.push(episode.number);
        if self.elements.release_version.is_none() {
            self.elements.release_version = episode.version;
        }
        self.claim(index, ElementKind::Episode);
        self.last_episode = Some(self.last_episode.map_or(index, |last| last.max(index)));
    }

    /// Years, keywords, resolutions and checksums inside brackets.
    fn enclosed_metadata(&mut self) {
        let tokens = self.tokens;
        for i in 0..self.tokens.len() {
            let token = &tokens[i];
            if token.kind != TokenKind::Enclosed {
                continue;
            }
            let text = token.text.as_str();
            if episode::is_year(text) {
                if self.elements.year.is_none() {
                    self.elements.year = text.parse().ok();
                }
                self.claim(i, ElementKind::Year);
                continue;
            }
            if is_checksum(text) {
                self.elements.checksum = Some(text.to_string());
                self.claim(i, ElementKind::Checksum);
                continue;
            }
            // "[1080p HEVC AAC]" is claimed only when every word is metadata.
            let words: Vec<&str> = text.split_whitespace().collect();
            let all_metadata = words
                .iter()
                .all(|w| parse_resolution(w).is_some() || self.keyword(w, true).is_some());
            if all_metadata {
                for word in words {
                    self.metadata_word(word, i, true);
                }
                self.identified[i] = true;
            }
        }
    }

    /// First unclaimed bracket before any free text.
    fn release_group(&mut self) {
        let tokens = self.tokens;
        for i in 0..self.tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Word => return,
                TokenKind::Enclosed if !self.identified[i] => {
                    self.elements.release_group = Some(token.text.clone());
                    self.claim(i, ElementKind::ReleaseGroup);
                    return;
                }
                _ => {}
            }
        }
    }

    fn free_keywords(&mut self) {
        let tokens = self.tokens;
        for i in self.unclaimed_words() {
            let text = tokens[i].text.as_str();
            if self.metadata_word(text, i, false) {
                self.identified[i] = true;
            }
        }
    }

    /// Season, part and episode markers, and free-standing years.
    fn markers(&mut self) {
        let tokens = self.tokens;
        let mut title_started = false;
        for i in 0..self.tokens.len() {
            if self.identified[i] || !tokens[i].is_word() {
                continue;
            }
            let text = tokens[i].text.as_str();

            if let Some((season, episode)) = episode::combined(text) {
                self.elements.season.push(season);
                self.claim(i, ElementKind::Season);
                self.push_episode(i, episode);
                continue;
            }
            if let Some(episode) = episode::prefixed(text) {
                self.push_episode(i, episode);
                continue;
            }
            if let Some(season) = season::s_prefix(text).or_else(|| season::japanese(text)) {
                self.elements.season.push(season);
                self.claim(i, ElementKind::Season);
                continue;
            }
            if let Some(next) = self.next_word(i).filter(|&n| !self.identified[n]) {
                let next_text = tokens[next].text.as_str();
                if season::is_season_word(text) {
                    if let Some(season) = season::number_or_roman(next_text) {
                        self.elements.season.push(season);
                        self.claim(i, ElementKind::Season);
                        self.identified[next] = true;
                        continue;
                    }
                }
                if season::is_season_word(next_text) {
                    if let Some(season) = season::ordinal(text) {
                        self.elements.season.push(season);
                        self.claim(i, ElementKind::Season);
                        self.identified[next] = true;
                        continue;
                    }
                }
                if season::is_part_word(text) {
                    if let Some(part) = season::number_or_roman(next_text) {
                        self.elements.part.get_or_insert(part);
                        self.claim(i, ElementKind::Part);
                        self.identified[next] = true;
                        continue;
                    }
                }
                if episode::is_episode_word(text) {
                    if let Some(episode) = episode::number(next_text) {
                        self.identified[i] = true;
                        self.push_episode(next, episode);
                        continue;
                    }
                }
            }
            if episode::is_year(text) && title_started {
                if self.elements.year.is_none() {
                    self.elements.year = text.parse().ok();
                }
                self.claim(i, ElementKind::Year);
                continue;
            }
            title_started = true;
        }
    }

    /// `Title - 05`.
    fn dash_episodes(&mut self) {
        let tokens = self.tokens;
        for i in 0..self.tokens.len() {
            if tokens[i].kind != TokenKind::Dash {
                continue;
            }
            let Some(next) = self.next_word(i).filter(|&n| !self.identified[n]) else {
                continue;
            };
            if let Some(episode) = episode::number(&tokens[next].text) {
                self.identified[i] = true;
                self.push_episode(next, episode);
            }
        }
    }

    /// Bare numbers in an input known to be an episode.
    ///
    /// Numbers ahead of any title text are episodes and precede those already
    /// found. If nothing is found yet, the first number after title text is the
    /// episode.
    fn bare_numbers(&mut self) {
        let tokens = self.tokens;
        let mut leading = Vec::new();
        let mut trailing = None;
        let mut seen_text = false;
        for i in self.unclaimed_words() {
            match episode::number(&tokens[i].text) {
                Some(episode) if !seen_text => leading.push((i, episode)),
                Some(episode) if trailing.is_none() => trailing = Some((i, episode)),
                Some(_) => {}
                None => seen_text = true,
            }
        }

        if !leading.is_empty() {
            let found = std::mem::take(&mut self.elements.episode);
            for (i, episode) in leading {
                self.push_episode(i, episode);
            }
            for number in found.as_slice() {
                self.elements.episode.push(*number);
            }
        } else if self.elements.episode.is_absent() {
            if let Some((i, episode)) = trailing {
                self.push_episode(i, episode);
            }
        }
    }

    /// `[05]` as a last resort.
    fn enclosed_episode(&mut self) {
        let tokens = self.tokens;
        if !self.elements.episode.is_absent() {
            return;
        }
        for i in 0..self.tokens.len() {
            if self.identified[i] || tokens[i].kind != TokenKind::Enclosed {
                continue;
            }
            if let Some(episode) = episode::number(&tokens[i].text) {
                self.push_episode(i, episode);
                return;
            }
        }
    }

    fn titles(&mut self) {
        let tokens = self.tokens;
        if let Some((index, title)) = title::extract_title(self.tokens, &self.identified) {
            self.elements.title = Some(title);
            self.elements.mark(ElementKind::Title, index);
            for i in index..self.tokens.len() {
                if tokens[i].is_word() && !self.identified[i] {
                    self.identified[i] = true;
                } else if self.identified[i] || tokens[i].kind != TokenKind::Delimiter {
                    break;
                }
            }
        }
        if let Some((index, text)) =
            title::extract_episode_title(self.tokens, &self.identified, self.last_episode)
        {
            self.elements.episode_title = Some(text);
            self.elements.mark(ElementKind::EpisodeTitle, index);
        }
    }

    fn keyword(&self, text: &str, enclosed: bool) -> Option<&'static KeywordEntry> {
        let entry = keyword::lookup(text, enclosed)?;
        let excluded = match entry.kind {
            KeywordKind::Language => self.options.exclude.contains(Exclude::LANGUAGE),
            KeywordKind::Country => self.options.exclude.contains(Exclude::COUNTRY),
            _ => false,
        };
        (!excluded).then_some(entry)
    }

    /// Record a metadata word found at token `index`. Returns whether it was claimed.
    fn metadata_word(&mut self, text: &str, index: usize, enclosed: bool) -> bool {
        if let Some(resolution) = parse_resolution(text) {
            self.elements.resolution.get_or_insert(resolution);
            self.elements.mark(ElementKind::Resolution, index);
            return true;
        }
        let Some(entry) = self.keyword(text, enclosed) else {
            return false;
        };
        let value = text.to_string();
        let e = &mut self.elements;
        let kind = match entry.kind {
            KeywordKind::VideoCodec => {
                e.video_codec.get_or_insert(value);
                ElementKind::VideoCodec
            }
            KeywordKind::AudioCodec => {
                e.audio_codec.get_or_insert(value);
                ElementKind::AudioCodec
            }
            KeywordKind::Resolution => {
                e.resolution.get_or_insert(value);
                ElementKind::Resolution
            }
            KeywordKind::Source => {
                e.source.get_or_insert(value);
                ElementKind::Source
            }
            KeywordKind::EpisodeType => {
                e.episode_type.get_or_insert(value);
                ElementKind::EpisodeType
            }
            KeywordKind::Language => {
                e.language.push(value);
                ElementKind::Language
            }
            KeywordKind::Country => {
                e.country.push(value);
                ElementKind::Country
            }
            KeywordKind::Subtitles => {
                e.subtitles.push(value);
                ElementKind::Subtitles
            }
            KeywordKind::ReleaseInfo => {
                e.release_info.push(value);
                ElementKind::ReleaseInfo
            }
        };
        e.mark(kind, index);
        true
    }
}

fn is_checksum(s: &str) -> bool {
    s.len() == 8 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// `1920x1080` → `1080p`, `720P` → `720p`.
fn parse_resolution(s: &str) -> Option<String> {
    if let Some(caps) = RE_RESOLUTION_WXH.captures(s) {
        return Some(format!("{}p", &caps[1]));
    }
    let caps = RE_RESOLUTION_P.captures(s)?;
    Some(format!("{}{}", &caps[1], caps[2].to_lowercase()))
}
