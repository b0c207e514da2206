//! Path → search name and episode number.

use tsuiseki_parse::tokenizer::split_extension;
use tsuiseki_parse::{ElementKind, Elements, Multi, ParseOptions};

use crate::error::SyncError;
use crate::fixups;
use crate::models::ParsedFile;

/// Folder depths consulted above the file: the parent, then the grandparent.
const FOLDER_DEPTHS: [usize; 2] = [2, 3];

/// Classifies a single path component.
pub trait Tagger {
    fn tag(&self, text: &str) -> Elements;
}

/// The production tagger: episode mode, language and country words kept in titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameTagger;

impl Tagger for FilenameTagger {
    fn tag(&self, text: &str) -> Elements {
        tsuiseki_parse::parse_with(text, &ParseOptions::episode())
    }
}

pub struct Extractor<T = FilenameTagger> {
    tagger: T,
}

impl Default for Extractor<FilenameTagger> {
    fn default() -> Self {
        Self::new(FilenameTagger)
    }
}

impl<T: Tagger> Extractor<T> {
    pub fn new(tagger: T) -> Self {
        Self { tagger }
    }

    pub fn extract(&self, path: &str) -> Result<ParsedFile, SyncError> {
        let parts = self.prepare(path)?;
        let filename = &parts[parts.len() - 1];
        let guess = self.tagger.tag(filename);
        tracing::debug!(filename = %filename, guess = %to_json(&guess), "filename guess");

        let mut season = guess.season.first().copied();
        let mut part = guess.part;
        let mut year = guess.year;

        let mut remaining: &[u32] = &[];
        let mut episode = match &guess.episode {
            Multi::Absent => guess
                .episode_title
                .as_deref()
                .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
                .and_then(|t| t.parse().ok()),
            Multi::Scalar(n) => Some(*n),
            Multi::Multiple(all) => {
                if let Some((last, rest)) = all.split_last() {
                    remaining = rest;
                    Some(*last)
                } else {
                    None
                }
            }
        };
        if let Multi::Multiple(seasons) = &guess.season {
            if episode.is_none() && seasons.len() > 1 {
                episode = seasons.last().copied();
            }
        }
        let episode = episode.unwrap_or(1);

        let name = if title_is_trusted(&guess) {
            guess.title.clone()
        } else {
            self.folder_title(&parts, &mut season, &mut part, &mut year)
                .or_else(|| guess.title.clone())
        };
        let Some(mut name) = name else {
            return Err(parse_error(path, &guess));
        };

        if !remaining.is_empty() {
            let numbers: Vec<String> = remaining.iter().map(u32::to_string).collect();
            name.push(' ');
            name.push_str(&numbers.join(" "));
        }
        if let Some(season) = season {
            if season > 1 || part.is_some() {
                name.push_str(&format!(" Season {season}"));
            }
        }
        if let Some(part) = part {
            name.push_str(&format!(" Part {part}"));
        }

        tracing::info!(name = %name, episode, ?year, "parsed file");
        Ok(ParsedFile {
            name,
            episode,
            year,
        })
    }

    /// Split the path, strip the extension and apply title fixups to the
    /// component the title comes from.
    fn prepare(&self, path: &str) -> Result<Vec<String>, SyncError> {
        let normalized = path.replace('\\', "/");
        let mut parts: Vec<String> = normalized.split('/').map(str::to_string).collect();
        let last = parts.len() - 1;

        let guess = self.tagger.tag(&parts[last]);
        parts[last] = split_extension(&parts[last]).0.to_string();

        let found = match guess.title.clone() {
            Some(title) => Some((last, title)),
            None => FOLDER_DEPTHS
                .iter()
                .filter(|&&depth| depth <= parts.len())
                .find_map(|&depth| {
                    let index = parts.len() - depth;
                    self.tagger.tag(&parts[index]).title.map(|t| (index, t))
                }),
        };
        let Some((index, title)) = found else {
            tracing::warn!(path, guess = %to_json(&guess), "no title in filename or folders");
            return Err(parse_error(path, &guess));
        };

        let episode = match guess.episode {
            Multi::Scalar(n) => Some(n),
            _ => None,
        };
        parts[index] = fixups::apply(&parts[index], &title, episode);
        Ok(parts)
    }

    /// Title from the nearest folder that has one. Every folder visited on the
    /// way fills season, part and year where they are still empty, so
    /// `Show/Season 2/05.mkv` keeps its season.
    fn folder_title(
        &self,
        parts: &[String],
        season: &mut Option<u32>,
        part: &mut Option<u32>,
        year: &mut Option<u32>,
    ) -> Option<String> {
        for depth in FOLDER_DEPTHS {
            if depth > parts.len() {
                break;
            }
            let folder = &parts[parts.len() - depth];
            let guess = self.tagger.tag(folder);
            tracing::debug!(depth, folder = %folder, guess = %to_json(&guess), "folder guess");
            *season = season.or(guess.season.first().copied());
            *part = part.or(guess.part);
            *year = year.or(guess.year);
            if guess.title.is_some() {
                return guess.title;
            }
        }
        None
    }
}

/// The filename's own title is trusted unless the episode or season marker
/// comes first, which means the leading text is probably an episode title.
fn title_is_trusted(guess: &Elements) -> bool {
    let episode_index = guess
        .key_index(ElementKind::Episode)
        .map_or(1, |i| i as isize);
    let season_index = guess
        .key_index(ElementKind::Season)
        .map_or(-1, |i| i as isize);
    guess.title.is_some() && episode_index > 0 && (season_index > 0 || season_index == -1)
}

fn to_json(guess: &Elements) -> String {
    serde_json::to_string(guess).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

fn parse_error(path: &str, guess: &Elements) -> SyncError {
    SyncError::Parse {
        path: path.to_string(),
        guess: to_json(guess),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(path: &str) -> ParsedFile {
        Extractor::default().extract(path).unwrap()
    }

    #[test]
    fn test_trusted_filename_title() {
        let p = extract("/anime/whatever/[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv");
        assert_eq!(p.name, "Sousou no Frieren");
        assert_eq!(p.episode, 5);
        assert_eq!(p.year, None);
    }

    #[test]
    fn test_windows_separators() {
        let p = extract(r"C:\Anime\Frieren\[SubsPlease] Sousou no Frieren - 07 (1080p).mkv");
        assert_eq!(p.name, "Sousou no Frieren");
        assert_eq!(p.episode, 7);
    }

    #[test]
    fn test_episode_first_uses_folder_title() {
        let p = extract("/anime/Haikyuu (2014)/05 - Some Episode Name.mkv");
        assert_eq!(p.name, "Haikyuu");
        assert_eq!(p.episode, 5);
        assert_eq!(p.year, Some(2014));
    }

    #[test]
    fn test_bare_episode_file_uses_folder() {
        let p = extract("/anime/Frieren/05.mkv");
        assert_eq!(p.name, "Frieren");
        assert_eq!(p.episode, 5);
    }

    #[test]
    fn test_grandparent_folder() {
        let p = extract("/anime/Bocchi the Rock/Season 1/03.mkv");
        assert_eq!(p.name, "Bocchi the Rock");
        assert_eq!(p.episode, 3);
    }

    #[test]
    fn test_season_folder_keeps_season() {
        let p = extract("/anime/Show/Season 2/05.mkv");
        assert_eq!(p.name, "Show Season 2");
        assert_eq!(p.episode, 5);

        let p = extract("/anime/Attack on Titan/Season 3 Part 2/05.mkv");
        assert_eq!(p.name, "Attack on Titan Season 3 Part 2");
        assert_eq!(p.episode, 5);
    }

    #[test]
    fn test_filename_season_beats_folder() {
        let mut file = Elements::default();
        file.episode.push(4);
        file.season.push(3);
        let mut season_folder = Elements::default();
        season_folder.season.push(2);
        let mut show_folder = Elements::default();
        show_folder.title = Some("Show".into());
        let extractor = Extractor::new(CannedTagger(vec![
            ("04.mkv", file.clone()),
            ("04", file),
            ("Season 2", season_folder),
            ("Show", show_folder),
        ]));
        let p = extractor.extract("/anime/Show/Season 2/04.mkv").unwrap();
        assert_eq!(p.name, "Show Season 3");
        assert_eq!(p.episode, 4);
    }

    #[test]
    fn test_season_suffix_added_after_second_season() {
        let p = extract("/anime/Show S2 - 04.mkv");
        assert_eq!(p.name, "Show Season 2");
        assert_eq!(p.episode, 4);

        let p = extract("/anime/Show S1 - 04.mkv");
        assert_eq!(p.name, "Show");
    }

    #[test]
    fn test_part_suffix() {
        let p = extract("/anime/Attack on Titan Season 3 Part 2 - 05.mkv");
        assert_eq!(p.name, "Attack on Titan Season 3 Part 2");
        let p = extract("/anime/Attack on Titan Part 2 - 05.mkv");
        assert_eq!(p.name, "Attack on Titan Part 2");
    }

    #[test]
    fn test_leading_numbers_join_folder_name() {
        let p = extract("/anime/Eighty Six/86 - 13.mkv");
        assert_eq!(p.name, "Eighty Six 86");
        assert_eq!(p.episode, 13);
    }

    #[test]
    fn test_default_episode_is_one() {
        let p = extract("/movies/Kimi no Na wa (2016).mkv");
        assert_eq!(p.name, "Kimi no Na wa");
        assert_eq!(p.episode, 1);
        assert_eq!(p.year, Some(2016));
    }

    #[test]
    fn test_punctuation_sensitive_title() {
        let p = extract("/anime/Link.Click_-_03.mkv");
        assert_eq!(p.name, "Link Click");
        assert_eq!(p.episode, 3);
    }

    #[test]
    fn test_episode_revision_removed() {
        let p = extract("/anime/Show.S01E05v2.mkv");
        assert_eq!(p.name, "Show");
        assert_eq!(p.episode, 5);
    }

    #[test]
    fn test_no_title_anywhere() {
        let err = Extractor::default().extract("05.mkv").unwrap_err();
        match err {
            SyncError::Parse { path, guess } => {
                assert_eq!(path, "05.mkv");
                assert!(guess.contains("\"episode\":5"), "{guess}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    struct CannedTagger(Vec<(&'static str, Elements)>);

    impl Tagger for CannedTagger {
        fn tag(&self, text: &str) -> Elements {
            self.0
                .iter()
                .find(|(input, _)| *input == text)
                .map(|(_, e)| e.clone())
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_digit_episode_title_is_the_episode() {
        let mut guess = Elements::default();
        guess.title = Some("Show".into());
        guess.episode_title = Some("07".into());
        let extractor = Extractor::new(CannedTagger(vec![
            ("Show 07.mkv", guess.clone()),
            ("Show 07", guess),
        ]));
        let p = extractor.extract("Show 07.mkv").unwrap();
        assert_eq!(p.name, "Show");
        assert_eq!(p.episode, 7);
    }

    #[test]
    fn test_multiple_seasons_supply_episode() {
        let mut guess = Elements::default();
        guess.title = Some("Show".into());
        guess.season.push(2);
        guess.season.push(6);
        let extractor =
            Extractor::new(CannedTagger(vec![("Show", guess.clone()), ("Show.mkv", guess)]));
        let p = extractor.extract("Show.mkv").unwrap();
        assert_eq!(p.episode, 6);
        assert_eq!(p.name, "Show Season 2");
    }
}
