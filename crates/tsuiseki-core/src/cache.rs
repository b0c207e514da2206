//! Per-folder memo of the last resolved list entry.
//!
//! Keyed by a hash of the file's directory, so every episode in one folder
//! shares an entry. The whole map lives in one JSON file that is read once
//! and rewritten on every change.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tsuiseki_api::ListStatus;
use unicode_normalization::UnicodeNormalization;

use crate::models::AnimeProgress;

/// Absolute episode seen last time and the entry-relative episode it mapped to.
///
/// Serialized as `"19->7"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativeMapping {
    pub absolute: u32,
    pub relative: u32,
}

impl RelativeMapping {
    pub fn offset(&self) -> i64 {
        i64::from(self.absolute) - i64::from(self.relative)
    }
}

impl fmt::Display for RelativeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.absolute, self.relative)
    }
}

impl FromStr for RelativeMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (absolute, relative) = s
            .split_once("->")
            .ok_or_else(|| format!("invalid relative progress: {s:?}"))?;
        let number = |text: &str| {
            text.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid relative progress {s:?}: {e}"))
        };
        Ok(Self {
            absolute: number(absolute)?,
            relative: number(relative)?,
        })
    }
}

impl TryFrom<String> for RelativeMapping {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelativeMapping> for String {
    fn from(mapping: RelativeMapping) -> Self {
        mapping.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub guessed_name: String,
    pub anime_id: u64,
    pub current_progress: Option<u32>,
    #[serde(default)]
    pub relative_progress: RelativeMapping,
    pub total_episodes: Option<u32>,
    pub current_status: Option<ListStatus>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Map a new absolute episode through the stored offset.
    ///
    /// `None` when the result falls outside `1..=total_episodes`, or when the
    /// episode count is unknown.
    pub fn rebase(&self, absolute: u32) -> Option<u32> {
        let total = i64::from(self.total_episodes?);
        let relative = i64::from(absolute) - self.relative_progress.offset();
        if !(1..=total).contains(&relative) {
            return None;
        }
        u32::try_from(relative).ok()
    }

    /// Rebuild the list state this entry memoizes, observing `episode`.
    pub fn to_progress(&self, episode: u32) -> AnimeProgress {
        AnimeProgress {
            id: Some(self.anime_id),
            name: Some(self.guessed_name.clone()),
            current_progress: self.current_progress,
            total_episodes: self.total_episodes,
            observed_episode: Some(episode),
            current_status: self.current_status,
        }
    }
}

/// SHA-256 of the directory containing `file_path`, after normalizing
/// separators, Unicode form and case.
pub fn dir_hash(file_path: &str) -> String {
    let normalized = file_path.replace('\\', "/");
    let dir = normalized
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir)
        .trim_end_matches('/');
    let key: String = dir.nfc().collect::<String>().to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct ProgressCache {
    path: PathBuf,
    ttl: Duration,
    entries: Option<BTreeMap<String, CacheEntry>>,
}

impl ProgressCache {
    /// The file is not touched until the first lookup or store.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            entries: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lookup(&mut self, file_path: &str, guessed_name: &str) -> Option<CacheEntry> {
        self.lookup_at(file_path, guessed_name, Utc::now())
    }

    /// Purge everything expired at `now`, then return the folder's entry if
    /// it was stored under the same guessed name.
    pub fn lookup_at(
        &mut self,
        file_path: &str,
        guessed_name: &str,
        now: DateTime<Utc>,
    ) -> Option<CacheEntry> {
        let entries = self.load();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let purged = before - entries.len();

        let key = dir_hash(file_path);
        let hit = entries
            .get(&key)
            .filter(|entry| entry.guessed_name == guessed_name)
            .cloned();

        if purged > 0 {
            tracing::debug!(purged, "purged expired cache entries");
            self.persist();
        }
        match &hit {
            Some(entry) => tracing::debug!(key = %key, anime_id = entry.anime_id, "cache hit"),
            None => tracing::debug!(key = %key, name = guessed_name, "cache miss"),
        }
        hit
    }

    pub fn store(
        &mut self,
        file_path: &str,
        guessed_name: &str,
        absolute_episode: u32,
        progress: &AnimeProgress,
    ) {
        self.store_at(file_path, guessed_name, absolute_episode, progress, Utc::now());
    }

    /// Remember `progress` for the file's folder until `now + ttl`.
    /// Progress without an id is not stored.
    pub fn store_at(
        &mut self,
        file_path: &str,
        guessed_name: &str,
        absolute_episode: u32,
        progress: &AnimeProgress,
        now: DateTime<Utc>,
    ) {
        let Some(anime_id) = progress.id else {
            return;
        };
        let entry = CacheEntry {
            guessed_name: guessed_name.to_string(),
            anime_id,
            current_progress: progress.current_progress,
            relative_progress: RelativeMapping {
                absolute: absolute_episode,
                relative: progress.observed_episode.unwrap_or(absolute_episode),
            },
            total_episodes: progress.total_episodes,
            current_status: progress.current_status,
            expires_at: now + self.ttl,
        };
        let key = dir_hash(file_path);
        tracing::debug!(key = %key, anime_id, mapping = %entry.relative_progress, "storing cache entry");
        self.load().insert(key, entry);
        self.persist();
    }

    fn load(&mut self) -> &mut BTreeMap<String, CacheEntry> {
        let path = &self.path;
        self.entries.get_or_insert_with(|| read_entries(path))
    }

    fn persist(&self) {
        let Some(entries) = &self.entries else {
            return;
        };
        if let Err(e) = write_entries(&self.path, entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write cache");
        }
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, CacheEntry> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read cache, starting empty");
            return BTreeMap::new();
        }
    };
    if content.trim().is_empty() {
        return BTreeMap::new();
    }
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&content) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt cache file, starting empty");
            return BTreeMap::new();
        }
    };
    raw.into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "dropping malformed cache entry");
                None
            }
        })
        .collect()
}

fn write_entries(path: &Path, entries: &BTreeMap<String, CacheEntry>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, content)
}
