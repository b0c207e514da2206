use serde::{Deserialize, Serialize};
use tsuiseki_api::{CatalogEntry, ListStatus};

/// Resolved state of one anime on the user's list, plus the episode just watched.
///
/// `current_progress` and `current_status` are both `None` when the anime
/// exists in the catalog but not on the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeProgress {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub current_progress: Option<u32>,
    pub total_episodes: Option<u32>,
    /// Relative to `id`'s own numbering.
    pub observed_episode: Option<u32>,
    pub current_status: Option<ListStatus>,
}

impl AnimeProgress {
    /// Build from a search hit and the episode observed in the file.
    pub fn from_entry(entry: &CatalogEntry, observed_episode: u32) -> Self {
        let list_entry = entry.list_entry.as_ref();
        Self {
            id: Some(entry.id),
            name: entry.title.clone(),
            current_progress: list_entry.and_then(|e| e.progress),
            total_episodes: entry.episodes,
            observed_episode: Some(observed_episode),
            current_status: list_entry.and_then(|e| e.status),
        }
    }

    /// Same, but without the list state: a candidate for adding to the list.
    pub fn off_list(entry: &CatalogEntry, observed_episode: u32) -> Self {
        Self {
            current_progress: None,
            current_status: None,
            ..Self::from_entry(entry, observed_episode)
        }
    }

    pub fn is_on_list(&self) -> bool {
        self.current_progress.is_some() || self.current_status.is_some()
    }
}

/// Where an absolute episode number lands among a franchise's seasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEpisodeResolution {
    pub entry_id: u64,
    pub entry_title: Option<String>,
    pub remote_progress: Option<u32>,
    pub episode_count: Option<u32>,
    pub relative_episode: u32,
}
