//! The list-service seam used by the sync engine.
//!
//! [`AniListClient`](crate::AniListClient) is the production implementation;
//! tests substitute in-memory fakes.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

/// Search and mutation operations against a user's anime list.
pub trait ListService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search the catalog. Results are in the service's relevance order.
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CatalogEntry>, Self::Error>> + Send;

    /// Create or update a list entry, returning the values the service stored.
    fn save_entry(
        &self,
        update: &EntryUpdate,
    ) -> impl Future<Output = Result<SavedEntry, Self::Error>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search: String,
    /// Lower bound on the start date, as a fuzzy date integer (`1` means any).
    pub start_after: u32,
    /// Restrict results to entries on the user's list.
    pub on_list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryUpdate {
    pub media_id: u64,
    pub progress: Option<u32>,
    pub status: Option<ListStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedEntry {
    pub media_id: u64,
    pub progress: Option<u32>,
    pub status: Option<ListStatus>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: Option<String>,
    pub season: Option<MediaSeason>,
    pub season_year: Option<u32>,
    pub episodes: Option<u32>,
    /// Minutes per episode.
    pub duration: Option<u32>,
    pub format: Option<String>,
    /// Airing status, e.g. `RELEASING`, `FINISHED`.
    pub status: Option<String>,
    pub list_entry: Option<ListEntry>,
}

/// The user's own record for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub status: Option<ListStatus>,
    pub progress: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl MediaSeason {
    /// Position within a calendar year.
    pub fn order(self) -> u8 {
        match self {
            Self::Winter => 1,
            Self::Spring => 2,
            Self::Summer => 3,
            Self::Fall => 4,
        }
    }
}

/// Status of an entry on the user's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Current,
    Planning,
    Completed,
    Dropped,
    Paused,
    Repeating,
}

impl ListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Planning => "PLANNING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Repeating => "REPEATING",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&ListStatus::Repeating).unwrap();
        assert_eq!(json, "\"REPEATING\"");
        let status: ListStatus = serde_json::from_str("\"PLANNING\"").unwrap();
        assert_eq!(status, ListStatus::Planning);
        assert_eq!(ListStatus::Completed.to_string(), "COMPLETED");
    }

    #[test]
    fn test_season_order() {
        let mut seasons = vec![MediaSeason::Fall, MediaSeason::Winter, MediaSeason::Summer];
        seasons.sort_by_key(|s| s.order());
        assert_eq!(
            seasons,
            vec![MediaSeason::Winter, MediaSeason::Summer, MediaSeason::Fall]
        );
    }
}
