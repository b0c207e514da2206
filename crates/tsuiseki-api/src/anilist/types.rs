use std::fmt;

use serde::Deserialize;

use crate::traits::{CatalogEntry, ListEntry, ListStatus, MediaSeason, SavedEntry};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLErrorMessage {
    pub message: String,
    pub status: Option<u16>,
}

impl fmt::Display for GraphQLErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ── Search ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub season: Option<MediaSeason>,
    pub season_year: Option<u32>,
    pub episodes: Option<u32>,
    pub duration: Option<u32>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub media_list_entry: Option<MediaListEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListEntry {
    pub status: Option<ListStatus>,
    pub progress: Option<u32>,
}

impl AniListMedia {
    pub fn into_catalog_entry(self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            title: self.title.and_then(|t| t.romaji),
            season: self.season,
            season_year: self.season_year,
            episodes: self.episodes,
            duration: self.duration,
            format: self.format,
            status: self.status,
            list_entry: self.media_list_entry.map(|e| ListEntry {
                status: e.status,
                progress: e.progress,
            }),
        }
    }
}

// ── Mutations ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveEntryResponse {
    #[serde(rename = "SaveMediaListEntry")]
    pub save_media_list_entry: SavedMediaListEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMediaListEntry {
    pub media_id: u64,
    pub status: Option<ListStatus>,
    pub progress: Option<u32>,
}

impl SavedMediaListEntry {
    pub fn into_saved_entry(self) -> SavedEntry {
        SavedEntry {
            media_id: self.media_id,
            progress: self.progress,
            status: self.status,
        }
    }
}
