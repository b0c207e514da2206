//! Absolute episode numbering.
//!
//! Long-running shows are often released with episodes numbered across all
//! seasons (`One Piece - 1000`), while the catalog splits them into one entry
//! per season. This module finds the entry an absolute number falls into.

use tsuiseki_api::{CatalogEntry, MediaSeason};

use crate::models::SeasonEpisodeResolution;

/// Episode count assumed for entries that don't report one.
pub const DEFAULT_EPISODE_COUNT: u32 = 12;

/// Minutes per episode above which an entry counts as a regular season.
const MIN_EPISODE_DURATION: u32 = 21;

/// Order within a year; unknown seasons sort last.
pub fn season_order(season: Option<MediaSeason>) -> u8 {
    season.map_or(5, MediaSeason::order)
}

/// Keep full-length TV seasons, oldest first.
///
/// Entries without a duration are kept only while still airing. Entries
/// without a year sort after every dated entry. Ties keep their search order.
pub fn filter_valid_seasons(entries: &[CatalogEntry]) -> Vec<&CatalogEntry> {
    let mut seasons: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|entry| entry.format.as_deref() == Some("TV"))
        .filter(|entry| match entry.duration {
            Some(minutes) => minutes > MIN_EPISODE_DURATION,
            None => entry.status.as_deref() == Some("RELEASING"),
        })
        .collect();
    seasons.sort_by_key(|entry| {
        (
            entry.season_year.unwrap_or(u32::MAX),
            season_order(entry.season),
        )
    });
    seasons
}

/// Walk `seasons` in order, accumulating episode counts, and return the first
/// season whose range contains `absolute`.
pub fn find_season_and_episode(
    seasons: &[&CatalogEntry],
    absolute: u32,
) -> Option<SeasonEpisodeResolution> {
    let mut accumulated = 0;
    for season in seasons {
        let count = season
            .episodes
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_EPISODE_COUNT);
        if accumulated + count >= absolute {
            return Some(SeasonEpisodeResolution {
                entry_id: season.id,
                entry_title: season.title.clone(),
                remote_progress: season.list_entry.as_ref().and_then(|e| e.progress),
                episode_count: season.episodes,
                relative_episode: absolute.saturating_sub(accumulated),
            });
        }
        accumulated += count;
    }
    None
}

/// Map an absolute episode onto the franchise entries returned by a search.
pub fn resolve(entries: &[CatalogEntry], absolute: u32) -> Option<SeasonEpisodeResolution> {
    let seasons = filter_valid_seasons(entries);
    let resolution = find_season_and_episode(&seasons, absolute);
    tracing::debug!(
        absolute,
        candidates = entries.len(),
        valid = seasons.len(),
        resolved = ?resolution.as_ref().map(|r| (r.entry_id, r.relative_episode)),
        "absolute episode resolution"
    );
    resolution
}
