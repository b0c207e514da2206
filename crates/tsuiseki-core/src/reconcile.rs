//! Decide and commit the list mutation for a watched episode.

use tracing::{debug, info};
use tsuiseki_api::{EntryUpdate, ListService, ListStatus, SavedEntry};

use crate::config::SyncOptions;
use crate::error::SyncError;
use crate::models::AnimeProgress;

/// The mutation a watched episode calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListUpdate {
    /// Put a catalog entry on the list as `CURRENT`.
    Add { progress: u32 },
    /// Restart a completed entry at episode 1. The service resets progress
    /// when leaving `COMPLETED`, so this takes two saves.
    Rewatch,
    Save { progress: u32, status: ListStatus },
}

/// Pure decision: what should change, or why nothing may.
pub fn plan(progress: &AnimeProgress, options: &SyncOptions) -> Result<ListUpdate, SyncError> {
    let name = progress.name.as_deref().unwrap_or("unknown title");
    if progress.id.is_none() {
        return Err(SyncError::NotInList(format!(
            "couldn't find {name:?}, make sure it is on your list and the title is correct"
        )));
    }
    let observed = progress.observed_episode.unwrap_or(1);

    if !progress.is_on_list() {
        if options.add_entry_if_missing {
            return Ok(ListUpdate::Add { progress: observed });
        }
        return Err(SyncError::NotInList(format!(
            "{name:?} has no list progress, is it on your list?"
        )));
    }

    let Some(status) = progress.current_status else {
        return Err(SyncError::NotModifiable(None));
    };

    let completes = match status {
        ListStatus::Completed
            if observed == 1 && options.set_completed_to_rewatching_on_first_episode =>
        {
            return Ok(ListUpdate::Rewatch);
        }
        ListStatus::Repeating if options.update_progress_when_rewatching => {
            options.set_to_completed_after_last_episode_rewatching
        }
        ListStatus::Current | ListStatus::Planning => {
            if let Some(current) = progress.current_progress {
                if observed <= current {
                    return Err(SyncError::NotNew { observed, current });
                }
            }
            // Planning entries move to current, never straight to completed.
            status == ListStatus::Current && options.set_to_completed_after_last_episode_current
        }
        other => return Err(SyncError::NotModifiable(Some(other))),
    };

    let target = if completes && progress.total_episodes == Some(observed) {
        ListStatus::Completed
    } else if status == ListStatus::Repeating {
        ListStatus::Repeating
    } else {
        ListStatus::Current
    };
    Ok(ListUpdate::Save {
        progress: observed,
        status: target,
    })
}

/// Plan and commit. Returns the state the service reports after the save.
pub async fn reconcile<S: ListService>(
    service: &S,
    progress: AnimeProgress,
    options: &SyncOptions,
) -> Result<AnimeProgress, SyncError> {
    let update = plan(&progress, options)?;
    let Some(media_id) = progress.id else {
        return Err(SyncError::NotInList("missing media id".into()));
    };
    let name = progress.name.clone().unwrap_or_default();
    debug!(title = %name, media_id, ?update, "Planned list update");

    match update {
        ListUpdate::Add { progress: episode } => {
            let saved = save(service, media_id, Some(episode), Some(ListStatus::Current)).await?;
            info!(title = %name, media_id, episode, "Added to list");
            Ok(AnimeProgress {
                current_progress: saved.progress.or(Some(episode)),
                current_status: saved.status.or(Some(ListStatus::Current)),
                ..progress
            })
        }
        ListUpdate::Rewatch => {
            save(service, media_id, Some(0), Some(ListStatus::Repeating)).await?;
            let saved = save(service, media_id, Some(1), None).await?;
            info!(title = %name, media_id, progress = ?saved.progress, "Started rewatch");
            Ok(AnimeProgress {
                current_progress: saved.progress,
                current_status: saved.status.or(Some(ListStatus::Repeating)),
                observed_episode: Some(1),
                ..progress
            })
        }
        ListUpdate::Save {
            progress: episode,
            status,
        } => {
            let saved = save(service, media_id, Some(episode), Some(status)).await?;
            info!(
                title = %name,
                media_id,
                progress = ?saved.progress,
                status = ?saved.status,
                "Updated progress"
            );
            Ok(AnimeProgress {
                current_progress: saved.progress,
                current_status: saved.status,
                ..progress
            })
        }
    }
}

async fn save<S: ListService>(
    service: &S,
    media_id: u64,
    progress: Option<u32>,
    status: Option<ListStatus>,
) -> Result<SavedEntry, SyncError> {
    service
        .save_entry(&EntryUpdate {
            media_id,
            progress,
            status,
        })
        .await
        .map_err(SyncError::api)
}
