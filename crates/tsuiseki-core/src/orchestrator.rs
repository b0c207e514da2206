use tracing::{debug, info, warn};
use tsuiseki_api::{CatalogEntry, ListService, SearchQuery};

use crate::absolute;
use crate::cache::ProgressCache;
use crate::config::SyncOptions;
use crate::error::SyncError;
use crate::extract::{Extractor, FilenameTagger, Tagger};
use crate::models::{AnimeProgress, ParsedFile};
use crate::reconcile::reconcile;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Record the episode on the list.
    Update,
    /// Only find the entry's page.
    Launch,
}

/// Result of syncing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The entry's AniList page, for the caller to open.
    Launch { name: String, url: String },
    /// The list state after the update.
    Updated { progress: AnimeProgress },
}

pub fn anime_url(id: u64) -> String {
    format!("https://anilist.co/anime/{id}")
}

/// Runs one file through extraction, resolution and reconciliation.
pub struct Updater<S, T = FilenameTagger> {
    service: S,
    extractor: Extractor<T>,
    cache: ProgressCache,
    options: SyncOptions,
}

impl<S: ListService, T: Tagger> Updater<S, T> {
    pub fn new(service: S, tagger: T, cache: ProgressCache, options: SyncOptions) -> Self {
        Self {
            service,
            extractor: Extractor::new(tagger),
            cache,
            options,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn run(&mut self, path: &str, action: Action) -> Result<SyncOutcome, SyncError> {
        let file = self.extractor.extract(path)?;
        let cached = self.cache.lookup(path, &file.name);

        if action == Action::Launch {
            if let Some(entry) = &cached {
                info!(title = %file.name, anime_id = entry.anime_id, "Opening cached entry");
                return Ok(SyncOutcome::Launch {
                    name: file.name,
                    url: anime_url(entry.anime_id),
                });
            }
        }

        let from_cache = cached.as_ref().and_then(|entry| {
            let relative = entry.rebase(file.episode)?;
            Some(entry.to_progress(relative))
        });
        let progress = match from_cache {
            Some(progress) => {
                info!(
                    title = %file.name,
                    episode = file.episode,
                    relative = ?progress.observed_episode,
                    "Using cached entry"
                );
                progress
            }
            None => {
                if cached.is_some() {
                    debug!(title = %file.name, episode = file.episode, "Cached entry out of range");
                }
                self.resolve(&file, action).await?
            }
        };

        let (outcome, progress) = match action {
            Action::Launch => {
                let Some(id) = progress.id else {
                    return Err(not_found(&file.name));
                };
                let name = progress.name.clone().unwrap_or_else(|| file.name.clone());
                info!(title = %name, anime_id = id, "Opening entry");
                let outcome = SyncOutcome::Launch {
                    name,
                    url: anime_url(id),
                };
                (outcome, progress)
            }
            Action::Update => {
                let progress = reconcile(&self.service, progress, &self.options).await?;
                let outcome = SyncOutcome::Updated {
                    progress: progress.clone(),
                };
                (outcome, progress)
            }
        };

        if progress.current_progress.is_some() {
            self.cache.store(path, &file.name, file.episode, &progress);
        }
        Ok(outcome)
    }

    /// Search the list (and, when allowed, the whole catalog) and settle on
    /// one entry and an episode relative to it.
    async fn resolve(&self, file: &ParsedFile, action: Action) -> Result<AnimeProgress, SyncError> {
        let mut query = SearchQuery {
            search: file.name.clone(),
            start_after: file.year.unwrap_or(1),
            on_list: true,
        };
        let mut results = self.search(&query).await?;

        if results.is_empty() {
            if action != Action::Launch && !self.options.add_entry_if_missing {
                return Err(SyncError::NotInList(format!(
                    "couldn't find an anime from this title ({}), is it on your list?",
                    file.name
                )));
            }
            info!(title = %file.name, "Not on list, searching all anime");
            query.on_list = false;
            results = self.search(&query).await?;

            let Some(first) = results.first() else {
                return Err(not_found(&file.name));
            };
            if action == Action::Update {
                debug!(title = ?first.title, anime_id = first.id, "Candidate for adding to list");
                return Ok(AnimeProgress::off_list(first, file.episode));
            }
        }

        let first = &results[0];
        let progress = AnimeProgress::from_entry(first, file.episode);
        match first.episodes {
            Some(episodes) if file.episode > episodes => Ok(self.resolve_absolute(&results, file, progress)),
            _ => {
                debug!(title = ?first.title, anime_id = first.id, "Using first search result");
                Ok(progress)
            }
        }
    }

    fn resolve_absolute(
        &self,
        results: &[CatalogEntry],
        file: &ParsedFile,
        fallback: AnimeProgress,
    ) -> AnimeProgress {
        let Some(found) = absolute::resolve(results, file.episode) else {
            warn!(
                title = %file.name,
                episode = file.episode,
                "Absolute episode is past every known season, keeping first result"
            );
            return fallback;
        };
        let status = results
            .iter()
            .find(|entry| entry.id == found.entry_id)
            .and_then(|entry| entry.list_entry)
            .and_then(|entry| entry.status);

        info!(
            absolute = file.episode,
            relative = found.relative_episode,
            title = ?found.entry_title,
            anime_id = found.entry_id,
            "Resolved absolute episode"
        );
        AnimeProgress {
            id: Some(found.entry_id),
            name: found.entry_title,
            current_progress: found.remote_progress,
            total_episodes: found.episode_count,
            observed_episode: Some(found.relative_episode),
            current_status: status,
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogEntry>, SyncError> {
        let results = self.service.search(query).await.map_err(SyncError::api)?;
        debug!(
            search = %query.search,
            on_list = query.on_list,
            results = results.len(),
            "Search finished"
        );
        Ok(results)
    }
}

fn not_found(name: &str) -> SyncError {
    SyncError::NotInList(format!("couldn't find an anime from this title ({name})"))
}
