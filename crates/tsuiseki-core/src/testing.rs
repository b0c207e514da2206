//! In-memory [`ListService`] for tests.

use std::future::Future;
use std::sync::Mutex;

use tsuiseki_api::{CatalogEntry, EntryUpdate, ListService, SavedEntry, SearchQuery};

#[derive(Debug, thiserror::Error)]
#[error("fake service failure")]
pub struct FakeError;

/// Answers searches from two canned result lists and echoes every save.
#[derive(Default)]
pub struct FakeService {
    /// Returned for `on_list: true` searches.
    pub on_list: Vec<CatalogEntry>,
    /// Returned for `on_list: false` searches.
    pub catalog: Vec<CatalogEntry>,
    pub fail_saves: bool,
    pub searches: Mutex<Vec<SearchQuery>>,
    pub saves: Mutex<Vec<EntryUpdate>>,
}

impl FakeService {
    pub fn searches(&self) -> Vec<SearchQuery> {
        self.searches.lock().unwrap().clone()
    }

    pub fn saves(&self) -> Vec<EntryUpdate> {
        self.saves.lock().unwrap().clone()
    }
}

impl ListService for FakeService {
    type Error = FakeError;

    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CatalogEntry>, Self::Error>> + Send {
        self.searches.lock().unwrap().push(query.clone());
        let results = if query.on_list {
            self.on_list.clone()
        } else {
            self.catalog.clone()
        };
        async move { Ok(results) }
    }

    fn save_entry(
        &self,
        update: &EntryUpdate,
    ) -> impl Future<Output = Result<SavedEntry, Self::Error>> + Send {
        self.saves.lock().unwrap().push(*update);
        let result = if self.fail_saves {
            Err(FakeError)
        } else {
            Ok(SavedEntry {
                media_id: update.media_id,
                progress: update.progress,
                status: update.status,
            })
        };
        async move { result }
    }
}
