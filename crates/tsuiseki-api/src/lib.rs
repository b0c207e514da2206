pub mod anilist;
pub mod traits;

pub use anilist::{AniListClient, AniListError, ClientSettings};
pub use traits::{
    CatalogEntry, EntryUpdate, ListEntry, ListService, ListStatus, MediaSeason, SavedEntry,
    SearchQuery,
};
