pub mod client;
pub mod error;
pub mod types;

pub use client::{AniListClient, ClientSettings};
pub use error::AniListError;
