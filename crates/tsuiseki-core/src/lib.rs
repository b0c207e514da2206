pub mod absolute;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fixups;
pub mod models;
pub mod orchestrator;
pub mod reconcile;
pub mod token;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, SyncOptions};
pub use error::SyncError;
pub use orchestrator::{Action, SyncOutcome, Updater};
