use serde::{Deserialize, Serialize};

/// What a file path says about the show it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    /// Search name. Already carries leftover episode numbers and
    /// `Season N` / `Part N` suffixes.
    pub name: String,
    /// Episode number as written in the file, possibly absolute.
    pub episode: u32,
    pub year: Option<u32>,
}
