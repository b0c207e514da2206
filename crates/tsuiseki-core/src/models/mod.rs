mod file;
mod progress;

pub use file::ParsedFile;
pub use progress::{AnimeProgress, SeasonEpisodeResolution};
