use bitflags::bitflags;

bitflags! {
    /// Element categories the parser should not claim.
    ///
    /// Excluded words are left in place and end up in the title.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Exclude: u8 {
        const COUNTRY = 0b0000_0001;
        const LANGUAGE = 0b0000_0010;
    }
}

impl Default for Exclude {
    fn default() -> Self {
        Exclude::empty()
    }
}

/// Parser knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub exclude: Exclude,
    /// Treat the input as an episode: bare numbers count as episode numbers.
    pub episode_type: bool,
}

impl ParseOptions {
    /// Options for episode filenames where titles may contain language or
    /// country words.
    pub fn episode() -> Self {
        Self {
            exclude: Exclude::COUNTRY | Exclude::LANGUAGE,
            episode_type: true,
        }
    }
}
