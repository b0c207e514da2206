use bitflags::bitflags;
use phf::phf_map;

bitflags! {
    /// Flags controlling when a keyword matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeywordFlags: u8 {
        /// Only match inside brackets (short or common words such as "TV", "SP").
        const AMBIGUOUS = 0b0000_0001;
    }
}

/// The element a keyword populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    VideoCodec,
    AudioCodec,
    Resolution,
    Source,
    Language,
    Country,
    Subtitles,
    ReleaseInfo,
    EpisodeType,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordEntry {
    pub kind: KeywordKind,
    pub flags: KeywordFlags,
}

impl KeywordEntry {
    const fn new(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::empty(),
        }
    }

    const fn ambiguous(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::AMBIGUOUS,
        }
    }
}

use KeywordKind as K;

/// Keys are uppercase; lookups uppercase their input.
static KEYWORDS: phf::Map<&'static str, KeywordEntry> = phf_map! {
    "H264" => KeywordEntry::new(K::VideoCodec),
    "H.264" => KeywordEntry::new(K::VideoCodec),
    "X264" => KeywordEntry::new(K::VideoCodec),
    "H265" => KeywordEntry::new(K::VideoCodec),
    "H.265" => KeywordEntry::new(K::VideoCodec),
    "X265" => KeywordEntry::new(K::VideoCodec),
    "HEVC" => KeywordEntry::new(K::VideoCodec),
    "AVC" => KeywordEntry::new(K::VideoCodec),
    "AV1" => KeywordEntry::new(K::VideoCodec),
    "XVID" => KeywordEntry::new(K::VideoCodec),
    "10BIT" => KeywordEntry::new(K::VideoCodec),
    "HI10P" => KeywordEntry::new(K::VideoCodec),

    "AAC" => KeywordEntry::new(K::AudioCodec),
    "AC3" => KeywordEntry::new(K::AudioCodec),
    "EAC3" => KeywordEntry::new(K::AudioCodec),
    "FLAC" => KeywordEntry::new(K::AudioCodec),
    "MP3" => KeywordEntry::new(K::AudioCodec),
    "OPUS" => KeywordEntry::new(K::AudioCodec),
    "DTS" => KeywordEntry::new(K::AudioCodec),
    "TRUEHD" => KeywordEntry::new(K::AudioCodec),

    "480P" => KeywordEntry::new(K::Resolution),
    "576P" => KeywordEntry::new(K::Resolution),
    "720P" => KeywordEntry::new(K::Resolution),
    "1080P" => KeywordEntry::new(K::Resolution),
    "1080I" => KeywordEntry::new(K::Resolution),
    "2160P" => KeywordEntry::new(K::Resolution),
    "4K" => KeywordEntry::new(K::Resolution),

    "BD" => KeywordEntry::ambiguous(K::Source),
    "BDRIP" => KeywordEntry::new(K::Source),
    "BDREMUX" => KeywordEntry::new(K::Source),
    "BLURAY" => KeywordEntry::new(K::Source),
    "BLU-RAY" => KeywordEntry::new(K::Source),
    "DVD" => KeywordEntry::ambiguous(K::Source),
    "DVDRIP" => KeywordEntry::new(K::Source),
    "HDTV" => KeywordEntry::new(K::Source),
    "TV" => KeywordEntry::ambiguous(K::Source),
    "TVRIP" => KeywordEntry::new(K::Source),
    "WEB" => KeywordEntry::ambiguous(K::Source),
    "WEBDL" => KeywordEntry::new(K::Source),
    "WEB-DL" => KeywordEntry::new(K::Source),
    "WEBRIP" => KeywordEntry::new(K::Source),

    "REMASTERED" => KeywordEntry::new(K::ReleaseInfo),
    "UNCENSORED" => KeywordEntry::new(K::ReleaseInfo),
    "UNCUT" => KeywordEntry::new(K::ReleaseInfo),
    "BATCH" => KeywordEntry::new(K::ReleaseInfo),

    "MULTI-SUB" => KeywordEntry::new(K::Subtitles),
    "MULTISUB" => KeywordEntry::new(K::Subtitles),
    "SUBBED" => KeywordEntry::new(K::Subtitles),
    "DUBBED" => KeywordEntry::new(K::Subtitles),
    "SOFTSUBS" => KeywordEntry::new(K::Subtitles),

    "OVA" => KeywordEntry::new(K::EpisodeType),
    "OAD" => KeywordEntry::new(K::EpisodeType),
    "ONA" => KeywordEntry::new(K::EpisodeType),
    "SP" => KeywordEntry::ambiguous(K::EpisodeType),
    "SPECIAL" => KeywordEntry::ambiguous(K::EpisodeType),
    "MOVIE" => KeywordEntry::ambiguous(K::EpisodeType),

    // Languages and countries collide with common title words ("Chi", "It", "Us").
    // Callers exclude them when titles matter more than metadata.
    "ENG" => KeywordEntry::new(K::Language),
    "ENGLISH" => KeywordEntry::new(K::Language),
    "JPN" => KeywordEntry::new(K::Language),
    "JAP" => KeywordEntry::new(K::Language),
    "JAPANESE" => KeywordEntry::new(K::Language),
    "CHI" => KeywordEntry::new(K::Language),
    "CHS" => KeywordEntry::new(K::Language),
    "CHT" => KeywordEntry::new(K::Language),
    "GER" => KeywordEntry::new(K::Language),
    "FRE" => KeywordEntry::new(K::Language),
    "SPA" => KeywordEntry::new(K::Language),
    "ITA" => KeywordEntry::new(K::Language),
    "KOR" => KeywordEntry::new(K::Language),
    "RUS" => KeywordEntry::new(K::Language),
    "VOSTFR" => KeywordEntry::new(K::Language),

    "US" => KeywordEntry::new(K::Country),
    "UK" => KeywordEntry::new(K::Country),
    "JP" => KeywordEntry::new(K::Country),
    "FR" => KeywordEntry::new(K::Country),
    "DE" => KeywordEntry::new(K::Country),
    "IT" => KeywordEntry::new(K::Country),
    "CN" => KeywordEntry::new(K::Country),
    "KR" => KeywordEntry::new(K::Country),
    "BR" => KeywordEntry::new(K::Country),
};

/// Look up a keyword, skipping ambiguous entries outside brackets.
pub fn lookup(text: &str, enclosed: bool) -> Option<&'static KeywordEntry> {
    let entry = KEYWORDS.get(text.to_uppercase().as_str())?;
    if !enclosed && entry.flags.contains(KeywordFlags::AMBIGUOUS) {
        return None;
    }
    Some(entry)
}
