use serde::{Deserialize, Serialize};

/// A field that may be missing, found once, or found several times.
///
/// Episode and season markers can legitimately repeat in one filename
/// (`86 - 13`, `S01 S02`), so they are kept as every value found, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multi<T> {
    Absent,
    Scalar(T),
    Multiple(Vec<T>),
}

impl<T> Default for Multi<T> {
    fn default() -> Self {
        Multi::Absent
    }
}

impl<T> Multi<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Multi::Absent)
    }

    /// All values in the order they were found.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Multi::Absent => &[],
            Multi::Scalar(value) => std::slice::from_ref(value),
            Multi::Multiple(values) => values,
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value, promoting `Scalar` to `Multiple` on the second one.
    pub fn push(&mut self, value: T) {
        *self = match std::mem::take(self) {
            Multi::Absent => Multi::Scalar(value),
            Multi::Scalar(first) => Multi::Multiple(vec![first, value]),
            Multi::Multiple(mut values) => {
                values.push(value);
                Multi::Multiple(values)
            }
        };
    }
}

/// Names of the fields in [`Elements`], used for positional ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Title,
    Episode,
    Season,
    Part,
    Year,
    EpisodeTitle,
    ReleaseGroup,
    Resolution,
    VideoCodec,
    AudioCodec,
    Source,
    Checksum,
    ReleaseVersion,
    EpisodeType,
    Language,
    Country,
    Subtitles,
    ReleaseInfo,
    FileExtension,
}

/// Everything recognized in one filename or folder name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Elements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Multi::is_absent")]
    pub episode: Multi<u32>,
    #[serde(default, skip_serializing_if = "Multi::is_absent")]
    pub season: Multi<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Text after the last episode marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// CRC32 in brackets, e.g. `ABCD1234`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Release revision, e.g. `v2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_version: Option<String>,
    /// `OVA`, `Special`, `Movie` and friends.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub country: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtitles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_info: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    /// Token index at which each element was found.
    #[serde(skip)]
    positions: Vec<(usize, ElementKind)>,
}

impl Elements {
    /// Record that `kind` was found at token `index`.
    pub(crate) fn mark(&mut self, kind: ElementKind, index: usize) {
        self.positions.push((index, kind));
    }

    /// Kinds present, ordered by where they first appear in the input.
    pub fn keys(&self) -> Vec<ElementKind> {
        let mut positions = self.positions.clone();
        positions.sort_by_key(|(index, _)| *index);
        let mut keys: Vec<ElementKind> = Vec::with_capacity(positions.len());
        for (_, kind) in positions {
            if !keys.contains(&kind) {
                keys.push(kind);
            }
        }
        keys
    }

    /// Position of `kind` within [`Elements::keys`].
    pub fn key_index(&self, kind: ElementKind) -> Option<usize> {
        self.keys().iter().position(|k| *k == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_push_promotes() {
        let mut m = Multi::default();
        assert!(m.is_absent());
        m.push(86);
        assert_eq!(m, Multi::Scalar(86));
        m.push(13);
        assert_eq!(m, Multi::Multiple(vec![86, 13]));
        assert_eq!(m.first(), Some(&86));
        assert_eq!(m.last(), Some(&13));
    }

    #[test]
    fn test_keys_order_and_dedup() {
        let mut e = Elements::default();
        e.mark(ElementKind::Episode, 6);
        e.mark(ElementKind::Title, 2);
        e.mark(ElementKind::ReleaseGroup, 0);
        e.mark(ElementKind::Episode, 9);
        assert_eq!(
            e.keys(),
            vec![
                ElementKind::ReleaseGroup,
                ElementKind::Title,
                ElementKind::Episode
            ]
        );
        assert_eq!(e.key_index(ElementKind::Episode), Some(2));
        assert_eq!(e.key_index(ElementKind::Season), None);
    }

    #[test]
    fn test_serializes_multi_shapes() {
        let mut e = Elements {
            title: Some("86".into()),
            ..Default::default()
        };
        e.episode.push(1);
        e.episode.push(2);
        e.season.push(2);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["episode"], serde_json::json!([1, 2]));
        assert_eq!(json["season"], serde_json::json!(2));
        assert!(json.get("part").is_none());
    }
}
