//! Clip types for the timeline.

use promptcut_core::TimeRange;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique clip identity.
pub type ClipId = Uuid;

/// What a clip contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video,
    Text,
    Overlay,
    Audio,
    Effect,
}

/// A clip on the timeline.
///
/// Occupies the half-open interval `[start, end)` (seconds) on a numbered
/// track. Two clips on the same track must never overlap; the composition and
/// layout engine maintain that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Track index (0 conventionally holds primary video)
    pub track: usize,
    /// Start time in seconds (inclusive)
    pub start: f64,
    /// End time in seconds (exclusive, always > start)
    pub end: f64,
    /// What the clip contains
    pub kind: ClipKind,
    /// Display name
    pub name: String,
    /// Preview thumbnail reference, if one has been generated
    pub thumbnail: Option<String>,
    /// Path to the source media, if any (text/effect clips have none)
    pub source_path: Option<String>,
}

impl Clip {
    /// Create a new clip.
    pub fn new(name: impl Into<String>, kind: ClipKind, track: usize, start: f64, end: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            track,
            start,
            end,
            kind,
            name: name.into(),
            thumbnail: None,
            source_path: None,
        }
    }

    /// Attach a source media path.
    pub fn with_source(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Duration in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The clip's time range.
    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Check whether this clip overlaps a candidate interval on its track.
    #[inline]
    pub fn overlaps(&self, range: TimeRange) -> bool {
        self.range().overlaps(range)
    }
}
