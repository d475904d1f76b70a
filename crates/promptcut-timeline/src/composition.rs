//! The composition: the clip collection and its queries.

use promptcut_core::TimeRange;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::clip::{Clip, ClipId, ClipKind};

/// The set of clips making up the edit.
///
/// Single writer, last-write-wins. Mutations bump `revision` so views can
/// cheaply detect that a recompute (e.g. auto-zoom) is due.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composition {
    clips: Vec<Clip>,
    /// Bumped on every mutation.
    revision: u64,
}

impl Composition {
    /// Create an empty composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// All clips, in insertion order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Current revision; bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total content duration: the latest clip end, or 0 when empty.
    pub fn duration(&self) -> f64 {
        self.clips.iter().map(|c| c.end).fold(0.0, f64::max)
    }

    /// Highest occupied track index, if any clip exists.
    pub fn max_track(&self) -> Option<usize> {
        self.clips.iter().map(|c| c.track).max()
    }

    /// Clips on a track, sorted by start time.
    pub fn clips_on_track(&self, track: usize) -> SmallVec<[&Clip; 8]> {
        let mut on_track: SmallVec<[&Clip; 8]> =
            self.clips.iter().filter(|c| c.track == track).collect();
        on_track.sort_by(|a, b| a.start.total_cmp(&b.start));
        on_track
    }

    /// Clips of a given kind, in insertion order.
    pub fn clips_of_kind(&self, kind: ClipKind) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(move |c| c.kind == kind)
    }

    /// Whether a candidate interval is free on a track.
    pub fn is_free(&self, track: usize, range: TimeRange) -> bool {
        !self
            .clips
            .iter()
            .any(|c| c.track == track && c.overlaps(range))
    }

    /// Find a clip by ID.
    pub fn find(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Find a clip mutably by ID. Callers must preserve the no-overlap
    /// invariant; moves should go through the layout engine.
    pub fn find_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.revision += 1;
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Add a clip. The caller is expected to have resolved a legal placement
    /// (see `IntervalLayoutEngine`); an overlapping add is rejected.
    pub fn add(&mut self, clip: Clip) -> bool {
        if !self.is_free(clip.track, clip.range()) {
            return false;
        }
        self.clips.push(clip);
        self.revision += 1;
        true
    }

    /// Remove a clip by ID. Returns the removed clip.
    pub fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let idx = self.clips.iter().position(|c| c.id == id)?;
        self.revision += 1;
        Some(self.clips.remove(idx))
    }

    /// Replace a clip with one or more successors (used by split).
    pub(crate) fn replace(&mut self, id: ClipId, with: impl IntoIterator<Item = Clip>) -> bool {
        let Some(idx) = self.clips.iter().position(|c| c.id == id) else {
            return false;
        };
        self.clips.remove(idx);
        for (offset, clip) in with.into_iter().enumerate() {
            self.clips.insert(idx + offset, clip);
        }
        self.revision += 1;
        true
    }
}
