//! Edit operations on the composition, with snapshot undo/redo.
//!
//! History is snapshot-based: each executed command records the composition
//! before and after it ran. Batch commands mutate many clips at once, so
//! whole-composition snapshots are simpler and cheaper to reason about than
//! per-operation inverses.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::clip::{Clip, ClipId};
use crate::composition::Composition;
use crate::layout::IntervalLayoutEngine;

/// Shortest a clip may become through trimming, in seconds.
pub const MIN_CLIP_SECS: f64 = 1.0;

/// Adjacency slack for join operations.
const JOIN_EPSILON: f64 = 1e-6;

// ── Operations ──────────────────────────────────────────────────

/// Split a clip in two at `at_secs` (absolute timeline time).
///
/// Valid only strictly inside the clip. Returns the ids of the two parts.
pub fn split_clip(comp: &mut Composition, id: ClipId, at_secs: f64) -> Option<(ClipId, ClipId)> {
    let clip = comp.find(id)?.clone();
    if at_secs <= clip.start || at_secs >= clip.end {
        warn!(?id, at_secs, "split point outside clip; no cut performed");
        return None;
    }

    let mut first = clip.clone();
    first.id = Uuid::new_v4();
    first.name = format!("{}_part1", clip.name);
    first.end = at_secs;

    let mut second = clip.clone();
    second.id = Uuid::new_v4();
    second.name = format!("{}_part2", clip.name);
    second.start = at_secs;

    let ids = (first.id, second.id);
    comp.replace(id, [first, second]);
    debug!(?id, at_secs, "clip split");
    Some(ids)
}

/// Join two adjacent clips on the same track into one.
///
/// `second` must start where `first` ends (within epsilon). The merged clip
/// gets a fresh id and a combined name.
pub fn join_clips(comp: &mut Composition, first: ClipId, second: ClipId) -> Option<ClipId> {
    let a = comp.find(first)?.clone();
    let b = comp.find(second)?.clone();
    if a.track != b.track || (a.end - b.start).abs() > JOIN_EPSILON {
        warn!(?first, ?second, "clips not adjacent; no join performed");
        return None;
    }

    let mut joined = a.clone();
    joined.id = Uuid::new_v4();
    joined.name = format!("{}_joined_{}", a.name, b.name);
    joined.end = b.end;

    let joined_id = joined.id;
    comp.remove(second);
    comp.replace(first, [joined]);
    Some(joined_id)
}

/// Trim seconds off a clip's edges.
///
/// When the requested trim would leave less than `MIN_CLIP_SECS`, both
/// amounts are scaled down proportionally so the clip keeps the minimum
/// length. Returns the applied `(trim_start, trim_end)`.
pub fn trim_clip_edges(
    comp: &mut Composition,
    id: ClipId,
    trim_start: f64,
    trim_end: f64,
) -> Option<(f64, f64)> {
    let clip = comp.find(id)?;
    let duration = clip.duration();

    let mut ts = trim_start.max(0.0);
    let mut te = trim_end.max(0.0);
    let max_total = (duration - MIN_CLIP_SECS).max(0.0);
    let total = ts + te;
    if total > max_total {
        let scale = if total > 0.0 { max_total / total } else { 0.0 };
        ts *= scale;
        te *= scale;
    }

    let clip = comp.find_mut(id)?;
    clip.start += ts;
    clip.end -= te;
    Some((ts, te))
}

/// Move a clip to a new track/start, resolving the destination through the
/// layout engine so the move can never create an overlap.
pub fn move_clip(
    comp: &mut Composition,
    layout: &IntervalLayoutEngine,
    id: ClipId,
    dest_track: usize,
    dest_start: f64,
) -> Option<(usize, f64)> {
    let clip = comp.remove(id)?;
    let duration = clip.duration();
    let (track, start) = layout.choose_track(comp, clip.kind, dest_track, dest_start, duration);
    let mut moved = clip;
    moved.track = track;
    moved.start = start;
    moved.end = start + duration;
    comp.add(moved);
    Some((track, start))
}

// ── History ─────────────────────────────────────────────────────

/// One executed command with its surrounding snapshots.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The user/agent command text that produced this edit.
    pub command_text: String,
    /// Composition before the command ran.
    pub before: Composition,
    /// Composition after the command ran.
    pub after: Composition,
}

/// Snapshot-based undo/redo history.
#[derive(Debug)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    max_depth: usize,
}

impl CommandHistory {
    /// Create a history with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record an executed command. Clears the redo stack (a new action
    /// invalidates redo history).
    pub fn record(&mut self, command_text: impl Into<String>, before: Composition, after: Composition) {
        self.redo.clear();
        self.entries.push(HistoryEntry {
            command_text: command_text.into(),
            before,
            after,
        });
        if self.entries.len() > self.max_depth {
            self.entries.remove(0);
        }
    }

    /// Undo the most recent command, returning the composition to restore.
    pub fn undo(&mut self) -> Option<Composition> {
        let entry = self.entries.pop()?;
        let snapshot = entry.before.clone();
        self.redo.push(entry);
        Some(snapshot)
    }

    /// Redo the most recently undone command, returning the composition to
    /// restore.
    pub fn redo(&mut self) -> Option<Composition> {
        let entry = self.redo.pop()?;
        let snapshot = entry.after.clone();
        self.entries.push(entry);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Executed commands, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.redo.clear();
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(200)
    }
}
