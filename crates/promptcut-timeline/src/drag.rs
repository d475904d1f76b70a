//! Live drag-reorder feedback.
//!
//! While a clip is held, every pointer move maps to a target track and an
//! insertion slot, rendered by the view as a drop indicator. The indicator is
//! purely advisory; the authoritative placement on drop still goes through
//! the layout engine.

use smallvec::SmallVec;
use tracing::trace;

use crate::clip::{Clip, ClipId};
use crate::composition::Composition;
use crate::layout::IntervalLayoutEngine;

// ── Pixel mapping ───────────────────────────────────────────────

/// Per-track row heights. The primary video row is taller than the rest, so
/// vertical hit-testing walks cumulative heights instead of dividing.
#[derive(Debug, Clone)]
pub struct TrackGeometry {
    /// Height of the track-0 (primary video) row in pixels.
    pub video_row_px: f32,
    /// Height of every other row in pixels.
    pub row_px: f32,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            video_row_px: 56.0,
            row_px: 36.0,
        }
    }
}

impl TrackGeometry {
    /// Height of a single row.
    pub fn row_height(&self, track: usize) -> f32 {
        if track == 0 {
            self.video_row_px
        } else {
            self.row_px
        }
    }

    /// Map a y position (pixels from the top of the track area) to a track
    /// index. Returns `None` outside the vertical bounds of `track_count`
    /// rows.
    pub fn track_at_y(&self, y: f32, track_count: usize) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let mut top = 0.0;
        for track in 0..track_count {
            let bottom = top + self.row_height(track);
            if y < bottom {
                return Some(track);
            }
            top = bottom;
        }
        None
    }

    /// Top edge (pixels) of a track row.
    pub fn track_top(&self, track: usize) -> f32 {
        (0..track).map(|t| self.row_height(t)).sum()
    }
}

/// Horizontal mapping between pixels and timeline seconds.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Zoom factor: pixels per second of content.
    pub pixels_per_sec: f32,
    /// Horizontal scroll offset in pixels.
    pub scroll_x_px: f32,
}

impl Viewport {
    /// Map an x position to timeline time, clamped at zero.
    pub fn time_at_x(&self, x: f32) -> f64 {
        (((x + self.scroll_x_px) / self.pixels_per_sec) as f64).max(0.0)
    }

    /// Map a timeline time to an x position.
    pub fn x_at_time(&self, time: f64) -> f32 {
        time as f32 * self.pixels_per_sec - self.scroll_x_px
    }
}

// ── Drop indicator ──────────────────────────────────────────────

/// Transient marker showing where a dragged clip would land.
///
/// Exists only between drag-start and drag-end; cleared on every terminal
/// event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropIndicator {
    pub track: usize,
    pub time: f64,
    pub insertion_index: usize,
}

// ── Pointer interaction seam ────────────────────────────────────

/// Pointer-interaction surface for a drag gesture.
///
/// Keeps the reorder algorithm independent of any particular UI toolkit's
/// event model: the host translates its native drag events into these calls.
pub trait DragSurface {
    /// A clip was picked up.
    fn drag_start(&mut self, clip_id: ClipId);

    /// The pointer moved while holding a clip. Returns the indicator to
    /// render, or `None` when the pointer is outside the timeline.
    fn drag_move(
        &mut self,
        comp: &Composition,
        view: &Viewport,
        x: f32,
        y: f32,
    ) -> Option<DropIndicator>;

    /// The clip was released over the timeline. Returns the resolved
    /// `(track, start)` the clip was moved to, or `None` if no drag was in
    /// flight or the pointer left the track area.
    fn drag_drop(
        &mut self,
        comp: &mut Composition,
        view: &Viewport,
        x: f32,
        y: f32,
    ) -> Option<(usize, f64)>;

    /// The drag ended without a drop (left the viewport, source destroyed).
    fn drag_cancel(&mut self);
}

// ── Engine ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct DragSession {
    clip_id: ClipId,
    indicator: Option<DropIndicator>,
}

/// Computes live reorder feedback for the clip currently being dragged.
#[derive(Debug, Clone, Default)]
pub struct DragReorderEngine {
    pub geometry: TrackGeometry,
    layout: IntervalLayoutEngine,
    session: Option<DragSession>,
}

impl DragReorderEngine {
    pub fn new(geometry: TrackGeometry, layout: IntervalLayoutEngine) -> Self {
        Self {
            geometry,
            layout,
            session: None,
        }
    }

    /// The indicator from the most recent pointer move, if a drag is active.
    pub fn indicator(&self) -> Option<DropIndicator> {
        self.session.as_ref().and_then(|s| s.indicator)
    }

    /// Whether a drag is currently in flight.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Insertion slot for a pointer time on a track, excluding `exclude`
    /// (the dragged clip must not produce a self-referential marker).
    ///
    /// The index is the position before the first clip whose start exceeds
    /// the pointer time; past the last clip it is the end of the list. It is
    /// monotone in pointer time for a fixed track.
    pub fn insertion_index(
        &self,
        comp: &Composition,
        track: usize,
        time: f64,
        exclude: Option<ClipId>,
    ) -> usize {
        let candidates: SmallVec<[&Clip; 8]> = comp
            .clips_on_track(track)
            .into_iter()
            .filter(|c| Some(c.id) != exclude)
            .collect();
        candidates.iter().take_while(|c| c.start <= time).count()
    }

    /// Number of rows the drag surface spans: every occupied track plus one
    /// spare lane underneath for dropping onto a new track.
    fn row_count(&self, comp: &Composition) -> usize {
        comp.max_track().map_or(1, |t| t + 2)
    }
}

impl DragSurface for DragReorderEngine {
    fn drag_start(&mut self, clip_id: ClipId) {
        self.session = Some(DragSession {
            clip_id,
            indicator: None,
        });
    }

    fn drag_move(
        &mut self,
        comp: &Composition,
        view: &Viewport,
        x: f32,
        y: f32,
    ) -> Option<DropIndicator> {
        let row_count = self.row_count(comp);
        let clip_id = self.session.as_ref()?.clip_id;

        let Some(track) = self.geometry.track_at_y(y, row_count) else {
            // Pointer outside the vertical bounds: no stuck marker.
            if let Some(session) = self.session.as_mut() {
                session.indicator = None;
            }
            return None;
        };

        let time = view.time_at_x(x);
        let insertion_index = self.insertion_index(comp, track, time, Some(clip_id));
        let indicator = DropIndicator {
            track,
            time,
            insertion_index,
        };
        trace!(?indicator, "drag move");

        if let Some(session) = self.session.as_mut() {
            session.indicator = Some(indicator);
        }
        Some(indicator)
    }

    fn drag_drop(
        &mut self,
        comp: &mut Composition,
        view: &Viewport,
        x: f32,
        y: f32,
    ) -> Option<(usize, f64)> {
        let row_count = self.row_count(comp);
        let session = self.session.take()?;

        let desired_track = self.geometry.track_at_y(y, row_count)?;
        let desired_start = view.time_at_x(x);

        let clip = comp.remove(session.clip_id)?;
        let duration = clip.duration();
        let (track, start) =
            self.layout
                .choose_track(comp, clip.kind, desired_track, desired_start, duration);
        let mut moved = clip;
        moved.track = track;
        moved.start = start;
        moved.end = start + duration;
        comp.add(moved);
        Some((track, start))
    }

    fn drag_cancel(&mut self) {
        // Idempotent: cancelling with no drag in flight is a no-op.
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipKind;
    use uuid::Uuid;

    fn comp_with(ranges: &[(usize, f64, f64)]) -> Composition {
        let mut comp = Composition::new();
        for &(track, start, end) in ranges {
            assert!(comp.add(Clip::new("c", ClipKind::Video, track, start, end)));
        }
        comp
    }

    fn view() -> Viewport {
        Viewport {
            pixels_per_sec: 10.0,
            scroll_x_px: 0.0,
        }
    }

    #[test]
    fn test_track_at_y_cumulative_heights() {
        let geo = TrackGeometry::default();
        assert_eq!(geo.track_at_y(10.0, 3), Some(0));
        assert_eq!(geo.track_at_y(55.9, 3), Some(0));
        assert_eq!(geo.track_at_y(56.0, 3), Some(1));
        assert_eq!(geo.track_at_y(56.0 + 36.0, 3), Some(2));
        assert_eq!(geo.track_at_y(-1.0, 3), None);
        assert_eq!(geo.track_at_y(56.0 + 36.0 * 2.0, 3), None);
    }

    #[test]
    fn test_insertion_index_walk() {
        let comp = comp_with(&[(0, 0.0, 5.0), (0, 10.0, 15.0)]);
        let engine = DragReorderEngine::default();
        assert_eq!(engine.insertion_index(&comp, 0, -0.5, None), 0);
        assert_eq!(engine.insertion_index(&comp, 0, 3.0, None), 1);
        assert_eq!(engine.insertion_index(&comp, 0, 7.0, None), 1); // in the gap
        assert_eq!(engine.insertion_index(&comp, 0, 12.0, None), 2);
        assert_eq!(engine.insertion_index(&comp, 0, 20.0, None), 2); // past the end
    }

    #[test]
    fn test_insertion_index_monotone_in_time() {
        let comp = comp_with(&[(0, 0.0, 3.0), (0, 4.0, 8.0), (0, 9.0, 12.0)]);
        let engine = DragReorderEngine::default();
        let mut last = 0;
        let mut t = 0.0;
        while t < 15.0 {
            let idx = engine.insertion_index(&comp, 0, t, None);
            assert!(idx >= last, "index decreased at t={t}: {last} -> {idx}");
            last = idx;
            t += 0.25;
        }
    }

    #[test]
    fn test_dragged_clip_excluded_from_candidates() {
        let mut comp = Composition::new();
        let dragged = Clip::new("held", ClipKind::Video, 0, 0.0, 5.0);
        let dragged_id = dragged.id;
        comp.add(dragged);
        comp.add(Clip::new("other", ClipKind::Video, 0, 10.0, 15.0));

        let engine = DragReorderEngine::default();
        // Over its own slot: without exclusion this would be 1.
        assert_eq!(engine.insertion_index(&comp, 0, 2.0, Some(dragged_id)), 0);
    }

    #[test]
    fn test_drag_move_sets_and_clears_indicator() {
        let mut comp = comp_with(&[(0, 0.0, 5.0)]);
        let dragged = Clip::new("held", ClipKind::Video, 1, 0.0, 2.0);
        let dragged_id = dragged.id;
        comp.add(dragged);

        let mut engine = DragReorderEngine::default();
        engine.drag_start(dragged_id);

        let indicator = engine.drag_move(&comp, &view(), 70.0, 10.0).unwrap();
        assert_eq!(indicator.track, 0);
        assert_eq!(indicator.time, 7.0);
        assert_eq!(indicator.insertion_index, 1);
        assert_eq!(engine.indicator(), Some(indicator));

        // Leaving the vertical bounds clears the marker.
        assert!(engine.drag_move(&comp, &view(), 70.0, -5.0).is_none());
        assert_eq!(engine.indicator(), None);
    }

    #[test]
    fn test_drag_move_without_session() {
        let comp = comp_with(&[(0, 0.0, 5.0)]);
        let mut engine = DragReorderEngine::default();
        assert!(engine.drag_move(&comp, &view(), 10.0, 10.0).is_none());
    }

    #[test]
    fn test_drop_resolves_through_layout() {
        let mut comp = comp_with(&[(0, 0.0, 5.0)]);
        let dragged = Clip::new("held", ClipKind::Video, 1, 20.0, 24.0);
        let dragged_id = dragged.id;
        comp.add(dragged);

        let mut engine = DragReorderEngine::default();
        engine.drag_start(dragged_id);

        // Drop at t=3 on track 0: conflicts with [0,5), resolves to 5.
        let (track, start) = engine.drag_drop(&mut comp, &view(), 30.0, 10.0).unwrap();
        assert_eq!(track, 0);
        assert_eq!(start, 5.0);
        let moved = comp.find(dragged_id).unwrap();
        assert_eq!(moved.track, 0);
        assert_eq!(moved.start, 5.0);
        assert_eq!(moved.end, 9.0);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_cancel_is_idempotent_and_clears() {
        let mut engine = DragReorderEngine::default();
        engine.drag_start(Uuid::new_v4());
        assert!(engine.is_dragging());
        engine.drag_cancel();
        assert!(!engine.is_dragging());
        assert_eq!(engine.indicator(), None);
        engine.drag_cancel(); // second cancel is a no-op
        assert!(!engine.is_dragging());
    }
}
