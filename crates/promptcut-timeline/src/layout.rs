//! Non-overlapping clip placement.
//!
//! The layout engine is a total function: every request resolves to a legal
//! placement (worst case: appended at the end of the busiest track).
//! Placement conflicts are never surfaced as errors.

use promptcut_core::TimeRange;
use smallvec::SmallVec;
use tracing::debug;

use crate::clip::ClipKind;
use crate::composition::Composition;

/// Tunable placement constants.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// How far (seconds) a resolved start may drift from the desired start
    /// before `choose_track` rejects the track and tries the next one.
    pub track_tolerance_secs: f64,
    /// Float comparison slack for gap-fit and adjacency tests.
    pub epsilon: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            track_tolerance_secs: 3.0,
            epsilon: 1e-6,
        }
    }
}

/// Engine for resolving clip placement on tracks.
#[derive(Debug, Clone, Default)]
pub struct IntervalLayoutEngine {
    pub config: LayoutConfig,
}

impl IntervalLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Resolve a start time for a new clip of `duration` seconds on `track`.
    ///
    /// Returns `desired_start` unchanged when the candidate interval is
    /// free. Otherwise scans the track's clips in start order and returns
    /// the start of the first inter-clip gap that fits; if none does, the
    /// clip is appended at the end of the track.
    pub fn place(
        &self,
        comp: &Composition,
        track: usize,
        desired_start: f64,
        duration: f64,
    ) -> f64 {
        let occupied: SmallVec<[TimeRange; 8]> = comp
            .clips_on_track(track)
            .iter()
            .map(|c| c.range())
            .collect();
        self.resolve(&occupied, desired_start, duration)
    }

    /// Core placement over an already-sorted list of occupied ranges.
    fn resolve(&self, occupied: &[TimeRange], desired_start: f64, duration: f64) -> f64 {
        let candidate = TimeRange::from_start_duration(desired_start, duration);
        if !occupied.iter().any(|r| r.overlaps(candidate)) {
            return desired_start;
        }

        // First adjacent-pair gap that fits.
        for pair in occupied.windows(2) {
            let gap = pair[1].start - pair[0].end;
            if gap >= duration - self.config.epsilon {
                debug!(
                    desired_start,
                    resolved = pair[0].end,
                    "placement conflict resolved into gap"
                );
                return pair[0].end;
            }
        }

        // No interior gap: append at the track's end.
        let track_end = occupied.last().map(|r| r.end).unwrap_or(0.0);
        debug!(desired_start, resolved = track_end, "placement appended at track end");
        track_end
    }

    /// Pick a track and start for a new clip.
    ///
    /// Video clips prefer track 0. A track is accepted only when the
    /// resolved start lands within `track_tolerance_secs` of the desired
    /// start; otherwise existing tracks are searched in ascending order, and
    /// as a last resort a fresh track (`max_track + 1`) is allocated so the
    /// clip keeps its desired start.
    pub fn choose_track(
        &self,
        comp: &Composition,
        kind: ClipKind,
        desired_track: usize,
        desired_start: f64,
        duration: f64,
    ) -> (usize, f64) {
        let preferred = if kind == ClipKind::Video { 0 } else { desired_track };

        let mut candidates: SmallVec<[usize; 8]> = SmallVec::new();
        candidates.push(preferred);
        if let Some(max_track) = comp.max_track() {
            for track in 0..=max_track {
                if track != preferred {
                    candidates.push(track);
                }
            }
        }

        for track in candidates {
            let resolved = self.place(comp, track, desired_start, duration);
            if (resolved - desired_start).abs() <= self.config.track_tolerance_secs {
                return (track, resolved);
            }
        }

        // Every existing track would push the clip too far from where the
        // user dropped it; open a new lane instead.
        let new_track = comp.max_track().map_or(preferred, |t| t + 1);
        debug!(new_track, desired_start, "allocated new track for placement");
        (new_track, desired_start)
    }

    /// Place a multi-select drop: `durations` clips landing together on one
    /// track, starting at `desired_start`.
    ///
    /// The first clip is placed normally; each subsequent clip's desired
    /// start is the previous clip's resolved end, so the drop always
    /// produces a contiguous run in drop order.
    pub fn place_run(
        &self,
        comp: &Composition,
        track: usize,
        desired_start: f64,
        durations: &[f64],
    ) -> Vec<TimeRange> {
        let mut occupied: Vec<TimeRange> = comp
            .clips_on_track(track)
            .iter()
            .map(|c| c.range())
            .collect();

        let mut placed = Vec::with_capacity(durations.len());
        let mut desired = desired_start;
        for &duration in durations {
            let start = self.resolve(&occupied, desired, duration);
            let range = TimeRange::from_start_duration(start, duration);
            // Keep the occupied list sorted for the next resolve.
            let idx = occupied
                .iter()
                .position(|r| r.start > range.start)
                .unwrap_or(occupied.len());
            occupied.insert(idx, range);
            desired = range.end;
            placed.push(range);
        }
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;

    fn comp_with(ranges: &[(usize, f64, f64)]) -> Composition {
        let mut comp = Composition::new();
        for &(track, start, end) in ranges {
            assert!(comp.add(Clip::new("c", ClipKind::Video, track, start, end)));
        }
        comp
    }

    #[test]
    fn test_place_free_interval_unchanged() {
        let comp = comp_with(&[(0, 0.0, 5.0), (0, 10.0, 15.0)]);
        let engine = IntervalLayoutEngine::new();
        assert_eq!(engine.place(&comp, 0, 20.0, 3.0), 20.0);
    }

    #[test]
    fn test_place_resolves_into_first_fitting_gap() {
        // [0,5) and [10,15): desired 3 with duration 4 lands in the gap at 5.
        let comp = comp_with(&[(0, 0.0, 5.0), (0, 10.0, 15.0)]);
        let engine = IntervalLayoutEngine::new();
        assert_eq!(engine.place(&comp, 0, 3.0, 4.0), 5.0);
    }

    #[test]
    fn test_place_appends_when_no_gap_fits() {
        let comp = comp_with(&[(0, 0.0, 5.0), (0, 6.0, 10.0)]);
        let engine = IntervalLayoutEngine::new();
        // 3s does not fit in the 1s gap.
        assert_eq!(engine.place(&comp, 0, 2.0, 3.0), 10.0);
    }

    #[test]
    fn test_place_is_idempotent_on_free_interval() {
        let comp = comp_with(&[(0, 0.0, 5.0)]);
        let engine = IntervalLayoutEngine::new();
        let first = engine.place(&comp, 0, 7.0, 2.0);
        assert_eq!(first, 7.0);
        assert_eq!(engine.place(&comp, 0, first, 2.0), first);
    }

    #[test]
    fn test_choose_track_video_prefers_track_zero() {
        let comp = comp_with(&[(1, 0.0, 5.0)]);
        let engine = IntervalLayoutEngine::new();
        let (track, start) = engine.choose_track(&comp, ClipKind::Video, 1, 0.0, 4.0);
        assert_eq!(track, 0);
        assert_eq!(start, 0.0);
    }

    #[test]
    fn test_choose_track_falls_through_within_tolerance() {
        // Track 0 busy at [0,10); resolving 1.0 there lands at 10.0, which is
        // far outside tolerance. Track 1 is free, so it wins.
        let comp = comp_with(&[(0, 0.0, 10.0), (1, 20.0, 25.0)]);
        let engine = IntervalLayoutEngine::new();
        let (track, start) = engine.choose_track(&comp, ClipKind::Video, 0, 1.0, 4.0);
        assert_eq!(track, 1);
        assert_eq!(start, 1.0);
    }

    #[test]
    fn test_choose_track_allocates_new_track() {
        let comp = comp_with(&[(0, 0.0, 10.0), (1, 0.0, 10.0)]);
        let engine = IntervalLayoutEngine::new();
        let (track, start) = engine.choose_track(&comp, ClipKind::Video, 0, 1.0, 4.0);
        assert_eq!(track, 2);
        assert_eq!(start, 1.0);
    }

    #[test]
    fn test_choose_track_accepts_small_drift() {
        // Resolving lands 2s late, inside the 3s tolerance, so track 0 keeps it.
        let comp = comp_with(&[(0, 0.0, 5.0)]);
        let engine = IntervalLayoutEngine::new();
        let (track, start) = engine.choose_track(&comp, ClipKind::Video, 0, 3.0, 4.0);
        assert_eq!(track, 0);
        assert_eq!(start, 5.0);
    }

    #[test]
    fn test_place_run_is_contiguous() {
        let comp = Composition::new();
        let engine = IntervalLayoutEngine::new();
        let placed = engine.place_run(&comp, 0, 2.0, &[3.0, 4.0, 5.0]);
        assert_eq!(placed.len(), 3);
        assert_eq!((placed[0].start, placed[0].end), (2.0, 5.0));
        assert_eq!((placed[1].start, placed[1].end), (5.0, 9.0));
        assert_eq!((placed[2].start, placed[2].end), (9.0, 14.0));
    }

    #[test]
    fn test_place_run_skips_existing_clips() {
        let comp = comp_with(&[(0, 4.0, 6.0)]);
        let engine = IntervalLayoutEngine::new();
        let placed = engine.place_run(&comp, 0, 0.0, &[3.0, 3.0]);
        // First fits before the existing clip; second's desired start (3.0)
        // collides and resolves past it.
        assert_eq!((placed[0].start, placed[0].end), (0.0, 3.0));
        assert_eq!((placed[1].start, placed[1].end), (6.0, 9.0));
    }

    #[test]
    fn test_no_overlap_after_any_place_sequence() {
        let mut comp = Composition::new();
        let engine = IntervalLayoutEngine::new();
        let requests = [
            (0.0, 5.0),
            (3.0, 4.0),
            (1.0, 2.0),
            (0.0, 1.0),
            (8.0, 10.0),
            (2.5, 2.5),
        ];
        for (desired, duration) in requests {
            let start = engine.place(&comp, 0, desired, duration);
            assert!(comp.add(Clip::new("c", ClipKind::Video, 0, start, start + duration)));
        }
        let on_track = comp.clips_on_track(0);
        for pair in on_track.windows(2) {
            assert!(
                pair[0].end <= pair[1].start + 1e-9,
                "clips overlap: {:?} and {:?}",
                pair[0].range(),
                pair[1].range()
            );
        }
    }
}
