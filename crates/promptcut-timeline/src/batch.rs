//! Batch edit planning: one command applied to many clips.
//!
//! A batch command ("cut every clip", "add captions every 3s") expands into
//! per-clip work here; the animation engine narrates the same item list while
//! the edits are applied.

use promptcut_core::{PromptcutError, Result, TimeRange};
use rand::Rng;
use tracing::info;

use crate::clip::{ClipId, ClipKind};
use crate::composition::Composition;
use crate::edit::trim_clip_edges;

// ── Batch cut ───────────────────────────────────────────────────

/// Per-clip outcome of a batch cut.
#[derive(Debug, Clone)]
pub struct TrimReport {
    pub clip_id: ClipId,
    pub name: String,
    pub trimmed_start: f64,
    pub trimmed_end: f64,
    pub new_duration: f64,
}

/// "Cut every clip": trim both edges of every video clip.
///
/// Each clip's trim amounts are jittered by ±`jitter_frac` so the batch
/// reads as individually considered cuts rather than a uniform shave.
#[derive(Debug, Clone)]
pub struct BatchCutPlan {
    /// Seconds to trim from each clip's start.
    pub trim_start: f64,
    /// Seconds to trim from each clip's end.
    pub trim_end: f64,
    /// Per-clip randomization of the requested amounts.
    pub jitter_frac: f64,
}

impl BatchCutPlan {
    pub fn new(trim_start: f64, trim_end: f64) -> Self {
        Self {
            trim_start,
            trim_end,
            jitter_frac: 0.2,
        }
    }

    /// Apply the batch cut to every video clip.
    ///
    /// Trims are clamped per clip so nothing drops below the minimum length
    /// (see `trim_clip_edges`). Fails only when there is nothing to cut.
    pub fn apply<R: Rng>(&self, comp: &mut Composition, rng: &mut R) -> Result<Vec<TrimReport>> {
        if self.trim_start <= 0.0 && self.trim_end <= 0.0 {
            return Err(PromptcutError::Timeline(
                "no trim amounts specified for batch cut".into(),
            ));
        }

        let targets: Vec<(ClipId, String)> = comp
            .clips_of_kind(ClipKind::Video)
            .map(|c| (c.id, c.name.clone()))
            .collect();
        if targets.is_empty() {
            return Err(PromptcutError::Timeline(
                "no video clips found for batch cut".into(),
            ));
        }

        let mut reports = Vec::with_capacity(targets.len());
        for (id, name) in targets {
            let lo = 1.0 - self.jitter_frac;
            let hi = 1.0 + self.jitter_frac;
            let want_start = self.trim_start * rng.gen_range(lo..hi);
            let want_end = self.trim_end * rng.gen_range(lo..hi);

            if let Some((ts, te)) = trim_clip_edges(comp, id, want_start, want_end) {
                let new_duration = comp.find(id).map(|c| c.duration()).unwrap_or(0.0);
                reports.push(TrimReport {
                    clip_id: id,
                    name,
                    trimmed_start: ts,
                    trimmed_end: te,
                    new_duration,
                });
            }
        }

        info!(clips = reports.len(), "batch cut applied");
        Ok(reports)
    }
}

// ── Caption plan ────────────────────────────────────────────────

/// Caption slots computed from the timeline duration: one slot per
/// `interval` seconds, `ceil(duration / interval)` in total. The final slot
/// is clipped to the timeline end.
#[derive(Debug, Clone)]
pub struct CaptionPlan {
    pub interval: f64,
    pub slots: Vec<TimeRange>,
}

impl CaptionPlan {
    pub fn new(timeline_duration: f64, interval: f64) -> Self {
        let mut slots = Vec::new();
        if interval > 0.0 && timeline_duration > 0.0 {
            let count = (timeline_duration / interval).ceil() as usize;
            for i in 0..count {
                let start = i as f64 * interval;
                let end = (start + interval).min(timeline_duration);
                slots.push(TimeRange::new(start, end));
            }
        }
        Self { interval, slots }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::Clip;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn comp_with_videos(specs: &[(f64, f64)]) -> Composition {
        let mut comp = Composition::new();
        for (i, &(start, end)) in specs.iter().enumerate() {
            comp.add(Clip::new(format!("v{i}"), ClipKind::Video, 0, start, end));
        }
        comp
    }

    #[test]
    fn test_batch_cut_trims_every_clip() {
        let mut comp = comp_with_videos(&[(0.0, 10.0), (12.0, 25.0)]);
        let plan = BatchCutPlan::new(0.5, 0.5);
        let reports = plan.apply(&mut comp, &mut rng()).unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.trimmed_start > 0.0);
            assert!(report.trimmed_end > 0.0);
            // ±20% jitter around the requested half second.
            assert!(report.trimmed_start >= 0.4 && report.trimmed_start <= 0.6);
            assert!(report.trimmed_end >= 0.4 && report.trimmed_end <= 0.6);
        }
    }

    #[test]
    fn test_batch_cut_never_shrinks_below_minimum() {
        let mut comp = comp_with_videos(&[(0.0, 1.5)]);
        let plan = BatchCutPlan::new(2.0, 2.0);
        let reports = plan.apply(&mut comp, &mut rng()).unwrap();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].new_duration >= crate::edit::MIN_CLIP_SECS - 1e-9);
    }

    #[test]
    fn test_batch_cut_requires_amounts() {
        let mut comp = comp_with_videos(&[(0.0, 10.0)]);
        let plan = BatchCutPlan::new(0.0, 0.0);
        assert!(plan.apply(&mut comp, &mut rng()).is_err());
    }

    #[test]
    fn test_batch_cut_requires_video_clips() {
        let mut comp = Composition::new();
        comp.add(Clip::new("caption", ClipKind::Text, 2, 0.0, 3.0));
        let plan = BatchCutPlan::new(0.5, 0.5);
        assert!(plan.apply(&mut comp, &mut rng()).is_err());
    }

    #[test]
    fn test_caption_plan_slot_count_is_ceil() {
        assert_eq!(CaptionPlan::new(9.0, 3.0).slot_count(), 3);
        assert_eq!(CaptionPlan::new(10.0, 3.0).slot_count(), 4);
        assert_eq!(CaptionPlan::new(0.5, 3.0).slot_count(), 1);
        assert_eq!(CaptionPlan::new(0.0, 3.0).slot_count(), 0);
    }

    #[test]
    fn test_caption_plan_final_slot_clipped() {
        let plan = CaptionPlan::new(10.0, 3.0);
        let last = plan.slots.last().unwrap();
        assert_eq!(last.start, 9.0);
        assert_eq!(last.end, 10.0);
    }
}
