//! Convenience constructors over the queue primitives.
//!
//! These build specific batch shapes; they are not separate state machines.

use tracing::info;
use uuid::Uuid;

use crate::engine::AnimationQueueEngine;
use crate::queue::{ClipAnimation, OperationKind};

impl AnimationQueueEngine {
    /// Start a caption batch: one item per caption slot, where the slot
    /// count is `ceil(timeline_duration / interval)`. Caption clips do not
    /// exist yet when the batch starts, so each slot gets a fresh id.
    pub fn start_caption_batch(
        &mut self,
        command_text: impl Into<String>,
        timeline_duration: f64,
        interval: f64,
    ) -> Uuid {
        let count = if interval > 0.0 && timeline_duration > 0.0 {
            (timeline_duration / interval).ceil() as usize
        } else {
            0
        };
        let items = (0..count)
            .map(|_| ClipAnimation::new(Uuid::new_v4(), OperationKind::Caption))
            .collect();
        info!(slots = count, interval, "caption batch queued");
        self.start_animation(command_text, items)
    }

    /// Start a single-item queue for one tracked text overlay.
    pub fn start_tracking_text(&mut self, command_text: impl Into<String>, clip_id: Uuid) -> Uuid {
        let items = vec![ClipAnimation::new(clip_id, OperationKind::TrackText)];
        self.start_animation(command_text, items)
    }
}
