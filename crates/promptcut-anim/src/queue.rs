//! Animation queue data model.
//!
//! A queue narrates one batch command: an ordered list of per-clip
//! animations, each moving `Idle → Processing → {Completed | Error}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a single clip animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimState {
    Idle,
    Processing,
    Completed,
    Error,
}

/// State of the whole queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    Processing,
    Completed,
    Error,
}

/// The edit intent a queue item visualizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Cut,
    Trim,
    Join,
    Remove,
    Caption,
    Overlay,
    Fade,
    TrackText,
}

/// Progress animation for one clip within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipAnimation {
    /// Clip this item narrates. Caption slots use fresh ids because their
    /// clips do not exist yet when the batch starts.
    pub clip_id: Uuid,
    pub operation: OperationKind,
    pub state: AnimState,
    /// 0 to 100.
    pub progress: f32,
    pub error_message: Option<String>,
    /// Engine-clock timestamps (seconds).
    pub started_at: Option<f64>,
    pub finished_at: Option<f64>,
}

impl ClipAnimation {
    /// Create an idle item.
    pub fn new(clip_id: Uuid, operation: OperationKind) -> Self {
        Self {
            clip_id,
            operation,
            state: AnimState::Idle,
            progress: 0.0,
            error_message: None,
            started_at: None,
            finished_at: None,
        }
    }
}

/// One batch command's visualization state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationQueue {
    pub id: Uuid,
    /// The command text this batch narrates (shown in the chat overlay).
    pub command_text: String,
    pub items: Vec<ClipAnimation>,
    /// Index of the next item expected to finish.
    pub current_index: usize,
    pub state: QueueState,
}

impl AnimationQueue {
    /// Create a queue with every item idle and the queue processing.
    pub fn new(command_text: impl Into<String>, items: Vec<ClipAnimation>) -> Self {
        Self {
            id: Uuid::new_v4(),
            command_text: command_text.into(),
            items,
            current_index: 0,
            state: QueueState::Processing,
        }
    }

    /// Find an item by clip id.
    pub fn item(&self, clip_id: Uuid) -> Option<&ClipAnimation> {
        self.items.iter().find(|i| i.clip_id == clip_id)
    }

    /// Find an item mutably by clip id.
    pub fn item_mut(&mut self, clip_id: Uuid) -> Option<&mut ClipAnimation> {
        self.items.iter_mut().find(|i| i.clip_id == clip_id)
    }

    /// First idle item, if any.
    pub fn first_idle_mut(&mut self) -> Option<&mut ClipAnimation> {
        self.items.iter_mut().find(|i| i.state == AnimState::Idle)
    }

    /// Whether every item has completed.
    pub fn all_completed(&self) -> bool {
        self.items.iter().all(|i| i.state == AnimState::Completed)
    }

    /// Overall progress across the batch, 0 to 100.
    ///
    /// A partially-completed in-flight item is weighted fractionally so the
    /// value advances smoothly rather than jumping per item.
    pub fn overall_progress(&self) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        let completed = self
            .items
            .iter()
            .filter(|i| i.state == AnimState::Completed)
            .count() as f32;
        let in_flight: f32 = self
            .items
            .iter()
            .find(|i| i.state == AnimState::Processing)
            .map(|i| i.progress / 100.0)
            .unwrap_or(0.0);
        ((completed + in_flight) / self.items.len() as f32 * 100.0).clamp(0.0, 100.0)
    }
}
