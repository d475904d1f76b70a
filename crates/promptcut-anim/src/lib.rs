//! Promptcut Anim - Batch-operation progress visualization
//!
//! Models a batch edit ("cut every clip", "add captions every 3s") as an
//! ordered queue of per-clip animations. The engine drives per-item progress
//! through its own timer queue with an injected clock, so timer chains are
//! deterministic in tests and cancellable through an explicit epoch token.

pub mod builders;
pub mod clock;
pub mod engine;
pub mod queue;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AnimationConfig, AnimationQueueEngine};
pub use queue::{AnimState, AnimationQueue, ClipAnimation, OperationKind, QueueState};
