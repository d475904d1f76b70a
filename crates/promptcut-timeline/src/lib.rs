//! Promptcut Timeline - Layout and interaction engines
//!
//! Implements the timeline core for the Promptcut editor:
//! - Clips and the composition that owns them
//! - Non-overlapping clip placement (layout engine)
//! - Live drag-reorder feedback (drop indicators)
//! - Edit operations with snapshot undo/redo
//! - Batch edit planning (cut-every-clip, caption intervals)
//! - Display zoom derived from content
//! - The external timeline wire format

pub mod batch;
pub mod clip;
pub mod composition;
pub mod drag;
pub mod edit;
pub mod layout;
pub mod serialization;
pub mod zoom;

pub use batch::{BatchCutPlan, CaptionPlan};
pub use clip::{Clip, ClipId, ClipKind};
pub use composition::Composition;
pub use drag::{DragReorderEngine, DragSurface, DropIndicator, TrackGeometry, Viewport};
pub use edit::CommandHistory;
pub use layout::{IntervalLayoutEngine, LayoutConfig};
pub use serialization::{LaneKind, TimelineFile};
pub use zoom::{ViewportZoomController, ZoomConfig};
