//! Training-run bookkeeping.
//!
//! The network and optimizer live in an external framework. This module
//! covers what surrounds them: checkpoint naming with a save-best-only
//! policy, per-epoch history for loss and accuracy curves, and pixel metrics
//! computed on index masks.

mod checkpoint;
mod history;
pub mod metrics;

pub use checkpoint::{CheckpointDecision, CheckpointPolicy, CheckpointTracker};
pub use history::{Curve, EpochRecord, TrainingHistory};
pub use metrics::{class_iou, mean_iou, pixel_accuracy};
