//! Per-epoch training history.
//!
//! The history is the hand-off to plotting tools: it serializes to JSON with
//! one record per epoch and exposes the loss and accuracy curves as series.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Metrics recorded at the end of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch number
    pub epoch: usize,
    /// Training loss
    pub loss: f64,
    /// Validation loss
    pub val_loss: f64,
    /// Training pixel accuracy
    pub accuracy: f64,
    /// Validation pixel accuracy
    pub val_accuracy: f64,
}

/// Ordered list of epoch records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Records in epoch order
    pub epochs: Vec<EpochRecord>,
}

/// A named series of values, one per epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    /// Legend label
    pub label: &'static str,
    /// Values in epoch order
    pub values: Vec<f64>,
}

impl TrainingHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Whether no epochs are recorded.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Record with the lowest validation loss; NaN losses are ignored.
    pub fn best(&self) -> Option<&EpochRecord> {
        self.epochs
            .iter()
            .filter(|r| !r.val_loss.is_nan())
            .min_by(|a, b| a.val_loss.total_cmp(&b.val_loss))
    }

    /// Training and validation loss curves.
    pub fn loss_curves(&self) -> [Curve; 2] {
        [
            self.curve("Training loss", |r| r.loss),
            self.curve("Validation Loss", |r| r.val_loss),
        ]
    }

    /// Training and validation accuracy curves.
    pub fn accuracy_curves(&self) -> [Curve; 2] {
        [
            self.curve("Training Accuracy", |r| r.accuracy),
            self.curve("Validation Accuracy", |r| r.val_accuracy),
        ]
    }

    fn curve(&self, label: &'static str, f: impl Fn(&EpochRecord) -> f64) -> Curve {
        Curve {
            label,
            values: self.epochs.iter().map(f).collect(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write the history to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved training history ({} epochs) to {:?}", self.len(), path);
        Ok(())
    }

    /// Read a history from `path`.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}
