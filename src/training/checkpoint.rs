//! Checkpoint naming and the save-best-only policy.
//!
//! The tracker does not write model weights; it tells the training
//! collaborator when and where to save them.

use std::path::PathBuf;

use crate::constants::{BEST_MODEL_NAME, CHECKPOINT_PATTERN, DEFAULT_OUTPUT_DIR};

/// Where and when checkpoints are written.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointPolicy {
    /// Output directory
    pub dir: PathBuf,
    /// File name pattern with `{epoch}` and `{val_loss}` placeholders
    pub pattern: String,
    /// File name of the best-model checkpoint
    pub best_name: String,
    /// Only save when the validation loss improves
    pub save_best_only: bool,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pattern: CHECKPOINT_PATTERN.to_string(),
            best_name: BEST_MODEL_NAME.to_string(),
            save_best_only: true,
        }
    }
}

impl CheckpointPolicy {
    /// Policy writing into `dir` with default names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Epoch checkpoint path, e.g. `weightsEpoch_07_valLoss_0.43.hdf5`.
    pub fn epoch_path(&self, epoch: usize, val_loss: f64) -> PathBuf {
        let name = self
            .pattern
            .replace("{epoch}", &format!("{:02}", epoch))
            .replace("{val_loss}", &format!("{:.2}", val_loss));
        self.dir.join(name)
    }

    /// Best-model checkpoint path.
    pub fn best_path(&self) -> PathBuf {
        self.dir.join(&self.best_name)
    }
}

/// Paths to write after an epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointDecision {
    /// Epoch that triggered the save
    pub epoch: usize,
    /// Per-epoch checkpoint file
    pub epoch_path: PathBuf,
    /// Best-model file, present when the epoch improved the monitored loss
    pub best_path: Option<PathBuf>,
}

/// Tracks the best validation loss seen so far.
#[derive(Debug, Clone)]
pub struct CheckpointTracker {
    policy: CheckpointPolicy,
    best: Option<(usize, f64)>,
}

impl CheckpointTracker {
    /// Create a tracker with `policy`.
    pub fn new(policy: CheckpointPolicy) -> Self {
        Self { policy, best: None }
    }

    /// Best `(epoch, val_loss)` observed so far.
    pub fn best(&self) -> Option<(usize, f64)> {
        self.best
    }

    /// Report the validation loss of `epoch`.
    ///
    /// A loss improves when it is strictly lower than the best so far; NaN
    /// never improves. Returns `None` when nothing should be written.
    pub fn observe(&mut self, epoch: usize, val_loss: f64) -> Option<CheckpointDecision> {
        let improved = !val_loss.is_nan()
            && self.best.is_none_or(|(_, best)| val_loss < best);

        if improved {
            log::info!(
                "Epoch {:02}: val_loss improved to {:.5}{}",
                epoch,
                val_loss,
                self.best
                    .map(|(_, b)| format!(" from {:.5}", b))
                    .unwrap_or_default()
            );
            self.best = Some((epoch, val_loss));
        } else {
            log::info!("Epoch {:02}: val_loss did not improve", epoch);
        }

        if !improved && self.policy.save_best_only {
            return None;
        }

        Some(CheckpointDecision {
            epoch,
            epoch_path: self.policy.epoch_path(epoch, val_loss),
            best_path: improved.then(|| self.policy.best_path()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_file_name() {
        let policy = CheckpointPolicy::in_dir("out");
        assert_eq!(
            policy.epoch_path(7, 0.4321),
            PathBuf::from("out/weightsEpoch_07_valLoss_0.43.hdf5")
        );
        assert_eq!(
            policy.epoch_path(123, 1.0),
            PathBuf::from("out/weightsEpoch_123_valLoss_1.00.hdf5")
        );
        assert_eq!(policy.best_path(), PathBuf::from("out/bestModel.hdf5"));
    }

    #[test]
    fn test_save_best_only() {
        let mut tracker = CheckpointTracker::new(CheckpointPolicy::in_dir("out"));

        let first = tracker.observe(1, 0.8).unwrap();
        assert_eq!(first.best_path, Some(PathBuf::from("out/bestModel.hdf5")));

        assert!(tracker.observe(2, 0.9).is_none());
        assert!(tracker.observe(3, 0.8).is_none(), "equal loss is not an improvement");
        assert!(tracker.observe(4, f64::NAN).is_none());

        let fifth = tracker.observe(5, 0.5).unwrap();
        assert_eq!(fifth.epoch, 5);
        assert_eq!(tracker.best(), Some((5, 0.5)));
    }

    #[test]
    fn test_save_every_epoch() {
        let policy = CheckpointPolicy {
            save_best_only: false,
            ..CheckpointPolicy::in_dir("out")
        };
        let mut tracker = CheckpointTracker::new(policy);
        tracker.observe(1, 0.5);

        let worse = tracker.observe(2, 0.7).unwrap();
        assert_eq!(worse.best_path, None);
        assert_eq!(
            worse.epoch_path,
            PathBuf::from("out/weightsEpoch_02_valLoss_0.70.hdf5")
        );
    }
}
