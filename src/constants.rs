//! Global constants for aeroseg

/// Images processed between two progress signals
pub const PROGRESS_INTERVAL: usize = 15;

/// Side length images are resized to when labels are color masks
pub const DEFAULT_COLOR_DATASET_SIZE: u32 = 304;

/// Side length images are resized to when labels are grayscale index images
pub const DEFAULT_GRAY_DATASET_SIZE: u32 = 224;

/// Offset subtracted from grayscale label pixels to obtain class indices
pub const DEFAULT_GRAY_LABEL_OFFSET: u8 = 1;

/// Fraction of manifest entries held out for testing
pub const DEFAULT_TEST_FRACTION: f64 = 0.3;

/// Seed for the train/test shuffle
pub const DEFAULT_SPLIT_SEED: u64 = 69;

/// Manifest column delimiter
pub const MANIFEST_DELIMITER: char = ';';

/// Default number of training epochs recorded in configuration
pub const DEFAULT_EPOCHS: usize = 150;

/// Default training batch size recorded in configuration
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Fraction of the training set used for validation
pub const DEFAULT_VALIDATION_SPLIT: f64 = 0.3;

/// Encoder/decoder filter widths of the segmentation network
pub const DEFAULT_FILTERS: [usize; 8] = [32, 64, 128, 256, 256, 128, 64, 32];

/// Directory for checkpoints and training history
pub const DEFAULT_OUTPUT_DIR: &str = "resultTraining";

/// Checkpoint file name pattern; `{epoch}` and `{val_loss}` are substituted
pub const CHECKPOINT_PATTERN: &str = "weightsEpoch_{epoch}_valLoss_{val_loss}.hdf5";

/// File name of the best-model checkpoint
pub const BEST_MODEL_NAME: &str = "bestModel.hdf5";
