//! Configuration file support for aeroseg.
//!
//! This module provides serialization and deserialization of pipeline settings
//! as versioned JSON, so a dataset preparation run can be reproduced exactly.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::codec::{UnknownColorPolicy, WorkerPool};
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_FILTERS, DEFAULT_OUTPUT_DIR, DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, DEFAULT_VALIDATION_SPLIT,
    PROGRESS_INTERVAL,
};
use crate::data::{LabelEncoding, LoadOptions};
use crate::labels::NUM_CLASSES;
use crate::training::CheckpointPolicy;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Pipeline configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Dataset loading and splitting
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Label conversion
    #[serde(default)]
    pub codec: CodecConfig,

    /// Training-run record
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Dataset section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path of the `;`-delimited manifest
    pub manifest: Option<PathBuf>,
    /// Side length images are resized to; unset picks the size that
    /// matches `label_encoding` (304 for color, 224 for gray)
    pub image_size: Option<u32>,
    /// Fraction of entries held out for testing
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
    /// Storage format of the label images
    pub label_encoding: LabelEncoding,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            manifest: None,
            image_size: None,
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SPLIT_SEED,
            label_encoding: LabelEncoding::Color,
        }
    }
}

/// Codec section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Treatment of unregistered label colors
    pub unknown_color: UnknownColorPolicy,
    /// Images between progress log lines
    pub progress_interval: usize,
    /// Worker threads for the codec; `None` uses all cores
    pub worker_threads: Option<usize>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            unknown_color: UnknownColorPolicy::Strict,
            progress_interval: PROGRESS_INTERVAL,
            worker_threads: None,
        }
    }
}

/// Training section of the config.
///
/// These values are read by the external training collaborator; aeroseg
/// itself only uses `output_dir` and `num_classes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of epochs
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Fraction of the training set used for validation
    pub validation_split: f64,
    /// Filter widths of the encoder/decoder stages
    pub filters: Vec<usize>,
    /// Number of output classes
    pub num_classes: usize,
    /// Directory for checkpoints and history
    pub output_dir: PathBuf,
    /// Only checkpoint when validation loss improves
    pub save_best_only: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            validation_split: DEFAULT_VALIDATION_SPLIT,
            filters: DEFAULT_FILTERS.to_vec(),
            num_classes: NUM_CLASSES,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            save_best_only: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            dataset: DatasetConfig::default(),
            codec: CodecConfig::default(),
            training: TrainingConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tf = self.dataset.test_fraction;
        if !(tf > 0.0 && tf < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "dataset.test_fraction must be in (0, 1), got {}",
                tf
            )));
        }
        if self.dataset.image_size == Some(0) {
            return Err(ConfigError::Invalid(
                "dataset.image_size must be positive".to_string(),
            ));
        }
        if self.training.num_classes == 0 || self.training.num_classes > NUM_CLASSES {
            return Err(ConfigError::Invalid(format!(
                "training.num_classes must be in 1..={}, got {}",
                NUM_CLASSES, self.training.num_classes
            )));
        }
        Ok(())
    }

    /// Read configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// File name used inside the user config directory.
    pub fn default_filename() -> &'static str {
        "aeroseg-config.json"
    }

    /// `<config dir>/aeroseg/aeroseg-config.json`, with `~/.config` standing in
    /// when the platform reports no config directory.
    pub fn default_path() -> Option<PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(base.join("aeroseg").join(Self::default_filename()))
    }

    /// Load the config at [`Self::default_path`].
    ///
    /// `Ok(None)` when no such file exists; a file that exists but fails to
    /// parse is an error so the caller can report it once logging is set up.
    pub fn load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Image side length, resolved from the label encoding when unset.
    pub fn image_size(&self) -> u32 {
        self.dataset
            .image_size
            .unwrap_or_else(|| self.dataset.label_encoding.default_size())
    }

    /// Loader options derived from the dataset and codec sections.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            size: self.image_size(),
            label_encoding: self.dataset.label_encoding,
            policy: self.codec.unknown_color,
            progress_interval: self.codec.progress_interval,
        }
    }

    /// Checkpoint policy derived from the training section.
    pub fn checkpoint_policy(&self) -> CheckpointPolicy {
        CheckpointPolicy {
            save_best_only: self.training.save_best_only,
            ..CheckpointPolicy::in_dir(&self.training.output_dir)
        }
    }

    /// Worker pool sized by `codec.worker_threads`.
    pub fn worker_pool(&self) -> Result<WorkerPool, ConfigError> {
        WorkerPool::new(self.codec.worker_threads)
            .map_err(|e| ConfigError::Invalid(format!("worker pool: {}", e)))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while reading, writing or validating a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file is not valid config JSON
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file was written by a newer aeroseg
    #[error("config version {file_version} is newer than supported version {supported_version}")]
    VersionTooNew {
        /// Version recorded in the file
        file_version: u32,
        /// Highest version this build reads
        supported_version: u32,
    },

    /// Reading or writing the file failed
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
