//! Dataset glue around the mask codec.
//!
//! This module provides:
//! - `Manifest`: `;`-delimited lists of image/label path pairs
//! - `train_test_split`: seeded, reproducible splitting of manifest entries
//! - Loaders that read, resize, and encode image/label pairs into batches
//! - `.npy` and PNG storage for index and color masks
//!
//! ```rust,ignore
//! use aeroseg::data::{Manifest, LoadOptions, load_batch, train_test_split};
//!
//! let manifest = Manifest::load(Path::new("dataset.csv"))?;
//! let split = train_test_split(manifest.entries, 0.3, 69)?;
//! let batch = load_batch(&split.train, &LoadOptions::default(), &NoProgress)?;
//! ```

mod export;
mod loader;
mod manifest;
pub mod npy;
mod split;

pub use export::{read_color_mask, write_color_masks};
pub use loader::{
    LabelEncoding, LoadOptions, RawLabel, Sample, SampleBatch, load_batch, load_color_label,
    load_gray_label, load_rgb, load_sample, normalize,
};
pub use manifest::{Manifest, ManifestEntry};
pub use split::{Split, train_test_split};
