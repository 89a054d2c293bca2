//! aeroseg - Aerial segmentation label toolkit
//!
//! Converts between RGB color masks and dense class-index masks for the
//! 24-class aerial drone dataset, and provides the dataset and training-run
//! glue around that conversion.
//!
//! - [`labels`]: the fixed class table (index ↔ name ↔ color)
//! - [`codec`]: parallel index ↔ color conversion over `(N, H, W)` batches
//! - [`driver`]: per-item conversion of differently sized images
//! - [`data`]: manifests, train/test split, image loading, `.npy`/PNG storage
//! - [`training`]: checkpoint naming, history, pixel metrics
//! - [`config`]: versioned JSON configuration

pub mod codec;
pub mod config;
pub mod constants;
pub mod data;
pub mod driver;
pub mod error;
pub mod labels;
pub mod mask;
pub mod training;

pub use codec::{
    LogProgress, NoProgress, ProgressObserver, UnknownColorPolicy, decode_batch, encode_batch,
};
pub use driver::BatchDriver;
pub use error::{CodecError, DataError};
pub use labels::{CLASS_TABLE, LabelClass, NUM_CLASSES, color_of, index_of};
pub use mask::{ColorMask, IndexMask};
