//! Image and label loading for segmentation datasets.
//!
//! Input images are decoded with the `image` crate, converted to RGB, and
//! resized to a square side length with a triangle filter. Label images are
//! resized with nearest-neighbor sampling so that no blended, unregistered
//! colors or indices are introduced.
//!
//! ## Label encodings
//!
//! - **Color**: label images are RGB color masks; they are collapsed to class
//!   indices through the codec.
//! - **Gray**: label images are single-channel; `offset` is subtracted from
//!   every pixel to obtain the class index.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use ndarray::{Array, Array2, Array3, Array4, ArrayView4, Axis, Dimension, RemoveAxis};
use serde::{Deserialize, Serialize};

use super::ManifestEntry;
use crate::codec::{NoProgress, ProgressObserver, ProgressTicker, UnknownColorPolicy, encode_batch};
use crate::constants::{
    DEFAULT_COLOR_DATASET_SIZE, DEFAULT_GRAY_DATASET_SIZE, DEFAULT_GRAY_LABEL_OFFSET,
    PROGRESS_INTERVAL,
};
use crate::error::{CodecError, DataError};
use crate::mask::IndexMask;

/// How label images store class information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LabelEncoding {
    /// RGB color masks using the class table colors
    #[default]
    Color,
    /// Single-channel images holding `class index + offset`
    Gray {
        /// Value subtracted from every label pixel
        offset: u8,
    },
}

impl LabelEncoding {
    /// Grayscale encoding with the default offset of 1.
    pub fn gray() -> Self {
        Self::Gray {
            offset: DEFAULT_GRAY_LABEL_OFFSET,
        }
    }

    /// Side length datasets with this encoding are resized to by default.
    pub fn default_size(&self) -> u32 {
        match self {
            Self::Color => DEFAULT_COLOR_DATASET_SIZE,
            Self::Gray { .. } => DEFAULT_GRAY_DATASET_SIZE,
        }
    }
}

/// Options for loading image/label pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Side length images and labels are resized to
    pub size: u32,
    /// Storage format of the label images
    pub label_encoding: LabelEncoding,
    /// Treatment of unregistered label colors
    pub policy: UnknownColorPolicy,
    /// Entries between progress signals (0 disables them)
    pub progress_interval: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_COLOR_DATASET_SIZE,
            label_encoding: LabelEncoding::Color,
            policy: UnknownColorPolicy::Strict,
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

/// Label data of one sample before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLabel {
    /// RGB color mask `(H, W, 3)`
    Color(Array3<u8>),
    /// Class indices `(H, W)`
    Index(Array2<u8>),
}

/// One loaded image/label pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// RGB image `(H, W, 3)`
    pub image: Array3<u8>,
    /// Label image
    pub label: RawLabel,
}

/// A stacked batch of samples with labels encoded as class indices.
#[derive(Debug, Clone)]
pub struct SampleBatch {
    /// RGB images `(N, H, W, 3)`
    pub images: Array4<u8>,
    /// Class indices `(N, H, W)`
    pub labels: IndexMask,
    /// Entries that could not be loaded
    pub skipped: Vec<PathBuf>,
}

impl SampleBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.images.len_of(Axis(0))
    }

    /// Whether the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load an RGB image and resize it to `size × size`.
pub fn load_rgb(path: &Path, size: u32) -> Result<Array3<u8>, DataError> {
    let img = open(path)?.to_rgb8();
    let img = imageops::resize(&img, size, size, FilterType::Triangle);
    rgb_to_array(img)
}

/// Load a color label image and resize it to `size × size` without blending.
pub fn load_color_label(path: &Path, size: u32) -> Result<Array3<u8>, DataError> {
    let img = open(path)?.to_rgb8();
    let img = imageops::resize(&img, size, size, FilterType::Nearest);
    rgb_to_array(img)
}

/// Load a grayscale label image, resize it, and subtract `offset`.
pub fn load_gray_label(path: &Path, size: u32, offset: u8) -> Result<Array2<u8>, DataError> {
    let img = open(path)?.to_luma8();
    let img = imageops::resize(&img, size, size, FilterType::Nearest);
    let (w, h) = img.dimensions();

    let mut out = Array2::zeros((h as usize, w as usize));
    for (x, y, px) in img.enumerate_pixels() {
        let value = px[0];
        let index = value
            .checked_sub(offset)
            .filter(|&i| crate::mask::class_in_range(i64::from(i)))
            .ok_or_else(|| {
                CodecError::out_of_range(i64::from(value) - i64::from(offset))
                    .at((0, y as usize, x as usize))
            })?;
        out[[y as usize, x as usize]] = index;
    }
    Ok(out)
}

/// Load one manifest entry.
pub fn load_sample(entry: &ManifestEntry, options: &LoadOptions) -> Result<Sample, DataError> {
    check_size(options.size)?;
    let image = load_rgb(&entry.data, options.size)?;
    let label = match options.label_encoding {
        LabelEncoding::Color => RawLabel::Color(load_color_label(&entry.label, options.size)?),
        LabelEncoding::Gray { offset } => {
            RawLabel::Index(load_gray_label(&entry.label, options.size, offset)?)
        }
    };
    Ok(Sample { image, label })
}

/// Load every entry, skipping pairs that fail, and encode the labels.
///
/// A failing pair is skipped as a unit so images and labels stay aligned.
/// Progress is reported every `options.progress_interval` entries and the
/// observer completes once with the number of entries read, skipped ones
/// included. Color labels are encoded in one parallel batch.
pub fn load_batch(
    entries: &[ManifestEntry],
    options: &LoadOptions,
    observer: &dyn ProgressObserver,
) -> Result<SampleBatch, DataError> {
    check_size(options.size)?;

    let ticker = ProgressTicker::new(observer, options.progress_interval, entries.len());
    let mut images = Vec::with_capacity(entries.len());
    let mut colors = Vec::new();
    let mut indices = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        match load_sample(entry, options) {
            Ok(sample) => {
                images.push(sample.image);
                match sample.label {
                    RawLabel::Color(c) => colors.push(c),
                    RawLabel::Index(i) => indices.push(i),
                }
            }
            Err(e) => {
                log::warn!("Could not load {:?} / {:?}: {}", entry.data, entry.label, e);
                skipped.push(entry.data.clone());
            }
        }
        ticker.tick();
    }

    if images.is_empty() {
        return Err(DataError::EmptyBatch);
    }

    let images = stack(&images)?;
    let labels = match options.label_encoding {
        LabelEncoding::Color => {
            let colors = stack(&colors)?;
            encode_batch(colors.view(), options.policy, &NoProgress)?
        }
        LabelEncoding::Gray { .. } => stack(&indices)?,
    };
    ticker.finish();

    log::info!(
        "Loaded {} samples ({} skipped) at {}x{}",
        images.len_of(Axis(0)),
        skipped.len(),
        options.size,
        options.size
    );

    Ok(SampleBatch {
        images,
        labels,
        skipped,
    })
}

/// Scale 8-bit images to `[0, 1]`.
pub fn normalize(images: ArrayView4<'_, u8>) -> Array4<f32> {
    images.mapv(|v| f32::from(v) / 255.0)
}

fn check_size(size: u32) -> Result<(), DataError> {
    if size == 0 {
        return Err(DataError::InvalidArgument("image size must be positive".into()));
    }
    Ok(())
}

fn open(path: &Path) -> Result<image::DynamicImage, DataError> {
    if !path.exists() {
        return Err(DataError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(image::open(path)?)
}

fn rgb_to_array(img: image::RgbImage) -> Result<Array3<u8>, DataError> {
    let (w, h) = img.dimensions();
    Array3::from_shape_vec((h as usize, w as usize, 3), img.into_raw())
        .map_err(|e| DataError::InvalidArgument(format!("image buffer: {}", e)))
}

fn stack<A, D>(arrays: &[Array<A, D>]) -> Result<Array<A, D::Larger>, DataError>
where
    A: Clone,
    D: Dimension,
    D::Larger: RemoveAxis,
{
    let views: Vec<_> = arrays.iter().map(|a| a.view()).collect();
    ndarray::stack(Axis(0), &views)
        .map_err(|e| DataError::InvalidArgument(format!("cannot stack samples: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CountingProgress, NoProgress};
    use crate::labels::CLASS_TABLE;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("aeroseg_loader_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_pair(dir: &Path, stem: &str, class: usize) -> ManifestEntry {
        let data = dir.join(format!("{stem}.png"));
        let label = dir.join(format!("{stem}_label.png"));
        RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])).save(&data).unwrap();
        RgbImage::from_pixel(8, 6, Rgb(CLASS_TABLE[class].color))
            .save(&label)
            .unwrap();
        ManifestEntry::new(data, label)
    }

    #[test]
    fn test_load_color_batch() {
        let dir = temp_dir("color");
        let entries = vec![write_pair(&dir, "a", 3), write_pair(&dir, "b", 17)];
        let options = LoadOptions {
            size: 4,
            ..LoadOptions::default()
        };

        let counter = CountingProgress::default();
        let batch = load_batch(&entries, &options, &counter).unwrap();
        assert_eq!(batch.images.shape(), &[2, 4, 4, 3]);
        assert_eq!(batch.labels.shape(), &[2, 4, 4]);
        assert!(batch.labels.index_axis(Axis(0), 0).iter().all(|&v| v == 3));
        assert!(batch.labels.index_axis(Axis(0), 1).iter().all(|&v| v == 17));
        assert_eq!(counter.completions(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_pair_is_skipped() {
        let dir = temp_dir("skip");
        let good = write_pair(&dir, "good", 1);
        let missing = ManifestEntry::new(dir.join("nope.png"), dir.join("nope_label.png"));
        let options = LoadOptions {
            size: 2,
            ..LoadOptions::default()
        };

        let batch = load_batch(&[missing, good], &options, &NoProgress).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.skipped.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_progress_follows_options() {
        let dir = temp_dir("progress");
        let mut entries: Vec<_> = (0..4)
            .map(|i| write_pair(&dir, &format!("p{i}"), 2))
            .collect();
        entries.push(ManifestEntry::new(dir.join("gone.png"), dir.join("gone_label.png")));
        let options = LoadOptions {
            size: 2,
            progress_interval: 2,
            ..LoadOptions::default()
        };

        let counter = CountingProgress::default();
        let batch = load_batch(&entries, &options, &counter).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(counter.progress_calls(), 2);
        assert_eq!(counter.last_done(), 4);
        assert_eq!(counter.completions(), 1);
        assert_eq!(counter.completed_total(), 5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_size_per_encoding() {
        assert_eq!(LabelEncoding::Color.default_size(), 304);
        assert_eq!(LabelEncoding::gray().default_size(), 224);
    }

    #[test]
    fn test_all_missing_is_error() {
        let entries = vec![ManifestEntry::new("/nonexistent/a.png", "/nonexistent/b.png")];
        assert!(matches!(
            load_batch(&entries, &LoadOptions::default(), &NoProgress),
            Err(DataError::EmptyBatch)
        ));
    }

    #[test]
    fn test_gray_label_offset() {
        let dir = temp_dir("gray");
        let path = dir.join("gray.png");
        GrayImage::from_pixel(3, 3, Luma([5])).save(&path).unwrap();

        let labels = load_gray_label(&path, 3, 1).unwrap();
        assert!(labels.iter().all(|&v| v == 4));

        let zero = dir.join("zero.png");
        GrayImage::from_pixel(2, 2, Luma([0])).save(&zero).unwrap();
        assert!(matches!(
            load_gray_label(&zero, 2, 1),
            Err(DataError::Codec(CodecError::OutOfRange { value: -1, .. }))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_normalize() {
        let images = Array4::from_elem((1, 1, 1, 3), 255u8);
        let normalized = normalize(images.view());
        assert!(normalized.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_label_encoding_serde() {
        let json = serde_json::to_string(&LabelEncoding::gray()).unwrap();
        assert_eq!(json, r#"{"kind":"gray","offset":1}"#);
        let back: LabelEncoding = serde_json::from_str(r#"{"kind":"color"}"#).unwrap();
        assert_eq!(back, LabelEncoding::Color);
    }
}
