//! PNG export and import of color masks.

use std::path::{Path, PathBuf};

use image::RgbImage;
use ndarray::{Array4, ArrayView3, Axis};

use crate::error::DataError;
use crate::mask::{COLOR_CHANNELS, ColorMask};

/// Write every image of a color mask batch as `{stem}_{i:04}.png` in `dir`.
///
/// Returns the written paths in batch order.
pub fn write_color_masks(
    dir: &Path,
    masks: &ColorMask,
    stem: &str,
) -> Result<Vec<PathBuf>, DataError> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(masks.len_of(Axis(0)));
    for (i, mask) in masks.axis_iter(Axis(0)).enumerate() {
        let path = dir.join(format!("{}_{:04}.png", stem, i));
        to_rgb_image(mask)?.save(&path)?;
        paths.push(path);
    }

    log::info!("Exported {} color masks to {:?}", paths.len(), dir);
    Ok(paths)
}

/// Load a PNG (or any supported raster) as a single-image color batch `(1, H, W, 3)`.
pub fn read_color_mask(path: &Path) -> Result<ColorMask, DataError> {
    let img = image::open(path)?.to_rgb8();
    let (w, h) = img.dimensions();
    Array4::from_shape_vec((1, h as usize, w as usize, COLOR_CHANNELS), img.into_raw())
        .map_err(|e| DataError::InvalidArgument(format!("image buffer: {}", e)))
}

fn to_rgb_image(mask: ArrayView3<'_, u8>) -> Result<RgbImage, DataError> {
    let (h, w, _) = mask.dim();
    let raw: Vec<u8> = mask.iter().copied().collect();
    RgbImage::from_raw(w as u32, h as u32, raw)
        .ok_or_else(|| DataError::InvalidArgument(format!("cannot build {}x{} image", w, h)))
}
