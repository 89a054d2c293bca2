//! Index mask to color mask expansion.

use ndarray::{Array3, Array4, ArrayView2, ArrayView3, Axis};
use rayon::prelude::*;

use super::contiguous;
use super::progress::{NoProgress, ProgressObserver, ProgressTicker};
use crate::constants::PROGRESS_INTERVAL;
use crate::error::CodecError;
use crate::labels::{CLASS_TABLE, NUM_CLASSES};
use crate::mask::{COLOR_CHANNELS, ColorMask};

/// Expand a batch of index masks `(N, H, W)` into color masks `(N, H, W, 3)`.
///
/// All values are range-checked before any output is produced; a value
/// outside `[0, 23]` aborts the batch with `OutOfRange`. Images are expanded
/// in parallel and the observer is notified every 15 finished images.
pub fn decode_batch(
    masks: ArrayView3<'_, u8>,
    observer: &dyn ProgressObserver,
) -> Result<ColorMask, CodecError> {
    decode_batch_with_interval(masks, PROGRESS_INTERVAL, observer)
}

/// Same as [`decode_batch`] with a custom progress interval.
pub fn decode_batch_with_interval(
    masks: ArrayView3<'_, u8>,
    interval: usize,
    observer: &dyn ProgressObserver,
) -> Result<ColorMask, CodecError> {
    check_indices(&masks)?;

    let (n, h, w) = masks.dim();
    let pixels = h * w;
    let src = contiguous(&masks);
    let mut out = vec![0u8; n * pixels * COLOR_CHANNELS];
    let ticker = ProgressTicker::new(observer, interval, n);

    if pixels > 0 {
        out.par_chunks_mut(pixels * COLOR_CHANNELS)
            .zip(src.par_chunks(pixels))
            .for_each(|(dst, image)| {
                for (px, &index) in dst.chunks_exact_mut(COLOR_CHANNELS).zip(image) {
                    px.copy_from_slice(&CLASS_TABLE[usize::from(index)].color);
                }
                ticker.tick();
            });
    }
    ticker.finish();

    log::debug!("Decoded {} index masks of {}x{}", n, w, h);
    Array4::from_shape_vec((n, h, w, COLOR_CHANNELS), out)
        .map_err(|_| CodecError::shape("(N, H, W, 3)", &[n, h, w, COLOR_CHANNELS]))
}

/// Expand a single index mask `(H, W)` into a color image `(H, W, 3)`.
pub fn decode_image(mask: ArrayView2<'_, u8>) -> Result<Array3<u8>, CodecError> {
    let batch = decode_batch(mask.insert_axis(Axis(0)), &NoProgress)?;
    Ok(batch.index_axis_move(Axis(0), 0))
}

/// Reject the batch if any value is not a class index.
fn check_indices(masks: &ArrayView3<'_, u8>) -> Result<(), CodecError> {
    match masks
        .indexed_iter()
        .find(|(_, v)| usize::from(**v) >= NUM_CLASSES)
    {
        Some((pos, &value)) => Err(CodecError::out_of_range(i64::from(value)).at(pos)),
        None => Ok(()),
    }
}
