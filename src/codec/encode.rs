//! Color mask to index mask collapse.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::{Array2, Array3, ArrayView3, ArrayView4, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::contiguous;
use super::progress::{NoProgress, ProgressObserver};
use crate::error::CodecError;
use crate::labels::lookup_color;
use crate::mask::{COLOR_CHANNELS, IndexMask, check_color_shape};

/// What the encoder does with a color that is not in the class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownColorPolicy {
    /// Fail the whole batch with `UnknownColor`
    #[default]
    Strict,
    /// Write class 0 (`unlabeled`) and continue
    Unlabeled,
}

/// Collapse a batch of color masks `(N, H, W, 3)` into index masks `(N, H, W)`.
///
/// Rows of all images are classified in parallel; each worker writes only
/// its own output row. The observer receives a single completion signal.
///
/// Under [`UnknownColorPolicy::Strict`] the reported error is always the
/// first unmatched pixel in `(image, row, column)` order.
pub fn encode_batch(
    colors: ArrayView4<'_, u8>,
    policy: UnknownColorPolicy,
    observer: &dyn ProgressObserver,
) -> Result<IndexMask, CodecError> {
    check_color_shape(colors.shape())?;

    let (n, h, w, _) = colors.dim();
    let src = contiguous(&colors);
    let mut out = vec![0u8; n * h * w];
    let unmatched = AtomicUsize::new(0);

    if w > 0 && h > 0 {
        let result = out
            .par_chunks_mut(w)
            .zip(src.par_chunks(w * COLOR_CHANNELS))
            .enumerate()
            .try_for_each(|(row, (dst, rgb))| {
                let mut misses = 0;
                let pixels = dst.iter_mut().zip(rgb.chunks_exact(COLOR_CHANNELS));
                for (x, (slot, px)) in pixels.enumerate() {
                    let color = [px[0], px[1], px[2]];
                    match lookup_color(color) {
                        Some(index) => *slot = index,
                        None if policy == UnknownColorPolicy::Strict => {
                            return Err(CodecError::unknown_color(color).at((row / h, row % h, x)));
                        }
                        None => misses += 1,
                    }
                }
                if misses > 0 {
                    unmatched.fetch_add(misses, Ordering::Relaxed);
                }
                Ok(())
            });

        // Workers race to report; rescan so the error is reproducible.
        if let Err(err) = result {
            return Err(first_unknown(&src, h, w).unwrap_or(err));
        }
    }

    let unmatched = unmatched.into_inner();
    if unmatched > 0 {
        log::warn!(
            "{} pixels had unregistered colors and were labeled as class 0",
            unmatched
        );
    }

    observer.on_complete(n);
    log::debug!("Encoded {} color masks of {}x{}", n, w, h);

    Array3::from_shape_vec((n, h, w), out)
        .map_err(|_| CodecError::shape("(N, H, W)", &[n, h, w]))
}

/// Collapse a single color image `(H, W, 3)` into an index mask `(H, W)`.
pub fn encode_image(
    color: ArrayView3<'_, u8>,
    policy: UnknownColorPolicy,
) -> Result<Array2<u8>, CodecError> {
    let batch = encode_batch(color.insert_axis(Axis(0)), policy, &NoProgress)?;
    Ok(batch.index_axis_move(Axis(0), 0))
}

fn first_unknown(src: &[u8], h: usize, w: usize) -> Option<CodecError> {
    src.chunks_exact(COLOR_CHANNELS)
        .position(|px| lookup_color([px[0], px[1], px[2]]).is_none())
        .map(|i| {
            let px = &src[i * COLOR_CHANNELS..(i + 1) * COLOR_CHANNELS];
            let (row, x) = (i / w, i % w);
            CodecError::unknown_color([px[0], px[1], px[2]]).at((row / h, row % h, x))
        })
}
