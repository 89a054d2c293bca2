//! Bidirectional codec between index masks and color masks.
//!
//! - `decode_*`: class indices `(N, H, W)` → RGB `(N, H, W, 3)` for export and visualization
//! - `encode_*`: RGB `(N, H, W, 3)` → class indices `(N, H, W)` for categorical losses
//!
//! Both directions validate the cheap invariants once per call and then
//! run a data-parallel map over pixels. The only shared state is the
//! read-only label registry; workers write disjoint output chunks.
//!
//! ```rust,ignore
//! use aeroseg::codec::{decode_batch, encode_batch, NoProgress, UnknownColorPolicy};
//!
//! let colors = decode_batch(index_masks.view(), &NoProgress)?;
//! let back = encode_batch(colors.view(), UnknownColorPolicy::Strict, &NoProgress)?;
//! assert_eq!(back, index_masks);
//! ```

mod decode;
mod encode;
mod pool;
mod progress;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use ndarray::{ArrayView, Dimension};

pub use decode::{decode_batch, decode_batch_with_interval, decode_image};
pub use encode::{UnknownColorPolicy, encode_batch, encode_image};
pub use pool::WorkerPool;
pub use progress::{CountingProgress, LogProgress, NoProgress, ProgressObserver};

pub(crate) use progress::ProgressTicker;

/// Borrow the view's elements as one slice in logical order, copying only
/// when the view is not in standard layout.
fn contiguous<'v, D: Dimension>(view: &'v ArrayView<'_, u8, D>) -> Cow<'v, [u8]> {
    match view.as_slice() {
        Some(slice) => Cow::Borrowed(slice),
        None => Cow::Owned(view.iter().copied().collect()),
    }
}
