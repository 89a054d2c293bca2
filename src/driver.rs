//! Batch driver for lists of individually sized images.
//!
//! Datasets loaded without resizing hold one array per image, each with its
//! own dimensions. The driver runs the codec per item, reports progress every
//! `progress_interval` items, and stops at the first failing item.

use ndarray::{Array2, Array3};

use crate::codec::{
    LogProgress, NoProgress, ProgressObserver, ProgressTicker, UnknownColorPolicy, decode_image,
    encode_image,
};
use crate::constants::PROGRESS_INTERVAL;
use crate::error::CodecError;

/// Applies the decoder or encoder across a list of images.
pub struct BatchDriver {
    policy: UnknownColorPolicy,
    progress_interval: usize,
    observer: Box<dyn ProgressObserver + Send>,
}

impl BatchDriver {
    /// Create a silent driver with the strict color policy.
    pub fn new() -> Self {
        Self {
            policy: UnknownColorPolicy::default(),
            progress_interval: PROGRESS_INTERVAL,
            observer: Box::new(NoProgress),
        }
    }

    /// Create a driver that logs progress under `label`.
    pub fn logging(label: impl Into<String>) -> Self {
        Self::new().with_observer(LogProgress::new(label))
    }

    /// Set the policy for unregistered colors.
    pub fn with_policy(mut self, policy: UnknownColorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set how many items pass between progress signals (0 disables them).
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Replace the progress observer.
    pub fn with_observer(mut self, observer: impl ProgressObserver + Send + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Expand each index mask `(H, W)` into a color image `(H, W, 3)`.
    pub fn decode_all(&self, masks: &[Array2<u8>]) -> Result<Vec<Array3<u8>>, CodecError> {
        let ticker = self.ticker(masks.len());
        let mut out = Vec::with_capacity(masks.len());
        for (i, mask) in masks.iter().enumerate() {
            out.push(decode_image(mask.view()).map_err(|e| e.in_item(i))?);
            ticker.tick();
        }
        ticker.finish();
        Ok(out)
    }

    /// Collapse each color image `(H, W, 3)` into an index mask `(H, W)`.
    pub fn encode_all(&self, colors: &[Array3<u8>]) -> Result<Vec<Array2<u8>>, CodecError> {
        let ticker = self.ticker(colors.len());
        let mut out = Vec::with_capacity(colors.len());
        for (i, color) in colors.iter().enumerate() {
            out.push(encode_image(color.view(), self.policy).map_err(|e| e.in_item(i))?);
            ticker.tick();
        }
        ticker.finish();
        Ok(out)
    }

    fn ticker(&self, total: usize) -> ProgressTicker<'_> {
        ProgressTicker::new(self.observer.as_ref(), self.progress_interval, total)
    }
}

impl Default for BatchDriver {
    fn default() -> Self {
        Self::new()
    }
}
