//! Behavioral tests for the mask codec.
//!
//! These tests cover the decode/encode round trip, the concrete color
//! scenarios, error reporting, and determinism across worker pools.

mod parallel_tests;
mod roundtrip_tests;

use ndarray::Array3;

/// Build an index mask whose pixels cycle through every class.
fn cycling_mask(n: usize, h: usize, w: usize) -> Array3<u8> {
    Array3::from_shape_fn((n, h, w), |(i, y, x)| ((i * 7 + y * 5 + x * 3) % 24) as u8)
}
