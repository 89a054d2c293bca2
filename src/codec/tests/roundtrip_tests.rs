//! Round-trip and concrete-scenario tests.

use ndarray::{Array2, Array3, array};

use super::cycling_mask;
use crate::codec::{
    NoProgress, UnknownColorPolicy, decode_batch, decode_image, encode_batch, encode_image,
};

#[test]
fn test_decode_concrete_scenario() {
    let masks = array![[[0u8, 1], [2, 3]]];
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();

    let expected = array![[
        [[0u8, 0, 0], [128, 64, 128]],
        [[0, 76, 130], [0, 102, 0]]
    ]];
    assert_eq!(colors, expected);
}

#[test]
fn test_decode_unlabeled_is_black() {
    let masks = Array3::<u8>::zeros((1, 2, 2));
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();
    assert!(colors.iter().all(|&c| c == 0));
}

#[test]
fn test_decode_conflicting_is_blue() {
    let masks = Array3::<u8>::from_elem((1, 2, 2), 23);
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();
    for px in colors.rows() {
        assert_eq!(px.to_vec(), vec![0, 0, 255]);
    }
}

#[test]
fn test_roundtrip_all_classes() {
    let masks = cycling_mask(3, 17, 11);
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();
    let back = encode_batch(colors.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    assert_eq!(back, masks);
}

#[test]
fn test_shape_preservation() {
    let masks = cycling_mask(2, 5, 9);
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();
    assert_eq!(colors.shape(), &[2, 5, 9, 3]);

    let back = encode_batch(colors.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    assert_eq!(back.shape(), &[2, 5, 9]);
}

#[test]
fn test_roundtrip_non_standard_layout() {
    // Transposed view exercises the copy path for non-contiguous input.
    let masks = cycling_mask(2, 4, 6);
    let transposed = masks.view().permuted_axes([0, 2, 1]);
    let colors = decode_batch(transposed, &NoProgress).unwrap();
    assert_eq!(colors.shape(), &[2, 6, 4, 3]);

    let back = encode_batch(colors.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    assert_eq!(back, transposed.to_owned());
}

#[test]
fn test_single_image_helpers() {
    let mask = Array2::from_shape_fn((3, 4), |(y, x)| (y * 4 + x) as u8);
    let color = decode_image(mask.view()).unwrap();
    assert_eq!(color.shape(), &[3, 4, 3]);
    assert_eq!(color[[0, 1, 0]], 128);

    let back = encode_image(color.view(), UnknownColorPolicy::Strict).unwrap();
    assert_eq!(back, mask);
}

#[test]
fn test_empty_batch() {
    let masks = Array3::<u8>::zeros((0, 4, 4));
    let colors = decode_batch(masks.view(), &NoProgress).unwrap();
    assert_eq!(colors.shape(), &[0, 4, 4, 3]);

    let back = encode_batch(colors.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    assert_eq!(back.shape(), &[0, 4, 4]);
}

#[test]
fn test_determinism() {
    let masks = cycling_mask(4, 8, 8);
    let first = decode_batch(masks.view(), &NoProgress).unwrap();
    let second = decode_batch(masks.view(), &NoProgress).unwrap();
    assert_eq!(first, second);

    let a = encode_batch(first.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    let b = encode_batch(second.view(), UnknownColorPolicy::Strict, &NoProgress).unwrap();
    assert_eq!(a, b);
}
