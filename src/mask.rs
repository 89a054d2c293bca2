//! Mask grid types and shape validation.
//!
//! - `IndexMask`: `(N, H, W)` class indices in `[0, 23]`
//! - `ColorMask`: `(N, H, W, 3)` RGB triplets from the label registry
//!
//! Arrays loaded from disk arrive with a dynamic rank; the `*_from_dyn`
//! helpers check rank, trailing axis, and value range once per call.

use ndarray::{Array3, Array4, ArrayD, Axis, Ix3, Ix4};

use crate::error::CodecError;
use crate::labels::NUM_CLASSES;

/// Dense class-index masks, shape `(N, H, W)`.
pub type IndexMask = Array3<u8>;

/// RGB color masks, shape `(N, H, W, 3)`.
pub type ColorMask = Array4<u8>;

/// Number of channels in a color mask.
pub const COLOR_CHANNELS: usize = 3;

/// Convert a dynamic-rank integer array into an `IndexMask`.
///
/// Accepts `(N, H, W)` or `(N, H, W, 1)`. Every value must be a valid class
/// index; the first offending value is reported with its position.
pub fn index_mask_from_dyn<T>(array: ArrayD<T>) -> Result<IndexMask, CodecError>
where
    T: Copy + Into<i64>,
{
    let shape = array.shape().to_vec();
    let array = match shape.len() {
        3 => array,
        4 if shape[3] == 1 => array.index_axis_move(Axis(3), 0),
        _ => return Err(CodecError::shape("(N, H, W) or (N, H, W, 1)", &shape)),
    };

    let array = array
        .into_dimensionality::<Ix3>()
        .map_err(|_| CodecError::shape("(N, H, W)", &shape))?;

    if let Some(((n, y, x), &value)) = array
        .indexed_iter()
        .find(|(_, v)| !class_in_range((**v).into()))
    {
        return Err(CodecError::out_of_range(value.into()).at((n, y, x)));
    }

    // Range checked above, so the narrowing is lossless.
    Ok(array.mapv(|v| {
        let v: i64 = v.into();
        v as u8
    }))
}

/// Convert a dynamic-rank byte array into a `ColorMask`.
pub fn color_mask_from_dyn(array: ArrayD<u8>) -> Result<ColorMask, CodecError> {
    let shape = array.shape().to_vec();
    if shape.len() != 4 || shape[3] != COLOR_CHANNELS {
        return Err(CodecError::shape("(N, H, W, 3)", &shape));
    }
    array
        .into_dimensionality::<Ix4>()
        .map_err(|_| CodecError::shape("(N, H, W, 3)", &shape))
}

/// Check that a color batch has a trailing axis of 3.
pub fn check_color_shape(shape: &[usize]) -> Result<(), CodecError> {
    if shape.len() != 4 || shape[3] != COLOR_CHANNELS {
        return Err(CodecError::shape("(N, H, W, 3)", shape));
    }
    Ok(())
}

#[inline]
pub(crate) fn class_in_range(value: i64) -> bool {
    (0..NUM_CLASSES as i64).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_index_mask_rank3() {
        let array = ArrayD::from_shape_vec(IxDyn(&[1, 2, 2]), vec![0i32, 1, 2, 23]).unwrap();
        let mask = index_mask_from_dyn(array).unwrap();
        assert_eq!(mask.shape(), &[1, 2, 2]);
        assert_eq!(mask[[0, 1, 1]], 23);
    }

    #[test]
    fn test_index_mask_trailing_singleton() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 1, 2, 1]), vec![3i16, 4, 5, 6]).unwrap();
        let mask = index_mask_from_dyn(array).unwrap();
        assert_eq!(mask.shape(), &[2, 1, 2]);
        assert_eq!(mask[[1, 0, 1]], 6);
    }

    #[test]
    fn test_index_mask_bad_rank() {
        let array = ArrayD::from_shape_vec(IxDyn(&[4]), vec![0u8; 4]).unwrap();
        assert!(matches!(
            index_mask_from_dyn(array),
            Err(CodecError::Shape { .. })
        ));

        let array = ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, 3]), vec![0u8; 3]).unwrap();
        assert!(matches!(
            index_mask_from_dyn(array),
            Err(CodecError::Shape { .. })
        ));
    }

    #[test]
    fn test_index_mask_negative_value() {
        let array = ArrayD::from_shape_vec(IxDyn(&[1, 1, 2]), vec![0i32, -1]).unwrap();
        assert_eq!(
            index_mask_from_dyn(array),
            Err(CodecError::out_of_range(-1).at((0, 0, 1)))
        );
    }

    #[test]
    fn test_color_mask_shape() {
        let ok = ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, 3]), vec![0u8; 3]).unwrap();
        assert_eq!(color_mask_from_dyn(ok).unwrap().shape(), &[1, 1, 1, 3]);

        let bad = ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, 4]), vec![0u8; 4]).unwrap();
        assert_eq!(
            color_mask_from_dyn(bad),
            Err(CodecError::shape("(N, H, W, 3)", &[1, 1, 1, 4]))
        );
    }
}
