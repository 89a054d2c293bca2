//! Pixel-level segmentation metrics.

use ndarray::ArrayView3;

use crate::error::CodecError;
use crate::labels::NUM_CLASSES;

/// Fraction of pixels where `pred` equals `truth`.
///
/// Returns 0.0 for empty batches.
pub fn pixel_accuracy(
    pred: ArrayView3<'_, u8>,
    truth: ArrayView3<'_, u8>,
) -> Result<f64, CodecError> {
    check_same_shape(&pred, &truth)?;
    let total = pred.len();
    if total == 0 {
        return Ok(0.0);
    }
    let correct = pred.iter().zip(truth.iter()).filter(|(p, t)| p == t).count();
    Ok(correct as f64 / total as f64)
}

/// Intersection over union per class; `None` for classes absent from both grids.
pub fn class_iou(
    pred: ArrayView3<'_, u8>,
    truth: ArrayView3<'_, u8>,
) -> Result<[Option<f64>; NUM_CLASSES], CodecError> {
    check_same_shape(&pred, &truth)?;

    let mut intersection = [0usize; NUM_CLASSES];
    let mut union = [0usize; NUM_CLASSES];

    for (&p, &t) in pred.iter().zip(truth.iter()) {
        let (p, t) = (usize::from(p), usize::from(t));
        if p >= NUM_CLASSES {
            return Err(CodecError::out_of_range(p as i64));
        }
        if t >= NUM_CLASSES {
            return Err(CodecError::out_of_range(t as i64));
        }
        if p == t {
            intersection[p] += 1;
            union[p] += 1;
        } else {
            union[p] += 1;
            union[t] += 1;
        }
    }

    let mut iou = [None; NUM_CLASSES];
    for class in 0..NUM_CLASSES {
        if union[class] > 0 {
            iou[class] = Some(intersection[class] as f64 / union[class] as f64);
        }
    }
    Ok(iou)
}

/// Mean IoU over classes present in either grid.
pub fn mean_iou(pred: ArrayView3<'_, u8>, truth: ArrayView3<'_, u8>) -> Result<f64, CodecError> {
    let present: Vec<f64> = class_iou(pred, truth)?.into_iter().flatten().collect();
    if present.is_empty() {
        return Ok(0.0);
    }
    Ok(present.iter().sum::<f64>() / present.len() as f64)
}

fn check_same_shape(a: &ArrayView3<'_, u8>, b: &ArrayView3<'_, u8>) -> Result<(), CodecError> {
    if a.shape() != b.shape() {
        return Err(CodecError::shape(
            format!("prediction shape {:?}", a.shape()),
            b.shape(),
        ));
    }
    Ok(())
}
