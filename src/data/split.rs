//! Seeded train/test splitting.

use crate::error::DataError;

/// Result of a train/test split.
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    /// Items kept for training
    pub train: Vec<T>,
    /// Items held out for testing
    pub test: Vec<T>,
}

/// Shuffle `items` with a seeded generator and hold out `test_fraction` of them.
///
/// The test set has `ceil(n * test_fraction)` items. The same seed and input
/// always produce the same split.
pub fn train_test_split<T>(
    items: Vec<T>,
    test_fraction: f64,
    seed: u64,
) -> Result<Split<T>, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidArgument(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut items = items;
    shuffle(&mut items, seed);

    let n_test = (items.len() as f64 * test_fraction).ceil() as usize;
    let n_train = items.len() - n_test.min(items.len());
    let test = items.split_off(n_train);

    log::debug!(
        "Split {} items into {} train / {} test (seed {})",
        n_train + test.len(),
        n_train,
        test.len(),
        seed
    );

    Ok(Split { train: items, test })
}

/// Fisher-Yates shuffle driven by a 64-bit LCG.
fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut state = seed;
    let mut next = |bound: usize| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % bound as u64) as usize
    };

    for i in (1..items.len()).rev() {
        let j = next(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        let split = train_test_split((0..10).collect(), 0.3, 69).unwrap();
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_deterministic() {
        let a = train_test_split((0..50).collect::<Vec<u32>>(), 0.3, 69).unwrap();
        let b = train_test_split((0..50).collect::<Vec<u32>>(), 0.3, 69).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_order() {
        let a = train_test_split((0..50).collect::<Vec<u32>>(), 0.3, 1).unwrap();
        let b = train_test_split((0..50).collect::<Vec<u32>>(), 0.3, 2).unwrap();
        assert_ne!(a.train, b.train);
    }

    #[test]
    fn test_disjoint_and_complete() {
        let split = train_test_split((0..37).collect::<Vec<u32>>(), 0.25, 69).unwrap();
        let mut all: Vec<u32> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<u32>>());
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(train_test_split(vec![1, 2, 3], 0.0, 69).is_err());
        assert!(train_test_split(vec![1, 2, 3], 1.0, 69).is_err());
        assert!(train_test_split(vec![1, 2, 3], f64::NAN, 69).is_err());
    }

    #[test]
    fn test_empty_input() {
        let split = train_test_split(Vec::<u8>::new(), 0.3, 69).unwrap();
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }
}
