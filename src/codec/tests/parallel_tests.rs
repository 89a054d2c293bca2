//! Results must not depend on the number of workers.

use super::cycling_mask;
use crate::codec::{NoProgress, UnknownColorPolicy, WorkerPool, decode_batch, encode_batch};

#[test]
fn test_same_output_across_pool_sizes() {
    let masks = cycling_mask(6, 32, 24);

    let single = WorkerPool::new(Some(1)).unwrap();
    let many = WorkerPool::new(Some(4)).unwrap();

    let colors_1 = single.install(|| decode_batch(masks.view(), &NoProgress)).unwrap();
    let colors_4 = many.install(|| decode_batch(masks.view(), &NoProgress)).unwrap();
    assert_eq!(colors_1, colors_4);

    let back_1 = single
        .install(|| encode_batch(colors_1.view(), UnknownColorPolicy::Strict, &NoProgress))
        .unwrap();
    let back_4 = many
        .install(|| encode_batch(colors_4.view(), UnknownColorPolicy::Strict, &NoProgress))
        .unwrap();
    assert_eq!(back_1, back_4);
    assert_eq!(back_4, masks);
}
