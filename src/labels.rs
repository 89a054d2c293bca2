//! Label registry for the aerial drone segmentation classes.
//!
//! The registry is a fixed bijection between 24 class indices, their names,
//! and the RGB colors used in ground-truth color masks.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::CodecError;

/// Number of semantic classes.
pub const NUM_CLASSES: usize = 24;

/// A semantic class with its index, name, and mask color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelClass {
    /// Class index stored in index masks
    pub index: u8,
    /// Dataset name of the class
    pub name: &'static str,
    /// RGB color stored in color masks
    pub color: [u8; 3],
}

impl LabelClass {
    const fn new(index: u8, name: &'static str, color: [u8; 3]) -> Self {
        Self { index, name, color }
    }
}

/// All classes in index order.
pub const CLASS_TABLE: [LabelClass; NUM_CLASSES] = [
    LabelClass::new(0, "unlabeled", [0, 0, 0]),
    LabelClass::new(1, "paved-area", [128, 64, 128]),
    LabelClass::new(2, "dirt", [0, 76, 130]),
    LabelClass::new(3, "grass", [0, 102, 0]),
    LabelClass::new(4, "gravel", [87, 103, 112]),
    LabelClass::new(5, "water", [168, 42, 28]),
    LabelClass::new(6, "rocks", [30, 41, 48]),
    LabelClass::new(7, "pool", [89, 50, 0]),
    LabelClass::new(8, "vegetation", [35, 142, 107]),
    LabelClass::new(9, "roof", [70, 70, 70]),
    LabelClass::new(10, "wall", [156, 102, 102]),
    LabelClass::new(11, "window", [12, 228, 254]),
    LabelClass::new(12, "door", [12, 148, 254]),
    LabelClass::new(13, "fence", [153, 153, 190]),
    LabelClass::new(14, "fence-pole", [153, 153, 153]),
    LabelClass::new(15, "person", [96, 22, 255]),
    LabelClass::new(16, "dog", [0, 51, 102]),
    LabelClass::new(17, "car", [150, 143, 9]),
    LabelClass::new(18, "bicycle", [32, 11, 119]),
    LabelClass::new(19, "tree", [0, 51, 51]),
    LabelClass::new(20, "bald-tree", [190, 250, 190]),
    LabelClass::new(21, "ar-marker", [146, 150, 112]),
    LabelClass::new(22, "obstacle", [115, 135, 2]),
    LabelClass::new(23, "conflicting", [0, 0, 255]),
];

/// Pack an RGB triplet into a 24-bit key.
#[inline]
pub fn pack_rgb(color: [u8; 3]) -> u32 {
    (u32::from(color[0]) << 16) | (u32::from(color[1]) << 8) | u32::from(color[2])
}

fn color_lookup() -> &'static HashMap<u32, u8> {
    static LOOKUP: OnceLock<HashMap<u32, u8>> = OnceLock::new();
    LOOKUP.get_or_init(|| {
        CLASS_TABLE
            .iter()
            .map(|class| (pack_rgb(class.color), class.index))
            .collect()
    })
}

/// Color of a class index.
pub fn color_of(index: usize) -> Result<[u8; 3], CodecError> {
    CLASS_TABLE
        .get(index)
        .map(|class| class.color)
        .ok_or_else(|| CodecError::out_of_range(index as i64))
}

/// Class index of a registered color.
#[inline]
pub fn index_of(color: [u8; 3]) -> Result<u8, CodecError> {
    lookup_color(color).ok_or_else(|| CodecError::unknown_color(color))
}

/// Class index of a color, `None` when the color is not registered.
#[inline]
pub fn lookup_color(color: [u8; 3]) -> Option<u8> {
    color_lookup().get(&pack_rgb(color)).copied()
}

/// Name of a class index.
pub fn name_of(index: usize) -> Option<&'static str> {
    CLASS_TABLE.get(index).map(|class| class.name)
}

/// Class index for a dataset name (case-insensitive).
pub fn index_of_name(name: &str) -> Option<u8> {
    CLASS_TABLE
        .iter()
        .find(|class| class.name.eq_ignore_ascii_case(name))
        .map(|class| class.index)
}
