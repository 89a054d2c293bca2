//! NumPy `.npy` storage for mask and image batches.
//!
//! Index masks are written as `u8` arrays of shape `(N, H, W)`. Reading
//! accepts any common integer dtype and either `(N, H, W)` or `(N, H, W, 1)`,
//! since training pipelines often save labels as `int16`/`int32` with a
//! trailing channel axis.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::Path;

use ndarray::{Array4, ArrayD};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};

use crate::error::DataError;
use crate::mask::{ColorMask, IndexMask, color_mask_from_dyn, index_mask_from_dyn};

/// NumPy magic bytes: \x93NUMPY
const MAGIC: &[u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

/// Check whether `data` starts with the NumPy magic bytes.
pub fn is_npy(data: &[u8]) -> bool {
    data.len() >= MAGIC.len() && data.starts_with(MAGIC)
}

/// Write index masks to `path`.
pub fn write_index_masks(path: &Path, masks: &IndexMask) -> Result<(), DataError> {
    let writer = BufWriter::new(File::create(path)?);
    masks.write_npy(writer)?;
    log::debug!("Wrote index masks {:?} to {:?}", masks.shape(), path);
    Ok(())
}

/// Write an RGB image or color mask batch to `path`.
pub fn write_images(path: &Path, images: &Array4<u8>) -> Result<(), DataError> {
    let writer = BufWriter::new(File::create(path)?);
    images.write_npy(writer)?;
    log::debug!("Wrote images {:?} to {:?}", images.shape(), path);
    Ok(())
}

/// Read index masks from `path`, validating shape and class range.
pub fn read_index_masks(path: &Path) -> Result<IndexMask, DataError> {
    let mut reader = BufReader::new(File::open(path)?);
    check_magic(&mut reader)?;

    // Try integer dtypes in order of likelihood
    if let Ok(array) = ArrayD::<u8>::read_npy(&mut reader) {
        return Ok(index_mask_from_dyn(array)?);
    }

    reader.seek(SeekFrom::Start(0))?;
    if let Ok(array) = ArrayD::<i16>::read_npy(&mut reader) {
        return Ok(index_mask_from_dyn(array)?);
    }

    reader.seek(SeekFrom::Start(0))?;
    if let Ok(array) = ArrayD::<i32>::read_npy(&mut reader) {
        return Ok(index_mask_from_dyn(array)?);
    }

    reader.seek(SeekFrom::Start(0))?;
    if let Ok(array) = ArrayD::<i64>::read_npy(&mut reader) {
        return Ok(index_mask_from_dyn(array)?);
    }

    // Last attempt surfaces the reader's own error message
    reader.seek(SeekFrom::Start(0))?;
    let array = ArrayD::<u16>::read_npy(&mut reader)?;
    Ok(index_mask_from_dyn(array.mapv(u32::from))?)
}

/// Read a `u8` color mask batch `(N, H, W, 3)` from `path`.
pub fn read_color_masks(path: &Path) -> Result<ColorMask, DataError> {
    let mut reader = BufReader::new(File::open(path)?);
    check_magic(&mut reader)?;
    let array = ArrayD::<u8>::read_npy(&mut reader)?;
    Ok(color_mask_from_dyn(array)?)
}

fn check_magic<R: Read + Seek>(reader: &mut R) -> Result<(), DataError> {
    let mut head = [0u8; 6];
    let read = reader.read(&mut head)?;
    reader.seek(SeekFrom::Start(0))?;
    if !is_npy(&head[..read]) {
        return Err(DataError::InvalidArgument("not a NumPy .npy file".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use ndarray::{Array3, Array4};
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aeroseg_npy_{}_{}.npy", name, std::process::id()))
    }

    #[test]
    fn test_magic_detection() {
        assert!(is_npy(&[0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00]));
        assert!(!is_npy(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_index_masks_file_roundtrip() {
        let path = temp_file("index");
        let masks = Array3::from_shape_fn((2, 3, 4), |(n, y, x)| ((n + y + x) % 24) as u8);
        write_index_masks(&path, &masks).unwrap();
        assert_eq!(read_index_masks(&path).unwrap(), masks);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_reads_int32_with_channel_axis() {
        let path = temp_file("i32");
        let labels = Array4::<i32>::from_elem((1, 2, 2, 1), 22);
        labels.write_npy(BufWriter::new(File::create(&path).unwrap())).unwrap();

        let masks = read_index_masks(&path).unwrap();
        assert_eq!(masks.shape(), &[1, 2, 2]);
        assert!(masks.iter().all(|&v| v == 22));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let path = temp_file("range");
        let labels = Array3::<i16>::from_elem((1, 1, 1), -1);
        labels.write_npy(BufWriter::new(File::create(&path).unwrap())).unwrap();

        assert!(matches!(
            read_index_masks(&path),
            Err(DataError::Codec(CodecError::OutOfRange { value: -1, .. }))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rejects_non_npy() {
        let path = temp_file("text");
        std::fs::write(&path, b"hello world").unwrap();
        assert!(matches!(
            read_index_masks(&path),
            Err(DataError::InvalidArgument(_))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_color_masks_roundtrip() {
        let path = temp_file("color");
        let colors = Array4::<u8>::from_elem((1, 2, 2, 3), 70);
        write_images(&path, &colors).unwrap();
        assert_eq!(read_color_masks(&path).unwrap(), colors);
        std::fs::remove_file(&path).ok();
    }
}
