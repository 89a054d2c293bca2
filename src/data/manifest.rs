//! Dataset manifest parsing.
//!
//! A manifest is a `;`-delimited text file whose first row is a header and
//! whose remaining rows each pair an input image with its label image:
//!
//! ```text
//! data;label
//! images/000.jpg;labels/000.png
//! images/001.jpg;labels/001.png
//! ```
//!
//! Columns named `data` and `label` are located by header name. When the
//! header does not name them, the first two columns are used.

use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_DELIMITER;
use crate::error::DataError;

/// One image/label pair from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path of the input image
    pub data: PathBuf,
    /// Path of the label image
    pub label: PathBuf,
}

impl ManifestEntry {
    /// Create an entry from two paths.
    pub fn new(data: impl Into<PathBuf>, label: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            label: label.into(),
        }
    }
}

/// Parsed dataset manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Entries in file order
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read and parse a manifest file. Relative paths are resolved against
    /// the directory that contains the manifest.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let manifest = Self::parse(&text, base)?;
        log::info!(
            "Loaded manifest {:?} with {} entries",
            path,
            manifest.entries.len()
        );
        Ok(manifest)
    }

    /// Parse manifest text, resolving relative paths against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, DataError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (header_line, header) = lines
            .next()
            .ok_or_else(|| DataError::manifest(1, "manifest is empty"))?;
        let columns = Columns::from_header(header, header_line)?;

        let mut entries = Vec::new();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(MANIFEST_DELIMITER).map(str::trim).collect();
            let data = field(&fields, columns.data, line_no, "data")?;
            let label = field(&fields, columns.label, line_no, "label")?;
            entries.push(ManifestEntry::new(
                resolve(base_dir, data),
                resolve(base_dir, label),
            ));
        }

        if entries.is_empty() {
            return Err(DataError::manifest(header_line, "manifest has no entries"));
        }

        Ok(Self { entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to manifest text with a `data;label` header.
    pub fn to_text(&self) -> String {
        let mut out = format!("data{0}label\n", MANIFEST_DELIMITER);
        for entry in &self.entries {
            out.push_str(&format!(
                "{}{}{}\n",
                entry.data.display(),
                MANIFEST_DELIMITER,
                entry.label.display()
            ));
        }
        out
    }
}

/// Column positions of the data and label paths.
struct Columns {
    data: usize,
    label: usize,
}

impl Columns {
    fn from_header(header: &str, line: usize) -> Result<Self, DataError> {
        let names: Vec<String> = header
            .split(MANIFEST_DELIMITER)
            .map(|n| n.trim().to_lowercase())
            .collect();

        let data = names.iter().position(|n| n == "data");
        let label = names.iter().position(|n| n == "label");

        match (data, label) {
            (Some(data), Some(label)) => Ok(Self { data, label }),
            _ if names.len() >= 2 => {
                log::debug!(
                    "Manifest header {:?} lacks data/label names, using first two columns",
                    header
                );
                Ok(Self { data: 0, label: 1 })
            }
            _ => Err(DataError::manifest(
                line,
                format!("header needs at least two columns, got {:?}", header),
            )),
        }
    }
}

fn field<'a>(
    fields: &[&'a str],
    index: usize,
    line: usize,
    name: &str,
) -> Result<&'a str, DataError> {
    match fields.get(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DataError::manifest(line, format!("missing '{}' column", name))),
    }
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
