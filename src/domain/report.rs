//! Report metadata supplied by the loading collaborator

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An audiogram report to annotate.
///
/// The image bytes themselves are decoded and rendered by the host; the core
/// only reads the dimensions for layout and the filepath for naming the
/// annotation sidecar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Path of the report image file
    pub filepath: PathBuf,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Report {
    pub fn new(filepath: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Report {
            filepath: filepath.into(),
            width,
            height,
        }
    }

    /// Where the annotation document for this report is persisted: the
    /// report path with its extension replaced by `.json`.
    pub fn annotation_path(&self) -> PathBuf {
        self.filepath.with_extension("json")
    }

    /// The report file name, if the path has one
    pub fn filename(&self) -> Option<&Path> {
        self.filepath.file_name().map(Path::new)
    }
}
