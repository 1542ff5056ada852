//! Saving and loading annotation documents
//!
//! The annotation for a report is persisted as a JSON sidecar next to the
//! report image, with the image extension replaced by `.json`. I/O failure
//! handling and retry UX belong to the caller; these functions never leave a
//! partially applied document behind — a load parses completely before
//! returning, and a save reads the document without mutating it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::domain::{Annotation, Report};

/// Persist a submitted annotation next to its report.
///
/// Checks the submission precondition (an invalid report needs a reason)
/// before anything is written. Returns the path written to.
pub fn save_annotation(report: &Report, annotation: &Annotation) -> anyhow::Result<PathBuf> {
    annotation.ensure_submittable()?;
    let path = report.annotation_path();
    let json = serde_json::to_string_pretty(annotation)?;
    fs::write(&path, json).with_context(|| format!("writing annotation to {}", path.display()))?;
    info!("saved annotation for {}", report.filepath.display());
    Ok(path)
}

/// Load a previously saved annotation document.
///
/// All-or-nothing: a file that does not parse as a complete annotation
/// document yields an error and no partial data.
pub fn load_annotation(path: &Path) -> anyhow::Result<Annotation> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading annotation from {}", path.display()))?;
    let annotation = serde_json::from_str(&json)
        .with_context(|| format!("parsing annotation {}", path.display()))?;
    Ok(annotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Audiogram, BoundingBox, MeasurementType, Symbol};

    fn sample_annotation() -> Annotation {
        Annotation {
            comment: "second panel unreadable".to_owned(),
            audiograms: vec![Audiogram {
                bounding_box: BoundingBox::new(100.0, 100.0, 400.0, 300.0),
                corners: vec![],
                symbols: vec![Symbol {
                    bounding_box: BoundingBox::new(180.0, 140.0, 30.0, 30.0),
                    response: false,
                    measurement_type: MeasurementType::BoneMaskedRight,
                }],
                labels: vec![],
            }],
            ..Annotation::default()
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report::new(dir.path().join("report-7.png"), 1700, 2200);
        let annotation = sample_annotation();

        let path = save_annotation(&report, &annotation).unwrap();
        assert_eq!(path, dir.path().join("report-7.json"));
        assert_eq!(load_annotation(&path).unwrap(), annotation);
    }

    #[test]
    fn unsubmittable_annotation_is_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report::new(dir.path().join("report-7.png"), 1700, 2200);
        let annotation = Annotation {
            valid: false,
            ..Annotation::default()
        };

        assert!(save_annotation(&report, &annotation).is_err());
        assert!(!report.annotation_path().exists());
    }

    #[test]
    fn malformed_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"valid\": true, \"audiograms\": [{\"bound").unwrap();
        assert!(load_annotation(&path).is_err());
    }
}
