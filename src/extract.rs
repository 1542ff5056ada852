//! Threshold extraction from a completed annotation
//!
//! Every placed symbol is reduced to its bounding-box center, pushed through
//! the calibration maps, snapped to the clinical grids and decomposed into a
//! flat [`Threshold`] record. The records can be serialized to the portal's
//! comma-separated tabular format on demand.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationError, CalibrationMap, round_frequency, round_threshold};
use crate::domain::{Annotation, Conduction, Ear, Symbol};

/// Header row of the tabular export.
pub const CSV_HEADER: &str = "ear,conduction,masking,frequency,threshold,response";

/// A calibrated threshold reading derived from one symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub ear: Ear,
    pub conduction: Conduction,
    pub masking: bool,
    /// Snapped test frequency in Hz
    pub frequency: u32,
    /// Snapped hearing level in dB
    pub threshold: i32,
    /// Whether the subject responded at this level
    pub response_recorded: bool,
}

/// Which audiogram's corners calibrate symbol extraction.
///
/// The portal always calibrated from the first audiogram, even for symbols
/// on a second panel. That behavior is kept as the default; `PerAudiogram`
/// calibrates each panel from its own corners.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalibrationSource {
    #[default]
    FirstAudiogram,
    PerAudiogram,
}

/// Extract one calibrated threshold record per symbol in the annotation.
///
/// An annotation without audiograms yields an empty list. Otherwise the
/// required calibration corners must be present on the source audiogram(s)
/// or a [`CalibrationError`] is returned and nothing is extracted.
pub fn extract_thresholds(
    annotation: &Annotation,
    source: CalibrationSource,
) -> Result<Vec<Threshold>, CalibrationError> {
    let Some(first) = annotation.audiograms.first() else {
        return Ok(Vec::new());
    };

    let mut thresholds = Vec::new();
    match source {
        CalibrationSource::FirstAudiogram => {
            let map = CalibrationMap::from_corners(&first.corners)?;
            for audiogram in &annotation.audiograms {
                for symbol in &audiogram.symbols {
                    thresholds.push(extract_symbol(&map, symbol));
                }
            }
        }
        CalibrationSource::PerAudiogram => {
            for audiogram in &annotation.audiograms {
                if audiogram.symbols.is_empty() {
                    continue;
                }
                let map = CalibrationMap::from_corners(&audiogram.corners)?;
                for symbol in &audiogram.symbols {
                    thresholds.push(extract_symbol(&map, symbol));
                }
            }
        }
    }
    Ok(thresholds)
}

fn extract_symbol(map: &CalibrationMap, symbol: &Symbol) -> Threshold {
    let center = symbol.bounding_box.center();
    Threshold {
        ear: symbol.measurement_type.ear(),
        conduction: symbol.measurement_type.conduction(),
        masking: symbol.measurement_type.masking(),
        frequency: round_frequency(map.frequency_at(center.x)),
        threshold: round_threshold(map.threshold_at(center.y)),
        response_recorded: symbol.response,
    }
}

/// Render the threshold records as the portal's tabular text: a header row,
/// then one comma-joined row per record. Values are constrained enums and
/// numbers, so no quoting is needed.
pub fn thresholds_to_csv(thresholds: &[Threshold]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for t in thresholds {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            t.ear, t.conduction, t.masking, t.frequency, t.threshold, t.response_recorded
        ));
    }
    out
}
