//! Annotation document types for audiogram reports
//!
//! All coordinates are stored in image-space pixels at 1x zoom. The JSON
//! shape of these types is the persisted annotation document and uses the
//! portal's camelCase field names and SCREAMING_SNAKE measurement tokens.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{BoundingBox, Point};

/// A report may contain at most this many audiogram panels.
pub const MAX_AUDIOGRAMS: usize = 2;

/// An audiogram is calibrated by exactly this many corners.
pub const CORNERS_PER_AUDIOGRAM: usize = 4;

/// The ear a measurement was taken on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ear {
    Left,
    Right,
}

impl std::fmt::Display for Ear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ear::Left => write!(f, "left"),
            Ear::Right => write!(f, "right"),
        }
    }
}

/// The physical pathway of the test tone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conduction {
    Air,
    Bone,
}

impl std::fmt::Display for Conduction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conduction::Air => write!(f, "air"),
            Conduction::Bone => write!(f, "bone"),
        }
    }
}

/// The measurement type of a placed symbol: ear, conduction pathway and
/// masking condition, encoded as one of the eight portal wire tokens
/// (e.g. `AIR_MASKED_LEFT`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementType {
    AirUnmaskedLeft,
    AirUnmaskedRight,
    AirMaskedLeft,
    AirMaskedRight,
    BoneUnmaskedLeft,
    BoneUnmaskedRight,
    BoneMaskedLeft,
    BoneMaskedRight,
}

impl MeasurementType {
    /// All measurement types, in symbol-bar order
    pub const ALL: [MeasurementType; 8] = [
        MeasurementType::AirUnmaskedLeft,
        MeasurementType::AirUnmaskedRight,
        MeasurementType::AirMaskedLeft,
        MeasurementType::AirMaskedRight,
        MeasurementType::BoneUnmaskedLeft,
        MeasurementType::BoneUnmaskedRight,
        MeasurementType::BoneMaskedLeft,
        MeasurementType::BoneMaskedRight,
    ];

    /// The ear component of the token
    pub fn ear(self) -> Ear {
        match self {
            MeasurementType::AirUnmaskedLeft
            | MeasurementType::AirMaskedLeft
            | MeasurementType::BoneUnmaskedLeft
            | MeasurementType::BoneMaskedLeft => Ear::Left,
            _ => Ear::Right,
        }
    }

    /// The conduction component of the token
    pub fn conduction(self) -> Conduction {
        match self {
            MeasurementType::AirUnmaskedLeft
            | MeasurementType::AirUnmaskedRight
            | MeasurementType::AirMaskedLeft
            | MeasurementType::AirMaskedRight => Conduction::Air,
            _ => Conduction::Bone,
        }
    }

    /// Whether masking noise was applied during the measurement
    pub fn masking(self) -> bool {
        matches!(
            self,
            MeasurementType::AirMaskedLeft
                | MeasurementType::AirMaskedRight
                | MeasurementType::BoneMaskedLeft
                | MeasurementType::BoneMaskedRight
        )
    }

    /// The portal wire token, `CONDUCTION_MASKING_EAR`
    pub fn token(self) -> &'static str {
        match self {
            MeasurementType::AirUnmaskedLeft => "AIR_UNMASKED_LEFT",
            MeasurementType::AirUnmaskedRight => "AIR_UNMASKED_RIGHT",
            MeasurementType::AirMaskedLeft => "AIR_MASKED_LEFT",
            MeasurementType::AirMaskedRight => "AIR_MASKED_RIGHT",
            MeasurementType::BoneUnmaskedLeft => "BONE_UNMASKED_LEFT",
            MeasurementType::BoneUnmaskedRight => "BONE_UNMASKED_RIGHT",
            MeasurementType::BoneMaskedLeft => "BONE_MASKED_LEFT",
            MeasurementType::BoneMaskedRight => "BONE_MASKED_RIGHT",
        }
    }
}

impl std::fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl std::str::FromStr for MeasurementType {
    type Err = UnknownMeasurementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasurementType::ALL
            .into_iter()
            .find(|m| m.token() == s)
            .ok_or_else(|| UnknownMeasurementType(s.to_owned()))
    }
}

/// Error returned when parsing a measurement token that is not one of the
/// eight portal values.
#[derive(Debug, Error)]
#[error("unknown measurement type token: {0}")]
pub struct UnknownMeasurementType(pub String);

/// Horizontal half of a corner position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    Left,
    Right,
}

/// Vertical half of a corner position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Top,
    Bottom,
}

/// Which of the four calibration anchors a corner is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerPosition {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl CornerPosition {
    pub const TOP_LEFT: CornerPosition = CornerPosition {
        horizontal: Horizontal::Left,
        vertical: Vertical::Top,
    };
    pub const TOP_RIGHT: CornerPosition = CornerPosition {
        horizontal: Horizontal::Right,
        vertical: Vertical::Top,
    };
    pub const BOTTOM_LEFT: CornerPosition = CornerPosition {
        horizontal: Horizontal::Left,
        vertical: Vertical::Bottom,
    };
    pub const BOTTOM_RIGHT: CornerPosition = CornerPosition {
        horizontal: Horizontal::Right,
        vertical: Vertical::Bottom,
    };
}

impl std::fmt::Display for CornerPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = match self.vertical {
            Vertical::Top => "top",
            Vertical::Bottom => "bottom",
        };
        let h = match self.horizontal {
            Horizontal::Left => "left",
            Horizontal::Right => "right",
        };
        write!(f, "{v}-{h}")
    }
}

/// A calibration anchor tying a pixel location to a known frequency and
/// threshold pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    /// Which anchor this is (top-left, top-right, ...)
    pub position: CornerPosition,
    /// The frequency in Hz assigned to the corner
    pub frequency: u32,
    /// The hearing level in dB assigned to the corner
    pub threshold: i32,
    /// Pixel x-coordinate
    pub x: f64,
    /// Pixel y-coordinate
    pub y: f64,
}

impl Corner {
    /// Build a corner for a click at `coords` inside `audiogram_box`.
    ///
    /// The position is taken from the nearest box edges, and the initial
    /// calibration values follow: nearer the left edge means 125 Hz (else
    /// 8000 Hz), nearer the top edge means -10 dB (else 120 dB).
    pub fn at_click(coords: Point, audiogram_box: &BoundingBox) -> Self {
        let to_left = (coords.x - audiogram_box.x).abs();
        let to_right = (coords.x - (audiogram_box.x + audiogram_box.width)).abs();
        let to_top = (coords.y - audiogram_box.y).abs();
        let to_bottom = (coords.y - (audiogram_box.y + audiogram_box.height)).abs();

        let horizontal = if to_left < to_right {
            Horizontal::Left
        } else {
            Horizontal::Right
        };
        let vertical = if to_top < to_bottom {
            Vertical::Top
        } else {
            Vertical::Bottom
        };

        Corner {
            position: CornerPosition {
                horizontal,
                vertical,
            },
            frequency: if horizontal == Horizontal::Left {
                125
            } else {
                8000
            },
            threshold: if vertical == Vertical::Top { -10 } else { 120 },
            x: coords.x,
            y: coords.y,
        }
    }
}

/// A placed measurement mark.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// The box drawn around the symbol on the chart
    pub bounding_box: BoundingBox,
    /// Whether the subject responded; false is rendered hollow ("no response")
    pub response: bool,
    /// The measurement type, fixed at creation
    pub measurement_type: MeasurementType,
}

/// An axis-tick annotation: a box around a printed label plus its transcribed
/// text value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub bounding_box: BoundingBox,
    pub value: String,
}

/// One physical audiogram panel inside the report image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audiogram {
    pub bounding_box: BoundingBox,
    pub corners: Vec<Corner>,
    pub symbols: Vec<Symbol>,
    pub labels: Vec<Label>,
}

impl Audiogram {
    /// A fresh audiogram whose box drag just started at `origin`
    pub fn anchored_at(origin: Point) -> Self {
        Audiogram {
            bounding_box: BoundingBox::anchored_at(origin),
            ..Audiogram::default()
        }
    }

    /// Look up the corner tagged with `position`, if present
    pub fn corner_at(&self, position: CornerPosition) -> Option<&Corner> {
        self.corners.iter().find(|c| c.position == position)
    }

    /// Whether all four calibration corners have been placed
    pub fn is_fully_cornered(&self) -> bool {
        self.corners.len() == CORNERS_PER_AUDIOGRAM
    }
}

/// The annotation document for one report.
///
/// Created empty when a report is loaded (or hydrated from a saved JSON
/// file), mutated only through session messages, and handed off read-only to
/// the threshold extractor on submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Whether the report contains a usable audiogram
    pub valid: bool,
    /// Why the report is unusable; required when `valid` is false
    pub reason: Option<String>,
    /// Free-text annotator comment
    pub comment: String,
    /// The annotated audiogram panels, at most [`MAX_AUDIOGRAMS`]
    pub audiograms: Vec<Audiogram>,
}

impl Default for Annotation {
    fn default() -> Self {
        Annotation {
            valid: true,
            reason: None,
            comment: String::new(),
            audiograms: Vec::new(),
        }
    }
}

impl Annotation {
    /// Check the submission precondition: an invalid report needs a reason.
    pub fn ensure_submittable(&self) -> Result<(), SubmitError> {
        if !self.valid && self.reason.as_deref().is_none_or(str::is_empty) {
            return Err(SubmitError::MissingReason);
        }
        Ok(())
    }
}

/// Error rejecting an annotation handed off for submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a report marked invalid requires a non-empty reason")]
    MissingReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_tokens_round_trip() {
        for m in MeasurementType::ALL {
            assert_eq!(m.token().parse::<MeasurementType>().unwrap(), m);
        }
        assert!("AIR_LEFT".parse::<MeasurementType>().is_err());
    }

    #[test]
    fn measurement_decomposition() {
        let m = MeasurementType::AirMaskedLeft;
        assert_eq!(m.ear(), Ear::Left);
        assert_eq!(m.conduction(), Conduction::Air);
        assert!(m.masking());

        let m = MeasurementType::BoneUnmaskedRight;
        assert_eq!(m.ear(), Ear::Right);
        assert_eq!(m.conduction(), Conduction::Bone);
        assert!(!m.masking());
    }

    #[test]
    fn corner_defaults_follow_click_proximity() {
        let bbox = BoundingBox::new(100.0, 100.0, 400.0, 300.0);

        let c = Corner::at_click(Point::new(110.0, 110.0), &bbox);
        assert_eq!(c.position, CornerPosition::TOP_LEFT);
        assert_eq!(c.frequency, 125);
        assert_eq!(c.threshold, -10);

        let c = Corner::at_click(Point::new(490.0, 390.0), &bbox);
        assert_eq!(c.position, CornerPosition::BOTTOM_RIGHT);
        assert_eq!(c.frequency, 8000);
        assert_eq!(c.threshold, 120);
    }

    #[test]
    fn invalid_annotation_needs_reason() {
        let mut annotation = Annotation::default();
        assert_eq!(annotation.ensure_submittable(), Ok(()));

        annotation.valid = false;
        assert_eq!(
            annotation.ensure_submittable(),
            Err(SubmitError::MissingReason)
        );

        annotation.reason = Some(String::new());
        assert_eq!(
            annotation.ensure_submittable(),
            Err(SubmitError::MissingReason)
        );

        annotation.reason = Some("no audiogram on page".into());
        assert_eq!(annotation.ensure_submittable(), Ok(()));
    }

    #[test]
    fn document_serializes_with_portal_field_names() {
        let annotation = Annotation {
            audiograms: vec![Audiogram {
                bounding_box: BoundingBox::new(10.0, 20.0, 400.0, 300.0),
                corners: vec![Corner {
                    position: CornerPosition::TOP_LEFT,
                    frequency: 125,
                    threshold: -10,
                    x: 10.0,
                    y: 20.0,
                }],
                symbols: vec![Symbol {
                    bounding_box: BoundingBox::new(30.0, 40.0, 30.0, 30.0),
                    response: true,
                    measurement_type: MeasurementType::AirUnmaskedLeft,
                }],
                labels: vec![],
            }],
            ..Annotation::default()
        };

        let json = serde_json::to_value(&annotation).unwrap();
        let audiogram = &json["audiograms"][0];
        assert!(audiogram.get("boundingBox").is_some());
        assert_eq!(
            audiogram["symbols"][0]["measurementType"],
            "AIR_UNMASKED_LEFT"
        );
        assert_eq!(
            audiogram["corners"][0]["position"]["horizontal"],
            "left"
        );
        assert_eq!(json["reason"], serde_json::Value::Null);
    }
}
