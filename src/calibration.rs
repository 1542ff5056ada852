//! Pixel-to-clinical-value calibration for an annotated audiogram
//!
//! Four user-placed corners tie pixel locations to known frequency/threshold
//! pairs. The x-axis of an audiogram is logarithmic in frequency, so the
//! frequency map interpolates linearly in the octave domain (125 Hz = octave
//! 0) between the top-left and top-right corners; the threshold map
//! interpolates linearly between the top-left and bottom-left corners. Both
//! maps extrapolate outside the corner span; callers snap the result to the
//! clinical grids afterwards.

use thiserror::Error;

use crate::domain::{Corner, CornerPosition};

/// The standard pure-tone audiometry test frequencies, in Hz, ascending.
pub const STANDARD_FREQUENCIES: [u32; 11] = [
    125, 250, 500, 750, 1000, 1500, 2000, 3000, 4000, 6000, 8000,
];

/// Lowest snapped threshold value, in dB.
pub const MIN_STANDARD_THRESHOLD: i32 = -20;
/// Highest snapped threshold value, in dB.
pub const MAX_STANDARD_THRESHOLD: i32 = 130;

/// Convert a frequency in Hz to its octave number (125 Hz = octave 0).
pub fn frequency_to_octave(frequency: f64) -> f64 {
    (frequency / 125.0).log2()
}

/// Convert an octave number back to a frequency in Hz.
pub fn octave_to_frequency(octave: f64) -> f64 {
    125.0 * octave.exp2()
}

/// Snap a raw frequency to the nearest standard test frequency.
///
/// Nearest by absolute distance; a tie goes to the earlier candidate in the
/// ascending scan.
pub fn round_frequency(frequency: f64) -> u32 {
    let mut best = STANDARD_FREQUENCIES[0];
    let mut best_dist = f64::INFINITY;
    for candidate in STANDARD_FREQUENCIES {
        let dist = (frequency - f64::from(candidate)).abs();
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
    }
    best
}

/// Snap a raw threshold to the nearest multiple of 5 dB within
/// `[MIN_STANDARD_THRESHOLD, MAX_STANDARD_THRESHOLD]`, same tie rule as
/// [`round_frequency`].
pub fn round_threshold(threshold: f64) -> i32 {
    let mut best = MIN_STANDARD_THRESHOLD;
    let mut best_dist = f64::INFINITY;
    let mut candidate = MIN_STANDARD_THRESHOLD;
    while candidate <= MAX_STANDARD_THRESHOLD {
        let dist = (threshold - f64::from(candidate)).abs();
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
        candidate += 5;
    }
    best
}

/// Error building a calibration from an audiogram's corners.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    /// One of the three required anchors has not been placed.
    #[error("calibration incomplete: missing {0} corner")]
    IncompleteCorners(CornerPosition),
    /// Two anchors of an axis share the same pixel coordinate, so the axis
    /// has no extent and values along it are undefined.
    #[error("degenerate {axis} axis: corner anchors coincide")]
    DegenerateAxis { axis: &'static str },
}

/// One-dimensional linear interpolation through two anchors, extrapolating
/// outside the span.
#[derive(Clone, Copy, Debug)]
struct LinearMap {
    pixel0: f64,
    pixel1: f64,
    value0: f64,
    value1: f64,
}

impl LinearMap {
    fn at(&self, pixel: f64) -> f64 {
        self.value0
            + (self.value1 - self.value0) * (pixel - self.pixel0) / (self.pixel1 - self.pixel0)
    }
}

/// The pixel-x to frequency and pixel-y to threshold maps for one audiogram.
#[derive(Clone, Copy, Debug)]
pub struct CalibrationMap {
    octave: LinearMap,
    threshold: LinearMap,
}

impl CalibrationMap {
    /// Build the calibration maps from an audiogram's corners.
    ///
    /// Requires the top-left, top-right and bottom-left corners; the
    /// bottom-right corner does not participate.
    pub fn from_corners(corners: &[Corner]) -> Result<Self, CalibrationError> {
        let corner_at = |position: CornerPosition| {
            corners
                .iter()
                .find(|c| c.position == position)
                .ok_or(CalibrationError::IncompleteCorners(position))
        };
        let top_left = corner_at(CornerPosition::TOP_LEFT)?;
        let top_right = corner_at(CornerPosition::TOP_RIGHT)?;
        let bottom_left = corner_at(CornerPosition::BOTTOM_LEFT)?;

        if top_left.x == top_right.x {
            return Err(CalibrationError::DegenerateAxis { axis: "frequency" });
        }
        if top_left.y == bottom_left.y {
            return Err(CalibrationError::DegenerateAxis { axis: "threshold" });
        }

        Ok(CalibrationMap {
            octave: LinearMap {
                pixel0: top_left.x,
                pixel1: top_right.x,
                value0: frequency_to_octave(f64::from(top_left.frequency)),
                value1: frequency_to_octave(f64::from(top_right.frequency)),
            },
            threshold: LinearMap {
                pixel0: top_left.y,
                pixel1: bottom_left.y,
                value0: f64::from(top_left.threshold),
                value1: f64::from(bottom_left.threshold),
            },
        })
    }

    /// The unsnapped frequency in Hz at pixel column `x`
    pub fn frequency_at(&self, x: f64) -> f64 {
        octave_to_frequency(self.octave.at(x))
    }

    /// The unsnapped threshold in dB at pixel row `y`
    pub fn threshold_at(&self, y: f64) -> f64 {
        self.threshold.at(y)
    }
}
