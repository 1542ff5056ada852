//! Annotation workflow and calibrated threshold extraction for scanned
//! audiogram reports.
//!
//! An annotator marks up a report image through a fixed sequence of steps:
//! boxing the audiogram panels, placing the four calibration corners,
//! transcribing axis labels and placing measurement symbols. The session
//! state machine ([`session`]) validates every edit against the current step
//! and the document invariants; the calibration engine ([`calibration`],
//! [`extract`]) turns the finished annotation into clinical threshold
//! readings.
//!
//! Image decoding, rendering and the surrounding application shell are the
//! host's concern; this crate only deals in image-space coordinates and the
//! annotation document.

pub mod calibration;
pub mod domain;
pub mod extract;
pub mod persistence;
pub mod session;
pub mod view;
