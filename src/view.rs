//! View transform between the rendering surface and image space
//!
//! The annotation canvas shows the report image panned by `offset` and scaled
//! by `zoom_factor`. Pointer events arrive in view space (relative to the
//! surface origin) and every document edit happens in image space, so all
//! interaction handlers funnel through these conversions.

use crate::domain::Point;

/// Zoom change applied per wheel notch.
pub const ZOOM_STEP: f64 = 0.05;
/// Lower bound of the zoom factor.
pub const MIN_ZOOM: f64 = 0.05;
/// Upper bound of the zoom factor.
pub const MAX_ZOOM: f64 = 10.0;
/// Zoom factor when a report is first displayed.
pub const INITIAL_ZOOM: f64 = 0.6;

/// Which way a wheel notch moves the zoom factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// The pan/zoom state of the annotation canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Translation of the image origin, in view-space pixels
    pub offset: Point,
    /// Scale factor from image space to view space
    pub zoom_factor: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            offset: Point::default(),
            zoom_factor: INITIAL_ZOOM,
        }
    }
}

impl ViewTransform {
    /// Map a view-space point (relative to the surface origin) to image space
    pub fn to_image_space(&self, view_point: Point) -> Point {
        (view_point - self.offset).scale(1.0 / self.zoom_factor)
    }

    /// Map an image-space point to view space
    pub fn to_view_space(&self, image_point: Point) -> Point {
        image_point.scale(self.zoom_factor) + self.offset
    }

    /// Apply one zoom notch towards/away from the cursor.
    ///
    /// The zoom factor moves by [`ZOOM_STEP`] within `[MIN_ZOOM, MAX_ZOOM]`,
    /// and the offset is recomputed so the image point under the cursor stays
    /// under the cursor.
    pub fn zoom_around(&self, cursor: Point, direction: ZoomDirection) -> ViewTransform {
        let step = match direction {
            ZoomDirection::In => ZOOM_STEP,
            ZoomDirection::Out => -ZOOM_STEP,
        };
        let zoom_factor = (self.zoom_factor + step).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom_factor == self.zoom_factor {
            return *self;
        }
        let anchor = self.to_image_space(cursor);
        ViewTransform {
            offset: cursor - anchor.scale(zoom_factor),
            zoom_factor,
        }
    }

    /// The pan anchor for a drag starting with the cursor at `cursor`.
    ///
    /// Holding the anchor fixed for the whole gesture keeps repeated moves
    /// from accumulating rounding error.
    pub fn pan_anchor(&self, cursor: Point) -> Point {
        cursor - self.offset
    }

    /// The transform after panning so that `anchor` sits under `cursor`
    pub fn panned(&self, cursor: Point, anchor: Point) -> ViewTransform {
        ViewTransform {
            offset: cursor - anchor,
            zoom_factor: self.zoom_factor,
        }
    }
}
