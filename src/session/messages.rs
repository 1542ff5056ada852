//! Message types for an annotation session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Convenience constructors used by the host's event plumbing
//!
//! Every structural edit of the annotation document and every view change is
//! expressed as one of these messages and applied through
//! [`EditorState::apply`](super::state::EditorState::apply).

use crate::domain::{Annotation, MeasurementType, Point};
use crate::view::ZoomDirection;

// ============================================================================
// Step Types
// ============================================================================

/// Workflow step navigation.
#[derive(Debug, Clone, Copy)]
pub enum StepMsg {
    /// Advance to the next step (guarded)
    Next,
    /// Return to the previous step (always allowed)
    Previous,
}

// ============================================================================
// View Types
// ============================================================================

/// Direction of a corner calibration-value step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Pan/zoom messages for the annotation canvas.
#[derive(Debug, Clone, Copy)]
pub enum ViewMsg {
    /// Start dragging the image with the cursor at this view-space point
    BeginPan { cursor: Point },
    /// Move the image drag to this view-space point
    Pan { cursor: Point },
    /// Apply one zoom notch around the cursor
    Zoom {
        cursor: Point,
        direction: ZoomDirection,
    },
}

// ============================================================================
// Audiogram Types
// ============================================================================

/// Audiogram panel messages.
#[derive(Debug, Clone, Copy)]
pub enum AudiogramMsg {
    /// Start drawing a new audiogram box at this image-space origin
    Add { origin: Point },
    /// Resize the in-flight audiogram box to these dimensions
    ResizeBox { width: f64, height: f64 },
    /// Remove the audiogram at this index
    Remove { audiogram: usize },
}

// ============================================================================
// Corner Types
// ============================================================================

/// Calibration corner messages.
#[derive(Debug, Clone, Copy)]
pub enum CornerMsg {
    /// Place a corner at this image-space point
    Add { audiogram: usize, coordinates: Point },
    /// Double/halve the corner's frequency, wrapping at the ends of the range
    CycleFrequency {
        audiogram: usize,
        corner: usize,
        direction: StepDirection,
    },
    /// Step the corner's threshold by 5 dB, wrapping at the ends of the range
    CycleThreshold {
        audiogram: usize,
        corner: usize,
        direction: StepDirection,
    },
    /// Remove the corner at this index
    Remove { audiogram: usize, corner: usize },
}

// ============================================================================
// Label Types
// ============================================================================

/// Axis label messages.
#[derive(Debug, Clone)]
pub enum LabelMsg {
    /// Start drawing a new label box at this image-space origin
    Add { audiogram: usize, origin: Point },
    /// Resize the in-flight label box to these dimensions
    ResizeBox {
        audiogram: usize,
        width: f64,
        height: f64,
    },
    /// Remove the label at this index
    Remove { audiogram: usize, label: usize },
    /// Open the value editor for this label, or close it if already open
    ToggleEdit { audiogram: usize, label: usize },
    /// Commit the edited label's text value and close the editor
    SetValue { value: String },
}

// ============================================================================
// Symbol Types
// ============================================================================

/// Measurement symbol messages.
#[derive(Debug, Clone, Copy)]
pub enum SymbolMsg {
    /// Place a symbol of the selected measurement type centered here
    Add { audiogram: usize, coordinates: Point },
    /// Start dragging a placed symbol, cursor at this image-space point
    BeginDrag {
        audiogram: usize,
        symbol: usize,
        origin: Point,
    },
    /// Move the dragged symbol along with the cursor
    Drag {
        audiogram: usize,
        symbol: usize,
        cursor: Point,
    },
    /// Flip the symbol between response and no-response
    ToggleResponse { audiogram: usize, symbol: usize },
    /// Grow/shrink the symbol box by one wheel notch around its center
    Resize {
        audiogram: usize,
        symbol: usize,
        direction: StepDirection,
    },
    /// Remove the symbol at this index
    Remove { audiogram: usize, symbol: usize },
    /// Select the measurement type for newly placed symbols; selecting the
    /// active type again clears the selection
    SetMeasurementType(MeasurementType),
}

// ============================================================================
// Document Types
// ============================================================================

/// Whole-document messages.
#[derive(Debug, Clone)]
pub enum DocumentMsg {
    /// Replace the annotator's comment
    UpdateComment(String),
    /// Mark the report invalid with the given reason
    MarkInvalid(String),
    /// Atomically replace the document (hydration from a saved annotation)
    Initialize(Annotation),
    /// Return to the initial empty state at the first step
    Reset,
}

// ============================================================================
// Main Message Enum
// ============================================================================

/// Messages for annotation session interactions.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Workflow step navigation
    Step(StepMsg),
    /// Pan/zoom of the annotation canvas
    View(ViewMsg),
    /// Audiogram panel edits
    Audiogram(AudiogramMsg),
    /// Calibration corner edits
    Corner(CornerMsg),
    /// Axis label edits
    Label(LabelMsg),
    /// Measurement symbol edits
    Symbol(SymbolMsg),
    /// Whole-document operations
    Document(DocumentMsg),
    /// Pointer released: ends the active drag and commits or discards the
    /// draft box. Carries the audiogram under the cursor, if any, so a label
    /// draft can be resolved.
    EndDrag { audiogram: Option<usize> },
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Msg {
    // Step shortcuts
    pub fn next_step() -> Self {
        Self::Step(StepMsg::Next)
    }
    pub fn previous_step() -> Self {
        Self::Step(StepMsg::Previous)
    }

    // View shortcuts
    pub fn begin_pan(cursor: Point) -> Self {
        Self::View(ViewMsg::BeginPan { cursor })
    }
    pub fn pan(cursor: Point) -> Self {
        Self::View(ViewMsg::Pan { cursor })
    }
    pub fn zoom(cursor: Point, direction: ZoomDirection) -> Self {
        Self::View(ViewMsg::Zoom { cursor, direction })
    }

    // Audiogram shortcuts
    pub fn add_audiogram(origin: Point) -> Self {
        Self::Audiogram(AudiogramMsg::Add { origin })
    }
    pub fn resize_audiogram_box(width: f64, height: f64) -> Self {
        Self::Audiogram(AudiogramMsg::ResizeBox { width, height })
    }
    pub fn remove_audiogram(audiogram: usize) -> Self {
        Self::Audiogram(AudiogramMsg::Remove { audiogram })
    }

    // Corner shortcuts
    pub fn add_corner(audiogram: usize, coordinates: Point) -> Self {
        Self::Corner(CornerMsg::Add {
            audiogram,
            coordinates,
        })
    }
    pub fn cycle_corner_frequency(
        audiogram: usize,
        corner: usize,
        direction: StepDirection,
    ) -> Self {
        Self::Corner(CornerMsg::CycleFrequency {
            audiogram,
            corner,
            direction,
        })
    }
    pub fn cycle_corner_threshold(
        audiogram: usize,
        corner: usize,
        direction: StepDirection,
    ) -> Self {
        Self::Corner(CornerMsg::CycleThreshold {
            audiogram,
            corner,
            direction,
        })
    }
    pub fn remove_corner(audiogram: usize, corner: usize) -> Self {
        Self::Corner(CornerMsg::Remove { audiogram, corner })
    }

    // Label shortcuts
    pub fn add_label(audiogram: usize, origin: Point) -> Self {
        Self::Label(LabelMsg::Add { audiogram, origin })
    }
    pub fn resize_label_box(audiogram: usize, width: f64, height: f64) -> Self {
        Self::Label(LabelMsg::ResizeBox {
            audiogram,
            width,
            height,
        })
    }
    pub fn remove_label(audiogram: usize, label: usize) -> Self {
        Self::Label(LabelMsg::Remove { audiogram, label })
    }
    pub fn toggle_label_edit(audiogram: usize, label: usize) -> Self {
        Self::Label(LabelMsg::ToggleEdit { audiogram, label })
    }
    pub fn set_label_value(value: impl Into<String>) -> Self {
        Self::Label(LabelMsg::SetValue {
            value: value.into(),
        })
    }

    // Symbol shortcuts
    pub fn add_symbol(audiogram: usize, coordinates: Point) -> Self {
        Self::Symbol(SymbolMsg::Add {
            audiogram,
            coordinates,
        })
    }
    pub fn begin_symbol_drag(audiogram: usize, symbol: usize, origin: Point) -> Self {
        Self::Symbol(SymbolMsg::BeginDrag {
            audiogram,
            symbol,
            origin,
        })
    }
    pub fn drag_symbol(audiogram: usize, symbol: usize, cursor: Point) -> Self {
        Self::Symbol(SymbolMsg::Drag {
            audiogram,
            symbol,
            cursor,
        })
    }
    pub fn toggle_symbol_response(audiogram: usize, symbol: usize) -> Self {
        Self::Symbol(SymbolMsg::ToggleResponse { audiogram, symbol })
    }
    pub fn resize_symbol(audiogram: usize, symbol: usize, direction: StepDirection) -> Self {
        Self::Symbol(SymbolMsg::Resize {
            audiogram,
            symbol,
            direction,
        })
    }
    pub fn remove_symbol(audiogram: usize, symbol: usize) -> Self {
        Self::Symbol(SymbolMsg::Remove { audiogram, symbol })
    }
    pub fn set_measurement_type(measurement_type: MeasurementType) -> Self {
        Self::Symbol(SymbolMsg::SetMeasurementType(measurement_type))
    }

    // Document shortcuts
    pub fn update_comment(comment: impl Into<String>) -> Self {
        Self::Document(DocumentMsg::UpdateComment(comment.into()))
    }
    pub fn mark_invalid(reason: impl Into<String>) -> Self {
        Self::Document(DocumentMsg::MarkInvalid(reason.into()))
    }
    pub fn initialize_annotation(annotation: Annotation) -> Self {
        Self::Document(DocumentMsg::Initialize(annotation))
    }
    pub fn reset() -> Self {
        Self::Document(DocumentMsg::Reset)
    }

    pub fn end_drag(audiogram: Option<usize>) -> Self {
        Self::EndDrag { audiogram }
    }
}
