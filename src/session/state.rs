//! Session state for the annotation workflow
//!
//! The state is split in two layers: the persisted [`Annotation`] document,
//! and the ephemeral interaction state (view transform, active drag,
//! selected measurement type, open label editor) that never leaves the
//! session. Only the document is serialized.

use crate::domain::{Annotation, MeasurementType, Point, SubmitError};
use crate::view::ViewTransform;

use super::handlers;
use super::messages::Msg;

/// The ordered steps of the annotation workflow.
///
/// Steps are strictly sequential; [`Msg::next_step`] is guarded and
/// [`Msg::previous_step`] always moves one step back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnotationStep {
    /// Pick an existing annotation to continue, or start fresh
    #[default]
    AnnotationSelection,
    /// Draw a bounding box around each audiogram panel
    AudiogramAnnotation,
    /// Place the four calibration corners on each panel
    CornerAnnotation,
    /// Box and transcribe the axis labels
    LabelAnnotation,
    /// Place the measurement symbols
    SymbolAnnotation,
    /// Final review before submission
    Review,
}

impl AnnotationStep {
    /// The step after this one, if any
    pub fn next(self) -> Option<AnnotationStep> {
        match self {
            AnnotationStep::AnnotationSelection => Some(AnnotationStep::AudiogramAnnotation),
            AnnotationStep::AudiogramAnnotation => Some(AnnotationStep::CornerAnnotation),
            AnnotationStep::CornerAnnotation => Some(AnnotationStep::LabelAnnotation),
            AnnotationStep::LabelAnnotation => Some(AnnotationStep::SymbolAnnotation),
            AnnotationStep::SymbolAnnotation => Some(AnnotationStep::Review),
            AnnotationStep::Review => None,
        }
    }

    /// The step before this one, if any
    pub fn previous(self) -> Option<AnnotationStep> {
        match self {
            AnnotationStep::AnnotationSelection => None,
            AnnotationStep::AudiogramAnnotation => Some(AnnotationStep::AnnotationSelection),
            AnnotationStep::CornerAnnotation => Some(AnnotationStep::AudiogramAnnotation),
            AnnotationStep::LabelAnnotation => Some(AnnotationStep::CornerAnnotation),
            AnnotationStep::SymbolAnnotation => Some(AnnotationStep::LabelAnnotation),
            AnnotationStep::Review => Some(AnnotationStep::SymbolAnnotation),
        }
    }
}

/// The single active drag gesture, if any. Image pans and bounding-box drags
/// are mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// Right-button pan of the report image
    Image,
    /// Drawing or moving a bounding box
    BoundingBox,
}

/// Identifies the label whose value editor is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelRef {
    pub audiogram: usize,
    pub label: usize,
}

/// Ephemeral interaction state; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    /// The active drag gesture
    pub drag: DragState,
    /// Anchor captured at gesture start (pan anchor or previous drag point)
    pub origin: Point,
    /// The measurement type newly placed symbols receive
    pub selected_measurement_type: Option<MeasurementType>,
    /// The label currently open for value editing, at most one
    pub edited_label: Option<LabelRef>,
}

/// The full state of one annotation session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    /// Current workflow step
    pub step: AnnotationStep,
    /// Pan/zoom of the canvas
    pub view: ViewTransform,
    /// Ephemeral interaction state
    pub interaction: InteractionState,
    /// The annotation document under construction
    pub annotation: Annotation,
}

impl EditorState {
    /// A fresh session on an empty document, at the first step
    pub fn new() -> Self {
        EditorState::default()
    }

    /// Apply one message and return the successor state.
    ///
    /// Messages that are inapplicable in the current step, target an index
    /// that does not exist, or would violate a document invariant leave the
    /// state unchanged.
    #[must_use]
    pub fn apply(mut self, msg: Msg) -> Self {
        handlers::handle_msg(&mut self, msg);
        self
    }

    /// The document for handoff to the extractor and the persistence
    /// collaborator. Fails if the document does not meet the submission
    /// preconditions.
    pub fn submission(&self) -> Result<&Annotation, SubmitError> {
        self.annotation.ensure_submittable()?;
        Ok(&self.annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_strictly_sequential() {
        let mut step = AnnotationStep::AnnotationSelection;
        let mut walked = vec![step];
        while let Some(next) = step.next() {
            walked.push(next);
            step = next;
        }
        assert_eq!(
            walked,
            vec![
                AnnotationStep::AnnotationSelection,
                AnnotationStep::AudiogramAnnotation,
                AnnotationStep::CornerAnnotation,
                AnnotationStep::LabelAnnotation,
                AnnotationStep::SymbolAnnotation,
                AnnotationStep::Review,
            ]
        );
        assert_eq!(AnnotationStep::AnnotationSelection.previous(), None);
        assert_eq!(
            AnnotationStep::Review.previous(),
            Some(AnnotationStep::SymbolAnnotation)
        );
    }
}
