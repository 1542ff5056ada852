//! Annotation message handlers
//!
//! Handles every [`Msg`] against the session state. Handlers mutate the
//! state in place; [`EditorState::apply`] wraps them into a pure
//! state-to-state transition. A message that is inapplicable in the current
//! step, targets a missing index, or would violate a document invariant is
//! a silent no-op.

use log::debug;

use crate::domain::{Audiogram, BoundingBox, Corner, Label, Symbol, MAX_AUDIOGRAMS};

use super::messages::{
    AudiogramMsg, CornerMsg, DocumentMsg, LabelMsg, Msg, StepDirection, StepMsg, SymbolMsg,
    ViewMsg,
};
use super::state::{AnnotationStep, DragState, EditorState, LabelRef};

/// Minimum committed side length of an audiogram bounding box, in pixels.
const AUDIOGRAM_MIN_SIDE: f64 = 50.0;
/// Minimum committed side length of a label bounding box, in pixels.
const LABEL_MIN_SIDE: f64 = 25.0;
/// Side length of a freshly placed symbol box, in pixels.
const SYMBOL_SIDE: f64 = 30.0;
/// Smallest side length a symbol box may be resized to, in pixels.
const SYMBOL_MIN_SIDE: f64 = 30.0;
/// Pixels added/removed per symbol resize notch.
const SYMBOL_RESIZE_RATE: f64 = 1.0;

/// Corner frequency cycling range, in Hz.
const MIN_CORNER_FREQUENCY: u32 = 125;
const MAX_CORNER_FREQUENCY: u32 = 16000;
/// Corner threshold cycling range and step, in dB.
const MIN_CORNER_THRESHOLD: i32 = -10;
const MAX_CORNER_THRESHOLD: i32 = 130;
const CORNER_THRESHOLD_STEP: i32 = 5;

/// Handle a message, modifying the session state.
pub(crate) fn handle_msg(state: &mut EditorState, msg: Msg) {
    match msg {
        Msg::Step(msg) => handle_step(state, msg),
        Msg::View(msg) => handle_view(state, msg),
        Msg::Audiogram(msg) => handle_audiogram(state, msg),
        Msg::Corner(msg) => handle_corner(state, msg),
        Msg::Label(msg) => handle_label(state, msg),
        Msg::Symbol(msg) => handle_symbol(state, msg),
        Msg::Document(msg) => handle_document(state, msg),
        Msg::EndDrag { audiogram } => handle_end_drag(state, audiogram),
    }
}

// ============================================================================
// Step handlers
// ============================================================================

fn handle_step(state: &mut EditorState, msg: StepMsg) {
    match msg {
        StepMsg::Next => {
            if state.step == AnnotationStep::AudiogramAnnotation
                && state.annotation.audiograms.is_empty()
            {
                debug!("next step refused: no audiogram annotated yet");
                return;
            }
            if state.step == AnnotationStep::CornerAnnotation
                && !state
                    .annotation
                    .audiograms
                    .iter()
                    .all(Audiogram::is_fully_cornered)
            {
                debug!("next step refused: not every audiogram has 4 corners");
                return;
            }
            if let Some(next) = state.step.next() {
                state.step = next;
                state.interaction.selected_measurement_type = None;
            }
        }
        StepMsg::Previous => {
            if let Some(previous) = state.step.previous() {
                state.step = previous;
            }
            state.interaction.selected_measurement_type = None;
        }
    }
}

// ============================================================================
// View handlers
// ============================================================================

fn handle_view(state: &mut EditorState, msg: ViewMsg) {
    match msg {
        ViewMsg::BeginPan { cursor } => {
            if state.interaction.drag != DragState::Idle {
                return;
            }
            state.interaction.drag = DragState::Image;
            state.interaction.origin = state.view.pan_anchor(cursor);
        }
        ViewMsg::Pan { cursor } => {
            if state.interaction.drag != DragState::Image {
                return;
            }
            state.view = state.view.panned(cursor, state.interaction.origin);
        }
        ViewMsg::Zoom { cursor, direction } => {
            state.view = state.view.zoom_around(cursor, direction);
        }
    }
}

// ============================================================================
// Audiogram handlers
// ============================================================================

fn handle_audiogram(state: &mut EditorState, msg: AudiogramMsg) {
    if state.step != AnnotationStep::AudiogramAnnotation {
        return;
    }
    match msg {
        AudiogramMsg::Add { origin } => {
            if state.annotation.audiograms.len() == MAX_AUDIOGRAMS
                || state.interaction.drag != DragState::Idle
            {
                return;
            }
            state.annotation.audiograms.push(Audiogram::anchored_at(origin));
            state.interaction.drag = DragState::BoundingBox;
        }
        AudiogramMsg::ResizeBox { width, height } => {
            if state.interaction.drag != DragState::BoundingBox {
                return;
            }
            if let Some(audiogram) = state.annotation.audiograms.last_mut() {
                audiogram.bounding_box.width = width;
                audiogram.bounding_box.height = height;
            }
        }
        AudiogramMsg::Remove { audiogram } => {
            if audiogram < state.annotation.audiograms.len() {
                state.annotation.audiograms.remove(audiogram);
            }
        }
    }
}

// ============================================================================
// Corner handlers
// ============================================================================

fn handle_corner(state: &mut EditorState, msg: CornerMsg) {
    if state.step != AnnotationStep::CornerAnnotation {
        return;
    }
    match msg {
        CornerMsg::Add {
            audiogram,
            coordinates,
        } => {
            let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram) else {
                return;
            };
            if audiogram.is_fully_cornered() {
                return;
            }
            let corner = Corner::at_click(coordinates, &audiogram.bounding_box);
            if audiogram.corner_at(corner.position).is_some() {
                debug!("ignoring corner: {} already placed", corner.position);
                return;
            }
            audiogram.corners.push(corner);
        }
        CornerMsg::CycleFrequency {
            audiogram,
            corner,
            direction,
        } => {
            if let Some(corner) = corner_mut(state, audiogram, corner) {
                let f = corner.frequency;
                corner.frequency = match direction {
                    StepDirection::Up => {
                        if f * 2 > MAX_CORNER_FREQUENCY {
                            MIN_CORNER_FREQUENCY
                        } else {
                            f * 2
                        }
                    }
                    StepDirection::Down => {
                        if f / 2 < MIN_CORNER_FREQUENCY {
                            MAX_CORNER_FREQUENCY
                        } else {
                            f / 2
                        }
                    }
                };
            }
        }
        CornerMsg::CycleThreshold {
            audiogram,
            corner,
            direction,
        } => {
            if let Some(corner) = corner_mut(state, audiogram, corner) {
                let stepped = match direction {
                    StepDirection::Up => corner.threshold + CORNER_THRESHOLD_STEP,
                    StepDirection::Down => corner.threshold - CORNER_THRESHOLD_STEP,
                };
                corner.threshold = if stepped > MAX_CORNER_THRESHOLD {
                    MIN_CORNER_THRESHOLD
                } else if stepped < MIN_CORNER_THRESHOLD {
                    MAX_CORNER_THRESHOLD
                } else {
                    stepped
                };
            }
        }
        CornerMsg::Remove { audiogram, corner } => {
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram)
                && corner < audiogram.corners.len()
            {
                audiogram.corners.remove(corner);
            }
        }
    }
}

// ============================================================================
// Label handlers
// ============================================================================

fn handle_label(state: &mut EditorState, msg: LabelMsg) {
    if state.step != AnnotationStep::LabelAnnotation {
        return;
    }
    match msg {
        LabelMsg::Add { audiogram, origin } => {
            if state.interaction.drag != DragState::Idle {
                return;
            }
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram) {
                audiogram.labels.push(Label {
                    bounding_box: BoundingBox::anchored_at(origin),
                    value: "unlabeled".to_owned(),
                });
                state.interaction.drag = DragState::BoundingBox;
            }
        }
        LabelMsg::ResizeBox {
            audiogram,
            width,
            height,
        } => {
            if state.interaction.drag != DragState::BoundingBox {
                return;
            }
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram)
                && let Some(label) = audiogram.labels.last_mut()
            {
                label.bounding_box.width = width;
                label.bounding_box.height = height;
            }
        }
        LabelMsg::Remove { audiogram, label } => {
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram)
                && label < audiogram.labels.len()
            {
                audiogram.labels.remove(label);
                state.interaction.edited_label = None;
            }
        }
        LabelMsg::ToggleEdit { audiogram, label } => {
            if state.interaction.edited_label.is_some() {
                state.interaction.edited_label = None;
            } else if state
                .annotation
                .audiograms
                .get(audiogram)
                .is_some_and(|a| label < a.labels.len())
            {
                state.interaction.edited_label = Some(LabelRef { audiogram, label });
            }
        }
        LabelMsg::SetValue { value } => {
            let Some(edited) = state.interaction.edited_label else {
                return;
            };
            if let Some(audiogram) = state.annotation.audiograms.get_mut(edited.audiogram)
                && let Some(label) = audiogram.labels.get_mut(edited.label)
            {
                label.value = value;
            }
            state.interaction.edited_label = None;
        }
    }
}

// ============================================================================
// Symbol handlers
// ============================================================================

fn handle_symbol(state: &mut EditorState, msg: SymbolMsg) {
    match msg {
        // The measurement-type palette is not step-gated: it stays
        // interactive during review, where it filters the displayed symbols.
        SymbolMsg::SetMeasurementType(measurement_type) => {
            if state.interaction.selected_measurement_type == Some(measurement_type) {
                state.interaction.selected_measurement_type = None;
            } else {
                state.interaction.selected_measurement_type = Some(measurement_type);
            }
        }
        _ if state.step != AnnotationStep::SymbolAnnotation => {}
        SymbolMsg::Add {
            audiogram,
            coordinates,
        } => {
            let Some(measurement_type) = state.interaction.selected_measurement_type else {
                debug!("ignoring symbol: no measurement type selected");
                return;
            };
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram) {
                audiogram.symbols.push(Symbol {
                    bounding_box: BoundingBox::centered_square(coordinates, SYMBOL_SIDE),
                    response: true,
                    measurement_type,
                });
            }
        }
        SymbolMsg::BeginDrag {
            audiogram,
            symbol,
            origin,
        } => {
            if state.interaction.drag != DragState::Idle {
                return;
            }
            if symbol_mut(state, audiogram, symbol).is_some() {
                state.interaction.drag = DragState::BoundingBox;
                state.interaction.origin = origin;
            }
        }
        SymbolMsg::Drag {
            audiogram,
            symbol,
            cursor,
        } => {
            if state.interaction.drag != DragState::BoundingBox {
                return;
            }
            let origin = state.interaction.origin;
            if let Some(symbol) = symbol_mut(state, audiogram, symbol) {
                let delta = cursor - origin;
                symbol.bounding_box = symbol.bounding_box.translate(delta.x, delta.y);
                state.interaction.origin = cursor;
            }
        }
        SymbolMsg::ToggleResponse { audiogram, symbol } => {
            if let Some(symbol) = symbol_mut(state, audiogram, symbol) {
                symbol.response = !symbol.response;
            }
        }
        SymbolMsg::Resize {
            audiogram,
            symbol,
            direction,
        } => {
            if let Some(symbol) = symbol_mut(state, audiogram, symbol) {
                let grow = match direction {
                    StepDirection::Up => SYMBOL_RESIZE_RATE,
                    StepDirection::Down => -SYMBOL_RESIZE_RATE,
                };
                let resized = BoundingBox {
                    x: symbol.bounding_box.x - grow / 2.0,
                    y: symbol.bounding_box.y - grow / 2.0,
                    width: symbol.bounding_box.width + grow,
                    height: symbol.bounding_box.height + grow,
                };
                if resized.meets_minimum(SYMBOL_MIN_SIDE) {
                    symbol.bounding_box = resized;
                }
            }
        }
        SymbolMsg::Remove { audiogram, symbol } => {
            if let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram)
                && symbol < audiogram.symbols.len()
            {
                audiogram.symbols.remove(symbol);
            }
        }
    }
}

// ============================================================================
// Document handlers
// ============================================================================

fn handle_document(state: &mut EditorState, msg: DocumentMsg) {
    match msg {
        DocumentMsg::UpdateComment(comment) => {
            state.annotation.comment = comment;
        }
        DocumentMsg::MarkInvalid(reason) => {
            state.annotation.valid = false;
            state.annotation.reason = Some(reason);
        }
        DocumentMsg::Initialize(annotation) => {
            state.annotation = annotation;
        }
        DocumentMsg::Reset => {
            *state = EditorState::new();
        }
    }
}

// ============================================================================
// Drag commit
// ============================================================================

/// Pointer released: commit or discard the draft box of the current step,
/// then return to the idle drag state.
fn handle_end_drag(state: &mut EditorState, audiogram: Option<usize>) {
    if state.interaction.drag == DragState::BoundingBox {
        match state.step {
            AnnotationStep::AudiogramAnnotation => {
                if state
                    .annotation
                    .audiograms
                    .last()
                    .is_some_and(|a| !a.bounding_box.meets_minimum(AUDIOGRAM_MIN_SIDE))
                {
                    debug!("discarding undersized audiogram box");
                    state.annotation.audiograms.pop();
                }
            }
            AnnotationStep::LabelAnnotation => {
                if let Some(index) = audiogram {
                    commit_label_draft(state, index);
                }
            }
            _ => {}
        }
    }
    state.interaction.drag = DragState::Idle;
}

/// An undersized label draft is dropped; a committed one opens its value
/// editor.
fn commit_label_draft(state: &mut EditorState, audiogram_index: usize) {
    let Some(audiogram) = state.annotation.audiograms.get_mut(audiogram_index) else {
        return;
    };
    let Some(label) = audiogram.labels.last() else {
        return;
    };
    if label.bounding_box.meets_minimum(LABEL_MIN_SIDE) {
        state.interaction.edited_label = Some(LabelRef {
            audiogram: audiogram_index,
            label: audiogram.labels.len() - 1,
        });
    } else {
        debug!("discarding undersized label box");
        audiogram.labels.pop();
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn corner_mut<'a>(
    state: &'a mut EditorState,
    audiogram: usize,
    corner: usize,
) -> Option<&'a mut Corner> {
    state
        .annotation
        .audiograms
        .get_mut(audiogram)?
        .corners
        .get_mut(corner)
}

fn symbol_mut<'a>(
    state: &'a mut EditorState,
    audiogram: usize,
    symbol: usize,
) -> Option<&'a mut Symbol> {
    state
        .annotation
        .audiograms
        .get_mut(audiogram)?
        .symbols
        .get_mut(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CornerPosition, MeasurementType, Point};
    use crate::extract::{CalibrationSource, extract_thresholds, thresholds_to_csv};
    use crate::view::ZoomDirection;

    /// Drag out one audiogram box at (100, 100) with the given dimensions
    /// and commit it.
    fn drag_audiogram(state: EditorState, width: f64, height: f64) -> EditorState {
        state
            .apply(Msg::add_audiogram(Point::new(100.0, 100.0)))
            .apply(Msg::resize_audiogram_box(width, height))
            .apply(Msg::end_drag(None))
    }

    /// A session advanced to CornerAnnotation with one 200x300 audiogram.
    fn cornering_session() -> EditorState {
        let state = EditorState::new().apply(Msg::next_step());
        drag_audiogram(state, 200.0, 300.0).apply(Msg::next_step())
    }

    /// Click the four corners of the 200x300 audiogram from
    /// [`cornering_session`] at its box extremes.
    fn place_all_corners(state: EditorState) -> EditorState {
        state
            .apply(Msg::add_corner(0, Point::new(100.0, 100.0)))
            .apply(Msg::add_corner(0, Point::new(300.0, 100.0)))
            .apply(Msg::add_corner(0, Point::new(100.0, 400.0)))
            .apply(Msg::add_corner(0, Point::new(300.0, 400.0)))
    }

    /// A session advanced to SymbolAnnotation with a fully cornered
    /// audiogram.
    fn symbol_session() -> EditorState {
        place_all_corners(cornering_session())
            .apply(Msg::next_step())
            .apply(Msg::next_step())
    }

    #[test]
    fn audiogram_drag_commits_box() {
        let state = drag_audiogram(EditorState::new().apply(Msg::next_step()), 200.0, 300.0);
        assert_eq!(state.annotation.audiograms.len(), 1);
        let bbox = state.annotation.audiograms[0].bounding_box;
        assert_eq!((bbox.x, bbox.y), (100.0, 100.0));
        assert_eq!((bbox.width, bbox.height), (200.0, 300.0));
        assert_eq!(state.interaction.drag, DragState::Idle);
    }

    #[test]
    fn undersized_audiogram_box_is_discarded_not_kept() {
        let state = drag_audiogram(EditorState::new().apply(Msg::next_step()), 40.0, 40.0);
        assert!(state.annotation.audiograms.is_empty());
    }

    #[test]
    fn at_most_two_audiograms() {
        let mut state = EditorState::new().apply(Msg::next_step());
        for _ in 0..3 {
            state = drag_audiogram(state, 200.0, 300.0);
        }
        assert_eq!(state.annotation.audiograms.len(), 2);
    }

    #[test]
    fn audiogram_actions_are_step_gated() {
        // Still at AnnotationSelection: nothing may be drawn.
        let state = drag_audiogram(EditorState::new(), 200.0, 300.0);
        assert!(state.annotation.audiograms.is_empty());

        // Removal is only honored in AudiogramAnnotation.
        let state = cornering_session().apply(Msg::remove_audiogram(0));
        assert_eq!(state.annotation.audiograms.len(), 1);
    }

    #[test]
    fn next_step_requires_an_audiogram() {
        let state = EditorState::new().apply(Msg::next_step());
        assert_eq!(state.step, AnnotationStep::AudiogramAnnotation);

        let refused = state.clone().apply(Msg::next_step());
        assert_eq!(refused.step, AnnotationStep::AudiogramAnnotation);

        let advanced = drag_audiogram(state, 200.0, 300.0).apply(Msg::next_step());
        assert_eq!(advanced.step, AnnotationStep::CornerAnnotation);
    }

    #[test]
    fn next_step_requires_four_corners_everywhere() {
        let partially_cornered = cornering_session()
            .apply(Msg::add_corner(0, Point::new(100.0, 100.0)))
            .apply(Msg::add_corner(0, Point::new(300.0, 100.0)));
        let refused = partially_cornered.clone().apply(Msg::next_step());
        assert_eq!(refused.step, AnnotationStep::CornerAnnotation);

        let advanced = place_all_corners(cornering_session()).apply(Msg::next_step());
        assert_eq!(advanced.step, AnnotationStep::LabelAnnotation);
    }

    #[test]
    fn fifth_corner_is_a_no_op() {
        let state = place_all_corners(cornering_session());
        assert_eq!(state.annotation.audiograms[0].corners.len(), 4);

        let state = state.apply(Msg::add_corner(0, Point::new(150.0, 150.0)));
        assert_eq!(state.annotation.audiograms[0].corners.len(), 4);
    }

    #[test]
    fn duplicate_corner_position_is_a_no_op() {
        let state = cornering_session()
            .apply(Msg::add_corner(0, Point::new(100.0, 100.0)))
            // Another click in the top-left quadrant.
            .apply(Msg::add_corner(0, Point::new(120.0, 130.0)));
        let corners = &state.annotation.audiograms[0].corners;
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0].position, CornerPosition::TOP_LEFT);
    }

    #[test]
    fn corner_defaults_at_the_box_extremes() {
        let state = place_all_corners(cornering_session());
        let corners = &state.annotation.audiograms[0].corners;
        assert_eq!(corners[0].position, CornerPosition::TOP_LEFT);
        assert_eq!((corners[0].frequency, corners[0].threshold), (125, -10));
        assert_eq!(corners[1].position, CornerPosition::TOP_RIGHT);
        assert_eq!((corners[1].frequency, corners[1].threshold), (8000, -10));
        assert_eq!(corners[2].position, CornerPosition::BOTTOM_LEFT);
        assert_eq!((corners[2].frequency, corners[2].threshold), (125, 120));
        assert_eq!(corners[3].position, CornerPosition::BOTTOM_RIGHT);
        assert_eq!((corners[3].frequency, corners[3].threshold), (8000, 120));
    }

    #[test]
    fn corner_frequency_cycles_with_wraparound() {
        let mut state = cornering_session().apply(Msg::add_corner(0, Point::new(100.0, 100.0)));
        let frequency = |s: &EditorState| s.annotation.audiograms[0].corners[0].frequency;
        assert_eq!(frequency(&state), 125);

        // Down from the bottom of the range wraps to the top.
        state = state.apply(Msg::cycle_corner_frequency(0, 0, StepDirection::Down));
        assert_eq!(frequency(&state), 16000);

        // Up from the top wraps back to the bottom.
        state = state.apply(Msg::cycle_corner_frequency(0, 0, StepDirection::Up));
        assert_eq!(frequency(&state), 125);

        state = state.apply(Msg::cycle_corner_frequency(0, 0, StepDirection::Up));
        assert_eq!(frequency(&state), 250);
    }

    #[test]
    fn corner_threshold_cycles_with_wraparound() {
        let mut state = cornering_session().apply(Msg::add_corner(0, Point::new(100.0, 100.0)));
        let threshold = |s: &EditorState| s.annotation.audiograms[0].corners[0].threshold;
        assert_eq!(threshold(&state), -10);

        state = state.apply(Msg::cycle_corner_threshold(0, 0, StepDirection::Down));
        assert_eq!(threshold(&state), 130);

        state = state.apply(Msg::cycle_corner_threshold(0, 0, StepDirection::Up));
        assert_eq!(threshold(&state), -10);

        state = state.apply(Msg::cycle_corner_threshold(0, 0, StepDirection::Up));
        assert_eq!(threshold(&state), -5);
    }

    #[test]
    fn out_of_range_removals_are_no_ops() {
        let state = place_all_corners(cornering_session())
            .apply(Msg::remove_corner(0, 9))
            .apply(Msg::remove_corner(7, 0))
            .apply(Msg::remove_symbol(0, 0))
            .apply(Msg::remove_label(0, 0));
        assert_eq!(state.annotation.audiograms[0].corners.len(), 4);
    }

    #[test]
    fn label_commit_opens_its_value_editor() {
        let state = place_all_corners(cornering_session())
            .apply(Msg::next_step())
            .apply(Msg::add_label(0, Point::new(110.0, 420.0)))
            .apply(Msg::resize_label_box(0, 60.0, 30.0))
            .apply(Msg::end_drag(Some(0)));
        assert_eq!(state.annotation.audiograms[0].labels.len(), 1);
        assert_eq!(
            state.interaction.edited_label,
            Some(LabelRef {
                audiogram: 0,
                label: 0
            })
        );
        assert_eq!(state.annotation.audiograms[0].labels[0].value, "unlabeled");

        let state = state.apply(Msg::set_label_value("250"));
        assert_eq!(state.annotation.audiograms[0].labels[0].value, "250");
        assert_eq!(state.interaction.edited_label, None);
    }

    #[test]
    fn undersized_label_box_is_discarded() {
        let state = place_all_corners(cornering_session())
            .apply(Msg::next_step())
            .apply(Msg::add_label(0, Point::new(110.0, 420.0)))
            .apply(Msg::resize_label_box(0, 20.0, 20.0))
            .apply(Msg::end_drag(Some(0)));
        assert!(state.annotation.audiograms[0].labels.is_empty());
        assert_eq!(state.interaction.edited_label, None);
    }

    #[test]
    fn removing_a_label_closes_the_editor() {
        let state = place_all_corners(cornering_session())
            .apply(Msg::next_step())
            .apply(Msg::add_label(0, Point::new(110.0, 420.0)))
            .apply(Msg::resize_label_box(0, 60.0, 30.0))
            .apply(Msg::end_drag(Some(0)))
            .apply(Msg::remove_label(0, 0));
        assert!(state.annotation.audiograms[0].labels.is_empty());
        assert_eq!(state.interaction.edited_label, None);
    }

    #[test]
    fn symbol_placement_requires_a_selected_type() {
        let state = symbol_session().apply(Msg::add_symbol(0, Point::new(200.0, 175.0)));
        assert!(state.annotation.audiograms[0].symbols.is_empty());

        let state = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            .apply(Msg::add_symbol(0, Point::new(200.0, 175.0)));
        let symbols = &state.annotation.audiograms[0].symbols;
        assert_eq!(symbols.len(), 1);
        assert!(symbols[0].response);
        assert_eq!(
            symbols[0].measurement_type,
            MeasurementType::AirUnmaskedLeft
        );
        assert_eq!(symbols[0].bounding_box.center(), Point::new(200.0, 175.0));
        assert_eq!(symbols[0].bounding_box.width, 30.0);
    }

    #[test]
    fn measurement_type_acts_as_radio_with_off() {
        let state =
            symbol_session().apply(Msg::set_measurement_type(MeasurementType::BoneMaskedLeft));
        assert_eq!(
            state.interaction.selected_measurement_type,
            Some(MeasurementType::BoneMaskedLeft)
        );

        let switched = state
            .clone()
            .apply(Msg::set_measurement_type(MeasurementType::AirMaskedRight));
        assert_eq!(
            switched.interaction.selected_measurement_type,
            Some(MeasurementType::AirMaskedRight)
        );

        let cleared = state.apply(Msg::set_measurement_type(MeasurementType::BoneMaskedLeft));
        assert_eq!(cleared.interaction.selected_measurement_type, None);
    }

    #[test]
    fn leaving_the_step_clears_the_selected_type() {
        let state = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            .apply(Msg::previous_step());
        assert_eq!(state.interaction.selected_measurement_type, None);
    }

    #[test]
    fn symbol_drag_follows_the_cursor() {
        let state = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            .apply(Msg::add_symbol(0, Point::new(200.0, 175.0)))
            .apply(Msg::begin_symbol_drag(0, 0, Point::new(200.0, 175.0)))
            .apply(Msg::drag_symbol(0, 0, Point::new(210.0, 180.0)))
            .apply(Msg::drag_symbol(0, 0, Point::new(215.0, 190.0)))
            .apply(Msg::end_drag(Some(0)));
        assert_eq!(
            state.annotation.audiograms[0].symbols[0].bounding_box.center(),
            Point::new(215.0, 190.0)
        );
        assert_eq!(state.interaction.drag, DragState::Idle);
    }

    #[test]
    fn symbol_resize_respects_the_minimum() {
        let placed = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            .apply(Msg::add_symbol(0, Point::new(200.0, 175.0)));

        // Placed at the minimum size: shrinking is refused.
        let state = placed.clone().apply(Msg::resize_symbol(0, 0, StepDirection::Down));
        assert_eq!(state.annotation.audiograms[0].symbols[0].bounding_box.width, 30.0);

        let state = placed
            .apply(Msg::resize_symbol(0, 0, StepDirection::Up))
            .apply(Msg::resize_symbol(0, 0, StepDirection::Up))
            .apply(Msg::resize_symbol(0, 0, StepDirection::Down));
        let bbox = state.annotation.audiograms[0].symbols[0].bounding_box;
        assert_eq!(bbox.width, 31.0);
        // Resizing is centered.
        assert_eq!(bbox.center(), Point::new(200.0, 175.0));
    }

    #[test]
    fn toggle_symbol_response() {
        let state = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            .apply(Msg::add_symbol(0, Point::new(200.0, 175.0)))
            .apply(Msg::toggle_symbol_response(0, 0));
        assert!(!state.annotation.audiograms[0].symbols[0].response);

        let state = state.apply(Msg::toggle_symbol_response(0, 0));
        assert!(state.annotation.audiograms[0].symbols[0].response);
    }

    #[test]
    fn pan_and_box_drag_are_mutually_exclusive() {
        let state = EditorState::new()
            .apply(Msg::next_step())
            .apply(Msg::add_audiogram(Point::new(100.0, 100.0)))
            .apply(Msg::begin_pan(Point::new(50.0, 50.0)));
        assert_eq!(state.interaction.drag, DragState::BoundingBox);

        // And a pan refuses a concurrent box drag.
        let state = EditorState::new()
            .apply(Msg::next_step())
            .apply(Msg::begin_pan(Point::new(50.0, 50.0)))
            .apply(Msg::add_audiogram(Point::new(100.0, 100.0)));
        assert_eq!(state.interaction.drag, DragState::Image);
        assert!(state.annotation.audiograms.is_empty());
    }

    #[test]
    fn panning_moves_the_offset_from_the_gesture_anchor() {
        let state = EditorState::new()
            .apply(Msg::begin_pan(Point::new(100.0, 100.0)))
            .apply(Msg::pan(Point::new(130.0, 90.0)))
            .apply(Msg::end_drag(None));
        assert_eq!(state.view.offset, Point::new(30.0, -10.0));
        assert_eq!(state.interaction.drag, DragState::Idle);

        // Moves without an active pan do nothing.
        let state = state.apply(Msg::pan(Point::new(500.0, 500.0)));
        assert_eq!(state.view.offset, Point::new(30.0, -10.0));
    }

    #[test]
    fn zoom_message_updates_the_view() {
        let state = EditorState::new().apply(Msg::zoom(Point::new(0.0, 0.0), ZoomDirection::In));
        assert!((state.view.zoom_factor - 0.65).abs() < 1e-12);
    }

    #[test]
    fn initialize_replaces_the_document_atomically() {
        let hydrated = place_all_corners(cornering_session()).annotation;
        let state = EditorState::new().apply(Msg::initialize_annotation(hydrated.clone()));
        assert_eq!(state.annotation, hydrated);
        assert_eq!(state.step, AnnotationStep::AnnotationSelection);
    }

    #[test]
    fn reset_returns_to_the_initial_state() {
        let state = symbol_session()
            .apply(Msg::update_comment("needs review"))
            .apply(Msg::reset());
        assert_eq!(state, EditorState::new());
    }

    #[test]
    fn mark_invalid_records_the_reason() {
        let state = EditorState::new().apply(Msg::mark_invalid("illegible scan"));
        assert!(!state.annotation.valid);
        assert_eq!(state.annotation.reason.as_deref(), Some("illegible scan"));
        assert!(state.submission().is_ok());
    }

    #[test]
    fn submission_without_a_reason_is_refused() {
        let mut state = EditorState::new();
        state.annotation.valid = false;
        assert!(state.submission().is_err());
    }

    /// The whole workflow: annotate one audiogram, calibrate, place one
    /// symbol, review and export.
    #[test]
    fn full_annotation_workflow_exports_csv() {
        let state = symbol_session()
            .apply(Msg::set_measurement_type(MeasurementType::AirUnmaskedLeft))
            // Horizontal midpoint, top quarter of the 200x300 box.
            .apply(Msg::add_symbol(0, Point::new(200.0, 175.0)))
            .apply(Msg::update_comment("clean scan"))
            .apply(Msg::next_step());
        assert_eq!(state.step, AnnotationStep::Review);

        let annotation = state.submission().unwrap();
        let thresholds =
            extract_thresholds(annotation, CalibrationSource::FirstAudiogram).unwrap();
        assert_eq!(thresholds.len(), 1);

        let csv = thresholds_to_csv(&thresholds);
        assert_eq!(
            csv,
            "ear,conduction,masking,frequency,threshold,response\n\
             left,air,false,1000,20,true\n"
        );
    }
}
