//! Annotation session state machine
//!
//! This module contains:
//! - Session state management (workflow step, view, interaction, document)
//! - Message types for annotation interactions
//! - Message handlers

pub mod messages;
pub mod state;

mod handlers;

pub use messages::*;
pub use state::*;
