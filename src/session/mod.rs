//! Interactive session module
//!
//! This module contains:
//! - The authoring engine (draw, select, edit and save tapes)
//! - The study session (ALL and ONE reveal state machines)
//! - Message types and their handlers

pub mod authoring;
pub mod handlers;
pub mod messages;
pub mod study;

pub use authoring::{AuthoringEngine, SaveRequest, Tool, UNTITLED};
pub use handlers::{handle_authoring_msg, handle_study_msg};
pub use messages::{AuthoringMsg, PointerAction, StudyMsg};
pub use study::{RevealState, StudySession};
