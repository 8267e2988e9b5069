//! Message types for authoring and study sessions
//!
//! This module contains:
//! - PointerAction for canvas pointer events
//! - AuthoringMsg and StudyMsg, dispatched by [`super::handlers`]

use crate::domain::{StudyMode, SurfaceBox};

use super::authoring::Tool;

// ============================================================================
// Pointer Types
// ============================================================================

/// Pointer event on the drawing surface
///
/// Coordinates are in image space; convert client coordinates first with
/// [`PointerAction::to_image_space`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Button pressed at position
    Down(f32, f32),
    /// Pointer moved to position
    Move(f32, f32),
    /// Button released at position
    Up(f32, f32),
    /// Pointer left the surface
    Leave,
}

impl PointerAction {
    /// Remap client coordinates of this event into image space
    pub fn to_image_space(self, surface: &SurfaceBox) -> Self {
        let map = |x: f32, y: f32| {
            let p = surface.to_image_space(x, y);
            (p.x, p.y)
        };
        match self {
            PointerAction::Down(x, y) => {
                let (x, y) = map(x, y);
                PointerAction::Down(x, y)
            }
            PointerAction::Move(x, y) => {
                let (x, y) = map(x, y);
                PointerAction::Move(x, y)
            }
            PointerAction::Up(x, y) => {
                let (x, y) = map(x, y);
                PointerAction::Up(x, y)
            }
            PointerAction::Leave => PointerAction::Leave,
        }
    }
}

// ============================================================================
// Authoring Types
// ============================================================================

/// All authoring messages
#[derive(Debug, Clone, PartialEq)]
pub enum AuthoringMsg {
    /// Canvas pointer event
    Pointer(PointerAction),
    /// Switch between select and draw
    SetTool(Tool),
    /// Select a tape from the tape list (switches to the select tool)
    Select(String),
    /// Edit the selected tape's label
    SetLabel(String),
    /// Edit the selected tape's answer
    SetAnswer(String),
    /// Remove the selected tape
    DeleteSelected,
    /// Edit the artifact title
    SetTitle(String),
    /// Choose the study mode
    SetMode(StudyMode),
    /// Bind the stored image path
    BindImage(String),
}

// ============================================================================
// Study Types
// ============================================================================

/// All study messages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StudyMsg {
    /// Click on the canvas, in image space (ALL mode)
    ClickAt(f32, f32),
    /// Show the current tape and its answer (ONE mode)
    Reveal,
    /// Advance to the next tape (ONE mode)
    Next,
    /// Go back to the previous tape (ONE mode)
    Previous,
    /// Start over
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_action_to_image_space() {
        let surface = SurfaceBox {
            left: 10.0,
            top: 20.0,
            width: 100.0,
            height: 50.0,
            intrinsic_width: 200,
            intrinsic_height: 200,
        };
        assert_eq!(
            PointerAction::Down(60.0, 45.0).to_image_space(&surface),
            PointerAction::Down(100.0, 100.0)
        );
        assert_eq!(
            PointerAction::Leave.to_image_space(&surface),
            PointerAction::Leave
        );
    }
}
