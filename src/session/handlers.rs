//! Session message handlers
//!
//! Handles AuthoringMsg and StudyMsg by driving the matching state machine.

use crate::domain::Point;
use crate::session::authoring::AuthoringEngine;
use crate::session::messages::{AuthoringMsg, PointerAction, StudyMsg};
use crate::session::study::StudySession;

/// Handle an AuthoringMsg, modifying the engine
pub fn handle_authoring_msg(engine: &mut AuthoringEngine, msg: AuthoringMsg) {
    match msg {
        AuthoringMsg::Pointer(action) => handle_pointer(engine, action),
        AuthoringMsg::SetTool(tool) => engine.set_tool(tool),
        AuthoringMsg::Select(id) => {
            if !engine.select_by_id(&id) {
                log::warn!("Ignoring selection of unknown tape {}", id);
            }
        }
        AuthoringMsg::SetLabel(label) => {
            engine.set_label(label);
        }
        AuthoringMsg::SetAnswer(answer) => {
            engine.set_answer(answer);
        }
        AuthoringMsg::DeleteSelected => {
            if let Some(removed) = engine.delete_selected() {
                log::debug!("Deleted tape {}", removed.id);
            }
        }
        AuthoringMsg::SetTitle(title) => engine.set_title(title),
        AuthoringMsg::SetMode(mode) => engine.set_mode(mode),
        AuthoringMsg::BindImage(path) => engine.bind_image(path),
    }
}

// ============================================================================
// Pointer handlers
// ============================================================================

fn handle_pointer(engine: &mut AuthoringEngine, action: PointerAction) {
    match action {
        PointerAction::Down(x, y) => engine.pointer_down(Point::new(x, y)),
        PointerAction::Move(x, y) => engine.pointer_move(Point::new(x, y)),
        PointerAction::Up(x, y) => {
            engine.pointer_up(Point::new(x, y));
        }
        PointerAction::Leave => engine.pointer_leave(),
    }
}

// ============================================================================
// Study handlers
// ============================================================================

/// Handle a StudyMsg, modifying the session
pub fn handle_study_msg(session: &mut StudySession, msg: StudyMsg) {
    match msg {
        StudyMsg::ClickAt(x, y) => {
            session.click_at(x, y);
        }
        StudyMsg::Reveal => {
            session.reveal();
        }
        StudyMsg::Next => session.next(),
        StudyMsg::Previous => session.previous(),
        StudyMsg::Reset => session.reset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImageOcclusion, StudyMode};
    use crate::session::Tool;

    #[test]
    fn test_drag_then_edit_through_messages() {
        let mut engine = AuthoringEngine::new(1, 10.0);
        for msg in [
            AuthoringMsg::Pointer(PointerAction::Down(10.0, 10.0)),
            AuthoringMsg::Pointer(PointerAction::Move(40.0, 30.0)),
            AuthoringMsg::Pointer(PointerAction::Up(60.0, 40.0)),
            AuthoringMsg::SetLabel("mitral valve".to_string()),
            AuthoringMsg::SetAnswer("left side".to_string()),
        ] {
            handle_authoring_msg(&mut engine, msg);
        }

        let rect = &engine.rects().all()[0];
        assert_eq!(rect.label, "mitral valve");
        assert_eq!(rect.answer.as_deref(), Some("left side"));
        assert_eq!((rect.width, rect.height), (50.0, 30.0));
    }

    #[test]
    fn test_leave_cancels_drag() {
        let mut engine = AuthoringEngine::new(1, 10.0);
        handle_authoring_msg(&mut engine, AuthoringMsg::Pointer(PointerAction::Down(10.0, 10.0)));
        handle_authoring_msg(&mut engine, AuthoringMsg::Pointer(PointerAction::Leave));
        handle_authoring_msg(&mut engine, AuthoringMsg::Pointer(PointerAction::Up(80.0, 80.0)));
        assert!(engine.rects().is_empty());
    }

    #[test]
    fn test_select_from_list_switches_tool() {
        let mut engine = AuthoringEngine::new(1, 10.0);
        handle_authoring_msg(&mut engine, AuthoringMsg::Pointer(PointerAction::Down(0.0, 0.0)));
        handle_authoring_msg(&mut engine, AuthoringMsg::Pointer(PointerAction::Up(20.0, 20.0)));
        let id = engine.rects().all()[0].id.clone();
        engine.clear_selection();

        handle_authoring_msg(&mut engine, AuthoringMsg::Select(id.clone()));
        assert_eq!(engine.tool(), Tool::Select);
        assert_eq!(engine.selected_id(), Some(id.as_str()));

        handle_authoring_msg(&mut engine, AuthoringMsg::DeleteSelected);
        assert!(engine.rects().is_empty());
        assert_eq!(engine.selected_id(), None);
    }

    #[test]
    fn test_study_messages_drive_one_mode() {
        let now = chrono::Utc::now();
        let mut first = crate::domain::OcclusionRect::new(
            crate::domain::Rect::new(0.0, 0.0, 20.0, 20.0),
            "1",
        );
        first.answer = Some("aorta".to_string());
        let second =
            crate::domain::OcclusionRect::new(crate::domain::Rect::new(50.0, 0.0, 20.0, 20.0), "2");
        let artifact = ImageOcclusion {
            id: 3,
            deck_id: 1,
            title: None,
            image_path: "occlusions/a.png".to_string(),
            occlusions: vec![first, second],
            mode: StudyMode::One,
            created_at: now,
            updated_at: now,
        };
        let mut session = StudySession::new(&artifact);

        handle_study_msg(&mut session, StudyMsg::Reveal);
        assert_eq!(session.disclosed_answer(), Some("aorta"));
        handle_study_msg(&mut session, StudyMsg::Next);
        handle_study_msg(&mut session, StudyMsg::Reveal);
        assert!(session.is_complete());
        handle_study_msg(&mut session, StudyMsg::Reset);
        assert_eq!(session.current_index(), Some(0));
        assert!(!session.answer_shown());
    }
}
