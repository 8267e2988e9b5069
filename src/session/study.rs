//! Study state: the two reveal state machines
//!
//! ALL mode hides every tape and reveals them independently on click.
//! ONE mode hides only the tape at the current step while every other tape
//! stays visible, stepping through tapes in store order.

use std::collections::HashSet;

use crate::domain::{ImageOcclusion, OcclusionRect, RectStore, StudyMode};
use crate::render::Visibility;

/// Reveal state for the artifact's mode
#[derive(Debug, Clone, PartialEq)]
pub enum RevealState {
    All {
        revealed: HashSet<String>,
    },
    One {
        current_index: usize,
        answer_shown: bool,
    },
}

impl RevealState {
    fn initial(mode: StudyMode) -> Self {
        match mode {
            StudyMode::All => RevealState::All {
                revealed: HashSet::new(),
            },
            StudyMode::One => RevealState::One {
                current_index: 0,
                answer_shown: false,
            },
        }
    }
}

/// Study session over one persisted artifact
///
/// The tapes are read-only here; only the reveal state changes.
#[derive(Debug, Clone)]
pub struct StudySession {
    artifact_id: u64,
    title: Option<String>,
    mode: StudyMode,
    rects: RectStore,
    state: RevealState,
}

impl StudySession {
    pub fn new(artifact: &ImageOcclusion) -> Self {
        Self {
            artifact_id: artifact.id,
            title: artifact.title.clone(),
            mode: artifact.mode,
            rects: RectStore::from_rects(artifact.occlusions.clone()),
            state: RevealState::initial(artifact.mode),
        }
    }

    pub fn artifact_id(&self) -> u64 {
        self.artifact_id
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Study Mode")
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    pub fn rects(&self) -> &[OcclusionRect] {
        self.rects.all()
    }

    pub fn total(&self) -> usize {
        self.rects.len()
    }

    /// No tapes: only the base image is shown and every control is disabled
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// How `rect` should be painted in the current state
    pub fn visibility(&self, rect: &OcclusionRect) -> Visibility {
        match &self.state {
            RevealState::All { revealed } => {
                if revealed.contains(&rect.id) {
                    Visibility::Revealed
                } else {
                    Visibility::Hidden
                }
            }
            RevealState::One {
                current_index,
                answer_shown,
            } => {
                let is_current = self
                    .rects
                    .all()
                    .get(*current_index)
                    .is_some_and(|current| current.id == rect.id);
                // Current card is drawn with the highlight style
                if is_current && !answer_shown {
                    Visibility::Selected
                } else {
                    Visibility::Revealed
                }
            }
        }
    }

    /// Reveal the topmost tape under an image-space point (ALL mode)
    ///
    /// Returns true if a previously hidden tape was revealed.
    pub fn click_at(&mut self, x: f32, y: f32) -> bool {
        let RevealState::All { revealed } = &mut self.state else {
            return false;
        };
        let Some(hit) = self.rects.find_at_point(x, y) else {
            return false;
        };
        let newly = revealed.insert(hit.id.clone());
        if newly {
            log::debug!("Revealed tape {} ({}/{})", hit.id, revealed.len(), self.rects.len());
        }
        newly
    }

    /// Show the current tape (ONE mode); returns its answer, if any
    pub fn reveal(&mut self) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        let RevealState::One { answer_shown, .. } = &mut self.state else {
            return None;
        };
        *answer_shown = true;
        self.disclosed_answer()
    }

    /// Step forward, clamped at the last tape (ONE mode)
    pub fn next(&mut self) {
        let last = self.rects.len().saturating_sub(1);
        if let RevealState::One {
            current_index,
            answer_shown,
        } = &mut self.state
        {
            if self.rects.is_empty() {
                return;
            }
            *current_index = (*current_index + 1).min(last);
            *answer_shown = false;
        }
    }

    /// Step back, clamped at the first tape (ONE mode)
    pub fn previous(&mut self) {
        if let RevealState::One {
            current_index,
            answer_shown,
        } = &mut self.state
        {
            if self.rects.is_empty() {
                return;
            }
            *current_index = current_index.saturating_sub(1);
            *answer_shown = false;
        }
    }

    /// Return to the initial state of the mode
    pub fn reset(&mut self) {
        self.state = RevealState::initial(self.mode);
    }

    /// Completion indicator; never set for an empty artifact
    pub fn is_complete(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        match &self.state {
            RevealState::All { revealed } => revealed.len() == self.rects.len(),
            RevealState::One {
                current_index,
                answer_shown,
            } => *current_index == self.rects.len() - 1 && *answer_shown,
        }
    }

    /// Number of tapes revealed so far (ALL mode)
    pub fn revealed_count(&self) -> usize {
        match &self.state {
            RevealState::All { revealed } => revealed.len(),
            RevealState::One { .. } => 0,
        }
    }

    /// Current step (ONE mode)
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            RevealState::One { current_index, .. } if !self.is_empty() => Some(*current_index),
            _ => None,
        }
    }

    pub fn answer_shown(&self) -> bool {
        matches!(self.state, RevealState::One { answer_shown: true, .. })
    }

    /// Tape at the current step (ONE mode)
    pub fn current(&self) -> Option<&OcclusionRect> {
        self.current_index().and_then(|i| self.rects.all().get(i))
    }

    /// Answer to show in the answer panel, once the current tape is revealed
    pub fn disclosed_answer(&self) -> Option<&str> {
        if !self.answer_shown() {
            return None;
        }
        self.current().and_then(|r| r.answer_text())
    }

    pub fn can_next(&self) -> bool {
        self.current_index()
            .is_some_and(|i| i + 1 < self.rects.len())
    }

    pub fn can_previous(&self) -> bool {
        self.current_index().is_some_and(|i| i > 0)
    }

    /// One-line progress summary for the controls area
    pub fn progress_text(&self) -> String {
        if self.is_empty() {
            return "This occlusion has no tapes".to_string();
        }
        match &self.state {
            RevealState::All { revealed } => {
                let mut text = format!("{} / {} revealed", revealed.len(), self.rects.len());
                if self.is_complete() {
                    text.push_str(" - all revealed!");
                }
                text
            }
            RevealState::One {
                current_index,
                answer_shown,
            } => {
                let status = if self.is_complete() {
                    "completed all cards!"
                } else if *answer_shown {
                    "answer revealed"
                } else {
                    "click reveal to see the answer"
                };
                format!("Card {} of {} - {}", current_index + 1, self.rects.len(), status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tape(id: &str, x: f32, answer: Option<&str>) -> OcclusionRect {
        OcclusionRect {
            id: id.to_string(),
            x,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            label: id.to_string(),
            answer: answer.map(str::to_string),
        }
    }

    fn artifact(mode: StudyMode, occlusions: Vec<OcclusionRect>) -> ImageOcclusion {
        let now = Utc::now();
        ImageOcclusion {
            id: 9,
            deck_id: 1,
            title: Some("Heart".to_string()),
            image_path: "occlusions/heart.png".to_string(),
            occlusions,
            mode,
            created_at: now,
            updated_at: now,
        }
    }

    fn three(mode: StudyMode) -> StudySession {
        StudySession::new(&artifact(
            mode,
            vec![
                tape("r0", 0.0, Some("aorta")),
                tape("r1", 100.0, None),
                tape("r2", 200.0, Some("")),
            ],
        ))
    }

    #[test]
    fn test_all_mode_starts_fully_hidden() {
        let session = three(StudyMode::All);
        assert!(session.rects().iter().all(|r| session.visibility(r) == Visibility::Hidden));
        assert!(!session.is_complete());
    }

    #[test]
    fn test_all_mode_completion_ignores_duplicate_clicks() {
        let mut session = three(StudyMode::All);
        assert!(session.click_at(205.0, 5.0));
        assert!(!session.click_at(210.0, 10.0));
        assert!(session.click_at(5.0, 5.0));
        assert!(!session.is_complete());
        assert!(session.click_at(110.0, 10.0));
        assert!(!session.click_at(5.0, 5.0));

        assert_eq!(session.revealed_count(), 3);
        assert!(session.is_complete());
        assert!(session.rects().iter().all(|r| session.visibility(r) == Visibility::Revealed));
        assert_eq!(session.progress_text(), "3 / 3 revealed - all revealed!");
    }

    #[test]
    fn test_all_mode_click_on_nothing() {
        let mut session = three(StudyMode::All);
        assert!(!session.click_at(50.0, 50.0));
        assert_eq!(session.revealed_count(), 0);
    }

    #[test]
    fn test_all_mode_reset_clears_reveals() {
        let mut session = three(StudyMode::All);
        session.click_at(5.0, 5.0);
        session.reset();
        assert_eq!(session.revealed_count(), 0);
        assert_eq!(session.visibility(&session.rects()[0].clone()), Visibility::Hidden);
    }

    #[test]
    fn test_all_mode_ignores_one_mode_events() {
        let mut session = three(StudyMode::All);
        assert_eq!(session.reveal(), None);
        session.next();
        assert_eq!(session.current_index(), None);
        assert!(!session.can_next());
    }

    #[test]
    fn test_one_mode_isolation() {
        let mut session = three(StudyMode::One);
        session.next();
        assert_eq!(session.current_index(), Some(1));

        for shown in [false, true] {
            if shown {
                session.reveal();
            }
            let vis: Vec<_> = session.rects().iter().map(|r| session.visibility(r)).collect();
            let expected_current = if shown { Visibility::Revealed } else { Visibility::Selected };
            assert_eq!(vis, [Visibility::Revealed, expected_current, Visibility::Revealed]);
        }
    }

    #[test]
    fn test_one_mode_reveal_discloses_answer() {
        let mut session = three(StudyMode::One);
        assert_eq!(session.disclosed_answer(), None);
        assert_eq!(session.reveal(), Some("aorta"));
        assert!(session.answer_shown());

        // Tapes without an answer, or with an empty one, disclose nothing
        session.next();
        assert!(!session.answer_shown());
        assert_eq!(session.reveal(), None);
        session.next();
        assert_eq!(session.reveal(), None);
    }

    #[test]
    fn test_one_mode_navigation_clamps() {
        let mut session = three(StudyMode::One);
        session.previous();
        assert_eq!(session.current_index(), Some(0));
        assert!(!session.can_previous());

        session.next();
        session.next();
        session.next();
        assert_eq!(session.current_index(), Some(2));
        assert!(!session.can_next());
        assert!(session.can_previous());
    }

    #[test]
    fn test_one_mode_completion_keeps_navigation_free() {
        let mut session = three(StudyMode::One);
        session.next();
        session.next();
        assert!(!session.is_complete());
        session.reveal();
        assert!(session.is_complete());
        assert_eq!(session.progress_text(), "Card 3 of 3 - completed all cards!");

        session.previous();
        assert_eq!(session.current_index(), Some(1));
        assert!(!session.answer_shown());
        assert!(!session.is_complete());
    }

    #[test]
    fn test_one_mode_reset() {
        let mut session = three(StudyMode::One);
        session.next();
        session.reveal();
        session.reset();
        assert_eq!(session.current_index(), Some(0));
        assert!(!session.answer_shown());
    }

    #[test]
    fn test_one_mode_ignores_clicks() {
        let mut session = three(StudyMode::One);
        assert!(!session.click_at(5.0, 5.0));
    }

    #[test]
    fn test_empty_artifact_disables_everything() {
        for mode in [StudyMode::All, StudyMode::One] {
            let mut session = StudySession::new(&artifact(mode, Vec::new()));
            assert!(session.is_empty());
            assert!(!session.click_at(0.0, 0.0));
            assert_eq!(session.reveal(), None);
            session.next();
            session.previous();
            assert!(!session.is_complete());
            assert!(!session.can_next());
            assert!(!session.can_previous());
            assert_eq!(session.progress_text(), "This occlusion has no tapes");
        }
    }
}
