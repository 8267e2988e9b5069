//! Occlusion artifact types
//!
//! All tape coordinates are stored in image space. The order of
//! [`ImageOcclusion::occlusions`] is load-bearing: it is the paint order
//! (later tapes draw on top), the hit-test priority (topmost wins) and the
//! step order of [`StudyMode::One`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::error::ValidationError;

/// One maskable region ("tape") over the image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OcclusionRect {
    /// Unique within the owning artifact, never reused
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Text painted on the tape while it is hidden
    pub label: String,
    /// Disclosed when the tape is revealed in ONE mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl OcclusionRect {
    /// Create a tape with a freshly generated id
    pub fn new(bounds: Rect, label: impl Into<String>) -> Self {
        Self {
            id: Self::fresh_id(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            label: label.into(),
            answer: None,
        }
    }

    /// Collision-free tape id
    pub fn fresh_id() -> String {
        format!("occ-{}", uuid::Uuid::new_v4())
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.bounds().contains_point(x, y)
    }

    /// The answer, if it carries any non-empty text
    pub fn answer_text(&self) -> Option<&str> {
        self.answer.as_deref().filter(|a| !a.is_empty())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(ValidationError::DegenerateTape {
                id: self.id.clone(),
                width: self.width,
                height: self.height,
            });
        }
        if !(self.x.is_finite() && self.y.is_finite()) || self.x < 0.0 || self.y < 0.0 {
            return Err(ValidationError::InvalidOrigin {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Partial edit of a tape's metadata
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectPatch {
    pub label: Option<String>,
    /// `Some(None)` clears the answer
    pub answer: Option<Option<String>>,
}

impl RectPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn answer(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        Self {
            answer: Some(if answer.is_empty() { None } else { Some(answer) }),
            ..Default::default()
        }
    }

    pub(crate) fn apply(self, rect: &mut OcclusionRect) {
        if let Some(label) = self.label {
            rect.label = label;
        }
        if let Some(answer) = self.answer {
            rect.answer = answer;
        }
    }
}

/// Study mode of an artifact
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// Every tape hidden, each revealed independently
    #[default]
    All,
    /// One tape hidden at a time, all others visible
    One,
}

impl StudyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::All => "all",
            StudyMode::One => "one",
        }
    }
}

impl std::fmt::Display for StudyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StudyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StudyMode::All),
            "one" => Ok(StudyMode::One),
            other => Err(format!("unknown study mode '{other}', expected 'all' or 'one'")),
        }
    }
}

/// One studyable artifact: an image plus its ordered tapes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOcclusion {
    pub id: u64,
    pub deck_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub image_path: String,
    pub occlusions: Vec<OcclusionRect>,
    #[serde(default)]
    pub mode: StudyMode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageOcclusion {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Study Mode")
    }
}

/// Payload for creating an artifact
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOcclusion {
    pub deck_id: u64,
    pub image_path: String,
    pub occlusions: Vec<OcclusionRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: StudyMode,
}

impl NewOcclusion {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.deck_id == 0 {
            return Err(ValidationError::InvalidDeck);
        }
        validate_tapes(&self.occlusions)
    }
}

/// Whole-field replacement update; omitted fields stay untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcclusionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occlusions: Option<Vec<OcclusionRect>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StudyMode>,
}

impl OcclusionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.image_path.is_none()
            && self.occlusions.is_none()
            && self.mode.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        match &self.occlusions {
            Some(rects) => validate_tapes(rects),
            None => Ok(()),
        }
    }

    /// Replace every supplied field on `target`
    pub fn apply(self, target: &mut ImageOcclusion) {
        if let Some(title) = self.title {
            target.title = Some(title);
        }
        if let Some(image_path) = self.image_path {
            target.image_path = image_path;
        }
        if let Some(occlusions) = self.occlusions {
            target.occlusions = occlusions;
        }
        if let Some(mode) = self.mode {
            target.mode = mode;
        }
    }
}

/// Check a full tape list before it is persisted
pub fn validate_tapes(rects: &[OcclusionRect]) -> Result<(), ValidationError> {
    if rects.is_empty() {
        return Err(ValidationError::NoTapes);
    }
    let mut seen = HashSet::with_capacity(rects.len());
    for rect in rects {
        rect.validate()?;
        if !seen.insert(rect.id.as_str()) {
            return Err(ValidationError::DuplicateTapeId(rect.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tape(id: &str, x: f32, y: f32, w: f32, h: f32) -> OcclusionRect {
        OcclusionRect {
            id: id.to_string(),
            x,
            y,
            width: w,
            height: h,
            label: id.to_string(),
            answer: None,
        }
    }

    #[test]
    fn test_fresh_ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| OcclusionRect::fresh_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_lowercase_mode() {
        let created = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let artifact = ImageOcclusion {
            id: 7,
            deck_id: 3,
            title: None,
            image_path: "occlusions/heart-1.png".to_string(),
            occlusions: vec![tape("a", 1.0, 2.0, 30.0, 40.0)],
            mode: StudyMode::One,
            created_at: created,
            updated_at: created,
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["deckId"], 3);
        assert_eq!(json["imagePath"], "occlusions/heart-1.png");
        assert_eq!(json["mode"], "one");
        assert!(json.get("title").is_none());
        assert!(json["occlusions"][0].get("answer").is_none());
        assert_eq!(json["occlusions"][0]["width"], 30.0);
    }

    #[test]
    fn test_mode_defaults_to_all_when_missing() {
        let json = r#"{"deckId":1,"imagePath":"p.png","occlusions":[]}"#;
        let new: NewOcclusion = serde_json::from_str(json).unwrap();
        assert_eq!(new.mode, StudyMode::All);
    }

    #[test]
    fn test_validate_tapes() {
        assert_eq!(validate_tapes(&[]), Err(ValidationError::NoTapes));
        assert!(validate_tapes(&[tape("a", 0.0, 0.0, 1.0, 1.0)]).is_ok());
        assert!(matches!(
            validate_tapes(&[tape("a", 0.0, 0.0, 0.0, 10.0)]),
            Err(ValidationError::DegenerateTape { .. })
        ));
        assert!(matches!(
            validate_tapes(&[tape("a", -1.0, 0.0, 5.0, 5.0)]),
            Err(ValidationError::InvalidOrigin { .. })
        ));
        assert_eq!(
            validate_tapes(&[tape("a", 0.0, 0.0, 5.0, 5.0), tape("a", 9.0, 9.0, 5.0, 5.0)]),
            Err(ValidationError::DuplicateTapeId("a".to_string()))
        );
    }

    #[test]
    fn test_patch_replaces_whole_tape_list() {
        let now = Utc::now();
        let mut artifact = ImageOcclusion {
            id: 1,
            deck_id: 1,
            title: Some("old".to_string()),
            image_path: "a.png".to_string(),
            occlusions: vec![tape("a", 0.0, 0.0, 5.0, 5.0), tape("b", 9.0, 9.0, 5.0, 5.0)],
            mode: StudyMode::All,
            created_at: now,
            updated_at: now,
        };
        let patch = OcclusionPatch {
            occlusions: Some(vec![tape("c", 1.0, 1.0, 2.0, 2.0)]),
            ..Default::default()
        };
        patch.apply(&mut artifact);
        assert_eq!(artifact.occlusions, vec![tape("c", 1.0, 1.0, 2.0, 2.0)]);
        assert_eq!(artifact.title.as_deref(), Some("old"));
        assert_eq!(artifact.image_path, "a.png");
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        assert_eq!(
            OcclusionPatch::default().validate(),
            Err(ValidationError::EmptyUpdate)
        );
    }

    #[test]
    fn test_rect_patch_answer_clears_on_empty_string() {
        let mut rect = tape("a", 0.0, 0.0, 5.0, 5.0);
        RectPatch::answer("aorta").apply(&mut rect);
        assert_eq!(rect.answer_text(), Some("aorta"));
        RectPatch::answer("").apply(&mut rect);
        assert_eq!(rect.answer, None);
    }
}
