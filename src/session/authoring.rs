//! Authoring state: drawing, selecting and editing tapes, then saving
//!
//! The engine is a synchronous state machine driven by pointer events.
//! Saving is the only asynchronous step and is split into
//! [`AuthoringEngine::begin_save`] / [`AuthoringEngine::finish_save`] so an
//! event loop can keep the Save action disabled while a request is in flight.

use crate::domain::{
    ImageOcclusion, NewOcclusion, OcclusionPatch, OcclusionRect, Point, Rect, RectPatch,
    RectStore, StudyMode, validate_tapes,
};
use crate::error::{AuthoringError, ValidationError};
use crate::store::OcclusionStore;

/// Title used when the author leaves it blank
pub const UNTITLED: &str = "Untitled Occlusion";

/// Active canvas tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Click a tape to edit its label and answer
    Select,
    /// Drag to draw a new tape
    #[default]
    Draw,
}

/// A prepared persistence request
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    /// First save of a new artifact
    Create(NewOcclusion),
    /// Full replacement of an existing artifact's fields
    Update { id: u64, patch: OcclusionPatch },
}

impl SaveRequest {
    /// Send the request to `store`
    pub async fn send<S: OcclusionStore>(self, store: &S) -> Result<ImageOcclusion, AuthoringError> {
        match self {
            SaveRequest::Create(new) => Ok(store.create(new).await?),
            SaveRequest::Update { id, patch } => store
                .update(id, patch)
                .await?
                .ok_or(AuthoringError::Vanished(id)),
        }
    }
}

/// Clears the saving flag when dropped
struct InFlight<'a>(&'a mut bool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Authoring session for one artifact
#[derive(Debug, Clone)]
pub struct AuthoringEngine {
    deck_id: u64,
    min_tape_size: f32,
    rects: RectStore,
    tool: Tool,
    drag_anchor: Option<Point>,
    drag_current: Option<Point>,
    selected: Option<String>,
    title: String,
    mode: StudyMode,
    image_path: Option<String>,
    image_size: Option<(u32, u32)>,
    artifact_id: Option<u64>,
    saving: bool,
}

impl AuthoringEngine {
    /// Fresh session for a new artifact in `deck_id`
    pub fn new(deck_id: u64, min_tape_size: f32) -> Self {
        Self {
            deck_id,
            min_tape_size,
            rects: RectStore::new(),
            tool: Tool::default(),
            drag_anchor: None,
            drag_current: None,
            selected: None,
            title: String::new(),
            mode: StudyMode::default(),
            image_path: None,
            image_size: None,
            artifact_id: None,
            saving: false,
        }
    }

    /// Session editing an already persisted artifact; saves become updates
    pub fn from_artifact(artifact: &ImageOcclusion, min_tape_size: f32) -> Self {
        Self {
            rects: RectStore::from_rects(artifact.occlusions.clone()),
            title: artifact.title.clone().unwrap_or_default(),
            mode: artifact.mode,
            image_path: Some(artifact.image_path.clone()),
            artifact_id: Some(artifact.id),
            ..Self::new(artifact.deck_id, min_tape_size)
        }
    }

    pub fn rects(&self) -> &RectStore {
        &self.rects
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&OcclusionRect> {
        self.selected.as_deref().and_then(|id| self.rects.get(id))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    /// Id of the persisted artifact, once saved at least once
    pub fn artifact_id(&self) -> Option<u64> {
        self.artifact_id
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Normalized rectangle of the drag in progress
    pub fn preview(&self) -> Option<Rect> {
        let anchor = self.drag_anchor?;
        let current = self.drag_current.unwrap_or(anchor);
        Rect::from_corners(anchor, current).intersect(self.canvas())
    }

    /// Switch tools; any drag in progress is abandoned
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.cancel_drag();
    }

    pub fn bind_image(&mut self, path: impl Into<String>) {
        self.image_path = Some(path.into());
    }

    /// Natural size of the decoded base image; tapes are clipped to it
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_size = Some((width, height));
    }

    /// Image-space area tapes may cover
    ///
    /// Unbounded to the right and bottom until the image size is known.
    fn canvas(&self) -> Rect {
        match self.image_size {
            Some((w, h)) => Rect::new(0.0, 0.0, w as f32, h as f32),
            None => Rect::new(0.0, 0.0, f32::INFINITY, f32::INFINITY),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_mode(&mut self, mode: StudyMode) {
        self.mode = mode;
    }

    pub fn pointer_down(&mut self, at: Point) {
        match self.tool {
            Tool::Select => self.select_at(at),
            Tool::Draw => {
                self.drag_anchor = Some(at);
                self.drag_current = Some(at);
            }
        }
    }

    pub fn pointer_move(&mut self, at: Point) {
        if self.tool == Tool::Draw && self.drag_anchor.is_some() {
            self.drag_current = Some(at);
        }
    }

    /// Finish a drag; returns the id of the committed tape, if one was big enough
    pub fn pointer_up(&mut self, at: Point) -> Option<String> {
        if self.tool != Tool::Draw {
            return None;
        }
        let anchor = self.drag_anchor.take()?;
        self.drag_current = None;

        let Some(bounds) = Rect::from_corners(anchor, at).intersect(self.canvas()) else {
            log::debug!("Discarding drag entirely outside the image");
            return None;
        };
        if !bounds.exceeds(self.min_tape_size) {
            log::debug!(
                "Discarding {}x{} drag below the {}px minimum",
                bounds.width,
                bounds.height,
                self.min_tape_size
            );
            return None;
        }

        let label = (self.rects.len() + 1).to_string();
        let rect = OcclusionRect::new(bounds, label);
        let id = rect.id.clone();
        log::debug!("Committed tape {} at {:?}", id, bounds);
        self.rects.add(rect);
        self.selected = Some(id.clone());
        Some(id)
    }

    /// Pointer left the surface: a drag in progress is abandoned
    pub fn pointer_leave(&mut self) {
        self.cancel_drag();
    }

    /// Select the topmost tape under the point, or clear the selection
    pub fn select_at(&mut self, at: Point) {
        self.selected = self.rects.find_at_point(at.x, at.y).map(|r| r.id.clone());
    }

    /// Select a tape by id and switch to the select tool
    pub fn select_by_id(&mut self, id: &str) -> bool {
        if self.rects.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        self.set_tool(Tool::Select);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Edit the selected tape's label; false when nothing is selected
    pub fn set_label(&mut self, label: impl Into<String>) -> bool {
        self.update_selected(RectPatch::label(label))
    }

    /// Edit the selected tape's answer; an empty string clears it
    pub fn set_answer(&mut self, answer: impl Into<String>) -> bool {
        self.update_selected(RectPatch::answer(answer))
    }

    /// Remove the selected tape and clear the selection
    pub fn delete_selected(&mut self) -> Option<OcclusionRect> {
        let id = self.selected.take()?;
        self.rects.remove_by_id(&id)
    }

    /// Validate and mark a save as in flight
    ///
    /// Fails without side effects when a save is already outstanding, no
    /// image is bound, or there are no tapes.
    pub fn begin_save(&mut self) -> Result<SaveRequest, AuthoringError> {
        if self.saving {
            return Err(AuthoringError::SaveInFlight);
        }
        let image_path = match self.image_path.as_deref() {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => return Err(ValidationError::NoImage.into()),
        };
        validate_tapes(self.rects.all())?;

        let title = if self.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            self.title.clone()
        };
        let occlusions = self.rects.all().to_vec();

        let request = match self.artifact_id {
            None => SaveRequest::Create(NewOcclusion {
                deck_id: self.deck_id,
                image_path,
                occlusions,
                title: Some(title),
                mode: self.mode,
            }),
            Some(id) => SaveRequest::Update {
                id,
                patch: OcclusionPatch {
                    title: Some(title),
                    image_path: Some(image_path),
                    occlusions: Some(occlusions),
                    mode: Some(self.mode),
                },
            },
        };
        self.saving = true;
        Ok(request)
    }

    /// Record the outcome of a save started with [`Self::begin_save`]
    ///
    /// Tapes and metadata are kept either way so a failed save can be retried.
    pub fn finish_save(
        &mut self,
        result: Result<ImageOcclusion, AuthoringError>,
    ) -> Result<ImageOcclusion, AuthoringError> {
        self.saving = false;
        match &result {
            Ok(saved) => {
                log::info!("Saved occlusion {} with {} tapes", saved.id, saved.occlusions.len());
                self.artifact_id = Some(saved.id);
            }
            Err(err) => log::error!("Failed to save occlusion: {}", err),
        }
        result
    }

    /// Validate, send and record a save in one step
    ///
    /// Dropping the future before it resolves abandons the save and clears
    /// the in-flight flag, so a later save can go ahead.
    pub async fn save<S: OcclusionStore>(&mut self, store: &S) -> Result<ImageOcclusion, AuthoringError> {
        let request = self.begin_save()?;
        let result = {
            let _in_flight = InFlight(&mut self.saving);
            request.send(store).await
        };
        self.finish_save(result)
    }

    fn update_selected(&mut self, patch: RectPatch) -> bool {
        match self.selected.as_deref() {
            Some(id) => self.rects.update_by_id(id, patch),
            None => false,
        }
    }

    fn cancel_drag(&mut self) {
        self.drag_anchor = None;
        self.drag_current = None;
    }
}
