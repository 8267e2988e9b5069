//! Ordered in-memory tape collection for one artifact

use super::occlusion::{OcclusionRect, RectPatch};

/// Tapes of one artifact, in paint order
///
/// Index 0 is painted first; the last tape is topmost. Lookups by point
/// therefore scan from the back.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectStore {
    rects: Vec<OcclusionRect>,
}

impl RectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rects(rects: Vec<OcclusionRect>) -> Self {
        Self { rects }
    }

    pub fn into_rects(self) -> Vec<OcclusionRect> {
        self.rects
    }

    /// Append a tape on top of all existing ones
    pub fn add(&mut self, rect: OcclusionRect) {
        self.rects.push(rect);
    }

    /// Apply `patch` to the tape with `id`; returns false if there is none
    pub fn update_by_id(&mut self, id: &str, patch: RectPatch) -> bool {
        match self.rects.iter_mut().find(|r| r.id == id) {
            Some(rect) => {
                patch.apply(rect);
                true
            }
            None => false,
        }
    }

    /// Remove and return the tape with `id`, keeping the order of the rest
    pub fn remove_by_id(&mut self, id: &str) -> Option<OcclusionRect> {
        let index = self.index_of(id)?;
        Some(self.rects.remove(index))
    }

    /// Topmost tape containing the point, if any
    pub fn find_at_point(&self, x: f32, y: f32) -> Option<&OcclusionRect> {
        self.rects.iter().rev().find(|r| r.contains_point(x, y))
    }

    pub fn get(&self, id: &str) -> Option<&OcclusionRect> {
        self.rects.iter().find(|r| r.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.rects.iter().position(|r| r.id == id)
    }

    pub fn all(&self) -> &[OcclusionRect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}
