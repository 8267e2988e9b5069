//! Pure domain types with minimal dependencies
//!
//! This module contains the occlusion data model and its geometry.
//! Types here have no rendering or persistence dependencies.

pub mod geometry;
pub mod occlusion;
pub mod rect_store;

pub use geometry::*;
pub use occlusion::*;
pub use rect_store::*;
