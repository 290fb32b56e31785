//! Editor tooling: the scene inspector model and scene description files.
//!
//! # Invariants
//! - The inspector holds only a selection; all scene data lives in the
//!   `ComponentStore`.
//! - Transform edits always write an invertible `translate * scale` matrix.

mod inspector;
mod scene_file;

pub use inspector::{
    EntityListItem, InspectorError, MAX_EDIT_SCALE, MIN_EDIT_SCALE, SceneInspector, SceneSummary,
    TransformFields,
};
pub use scene_file::{
    CameraDescription, ChunkDescription, EntityDescription, MaterialDescription, ModelDescription,
    SceneDescription, SceneFileError, ShapeDescription, TransformDescription,
};

pub fn crate_info() -> &'static str {
    "lumen-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
