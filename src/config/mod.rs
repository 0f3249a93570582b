pub mod project;

use crate::lower::DEFAULT_VECTOR_TYPE;

/// Default lane-count expression used to size vectorized fields.
pub const DEFAULT_LANES: &str = "NUM_SRC_NODES";

/// Options controlling one conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Propagate per-message track masks. Off means "track-free" output.
    pub tracking: bool,
    /// Vector template for fields and masks.
    pub vector_type: String,
    /// Lane-count expression for vector constructors.
    pub lanes: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tracking: true,
            vector_type: DEFAULT_VECTOR_TYPE.to_string(),
            lanes: DEFAULT_LANES.to_string(),
        }
    }
}

impl ConvertOptions {
    /// Options from a project file, falling back to defaults per key.
    pub fn from_project(project: &project::Project) -> Self {
        let defaults = Self::default();
        Self {
            tracking: !project.track_free.unwrap_or(false),
            vector_type: project.vector_type.clone().unwrap_or(defaults.vector_type),
            lanes: project.lanes.clone().unwrap_or(defaults.lanes),
        }
    }
}
