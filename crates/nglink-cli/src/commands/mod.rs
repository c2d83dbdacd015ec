//! CLI command implementations

pub mod build;
pub mod points;

use anyhow::{Context, Result};
use nglink_state::InputDescription;
use std::path::Path;

/// Load an input description from path
pub fn load_input(path: &Path) -> Result<InputDescription> {
    InputDescription::from_file(path).with_context(|| format!("Failed to load: {}", path.display()))
}
