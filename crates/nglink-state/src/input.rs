//! Input descriptions of a viewer state.
//!
//! A description holds the output `dimensions`, the `layers` and the two
//! optional display flags:
//!
//! ```yaml
//! dimensions:
//!   z: {voxel_size: 2.0, unit: microns}
//!   y: {voxel_size: 1.8, unit: microns}
//!   x: {voxel_size: 1.8, unit: microns}
//!   t: {voxel_size: 0.001, unit: seconds}
//! layers:
//!   - source: image_path.zarr
//!     channel: 0
//!     shader: {color: green, emitter: RGB, vec: vec3}
//! showScaleBar: false
//! ```
//!
//! Key order of the file is kept, since it fixes axis and layer order.

use std::fs;
use std::path::Path;

use nglink_core::AxisSpec;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{StateError, StateResult};

/// Key of the output dimensions.
pub const DIMENSIONS_KEY: &str = "dimensions";
/// Key of the layer list.
pub const LAYERS_KEY: &str = "layers";
/// Key of the axis lines flag.
pub const SHOW_AXIS_LINES_KEY: &str = "showAxisLines";
/// Key of the scale bar flag.
pub const SHOW_SCALE_BAR_KEY: &str = "showScaleBar";

/// Validated top-level input of a state build.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDescription {
    root: Map<String, Value>,
}

impl InputDescription {
    /// Loads a `.json`, `.yaml` or `.yml` description.
    pub fn from_file<P: AsRef<Path>>(path: P) -> StateResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        debug!(path = %path.display(), "loading input description");
        match ext.as_str() {
            "json" => Self::from_json_str(&text),
            "yaml" | "yml" => Self::from_yaml_str(&text),
            _ => Err(StateError::malformed(
                "input description must be a .json, .yaml or .yml file",
                Value::String(path.display().to_string()),
            )),
        }
    }

    /// Parses a JSON description.
    pub fn from_json_str(text: &str) -> StateResult<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Parses a YAML description.
    pub fn from_yaml_str(text: &str) -> StateResult<Self> {
        Self::from_value(serde_yaml::from_str(text)?)
    }

    /// Validates an already parsed description.
    pub fn from_value(value: Value) -> StateResult<Self> {
        let Value::Object(root) = value else {
            return Err(StateError::malformed("input description must be an object", value));
        };

        match root.get(DIMENSIONS_KEY) {
            Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(StateError::malformed("dimensions must be an object", other.clone()));
            }
            None => {
                return Err(StateError::malformed("input requires 'dimensions'", Value::Object(root)));
            }
        }
        match root.get(LAYERS_KEY) {
            Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(StateError::malformed("layers accepts only a list", other.clone()));
            }
            None => {
                return Err(StateError::malformed("input requires 'layers'", Value::Object(root)));
            }
        }

        let input = Self { root };
        input.show_axis_lines()?;
        input.show_scale_bar()?;
        Ok(input)
    }

    /// Axis specs in input order.
    pub fn dimensions(&self) -> StateResult<Vec<(String, AxisSpec)>> {
        let Some(Value::Object(axes)) = self.root.get(DIMENSIONS_KEY) else {
            return Ok(Vec::new());
        };
        axes.iter()
            .map(|(name, raw)| {
                let spec = serde_json::from_value(raw.clone()).map_err(|e| {
                    StateError::malformed(format!("axis '{name}' needs {{voxel_size, unit}}: {e}"), raw.clone())
                })?;
                Ok((name.clone(), spec))
            })
            .collect()
    }

    /// Raw layer descriptions in input order.
    pub fn layers(&self) -> &[Value] {
        match self.root.get(LAYERS_KEY) {
            Some(Value::Array(layers)) => layers,
            _ => &[],
        }
    }

    /// Explicit `showAxisLines`, if given.
    pub fn show_axis_lines(&self) -> StateResult<Option<bool>> {
        self.flag(SHOW_AXIS_LINES_KEY)
    }

    /// Explicit `showScaleBar`, if given.
    pub fn show_scale_bar(&self) -> StateResult<Option<bool>> {
        self.flag(SHOW_SCALE_BAR_KEY)
    }

    fn flag(&self, key: &str) -> StateResult<Option<bool>> {
        match self.root.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(StateError::malformed(format!("{key} must be a boolean"), other.clone())),
        }
    }
}
