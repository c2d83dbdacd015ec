//! Complete viewer states and their shareable links.
//!
//! [`NgState`] converts an [`InputDescription`] into a [`Document`]:
//!
//! ```text
//! {
//!   "ng_link": "https://neuroglancer-demo.appspot.com/#!s3://bucket/dir/process_output.json",
//!   "dimensions": {"z": [2e-06, "m"], ...},
//!   "layers": [...],
//!   "showAxisLines": true,
//!   "showScaleBar": true
//! }
//! ```
//!
//! The document is built once and cached. Mutating dimensions or layers
//! takes effect on the next [`NgState::refresh`]; the display flags update
//! the cached document directly.
//!
//! # Example
//!
//! ```
//! use nglink_state::{InputDescription, LinkConfig, NgState};
//! use serde_json::json;
//!
//! let input = InputDescription::from_value(json!({
//!     "dimensions": {"x": {"voxel_size": 1.8, "unit": "microns"}},
//!     "layers": [{"source": "image_path.zarr", "channel": 0}]
//! }))
//! .unwrap();
//! let config = LinkConfig::builder("aind-msma-data").output_dir("/data/src").build();
//!
//! let state = NgState::new(&input, config).unwrap();
//! assert_eq!(
//!     state.url_link(),
//!     "https://neuroglancer-demo.appspot.com/#!s3://aind-msma-data/src/process_output.json"
//! );
//! assert_eq!(state.state().layers.len(), 1);
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use nglink_core::Dimensions;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::LinkConfig;
use crate::error::StateResult;
use crate::input::InputDescription;
use crate::layer::Layer;
use crate::source::SourceResolver;
use crate::writer;

/// Notebook home prefix stripped from output directories.
const NOTEBOOK_HOME: &str = "/home/jupyter/";

static REPEATED_SLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/{2,}").expect("static regex"));

/// Serialized viewer state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Link that opens this state in the viewer.
    pub ng_link: String,
    /// Output coordinate space.
    pub dimensions: Dimensions,
    /// Layers in input order.
    pub layers: Vec<Layer>,
    /// Whether axis lines are drawn.
    #[serde(rename = "showAxisLines")]
    pub show_axis_lines: bool,
    /// Whether the scale bar is drawn.
    #[serde(rename = "showScaleBar")]
    pub show_scale_bar: bool,
}

/// Builder and owner of one viewer state.
#[derive(Debug, Clone)]
pub struct NgState {
    config: LinkConfig,
    resolver: SourceResolver,
    output_dir: PathBuf,
    link: String,
    dimensions: Dimensions,
    layers: Vec<Layer>,
    show_axis_lines: bool,
    show_scale_bar: bool,
    document: Document,
}

impl NgState {
    /// Builds the state for `input`.
    ///
    /// Fails on the first axis or layer that cannot be converted.
    pub fn new(input: &InputDescription, config: LinkConfig) -> StateResult<Self> {
        let output_dir = normalize_output_dir(config.output_dir());
        let link = url_link(&config, &output_dir);
        let resolver = SourceResolver::new(config.storage().clone());

        let dimensions = Dimensions::from_specs(input.dimensions()?)?;
        let layers = build_layers(input.layers(), &dimensions, &resolver)?;
        let show_axis_lines = input.show_axis_lines()?.unwrap_or(true);
        let show_scale_bar = input.show_scale_bar()?.unwrap_or(true);

        debug!(
            link = %link,
            axes = dimensions.len(),
            layers = layers.len(),
            "built state"
        );

        let mut state = Self {
            config,
            resolver,
            output_dir,
            link,
            dimensions,
            layers,
            show_axis_lines,
            show_scale_bar,
            document: Document::default(),
        };
        state.refresh();
        Ok(state)
    }

    /// Cached document.
    #[inline]
    pub fn state(&self) -> &Document {
        &self.document
    }

    /// Rebuilds the cached document from the current fields.
    pub fn refresh(&mut self) -> &Document {
        self.document = Document {
            ng_link: self.link.clone(),
            dimensions: self.dimensions.clone(),
            layers: self.layers.clone(),
            show_axis_lines: self.show_axis_lines,
            show_scale_bar: self.show_scale_bar,
        };
        &self.document
    }

    /// Configuration the state was built with.
    #[inline]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Output coordinate space.
    #[inline]
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Replaces the output coordinate space.
    ///
    /// Existing layers keep the transforms they were built with.
    pub fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
    }

    /// Layers in order.
    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the layers.
    pub fn layers_mut(&mut self) -> &mut Vec<Layer> {
        &mut self.layers
    }

    /// Builds layers from descriptions against the current dimensions and appends them.
    pub fn add_layers(&mut self, descriptions: &[Value]) -> StateResult<()> {
        let layers = build_layers(descriptions, &self.dimensions, &self.resolver)?;
        self.layers.extend(layers);
        Ok(())
    }

    /// Whether axis lines are drawn.
    #[inline]
    pub fn show_axis_lines(&self) -> bool {
        self.show_axis_lines
    }

    /// Sets the axis lines flag.
    pub fn set_show_axis_lines(&mut self, show: bool) {
        self.show_axis_lines = show;
        self.document.show_axis_lines = show;
    }

    /// Whether the scale bar is drawn.
    #[inline]
    pub fn show_scale_bar(&self) -> bool {
        self.show_scale_bar
    }

    /// Sets the scale bar flag.
    pub fn set_show_scale_bar(&mut self, show: bool) {
        self.show_scale_bar = show;
        self.document.show_scale_bar = show;
    }

    /// Viewer link of the written state.
    #[inline]
    pub fn url_link(&self) -> &str {
        &self.link
    }

    /// Normalized output directory.
    #[inline]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the state is written to.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.config.json_name())
    }

    /// Writes the document to [`output_path`](Self::output_path), refreshing it first if `update` is set.
    pub fn save_state_as_json(&mut self, update: bool) -> StateResult<PathBuf> {
        if update {
            self.refresh();
        }
        let path = self.output_path();
        writer::save_json(&path, &self.document, self.config.verbose())?;
        Ok(path)
    }
}

fn build_layers(descriptions: &[Value], dimensions: &Dimensions, resolver: &SourceResolver) -> StateResult<Vec<Layer>> {
    descriptions
        .iter()
        .map(|desc| Layer::from_description(desc, dimensions, resolver))
        .collect()
}

/// Removes the notebook home prefix and collapses repeated slashes.
pub fn normalize_output_dir(dir: &Path) -> PathBuf {
    let text = dir.to_string_lossy().replace(NOTEBOOK_HOME, "");
    PathBuf::from(REPEATED_SLASHES.replace_all(&text, "/").into_owned())
}

/// `{base_url}#!{scheme}://{bucket}/{last dir segment}/{json_name}`.
fn url_link(config: &LinkConfig, output_dir: &Path) -> String {
    let relative = match output_dir.file_name() {
        Some(segment) => format!("{}/{}", segment.to_string_lossy(), config.json_name()),
        None => config.json_name().to_string(),
    };
    format!("{}#!{}", config.base_url(), config.storage().url(&relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nglink_core::{AxisValue, StorageScheme};
    use serde_json::json;

    fn input(extra: Value) -> InputDescription {
        let mut value = json!({
            "dimensions": {
                "z": {"voxel_size": 2.0, "unit": "microns"},
                "y": {"voxel_size": 1.8, "unit": "microns"},
                "x": {"voxel_size": 1.8, "unit": "microns"}
            },
            "layers": [{"source": "image_path.zarr", "channel": 0}]
        });
        if let (Some(root), Value::Object(extra)) = (value.as_object_mut(), extra) {
            root.extend(extra);
        }
        InputDescription::from_value(value).unwrap()
    }

    fn config() -> LinkConfig {
        LinkConfig::builder("aind-msma-data")
            .output_dir("/Users/me/repositories/aind-ng-link/src")
            .build()
    }

    #[test]
    fn link_uses_last_segment() {
        let state = NgState::new(&input(json!({})), config()).unwrap();
        assert_eq!(
            state.url_link(),
            "https://neuroglancer-demo.appspot.com/#!s3://aind-msma-data/src/process_output.json"
        );
        assert_eq!(state.state().ng_link, state.url_link());
    }

    #[test]
    fn link_with_gs_and_custom_viewer() {
        let config = LinkConfig::builder("bucket")
            .scheme(StorageScheme::Gs)
            .base_url("http://localhost:8080/")
            .json_name("state.json")
            .output_dir("results")
            .build();
        let state = NgState::new(&input(json!({})), config).unwrap();
        assert_eq!(state.url_link(), "http://localhost:8080/#!gs://bucket/results/state.json");
    }

    #[test]
    fn normalizes_output_dir() {
        assert_eq!(
            normalize_output_dir(Path::new("/home/jupyter/capsule//results////ng")),
            PathBuf::from("capsule/results/ng")
        );
        assert_eq!(normalize_output_dir(Path::new("/data/out")), PathBuf::from("/data/out"));
    }

    #[test]
    fn flags_default_true() {
        let state = NgState::new(&input(json!({})), config()).unwrap();
        assert!(state.state().show_axis_lines);
        assert!(state.state().show_scale_bar);
    }

    #[test]
    fn explicit_flags_win() {
        let state = NgState::new(
            &input(json!({"showAxisLines": false, "showScaleBar": false})),
            config(),
        )
        .unwrap();
        assert!(!state.show_axis_lines());
        assert!(!state.state().show_scale_bar);
    }

    #[test]
    fn new_matches_refresh() {
        let mut state = NgState::new(&input(json!({"showAxisLines": false})), config()).unwrap();
        let built = state.state().clone();
        assert_eq!(built.layers.len(), 1);
        assert_eq!(built.dimensions.len(), 3);
        assert!(!built.show_axis_lines);
        assert_eq!(state.refresh(), &built);
    }

    #[test]
    fn flag_setters_update_cached_document() {
        let mut state = NgState::new(&input(json!({})), config()).unwrap();
        state.set_show_scale_bar(false);
        assert!(!state.state().show_scale_bar);
        state.refresh();
        assert!(!state.state().show_scale_bar);
    }

    #[test]
    fn layer_edits_apply_on_refresh() {
        let mut state = NgState::new(&input(json!({})), config()).unwrap();
        state.add_layers(&[json!({"source": "second.zarr", "channel": 1})]).unwrap();
        state.layers_mut()[0].as_image_mut().unwrap().set_opacity(0.5);
        assert_eq!(state.state().layers.len(), 1);

        let doc = state.refresh();
        assert_eq!(doc.layers.len(), 2);
        assert_eq!(doc.layers[0].as_image().unwrap().opacity(), Some(0.5));
        assert_eq!(doc.layers[1].name(), Some("second_1"));
    }

    #[test]
    fn dimensions_apply_on_refresh() {
        let mut state = NgState::new(&input(json!({})), config()).unwrap();
        let mut dims = Dimensions::new();
        dims.insert("x", AxisValue::new(1e-6, "m"));
        state.set_dimensions(dims.clone());

        assert_eq!(state.state().dimensions.len(), 3);
        assert_eq!(state.refresh().dimensions, dims);
    }

    #[test]
    fn first_failing_layer_aborts() {
        let value = json!({
            "dimensions": {"x": {"voxel_size": 1.0, "unit": "microns"}},
            "layers": [{"source": "a.zarr"}, {"source": "b.n5"}]
        });
        let input = InputDescription::from_value(value).unwrap();
        assert!(NgState::new(&input, config()).is_err());
    }

    #[test]
    fn saves_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = LinkConfig::builder("aind-msma-data").output_dir(dir.path()).build();
        let mut state = NgState::new(&input(json!({})), config).unwrap();

        let path = state.save_state_as_json(true).unwrap();
        assert_eq!(path, dir.path().join("process_output.json"));

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ng_link"], state.url_link());
        assert_eq!(written["layers"][0]["name"], "image_path_0");
    }
}
