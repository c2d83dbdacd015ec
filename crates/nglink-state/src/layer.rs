//! Viewer layers built from loosely structured layer descriptions.
//!
//! A description is a JSON object tagged by `type`:
//!
//! ```text
//! {
//!     "type": "image",                       // optional, defaults to image
//!     "source": "image_path.zarr",           // or a list of tiles
//!     "channel": 0,                          // optional
//!     "name": "image_name",                  // optional
//!     "shader": {"color": "green", "emitter": "RGB", "vec": "vec3"},
//!     "shaderControls": {"normalized": {"range": [0, 200]}},
//!     "visible": true,                       // optional
//!     "opacity": 0.5                         // optional
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use nglink_core::{Dimensions, StorageLocation, StorageScheme};
//! use nglink_state::{Layer, SourceResolver};
//! use serde_json::json;
//!
//! let resolver = SourceResolver::new(StorageLocation::new(StorageScheme::S3, "aind-msma-data"));
//! let desc = json!({"type": "image", "source": "image_path.zarr", "channel": 1});
//!
//! let layer = Layer::from_description(&desc, &Dimensions::new(), &resolver).unwrap();
//! let image = layer.as_image().unwrap();
//! assert_eq!(image.name(), "image_path_1");
//! assert_eq!(image.channel(), 1);
//! ```

use nglink_core::{CHANNEL_AXIS, Dimensions};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::points::Point;
use crate::shader::ShaderSpec;
use crate::source::{ImageSource, SourceResolver};

/// Layer type tag of image layers.
pub const IMAGE_LAYER: &str = "image";

/// Layer type tag of annotation layers.
pub const ANNOTATION_LAYER: &str = "annotation";

/// Shader controls applied when a description does not set any.
pub fn default_shader_controls() -> Map<String, Value> {
    let mut controls = Map::new();
    controls.insert("normalized".into(), json!({"range": [0, 200]}));
    controls
}

/// One layer of a viewer state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    /// Remote image volume.
    Image(ImageLayer),
    /// Point annotations.
    Annotation(AnnotationLayer),
}

impl Layer {
    /// Builds a layer, dispatching on the description's `type`.
    pub fn from_description(
        desc: &Value,
        output_dims: &Dimensions,
        resolver: &SourceResolver,
    ) -> StateResult<Self> {
        let Value::Object(entries) = desc else {
            return Err(StateError::malformed("layer description must be an object", desc.clone()));
        };

        let kind = match entries.get("type") {
            None => IMAGE_LAYER,
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => {
                return Err(StateError::malformed("layer type must be a string", other.clone()));
            }
        };

        match kind {
            IMAGE_LAYER => Ok(Self::Image(ImageLayer::from_description(entries, output_dims, resolver)?)),
            ANNOTATION_LAYER => Ok(Self::Annotation(AnnotationLayer::from_description(entries)?)),
            _ => Err(StateError::malformed(
                "layer type must be 'image' or 'annotation'",
                Value::String(kind.to_string()),
            )),
        }
    }

    /// Type tag of the layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => IMAGE_LAYER,
            Self::Annotation(_) => ANNOTATION_LAYER,
        }
    }

    /// Layer name, if it has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Image(layer) => Some(layer.name()),
            Self::Annotation(layer) => layer.name(),
        }
    }

    /// Returns the image layer, if this is one.
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match self {
            Self::Image(layer) => Some(layer),
            Self::Annotation(_) => None,
        }
    }

    /// Returns the image layer mutably, if this is one.
    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match self {
            Self::Image(layer) => Some(layer),
            Self::Annotation(_) => None,
        }
    }

    /// Returns the annotation layer, if this is one.
    pub fn as_annotation(&self) -> Option<&AnnotationLayer> {
        match self {
            Self::Annotation(layer) => Some(layer),
            Self::Image(_) => None,
        }
    }
}

/// Image volume layer.
///
/// The channel is held 0-based and written 1-based as
/// `localDimensions: {"c'": [channel + 1, ""]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayer {
    source: ImageSource,
    #[serde(rename = "localDimensions", serialize_with = "serialize_channel")]
    channel: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    shader: Option<String>,
    #[serde(rename = "shaderControls")]
    shader_controls: Map<String, Value>,
    visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blend: Option<String>,
    name: String,
}

fn serialize_channel<S: Serializer>(channel: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(CHANNEL_AXIS, &(u64::from(*channel) + 1, ""))?;
    map.end()
}

impl ImageLayer {
    /// Creates a layer with default channel, controls and visibility.
    pub fn new(source: ImageSource) -> Self {
        let name = default_name(&source, None);
        Self {
            source,
            channel: 0,
            shader: None,
            shader_controls: default_shader_controls(),
            visible: true,
            opacity: None,
            blend: None,
            name,
        }
    }

    /// Builds a layer from the entries of an image description.
    ///
    /// Keys are applied in order, so a later key wins over an earlier one
    /// for the same field. Absent fields keep their defaults.
    pub fn from_description(
        desc: &Map<String, Value>,
        output_dims: &Dimensions,
        resolver: &SourceResolver,
    ) -> StateResult<Self> {
        let raw_source = desc
            .get("source")
            .ok_or_else(|| StateError::malformed("image layer requires 'source'", Value::Object(desc.clone())))?;

        let mut layer = Self::new(resolver.resolve(raw_source, output_dims)?);
        let mut explicit_channel = None;
        let mut explicit_name = None;

        for (key, value) in desc {
            match key.as_str() {
                "source" | "type" => {}
                "channel" => {
                    let channel = parse_channel(value)?;
                    layer.set_channel(channel);
                    explicit_channel = Some(channel);
                }
                "shader" => layer.set_shader(parse_shader(value)?),
                "shaderControls" => layer.set_shader_controls(parse_object("shaderControls", value)?),
                "visible" => layer.set_visible(parse_bool("visible", value)?),
                "opacity" => layer.set_opacity(parse_float("opacity", value)?),
                "blend" => layer.set_blend(parse_string("blend", value)?),
                "name" => explicit_name = Some(parse_string("name", value)?),
                other => debug!(key = other, "ignoring unknown image layer key"),
            }
        }

        layer.name = explicit_name.unwrap_or_else(|| default_name(&layer.source, explicit_channel));
        debug!(name = %layer.name, channel = layer.channel, "built image layer");
        Ok(layer)
    }

    /// Resolved source.
    #[inline]
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// 0-based channel.
    #[inline]
    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Sets the 0-based channel.
    pub fn set_channel(&mut self, channel: u32) {
        self.channel = channel;
    }

    /// Shader source, if set.
    #[inline]
    pub fn shader(&self) -> Option<&str> {
        self.shader.as_deref()
    }

    /// Sets the shader source verbatim.
    pub fn set_shader(&mut self, shader: impl Into<String>) {
        self.shader = Some(shader.into());
    }

    /// Shader controls.
    #[inline]
    pub fn shader_controls(&self) -> &Map<String, Value> {
        &self.shader_controls
    }

    /// Replaces the shader controls.
    pub fn set_shader_controls(&mut self, controls: Map<String, Value>) {
        self.shader_controls = controls;
    }

    /// Whether the layer is shown when the state loads.
    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Sets the visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Opacity in `[0, 1]`, if set.
    #[inline]
    pub fn opacity(&self) -> Option<f64> {
        self.opacity
    }

    /// Sets the opacity.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = Some(opacity);
    }

    /// Blend mode, if set.
    #[inline]
    pub fn blend(&self) -> Option<&str> {
        self.blend.as_deref()
    }

    /// Sets the blend mode, e.g. `"additive"`.
    pub fn set_blend(&mut self, blend: impl Into<String>) {
        self.blend = Some(blend.into());
    }

    /// Layer name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the layer name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// `{stem}_{channel}`, with an empty channel part when none was given.
pub fn default_name(source: &ImageSource, channel: Option<u32>) -> String {
    let stem = source.stem().unwrap_or_default();
    match channel {
        Some(channel) => format!("{stem}_{channel}"),
        None => format!("{stem}_"),
    }
}

/// Point annotation layer.
///
/// Source and annotations are passed through exactly as described.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationLayer {
    source: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    annotations: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<Value>,
}

impl AnnotationLayer {
    /// Creates an annotation layer.
    pub fn new(source: impl Into<Value>, annotations: Vec<Value>) -> Self {
        Self {
            source: source.into(),
            tool: None,
            name: None,
            annotations,
            limits: None,
        }
    }

    /// Creates a layer of `[x, y, z]` annotations from extracted points.
    pub fn from_points(source: impl Into<Value>, points: &[Point]) -> Self {
        Self::new(source, points.iter().map(Point::to_annotation).collect())
    }

    /// Builds a layer from the entries of an annotation description.
    pub fn from_description(desc: &Map<String, Value>) -> StateResult<Self> {
        let missing = |key: &str| {
            StateError::malformed(format!("annotation layer requires '{key}'"), Value::Object(desc.clone()))
        };

        let source = desc.get("source").cloned().ok_or_else(|| missing("source"))?;
        let annotations = match desc.get("annotations") {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                return Err(StateError::malformed("annotations must be a list", other.clone()));
            }
            None => return Err(missing("annotations")),
        };

        let mut layer = Self::new(source, annotations);
        for (key, value) in desc {
            match key.as_str() {
                "source" | "type" | "annotations" => {}
                "limits" => layer.limits = Some(value.clone()),
                "name" => layer.name = Some(parse_string("name", value)?),
                "tool" => layer.tool = Some(parse_string("tool", value)?),
                other => debug!(key = other, "ignoring unknown annotation layer key"),
            }
        }

        debug!(count = layer.annotations.len(), "built annotation layer");
        Ok(layer)
    }

    /// Sets display limits.
    pub fn with_limits(mut self, limits: impl Into<Value>) -> Self {
        self.limits = Some(limits.into());
        self
    }

    /// Sets the layer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the active annotation tool, e.g. `"annotatePoint"`.
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Annotation source, e.g. `{"url": "local://annotations"}`.
    #[inline]
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Annotation coordinates.
    #[inline]
    pub fn annotations(&self) -> &[Value] {
        &self.annotations
    }

    /// Display limits, if set.
    #[inline]
    pub fn limits(&self) -> Option<&Value> {
        self.limits.as_ref()
    }

    /// Layer name, if set.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Active tool, if set.
    #[inline]
    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }
}

fn parse_channel(value: &Value) -> StateResult<u32> {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .and_then(|c| u32::try_from(c).ok())
        .ok_or_else(|| StateError::malformed("channel must be a non-negative integer", value.clone()))
}

fn parse_shader(value: &Value) -> StateResult<String> {
    match value {
        Value::String(source) => Ok(source.clone()),
        Value::Object(_) => Ok(ShaderSpec::from_value(value)?.render()),
        other => Err(StateError::malformed(
            "shader must be a {color, emitter, vec} object or shader source",
            other.clone(),
        )),
    }
}

fn parse_object(key: &str, value: &Value) -> StateResult<Map<String, Value>> {
    value
        .as_object()
        .cloned()
        .ok_or_else(|| StateError::malformed(format!("{key} must be an object"), value.clone()))
}

fn parse_bool(key: &str, value: &Value) -> StateResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| StateError::malformed(format!("{key} must be a boolean"), value.clone()))
}

fn parse_float(key: &str, value: &Value) -> StateResult<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| StateError::malformed(format!("{key} must be a number"), value.clone()))
}

fn parse_string(key: &str, value: &Value) -> StateResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| StateError::malformed(format!("{key} must be a string"), value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nglink_core::{AxisValue, StorageLocation, StorageScheme};

    fn resolver() -> SourceResolver {
        SourceResolver::new(StorageLocation::new(StorageScheme::S3, "aind-msma-data"))
    }

    fn build(desc: Value) -> StateResult<Layer> {
        let mut dims = Dimensions::new();
        dims.insert("z", AxisValue::new(2e-6, "m"));
        dims.insert("y", AxisValue::new(1.8e-6, "m"));
        dims.insert("x", AxisValue::new(1.8e-6, "m"));
        Layer::from_description(&desc, &dims, &resolver())
    }

    #[test]
    fn image_defaults() {
        let layer = build(json!({"source": "image_path.zarr"})).unwrap();
        let image = layer.as_image().unwrap();

        assert_eq!(
            image.source(),
            &ImageSource::Single("zarr://s3://aind-msma-data/image_path.zarr".into())
        );
        assert_eq!(image.channel(), 0);
        assert_eq!(image.shader_controls(), &default_shader_controls());
        assert!(image.visible());
        assert_eq!(image.opacity(), None);
        assert_eq!(image.shader(), None);
        assert_eq!(image.name(), "image_path_");
    }

    #[test]
    fn name_uses_zero_based_channel() {
        let layer = build(json!({"type": "image", "source": "image_path.zarr", "channel": 0})).unwrap();
        assert_eq!(layer.name(), Some("image_path_0"));

        let layer = build(json!({"source": "image_path.zarr", "channel": 3})).unwrap();
        assert_eq!(layer.name(), Some("image_path_3"));
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let layer = build(json!({
            "source": "image_path.zarr",
            "channel": 1,
            "name": "image_name_1",
            "shader": {"color": "red", "emitter": "RGB", "vec": "vec3"},
            "shaderControls": {"normalized": {"range": [0, 500]}},
            "visible": false,
            "opacity": 0.5,
            "blend": "additive"
        }))
        .unwrap();
        let image = layer.as_image().unwrap();

        assert_eq!(image.name(), "image_name_1");
        assert_eq!(image.channel(), 1);
        assert!(image.shader().unwrap().contains("emitRGB(color * normalized());"));
        assert_eq!(image.shader_controls()["normalized"]["range"], json!([0, 500]));
        assert!(!image.visible());
        assert_eq!(image.opacity(), Some(0.5));
        assert_eq!(image.blend(), Some("additive"));
    }

    #[test]
    fn serialized_image_layer() {
        let layer = build(json!({
            "type": "image",
            "source": "image_path.zarr",
            "channel": 1,
            "shader": {"color": "red", "emitter": "RGB", "vec": "vec3"}
        }))
        .unwrap();
        let value = serde_json::to_value(&layer).unwrap();

        assert_eq!(value["type"], "image");
        assert_eq!(value["source"], "zarr://s3://aind-msma-data/image_path.zarr");
        assert_eq!(value["localDimensions"], json!({"c'": [2, ""]}));
        assert_eq!(value["shaderControls"], json!({"normalized": {"range": [0, 200]}}));
        assert_eq!(value["visible"], true);
        assert_eq!(value["name"], "image_path_1");
        assert!(value.get("opacity").is_none());
        assert!(value.get("blend").is_none());
    }

    #[test]
    fn multi_tile_name_from_first_tile() {
        let layer = build(json!({
            "source": [
                {"url": "s3://aind-open-data/exaSPIM/tile_x_0000_y_0000_z_0000_ch_488.zarr",
                 "transform_matrix": {"delta_x": -14192, "delta_y": -10640, "delta_z": 0}},
                {"url": "s3://aind-open-data/exaSPIM/tile_x_0000_y_0001_z_0000_ch_488.zarr",
                 "transform_matrix": {"delta_x": -14192, "delta_y": -19684.000456947142, "delta_z": 0}}
            ],
            "channel": 0
        }))
        .unwrap();
        assert_eq!(layer.name(), Some("tile_x_0000_y_0000_z_0000_ch_488_0"));
    }

    #[test]
    fn setters_after_construction() {
        let mut layer = build(json!({"source": "image_path.zarr"})).unwrap();
        let image = layer.as_image_mut().unwrap();
        image.set_opacity(0.25);
        image.set_visible(false);
        image.set_channel(2);

        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["opacity"], 0.25);
        assert_eq!(value["visible"], false);
        assert_eq!(value["localDimensions"]["c'"][0], 3);
    }

    #[test]
    fn later_duplicate_key_wins() {
        let input = crate::input::InputDescription::from_json_str(
            r#"{
                "dimensions": {"x": {"voxel_size": 1.8, "unit": "microns"}},
                "layers": [{
                    "source": "image_path.zarr",
                    "opacity": 0.1,
                    "visible": false,
                    "channel": 1,
                    "opacity": 0.9,
                    "channel": 2
                }]
            }"#,
        )
        .unwrap();

        let layer = build(input.layers()[0].clone()).unwrap();
        let image = layer.as_image().unwrap();
        assert_eq!(image.opacity(), Some(0.9));
        assert_eq!(image.channel(), 2);
        assert_eq!(image.name(), "image_path_2");
        assert!(!image.visible());
    }

    #[test]
    fn opacity_accepts_numeric_strings() {
        let layer = build(json!({"source": "a.zarr", "opacity": "0.75"})).unwrap();
        assert_eq!(layer.as_image().unwrap().opacity(), Some(0.75));
    }

    #[test]
    fn invalid_field_types() {
        for desc in [
            json!({"source": "a.zarr", "channel": -1}),
            json!({"source": "a.zarr", "channel": "one"}),
            json!({"source": "a.zarr", "visible": "yes"}),
            json!({"source": "a.zarr", "opacity": [1]}),
            json!({"source": "a.zarr", "shaderControls": 5}),
            json!({"source": "a.zarr", "shader": 5}),
            json!({"channel": 0}),
            json!({"type": "mesh", "source": "a.zarr"}),
            json!("a.zarr"),
        ] {
            assert!(
                matches!(build(desc.clone()), Err(StateError::MalformedInput { .. })),
                "{desc}"
            );
        }
    }

    #[test]
    fn unsupported_format_aborts_layer() {
        assert!(matches!(
            build(json!({"source": "volume.tif"})),
            Err(StateError::Core(nglink_core::Error::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn annotation_pass_through() {
        let layer = build(json!({
            "type": "annotation",
            "source": {"url": "local://annotations"},
            "tool": "annotatePoint",
            "name": "annotation_name_layer",
            "annotations": [[1865, 4995, 3646, 0.5, 0.5], [1865, 4985, 3641, 0.5, 0.5]],
            "limits": [0, 100]
        }))
        .unwrap();

        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["type"], "annotation");
        assert_eq!(value["source"], json!({"url": "local://annotations"}));
        assert_eq!(value["tool"], "annotatePoint");
        assert_eq!(value["name"], "annotation_name_layer");
        assert_eq!(value["annotations"][1], json!([1865, 4985, 3641, 0.5, 0.5]));
        assert_eq!(value["limits"], json!([0, 100]));
    }

    #[test]
    fn annotation_requires_annotations() {
        assert!(build(json!({"type": "annotation", "source": "local://annotations"})).is_err());
        assert!(build(json!({"type": "annotation", "source": "x", "annotations": 3})).is_err());
    }

    #[test]
    fn annotation_from_points() {
        let points = [Point::new(1.0, 2.0, 3.0), Point::new(4.0, 5.0, 6.0)];
        let layer = AnnotationLayer::from_points(json!({"url": "local://annotations"}), &points)
            .with_name("cells")
            .with_tool("annotatePoint");

        assert_eq!(layer.annotations(), &[json!([1.0, 2.0, 3.0]), json!([4.0, 5.0, 6.0])]);
        assert_eq!(layer.name(), Some("cells"));
        assert_eq!(layer.limits(), None);
    }
}
