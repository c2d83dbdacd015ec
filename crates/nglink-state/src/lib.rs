//! Neuroglancer viewer states for remote Zarr volumes.
//!
//! This crate turns a loose description of dimensions and layers into a
//! viewer state document plus a shareable link:
//! - Load JSON or YAML input descriptions
//! - Resolve image sources against an S3 or GCS bucket
//! - Generate shaders and per-tile transforms
//! - Pass point annotations through, or read them from marker files
//!
//! # Quick Start
//!
//! ```
//! use nglink_state::{InputDescription, LinkConfig, NgState};
//! use serde_json::json;
//!
//! let input = InputDescription::from_value(json!({
//!     "dimensions": {
//!         "z": {"voxel_size": 2.0, "unit": "microns"},
//!         "y": {"voxel_size": 1.8, "unit": "microns"},
//!         "x": {"voxel_size": 1.8, "unit": "microns"},
//!         "t": {"voxel_size": 0.001, "unit": "seconds"}
//!     },
//!     "layers": [
//!         {
//!             "source": "image_path.zarr",
//!             "channel": 0,
//!             "shader": {"color": "green", "emitter": "RGB", "vec": "vec3"}
//!         }
//!     ]
//! }))
//! .unwrap();
//!
//! let config = LinkConfig::builder("aind-msma-data").output_dir("src").build();
//! let state = NgState::new(&input, config).unwrap();
//!
//! let doc = serde_json::to_value(state.state()).unwrap();
//! assert_eq!(doc["layers"][0]["localDimensions"]["c'"][0], 1);
//! ```
//!
//! # Writing
//!
//! ```ignore
//! let path = state.save_state_as_json(true)?;
//! println!("{} -> {}", path.display(), state.url_link());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod input;
mod layer;
mod shader;
mod source;
mod state;

pub mod points;
pub mod writer;

pub use config::{DEFAULT_BASE_URL, DEFAULT_JSON_NAME, LinkConfig, LinkConfigBuilder};
pub use error::{StateError, StateResult};
pub use input::{DIMENSIONS_KEY, InputDescription, LAYERS_KEY, SHOW_AXIS_LINES_KEY, SHOW_SCALE_BAR_KEY};
pub use layer::{
    ANNOTATION_LAYER, AnnotationLayer, IMAGE_LAYER, ImageLayer, Layer, default_name, default_shader_controls,
};
pub use points::{Point, parse_points, points_from_xml};
pub use shader::{Emitter, ShaderSpec};
pub use source::{
    CoordinateTransform, ImageSource, SourceResolver, TRANSFORM_MATRIX_KEY, Tile, TileMatrix, parse_matrix,
};
pub use state::{Document, NgState, normalize_output_dir};

pub use nglink_core::{Dimensions, StorageLocation, StorageScheme};
