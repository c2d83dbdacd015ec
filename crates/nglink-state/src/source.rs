//! Image source resolution.
//!
//! Every image layer source ends up as a fully-qualified Zarr URL on the
//! configured bucket, e.g. `zarr://s3://aind-msma-data/image_path.zarr`.
//! Multi-tile layers additionally carry one transform per tile that places
//! it into the shared output space.
//!
//! # Example
//!
//! ```
//! use nglink_state::SourceResolver;
//! use nglink_core::{StorageLocation, StorageScheme};
//!
//! let resolver = SourceResolver::new(StorageLocation::new(StorageScheme::S3, "aind-msma-data"));
//! let url = resolver.resolve_path("image_path.zarr").unwrap();
//! assert_eq!(url, "zarr://s3://aind-msma-data/image_path.zarr");
//!
//! // resolving again is a no-op
//! assert_eq!(resolver.resolve_path(&url).unwrap(), url);
//! ```

use std::path::Path;

use nglink_core::{Dimensions, ImageFormat, Matrix, StorageLocation, Translation};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::error::{StateError, StateResult};

/// Key of the tile transform in input descriptions.
pub const TRANSFORM_MATRIX_KEY: &str = "transform_matrix";

/// Resolved source of an image layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// One Zarr URL.
    Single(String),
    /// Several tiles, each with its own transform.
    Tiles(Vec<Tile>),
}

impl ImageSource {
    /// URL the layer name is derived from: the single URL or the first tile's.
    pub fn primary_url(&self) -> Option<&str> {
        match self {
            Self::Single(url) => Some(url),
            Self::Tiles(tiles) => tiles.first().map(|t| t.url.as_str()),
        }
    }

    /// File stem of [`primary_url`](Self::primary_url), e.g. `tile_x_0000` for `.../tile_x_0000.zarr`.
    pub fn stem(&self) -> Option<String> {
        let url = self.primary_url()?.trim_end_matches('/');
        Path::new(url)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }
}

/// One tile of a multi-tile source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Resolved Zarr URL.
    pub url: String,
    /// Placement of the tile in the output space.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<CoordinateTransform>,
    /// Other keys of the tile description, copied through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Affine matrix of a tile transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TileMatrix {
    /// Expanded from a `{delta_x, delta_y, delta_z}` object.
    Translation(Matrix),
    /// Explicit rows, kept exactly as given.
    Affine(Vec<Vec<Number>>),
}

impl TileMatrix {
    /// Number of rows and columns.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Translation(m) => m.shape(),
            Self::Affine(rows) => (rows.len(), rows.first().map_or(0, Vec::len)),
        }
    }

    /// Element at `row`, `col` as `f64`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        match self {
            Self::Translation(m) => m.rows().get(row)?.get(col).copied(),
            Self::Affine(rows) => rows.get(row)?.get(col)?.as_f64(),
        }
    }
}

/// Matrix plus the coordinate space it maps into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateTransform {
    /// Row-major affine matrix.
    pub matrix: TileMatrix,
    /// Output coordinate space of the matrix.
    #[serde(rename = "outputDimensions")]
    pub output_dimensions: Dimensions,
}

/// Turns raw source descriptions into viewer URLs for one storage location.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    storage: StorageLocation,
    format: ImageFormat,
}

impl SourceResolver {
    /// Creates a resolver for Zarr sources on `storage`.
    pub fn new(storage: StorageLocation) -> Self {
        Self {
            storage,
            format: ImageFormat::Zarr,
        }
    }

    /// Storage location sources are resolved against.
    #[inline]
    pub fn storage(&self) -> &StorageLocation {
        &self.storage
    }

    /// Resolves a single path or URL.
    ///
    /// Bucket-relative paths are qualified with the scheme and bucket, then the
    /// format prefix is added. Already-resolved URLs are returned unchanged.
    pub fn resolve_path(&self, raw: &str) -> StateResult<String> {
        let prefix = self.format.prefix();
        let path = raw.strip_prefix(prefix).unwrap_or(raw).trim_end_matches('/');

        let qualified = if path.contains("://") {
            path.to_string()
        } else {
            self.storage.url(&normalize_relative(path))
        };

        ImageFormat::detect(&qualified)?;
        let resolved = format!("{prefix}{qualified}");
        trace!(raw, resolved = %resolved, "resolved source");
        Ok(resolved)
    }

    /// Resolves a source value: a path string or a list of tile objects.
    pub fn resolve(&self, raw: &Value, output_dims: &Dimensions) -> StateResult<ImageSource> {
        match raw {
            Value::String(path) => Ok(ImageSource::Single(self.resolve_path(path)?)),
            Value::Array(tiles) => Ok(ImageSource::Tiles(self.resolve_tiles(tiles, output_dims)?)),
            other => Err(StateError::malformed(
                "image source must be a path or a list of tiles",
                other.clone(),
            )),
        }
    }

    /// Resolves every tile of a multi-tile source.
    ///
    /// `output_dims` is the state-level order; transforms use it reversed.
    pub fn resolve_tiles(&self, tiles: &[Value], output_dims: &Dimensions) -> StateResult<Vec<Tile>> {
        if tiles.is_empty() {
            return Err(StateError::malformed("tile list is empty", Value::Array(Vec::new())));
        }
        let transform_dims = output_dims.reversed();
        tiles
            .iter()
            .map(|tile| self.resolve_tile(tile, &transform_dims))
            .collect()
    }

    fn resolve_tile(&self, raw: &Value, transform_dims: &Dimensions) -> StateResult<Tile> {
        let Value::Object(entries) = raw else {
            return Err(StateError::malformed("tile must be an object", raw.clone()));
        };

        let mut url = None;
        let mut transform = None;
        let mut extra = Map::new();

        for (key, value) in entries {
            match key.as_str() {
                "url" => {
                    let path = value
                        .as_str()
                        .ok_or_else(|| StateError::malformed("tile url must be a string", value.clone()))?;
                    url = Some(self.resolve_path(path)?);
                }
                TRANSFORM_MATRIX_KEY => {
                    transform = Some(CoordinateTransform {
                        matrix: parse_matrix(value)?,
                        output_dimensions: transform_dims.clone(),
                    });
                }
                _ => {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }

        let url = url.ok_or_else(|| StateError::malformed("tile is missing 'url'", raw.clone()))?;
        if transform.is_some() {
            extra.remove("transform");
        }
        Ok(Tile { url, transform, extra })
    }
}

/// Drops `.` segments and empty segments from a bucket-relative path.
fn normalize_relative(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Builds a tile matrix from a delta object or an explicit 2-D array.
///
/// Delta objects expand into a 5x6 translation. Explicit arrays must be
/// rectangular and numeric and are otherwise kept untouched.
pub fn parse_matrix(value: &Value) -> StateResult<TileMatrix> {
    match value {
        Value::Object(_) => {
            let t: Translation = serde_json::from_value(value.clone())
                .map_err(|e| StateError::malformed(format!("invalid translation: {e}"), value.clone()))?;
            Ok(TileMatrix::Translation(Matrix::translation(&t)?))
        }
        Value::Array(rows) => {
            let rows = rows
                .iter()
                .map(|row| {
                    row.as_array()?
                        .iter()
                        .map(|v| match v {
                            Value::Number(n) => Some(n.clone()),
                            _ => None,
                        })
                        .collect::<Option<Vec<Number>>>()
                })
                .collect::<Option<Vec<_>>>()
                .filter(|rows| {
                    rows.first()
                        .is_some_and(|first| !first.is_empty() && rows.iter().all(|r| r.len() == first.len()))
                });
            rows.map(TileMatrix::Affine).ok_or_else(|| {
                StateError::malformed("affine matrix must be a rectangular numeric 2-D array", value.clone())
            })
        }
        other => Err(StateError::malformed(
            "transform_matrix must be a delta object or a 2-D array",
            other.clone(),
        )),
    }
}
