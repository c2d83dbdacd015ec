//! Image source format detection.
//!
//! Detects the chunked-array format of a layer source from its extension.
//! Zarr is the only format the generated states are wired for.

use std::path::Path;

use crate::error::{Error, Result};

/// Supported image source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Zarr / OME-Zarr store.
    Zarr,
}

impl ImageFormat {
    /// File extension without the leading dot.
    #[inline]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Zarr => "zarr",
        }
    }

    /// Data-source prefix understood by the viewer.
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Zarr => "zarr://",
        }
    }

    /// Detects format from the path extension only. Trailing separators are ignored.
    pub fn from_extension(path: &str) -> Option<Self> {
        let ext = Path::new(path.trim_end_matches('/'))
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("zarr") => Some(Self::Zarr),
            _ => None,
        }
    }

    /// Detects format, failing with [`Error::UnsupportedFormat`] otherwise.
    pub fn detect(path: &str) -> Result<Self> {
        Self::from_extension(path).ok_or_else(|| Error::UnsupportedFormat {
            path: path.to_string(),
        })
    }

    /// Returns the format whose prefix `url` carries, if any.
    pub fn from_prefix(url: &str) -> Option<Self> {
        url.starts_with(Self::Zarr.prefix()).then_some(Self::Zarr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_zarr() {
        assert_eq!(ImageFormat::detect("image_path.zarr").unwrap(), ImageFormat::Zarr);
        assert_eq!(
            ImageFormat::detect("s3://bucket/dataset/tile_x_0000.ZARR/").unwrap(),
            ImageFormat::Zarr
        );
    }

    #[test]
    fn reject_other_formats() {
        for path in ["image.tif", "image.n5", "image", "s3://bucket/zarr"] {
            assert!(
                matches!(ImageFormat::detect(path), Err(Error::UnsupportedFormat { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn prefix_detection() {
        assert_eq!(ImageFormat::from_prefix("zarr://s3://b/x.zarr"), Some(ImageFormat::Zarr));
        assert_eq!(ImageFormat::from_prefix("s3://b/x.zarr"), None);
    }
}
