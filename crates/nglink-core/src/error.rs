//! Error types for nglink-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the leaf conversions that
//! every layer and state build depends on:
//! - Image source format detection
//! - Translation matrix construction
//! - Physical unit conversion
//! - Storage scheme parsing
//!
//! # Usage
//!
//! ```rust
//! use nglink_core::{Error, Result};
//!
//! fn check_rows(rows: usize) -> Result<()> {
//!     if rows < 4 {
//!         return Err(Error::InsufficientTransformCapacity {
//!             rows,
//!             cols: 6,
//!             deltas: 3,
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_rows(3).is_err());
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting units, axes and sources.
///
/// # Categories
///
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat)
/// - **Matrix errors**: [`InsufficientTransformCapacity`](Error::InsufficientTransformCapacity)
/// - **Unit errors**: [`UnsupportedUnitConversion`](Error::UnsupportedUnitConversion),
///   [`UnknownUnit`](Error::UnknownUnit), [`IncompatibleUnit`](Error::IncompatibleUnit)
/// - **Axis errors**: [`UnknownAxis`](Error::UnknownAxis)
/// - **Storage errors**: [`UnsupportedScheme`](Error::UnsupportedScheme)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Source path does not point to a Zarr store.
    ///
    /// Zarr is the only chunked-array format the viewer is configured for.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nglink_core::Error;
    ///
    /// let err = Error::UnsupportedFormat { path: "s3://bucket/image.tif".into() };
    /// assert!(err.to_string().contains("image.tif"));
    /// ```
    #[error("format not implemented for visualization: {path}")]
    UnsupportedFormat {
        /// Offending source path
        path: String,
    },

    /// Translation matrix is too small to hold the supplied deltas.
    #[error("{rows}x{cols} transformation matrix is not enough for {deltas} deltas")]
    InsufficientTransformCapacity {
        /// Requested number of rows
        rows: usize,
        /// Requested number of columns
        cols: usize,
        /// Number of deltas to place
        deltas: usize,
    },

    /// Destination metric is neither length nor time.
    #[error("conversion to '{metric}' has not been implemented")]
    UnsupportedUnitConversion {
        /// Requested destination metric
        metric: String,
    },

    /// Unit string is not in the supported unit table.
    #[error("unknown unit: '{unit}'")]
    UnknownUnit {
        /// Unit as supplied by the caller
        unit: String,
    },

    /// Unit exists but measures a different quantity than the destination.
    ///
    /// Returned e.g. for a spatial axis declared in seconds.
    #[error("cannot convert '{unit}' to {metric}")]
    IncompatibleUnit {
        /// Unit as supplied by the caller
        unit: String,
        /// Destination metric
        metric: String,
    },

    /// Axis name is neither spatial, time nor the channel axis.
    #[error("unknown axis: '{name}'")]
    UnknownAxis {
        /// Axis name as supplied by the caller
        name: String,
    },

    /// Storage scheme other than `s3` or `gs`.
    #[error("unsupported storage scheme: '{scheme}' (supported: s3, gs)")]
    UnsupportedScheme {
        /// Scheme as supplied by the caller
        scheme: String,
    },
}
