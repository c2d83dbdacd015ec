//! # nglink-core
//!
//! Core types for building Neuroglancer viewer states.
//!
//! This crate provides the leaf conversions every layer and state build
//! depends on:
//!
//! - [`units`] - Length and time conversion into meters / seconds
//! - [`Dimensions`], [`AxisSpec`] - Ordered output axes of a state
//! - [`Matrix`], [`Translation`] - Tile transform matrices
//! - [`ImageFormat`] - Source format detection (Zarr)
//! - [`StorageLocation`] - Bucket and scheme of remote data
//!
//! ## Crate Structure
//!
//! ```text
//! nglink-core (this crate)
//!    ^
//!    |
//!    +-- nglink-state (layers, state document, writer)
//!           ^
//!           |
//!           +-- nglink-cli (ng-link binary)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod dimensions;
pub mod error;
pub mod format;
pub mod matrix;
pub mod storage;
pub mod units;

pub use dimensions::{AxisKind, AxisSpec, AxisValue, CHANNEL_AXIS, Dimensions, Magnitude, TIME_AXIS};
pub use error::{Error, Result};
pub use format::ImageFormat;
pub use matrix::{DEFAULT_COLS, DEFAULT_ROWS, Matrix, Translation};
pub use storage::{StorageLocation, StorageScheme};
pub use units::{Metric, Quantity};
