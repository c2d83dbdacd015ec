//! Where a state points to and where it is written.
//!
//! # Example
//!
//! ```
//! use nglink_state::{LinkConfig, StorageScheme};
//!
//! let config = LinkConfig::builder("aind-msma-data")
//!     .scheme(StorageScheme::S3)
//!     .output_dir("/Users/me/repositories/aind-ng-link/src")
//!     .build();
//!
//! assert_eq!(config.base_url(), "https://neuroglancer-demo.appspot.com/");
//! assert_eq!(config.json_name(), "process_output.json");
//! ```

use std::path::{Path, PathBuf};

use nglink_core::{StorageLocation, StorageScheme};

/// Public Neuroglancer deployment used for links by default.
pub const DEFAULT_BASE_URL: &str = "https://neuroglancer-demo.appspot.com/";

/// File name of the written state by default.
pub const DEFAULT_JSON_NAME: &str = "process_output.json";

/// Settings shared by every layer and the link of one state.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    storage: StorageLocation,
    output_dir: PathBuf,
    base_url: String,
    json_name: String,
    verbose: bool,
}

impl LinkConfig {
    /// Starts a builder for the given bucket.
    pub fn builder(bucket: impl Into<String>) -> LinkConfigBuilder {
        LinkConfigBuilder::new(bucket)
    }

    /// Bucket and scheme of image sources and of the state file.
    #[inline]
    pub fn storage(&self) -> &StorageLocation {
        &self.storage
    }

    /// Directory the state file is written to, before normalization.
    #[inline]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Viewer base URL.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// State file name.
    #[inline]
    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    /// Whether writes are logged at info level.
    #[inline]
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Builder for [`LinkConfig`].
#[derive(Debug, Clone)]
pub struct LinkConfigBuilder {
    scheme: StorageScheme,
    bucket: String,
    output_dir: PathBuf,
    base_url: String,
    json_name: String,
    verbose: bool,
}

impl LinkConfigBuilder {
    /// Creates a builder with S3 storage and the default viewer.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            scheme: StorageScheme::S3,
            bucket: bucket.into(),
            output_dir: PathBuf::from("."),
            base_url: DEFAULT_BASE_URL.to_string(),
            json_name: DEFAULT_JSON_NAME.to_string(),
            verbose: false,
        }
    }

    /// Sets the storage scheme.
    pub fn scheme(mut self, scheme: StorageScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the viewer base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the state file name.
    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.json_name = name.into();
        self
    }

    /// Enables info-level logging of writes.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builds the config.
    pub fn build(self) -> LinkConfig {
        LinkConfig {
            storage: StorageLocation::new(self.scheme, self.bucket),
            output_dir: self.output_dir,
            base_url: self.base_url,
            json_name: self.json_name,
            verbose: self.verbose,
        }
    }
}
