//! Remote storage location of datasets and generated states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cloud storage scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageScheme {
    /// Amazon S3.
    #[default]
    S3,
    /// Google Cloud Storage.
    Gs,
}

impl StorageScheme {
    /// Scheme name as used in URLs.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Gs => "gs",
        }
    }

    /// URL prefix including the `://` separator.
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::S3 => "s3://",
            Self::Gs => "gs://",
        }
    }
}

impl fmt::Display for StorageScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "gs" => Ok(Self::Gs),
            _ => Err(Error::UnsupportedScheme {
                scheme: s.to_string(),
            }),
        }
    }
}

/// A bucket on a storage scheme.
///
/// ```rust
/// use nglink_core::{StorageLocation, StorageScheme};
///
/// let loc = StorageLocation::new(StorageScheme::S3, "aind-msma-data");
/// assert_eq!(loc.url("src/process_output.json"), "s3://aind-msma-data/src/process_output.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    scheme: StorageScheme,
    bucket: String,
}

impl StorageLocation {
    /// Creates a location; surrounding `/` on the bucket are dropped.
    pub fn new(scheme: StorageScheme, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self {
            scheme,
            bucket: bucket.trim_matches('/').to_string(),
        }
    }

    /// Storage scheme.
    #[inline]
    pub fn scheme(&self) -> StorageScheme {
        self.scheme
    }

    /// Bucket path.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// True if `path` already carries this location's scheme prefix.
    #[inline]
    pub fn is_qualified(&self, path: &str) -> bool {
        path.starts_with(self.scheme.prefix())
    }

    /// Fully-qualified URL of a bucket-relative path.
    pub fn url(&self, relative: &str) -> String {
        format!(
            "{}{}/{}",
            self.scheme.prefix(),
            self.bucket,
            relative.trim_start_matches('/')
        )
    }
}
