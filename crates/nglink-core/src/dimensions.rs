//! Axis classification and the ordered output dimensions of a state.
//!
//! Neuroglancer reads axis order from the order of keys in its `dimensions`
//! object, so [`Dimensions`] keeps an explicit sequence instead of a map.
//!
//! # Example
//!
//! ```rust
//! use nglink_core::{AxisSpec, Dimensions};
//!
//! let dims = Dimensions::from_specs([
//!     ("z", AxisSpec::new(2.0, "microns")),
//!     ("y", AxisSpec::new(1.8, "microns")),
//!     ("x", AxisSpec::new(1.8, "microns")),
//!     ("t", AxisSpec::new(0.001, "seconds")),
//! ])
//! .unwrap();
//!
//! assert_eq!(dims.names().collect::<Vec<_>>(), ["z", "y", "x", "t"]);
//! assert_eq!(dims.get("t").unwrap().unit, "s");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use tracing::warn;

use crate::error::{Error, Result};
use crate::units::{self, Metric};

/// Reserved name of the channel axis.
pub const CHANNEL_AXIS: &str = "c'";

/// Name of the time axis.
pub const TIME_AXIS: &str = "t";

static SPATIAL_AXIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[x-zX-Z]$").expect("static regex"));

/// Numeric value of an axis.
///
/// Values read from a description stay [`Raw`](Self::Raw), so an unconverted
/// axis is written back exactly as given (`1` stays `1`, not `1.0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Magnitude {
    /// Computed value.
    Scaled(f64),
    /// Number as it appeared in the input.
    Raw(Number),
}

impl Magnitude {
    /// Value as `f64`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Scaled(v) => *v,
            // always Some without serde_json's arbitrary_precision
            Self::Raw(n) => n.as_f64().unwrap_or(f64::NAN),
        }
    }
}

impl From<f64> for Magnitude {
    fn from(v: f64) -> Self {
        Self::Scaled(v)
    }
}

impl From<Number> for Magnitude {
    fn from(n: Number) -> Self {
        Self::Raw(n)
    }
}

impl<'de> Deserialize<'de> for Magnitude {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Number::deserialize(deserializer).map(Self::Raw)
    }
}

/// Physical voxel size of one axis, as written in an input description.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AxisSpec {
    /// Size of one voxel along the axis.
    pub voxel_size: Magnitude,
    /// Unit of `voxel_size`; empty for the channel axis.
    #[serde(default)]
    pub unit: String,
}

impl AxisSpec {
    /// Creates an axis spec.
    pub fn new(voxel_size: impl Into<Magnitude>, unit: impl Into<String>) -> Self {
        Self {
            voxel_size: voxel_size.into(),
            unit: unit.into(),
        }
    }
}

/// What an axis name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// `x`, `y` or `z` in either case.
    Spatial,
    /// The time axis `t`.
    Time,
    /// The channel axis `c'`.
    Channel,
}

impl AxisKind {
    /// Classifies an axis name, returning `None` for unrecognised names.
    pub fn classify(name: &str) -> Option<Self> {
        if SPATIAL_AXIS.is_match(name) {
            Some(Self::Spatial)
        } else if name == TIME_AXIS {
            Some(Self::Time)
        } else if name == CHANNEL_AXIS {
            Some(Self::Channel)
        } else {
            None
        }
    }

    /// Destination metric of this axis kind; channels are not converted.
    #[inline]
    pub const fn metric(&self) -> Option<Metric> {
        match self {
            Self::Spatial => Some(Metric::Meters),
            Self::Time => Some(Metric::Seconds),
            Self::Channel => None,
        }
    }

    /// Converts a voxel size into the viewer representation for this kind.
    pub fn convert(&self, spec: &AxisSpec) -> Result<AxisValue> {
        match self.metric() {
            Some(metric) => Ok(AxisValue::new(
                units::convert(spec.voxel_size.as_f64(), &spec.unit, metric)?,
                metric.symbol(),
            )),
            None => Ok(AxisValue::new(spec.voxel_size.clone(), spec.unit.clone())),
        }
    }
}

/// Converts one axis into its `[magnitude, unit]` viewer pair.
///
/// Spatial axes end up in meters, time in seconds and the channel axis is
/// passed through unchanged.
pub fn convert(axis: &str, spec: &AxisSpec) -> Result<AxisValue> {
    let kind = AxisKind::classify(axis).ok_or_else(|| Error::UnknownAxis {
        name: axis.to_string(),
    })?;
    kind.convert(spec)
}

/// Scale of one output axis. Serializes as a two-element array.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisValue {
    /// Converted magnitude, or the input number for the channel axis.
    pub magnitude: Magnitude,
    /// Canonical unit symbol (`"m"`, `"s"`, or the channel unit).
    pub unit: String,
}

impl AxisValue {
    /// Creates an axis value.
    pub fn new(magnitude: impl Into<Magnitude>, unit: impl Into<String>) -> Self {
        Self {
            magnitude: magnitude.into(),
            unit: unit.into(),
        }
    }
}

impl Serialize for AxisValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.magnitude)?;
        tup.serialize_element(&self.unit)?;
        tup.end()
    }
}

/// Ordered sequence of converted output axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    axes: Vec<(String, AxisValue)>,
}

impl Dimensions {
    /// Creates empty dimensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts axis specs in the given order.
    ///
    /// Names that are neither spatial, time nor channel are skipped.
    pub fn from_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, AxisSpec)>,
        S: Into<String>,
    {
        let mut dims = Self::new();
        for (name, spec) in specs {
            let name = name.into();
            let Some(kind) = AxisKind::classify(&name) else {
                warn!(axis = %name, "skipping unrecognised axis");
                continue;
            };
            let value = kind.convert(&spec)?;
            dims.insert(name, value);
        }
        Ok(dims)
    }

    /// Inserts an axis, replacing the value in place if the name exists.
    pub fn insert(&mut self, name: impl Into<String>, value: AxisValue) {
        let name = name.into();
        match self.axes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.axes.push((name, value)),
        }
    }

    /// Returns the value of an axis.
    pub fn get(&self, name: &str) -> Option<&AxisValue> {
        self.axes.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterates axes in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AxisValue)> {
        self.axes.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates axis names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|(n, _)| n.as_str())
    }

    /// Number of axes.
    #[inline]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// True if no axes are defined.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Same axes in reverse order.
    ///
    /// Tile transforms declare their `outputDimensions` innermost-first,
    /// the opposite of the state-level order.
    pub fn reversed(&self) -> Self {
        Self {
            axes: self.axes.iter().rev().cloned().collect(),
        }
    }
}

impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.axes.len()))?;
        for (name, value) in &self.axes {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
