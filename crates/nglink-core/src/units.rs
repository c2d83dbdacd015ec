//! Physical unit conversion for axis voxel sizes.
//!
//! Neuroglancer expresses every spatial scale in meters and every temporal
//! scale in seconds. This module only knows the two quantities it needs:
//! lengths and times, each with the usual SI prefixes.
//!
//! # Example
//!
//! ```rust
//! use nglink_core::units::{convert, Metric};
//!
//! let meters = convert(2.0, "microns", Metric::Meters).unwrap();
//! assert!((meters - 2.0e-6).abs() < 1e-18);
//!
//! let seconds = convert(5.0, "ms", Metric::Seconds).unwrap();
//! assert!((seconds - 0.005).abs() < 1e-15);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Destination metric of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// SI length, unit symbol `m`.
    Meters,
    /// SI time, unit symbol `s`.
    Seconds,
}

impl Metric {
    /// Unit symbol written into viewer dimensions.
    #[inline]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Meters => "m",
            Self::Seconds => "s",
        }
    }

    /// Physical quantity measured by this metric.
    #[inline]
    pub const fn quantity(&self) -> Quantity {
        match self {
            Self::Meters => Quantity::Length,
            Self::Seconds => Quantity::Time,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters => write!(f, "meters"),
            Self::Seconds => write!(f, "seconds"),
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "meters" | "meter" | "metres" | "metre" | "m" => Ok(Self::Meters),
            "seconds" | "second" | "s" => Ok(Self::Seconds),
            _ => Err(Error::UnsupportedUnitConversion {
                metric: s.to_string(),
            }),
        }
    }
}

/// Physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Distance.
    Length,
    /// Duration.
    Time,
}

struct UnitDef {
    names: &'static [&'static str],
    quantity: Quantity,
    factor: f64,
}

const UNITS: &[UnitDef] = &[
    UnitDef { names: &["pm", "picometer", "picometre"], quantity: Quantity::Length, factor: 1e-12 },
    UnitDef { names: &["nm", "nanometer", "nanometre"], quantity: Quantity::Length, factor: 1e-9 },
    UnitDef {
        names: &["um", "\u{b5}m", "\u{3bc}m", "micron", "micrometer", "micrometre"],
        quantity: Quantity::Length,
        factor: 1e-6,
    },
    UnitDef { names: &["mm", "millimeter", "millimetre"], quantity: Quantity::Length, factor: 1e-3 },
    UnitDef { names: &["cm", "centimeter", "centimetre"], quantity: Quantity::Length, factor: 1e-2 },
    UnitDef { names: &["dm", "decimeter", "decimetre"], quantity: Quantity::Length, factor: 1e-1 },
    UnitDef { names: &["m", "meter", "metre"], quantity: Quantity::Length, factor: 1.0 },
    UnitDef { names: &["km", "kilometer", "kilometre"], quantity: Quantity::Length, factor: 1e3 },
    UnitDef { names: &["ps", "picosecond"], quantity: Quantity::Time, factor: 1e-12 },
    UnitDef { names: &["ns", "nanosecond"], quantity: Quantity::Time, factor: 1e-9 },
    UnitDef {
        names: &["us", "\u{b5}s", "\u{3bc}s", "microsecond"],
        quantity: Quantity::Time,
        factor: 1e-6,
    },
    UnitDef { names: &["ms", "millisecond"], quantity: Quantity::Time, factor: 1e-3 },
    UnitDef { names: &["s", "sec", "second"], quantity: Quantity::Time, factor: 1.0 },
    UnitDef { names: &["min", "minute"], quantity: Quantity::Time, factor: 60.0 },
    UnitDef { names: &["h", "hr", "hrs", "hour"], quantity: Quantity::Time, factor: 3600.0 },
];

fn find(name: &str) -> Option<&'static UnitDef> {
    UNITS.iter().find(|def| def.names.contains(&name))
}

/// Looks up a unit, returning its quantity and SI scale factor.
///
/// Matching is case-insensitive and accepts plural spellings
/// (`"microns"`, `"seconds"`).
pub fn lookup(unit: &str) -> Result<(Quantity, f64)> {
    let name = unit.trim().to_lowercase();

    let def = find(&name).or_else(|| {
        // Plural forms; short symbols like "ms" must not lose their "s".
        name.strip_suffix('s')
            .filter(|singular| singular.chars().count() > 2)
            .and_then(find)
    });

    def.map(|d| (d.quantity, d.factor))
        .ok_or_else(|| Error::UnknownUnit {
            unit: unit.to_string(),
        })
}

/// Converts `value` expressed in `unit` into `metric`.
pub fn convert(value: f64, unit: &str, metric: Metric) -> Result<f64> {
    let (quantity, factor) = lookup(unit)?;
    if quantity != metric.quantity() {
        return Err(Error::IncompatibleUnit {
            unit: unit.to_string(),
            metric: metric.to_string(),
        });
    }
    Ok(value * factor)
}
