//! Affine transform matrices for multi-tile image sources.
//!
//! Neuroglancer places each tile of a layer into the shared output space with
//! a homogeneous affine matrix. For a 5-axis state (`t`, `c'`, `z`, `y`, `x`
//! innermost last) this is a 5x6 matrix whose last column holds offsets.
//!
//! # Convention
//!
//! Matrices are stored in **row-major** order. A translation writes its
//! deltas bottom-up into the last column, x innermost:
//!
//! ```text
//! | 1 0 0 0 0  0  |
//! | 0 1 0 0 0  0  |
//! | 0 0 1 0 0  dz |
//! | 0 0 0 1 0  dy |
//! | 0 0 0 0 1  dx |
//! ```
//!
//! # Usage
//!
//! ```rust
//! use nglink_core::{Matrix, Translation};
//!
//! let m = Matrix::translation(&Translation::new(1.0, 2.0, 3.0)).unwrap();
//! assert_eq!(m.shape(), (5, 6));
//! assert_eq!(m[4][5], 1.0);
//! assert_eq!(m[3][5], 2.0);
//! assert_eq!(m[2][5], 3.0);
//! ```

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of rows of a translation matrix.
pub const DEFAULT_ROWS: usize = 5;

/// Default number of columns of a translation matrix.
pub const DEFAULT_COLS: usize = 6;

/// Per-axis offsets of a tile, as written in an input description.
///
/// Missing deltas default to zero; other keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct Translation {
    /// Offset along x.
    #[serde(default)]
    pub delta_x: f64,
    /// Offset along y.
    #[serde(default)]
    pub delta_y: f64,
    /// Offset along z.
    #[serde(default)]
    pub delta_z: f64,
}

impl Translation {
    /// Creates a translation from x, y and z offsets.
    pub const fn new(delta_x: f64, delta_y: f64, delta_z: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            delta_z,
        }
    }

    /// Deltas in placement order (x first, written to the bottom row).
    #[inline]
    pub const fn deltas(&self) -> [f64; 3] {
        [self.delta_x, self.delta_y, self.delta_z]
    }
}

/// Rectangular row-major matrix of `f64`.
///
/// Serializes as a nested array of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Matrix {
    rows: Vec<Vec<f64>>,
}

impl Matrix {
    /// Creates an `n_rows x n_cols` matrix with ones on the main diagonal.
    pub fn identity(n_rows: usize, n_cols: usize) -> Self {
        let rows = (0..n_rows)
            .map(|r| (0..n_cols).map(|c| if r == c { 1.0 } else { 0.0 }).collect())
            .collect();
        Self { rows }
    }

    /// Wraps explicit rows, returning `None` unless they form a non-empty rectangle.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first()?.len();
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self { rows })
    }

    /// Builds the default 5x6 translation matrix.
    pub fn translation(t: &Translation) -> Result<Self> {
        Self::translation_sized(t, DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Builds an `n_rows x n_cols` translation matrix.
    ///
    /// Deltas go into the last column at rows `n_rows-1`, `n_rows-2` and
    /// `n_rows-3`. Fails if `n_rows - 1` is smaller than the number of deltas.
    pub fn translation_sized(t: &Translation, n_rows: usize, n_cols: usize) -> Result<Self> {
        let deltas = t.deltas();
        if n_rows <= deltas.len() || n_cols == 0 {
            return Err(Error::InsufficientTransformCapacity {
                rows: n_rows,
                cols: n_cols,
                deltas: deltas.len(),
            });
        }

        let mut m = Self::identity(n_rows, n_cols);
        let last = n_cols - 1;
        for (i, delta) in deltas.into_iter().enumerate() {
            m.rows[n_rows - 1 - i][last] = delta;
        }
        Ok(m)
    }

    /// Number of rows and columns.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.rows.first().map_or(0, Vec::len))
    }

    /// Row slices.
    #[inline]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Consumes the matrix, returning its rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

impl Index<usize> for Matrix {
    type Output = [f64];

    #[inline]
    fn index(&self, row: usize) -> &[f64] {
        &self.rows[row]
    }
}
