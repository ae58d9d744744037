// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transform.
//!
//! Covers what the effect needs for projection and per-window placement
//! (translation, uniform and non-uniform scale, rotation about X and Y,
//! composition and point transformation) without pulling in a full
//! linear-algebra crate.
//!
//! The `*ed` builder methods right-multiply, matching the fixed-function
//! matrix stack: the newly appended operation is applied to vertices *before*
//! everything already in the transform.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column*, which is the layout GPU APIs expect for
/// uniform uploads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Returns the element at `row`, `col`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= 4`.
    #[inline]
    #[must_use]
    pub const fn at(self, row: usize, col: usize) -> f64 {
        self.cols[col][row]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation about the X axis, in degrees.
    #[must_use]
    pub fn from_rotation_x_degrees(degrees: f64) -> Self {
        let (s, c) = sin_cos_degrees(degrees);
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation about the Y axis, in degrees.
    #[must_use]
    pub fn from_rotation_y_degrees(degrees: f64) -> Self {
        let (s, c) = sin_cos_degrees(degrees);
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns `self * translation(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn translated(self, x: f64, y: f64, z: f64) -> Self {
        self * Self::from_translation(x, y, z)
    }

    /// Returns `self * scale(sx, sy, sz)`.
    #[inline]
    #[must_use]
    pub fn scaled(self, sx: f64, sy: f64, sz: f64) -> Self {
        self * Self::from_scale(sx, sy, sz)
    }

    /// Returns `self * rotation_x(degrees)`.
    #[inline]
    #[must_use]
    pub fn rotated_x_degrees(self, degrees: f64) -> Self {
        self * Self::from_rotation_x_degrees(degrees)
    }

    /// Returns `self * rotation_y(degrees)`.
    #[inline]
    #[must_use]
    pub fn rotated_y_degrees(self, degrees: f64) -> Self {
        self * Self::from_rotation_y_degrees(degrees)
    }

    /// Transforms the homogeneous point `(x, y, z, 1)` and returns all four
    /// resulting components (no perspective divide).
    #[must_use]
    pub fn transform_point(self, x: f64, y: f64, z: f64) -> [f64; 4] {
        let c = &self.cols;
        let mut out = [0.0; 4];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = c[0][row] * x + c[1][row] * y + c[2][row] * z + c[3][row];
        }
        out
    }

    /// Flattens to 16 column-major `f32` values for GPU upload.
    #[must_use]
    pub fn to_cols_f32(self) -> [f32; 16] {
        let mut out = [0.0_f32; 16];
        for (i, v) in self.cols.iter().flatten().enumerate() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "GPU matrices are single precision"
            )]
            let narrowed = *v as f32;
            out[i] = narrowed;
        }
        out
    }

    /// Is every element [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (radians.sin(), radians.cos())
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, slot) in col.iter_mut().enumerate() {
                *slot =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
