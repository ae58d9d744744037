// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asymmetric-frustum projection for the two virtual eyes.
//!
//! Each eye gets a perspective frustum shifted horizontally by the
//! *convergence* (so both frusta meet on the reference plane), and the scene
//! is then shifted by the *parallax* in the opposite direction. Both values
//! are derived from the field of view, the configured maximum on-screen
//! disparity and the output width:
//!
//! ```text
//!   parallax    = disparity_px / width_px
//!   convergence = parallax · near / (0.5 / tan(fov/2))
//! ```
//!
//! The compositor's default camera sits at [`DEFAULT_Z_CAMERA`] in front of a
//! unit-wide screen; [`world_z_correction`] moves the scene so the frustum's
//! own focal distance lines up with it.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::options::StereoMode;
use crate::transform::Transform3d;

/// Distance of the near clipping plane.
pub const NEAR: f64 = 0.1;
/// Distance of the far clipping plane.
pub const FAR: f64 = 100.0;
/// Aspect ratio used for the eye frusta (the host scales to the output).
pub const ASPECT: f64 = 1.0;
/// Camera distance of the compositor's default screen-space transform.
pub const DEFAULT_Z_CAMERA: f64 = 0.866_025_4;

/// The six planes of a perspective frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    /// Left plane x at the near plane.
    pub left: f64,
    /// Right plane x at the near plane.
    pub right: f64,
    /// Bottom plane y at the near plane.
    pub bottom: f64,
    /// Top plane y at the near plane.
    pub top: f64,
    /// Near plane distance.
    pub near: f64,
    /// Far plane distance.
    pub far: f64,
}

impl Frustum {
    /// Builds the projection matrix for this frustum.
    #[must_use]
    pub fn to_matrix(self) -> Transform3d {
        build_frustum(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }

    /// Recovers the frustum planes from a matrix produced by
    /// [`build_frustum`].
    ///
    /// The result is meaningless for matrices of any other shape.
    #[must_use]
    pub fn from_matrix(m: &Transform3d) -> Self {
        let x = m.at(0, 0);
        let y = m.at(1, 1);
        let a = m.at(0, 2);
        let b = m.at(1, 2);
        let c = m.at(2, 2);
        let d = m.at(2, 3);

        let near = d / (c - 1.0);
        let far = d / (c + 1.0);
        let width = 2.0 * near / x;
        let height = 2.0 * near / y;
        let x_sum = a * width;
        let y_sum = b * height;

        Self {
            left: (x_sum - width) / 2.0,
            right: (x_sum + width) / 2.0,
            bottom: (y_sum - height) / 2.0,
            top: (y_sum + height) / 2.0,
            near,
            far,
        }
    }
}

/// Builds an off-axis perspective frustum matrix (column-major).
#[must_use]
pub fn build_frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Transform3d {
    let x = (2.0 * near) / (right - left);
    let y = (2.0 * near) / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -(2.0 * far * near) / (far - near);

    Transform3d::from_cols(
        [x, 0.0, 0.0, 0.0],
        [0.0, y, 0.0, 0.0],
        [a, b, c, -1.0],
        [0.0, 0.0, d, 0.0],
    )
}

/// Builds a perspective projection whose frustum is shifted horizontally by
/// `x_shift` (in near-plane units).
#[must_use]
pub fn build_perspective(fov_y_degrees: f64, aspect: f64, near: f64, far: f64, x_shift: f64) -> Transform3d {
    let y_max = near * half_fov_tan(fov_y_degrees);
    let y_min = -y_max;
    let x_min = y_min * aspect;
    let x_max = y_max * aspect;

    build_frustum(x_min + x_shift, x_max + x_shift, y_min, y_max, near, far)
}

/// Camera-space Z offset applied after each eye's projection so that the
/// frustum's focal distance matches [`DEFAULT_Z_CAMERA`].
#[must_use]
pub fn world_z_correction(fov_y_degrees: f64) -> f64 {
    DEFAULT_Z_CAMERA - focal_distance(fov_y_degrees)
}

/// Maps output pixels onto the unit-wide screen plane.
///
/// The output's bottom-left corner lands on `(-0.5, -0.5, z)` and its
/// top-right corner on `(0.5, 0.5, z)`. Pixel `y` grows downward; scene `y`
/// grows upward. Depth is left in scene units.
#[must_use]
pub fn screen_space(output: kurbo::Rect, z: f64) -> Transform3d {
    Transform3d::from_translation(-0.5, -0.5, z)
        .scaled(1.0 / output.width(), -1.0 / output.height(), 1.0)
        .translated(-output.x0, -output.y1, 0.0)
}

/// Distance at which a unit-wide screen exactly fills the field of view.
fn focal_distance(fov_y_degrees: f64) -> f64 {
    0.5 / half_fov_tan(fov_y_degrees)
}

fn half_fov_tan(fov_y_degrees: f64) -> f64 {
    (fov_y_degrees * core::f64::consts::PI / 360.0).tan()
}

/// Which virtual eye a pass renders for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Eye {
    /// The left eye (negative frustum shift, negative parallax).
    Left,
    /// The right eye.
    Right,
}

impl Eye {
    /// Both eyes, in draw order.
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];

    /// Filter index for this eye: 0 for left and 1 for right, swapped when
    /// `invert` is set.
    #[inline]
    #[must_use]
    pub const fn filter_index(self, invert: bool) -> u8 {
        match (self, invert) {
            (Self::Left, false) | (Self::Right, true) => 0,
            (Self::Right, false) | (Self::Left, true) => 1,
        }
    }

    /// `-1.0` for the left eye and `1.0` for the right.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Per-frame stereo scalars.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoGeometry {
    /// Horizontal frustum shift per eye, in near-plane units.
    pub convergence: f64,
    /// Horizontal scene shift per eye, as a fraction of the output width.
    pub parallax: f64,
}

impl StereoGeometry {
    /// Derives convergence and parallax from the current options.
    ///
    /// Called every frame; nothing is cached across option changes.
    #[must_use]
    pub fn compute(fov_y_degrees: f64, max_disparity_px: f64, screen_width_px: f64) -> Self {
        let parallax = max_disparity_px / screen_width_px;
        Self {
            convergence: parallax * (NEAR / focal_distance(fov_y_degrees)),
            parallax,
        }
    }

    /// Scene translation for `eye`: `(∓parallax, 0, world_z_correction)`.
    #[must_use]
    pub fn eye_offset(self, eye: Eye, fov_y_degrees: f64) -> [f64; 3] {
        [
            eye.sign() * self.parallax,
            0.0,
            world_z_correction(fov_y_degrees),
        ]
    }
}

/// Left, right and mono projection matrices for one output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EyeProjections {
    /// Left-eye projection.
    pub left: Transform3d,
    /// Right-eye projection.
    pub right: Transform3d,
    /// Zero-convergence projection used by the 2.5D mode.
    pub mono: Transform3d,
}

impl Default for EyeProjections {
    fn default() -> Self {
        Self {
            left: Transform3d::IDENTITY,
            right: Transform3d::IDENTITY,
            mono: Transform3d::IDENTITY,
        }
    }
}

impl EyeProjections {
    /// Recomputes the matrices `mode` uses; the others keep their value.
    pub fn update(&mut self, mode: StereoMode, geometry: StereoGeometry, fov_y_degrees: f64) {
        if mode.is_stereo() {
            self.left = build_perspective(fov_y_degrees, ASPECT, NEAR, FAR, -geometry.convergence);
            self.right = build_perspective(fov_y_degrees, ASPECT, NEAR, FAR, geometry.convergence);
        } else {
            self.mono = build_perspective(fov_y_degrees, ASPECT, NEAR, FAR, 0.0);
        }
    }

    /// The projection for `eye`.
    #[must_use]
    pub fn for_eye(&self, eye: Eye) -> Transform3d {
        match eye {
            Eye::Left => self.left,
            Eye::Right => self.right,
        }
    }
}
