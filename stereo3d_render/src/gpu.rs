// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPU collaborator contract.
//!
//! The effect never talks to a graphics API directly. Everything it needs
//! from the host's renderer goes through [`GpuContext`]:
//!
//! - **Write masks**: color channel mask and stencil test, function,
//!   operations and write enable.
//! - **Projection stack**: push, load and pop of the projection matrix that
//!   the host's window drawing uses.
//! - **Resources**: color-matrix fragment programs per texture target and
//!   BGRA textures.
//! - **Primitives**: overlay lines in output pixels, colored 3D lines,
//!   textured quads and window draws.
//!
//! Calls that a driver can reject return [`GpuError`]; the rest are
//! fire-and-forget, matching how the host's GL state calls behave.
//! [`HeadlessGpu`](crate::headless::HeadlessGpu) implements the trait without
//! a GPU for tests and demos.

use kurbo::{Line, Rect};
use stereo3d_core::transform::Transform3d;
use stereo3d_core::window::{PaintAttribs, TextureTarget, WindowId};

use crate::error::GpuError;
use crate::resource::{ProgramId, TextureId};

/// Which color channels are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorMask {
    /// Red channel.
    pub red: bool,
    /// Green channel.
    pub green: bool,
    /// Blue channel.
    pub blue: bool,
    /// Alpha channel.
    pub alpha: bool,
}

impl ColorMask {
    /// Every channel.
    pub const ALL: Self = Self {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };

    /// No channel.
    pub const NONE: Self = Self {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };

    /// Everything but red (the cyan lens).
    pub const CYAN: Self = Self {
        red: false,
        ..Self::ALL
    };

    /// Red and alpha only (the red lens).
    pub const RED: Self = Self {
        green: false,
        blue: false,
        ..Self::ALL
    };
}

impl Default for ColorMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Stencil comparison function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilFunc {
    /// Never passes.
    Never,
    /// Always passes.
    #[default]
    Always,
    /// Passes where `(stencil & mask) == (reference & mask)`.
    Equal,
    /// Passes where `(stencil & mask) != (reference & mask)`.
    NotEqual,
}

/// What happens to the stored stencil value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilOp {
    /// Leave it.
    #[default]
    Keep,
    /// Set it to zero.
    Zero,
    /// Flip its bits.
    Invert,
}

/// Stencil operations for the three test outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StencilOps {
    /// Stencil test failed.
    pub fail: StencilOp,
    /// Stencil test passed, depth test failed.
    pub depth_fail: StencilOp,
    /// Both passed.
    pub pass: StencilOp,
}

impl StencilOps {
    /// Never modify the stencil buffer.
    pub const KEEP: Self = Self {
        fail: StencilOp::Keep,
        depth_fail: StencilOp::Keep,
        pass: StencilOp::Keep,
    };
}

/// A 3×3 color transform applied to every fetched texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix {
    /// Output channel `i` is `rows[i] · (r, g, b)`.
    pub rows: [[f64; 3]; 3],
}

impl ColorMatrix {
    /// Optimized anaglyph: red is rebuilt from mostly green and blue, green
    /// and blue keep 90% of themselves plus 10% of red.
    pub const ANAGLYPH: Self = Self {
        rows: [[0.1, 0.63, 0.27], [0.1, 0.9, 0.0], [0.1, 0.0, 0.9]],
    };

    /// Transforms one color.
    #[must_use]
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        self.rows
            .map(|row| row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2])
    }
}

/// Extra fragment programs applied when drawing one window.
///
/// Starts empty for every draw; filters append to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FragmentStage {
    programs: Vec<ProgramId>,
}

impl FragmentStage {
    /// No extra programs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a program to run after the ones already added.
    pub fn push(&mut self, program: ProgramId) {
        self.programs.push(program);
    }

    /// Programs in application order.
    #[must_use]
    pub fn programs(&self) -> &[ProgramId] {
        &self.programs
    }
}

/// One end of a colored line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineVertex {
    /// Position in the space of the draw's transform.
    pub position: [f64; 3],
    /// Straight RGBA color.
    pub color: [f64; 4],
}

/// A line segment with per-vertex color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line3d {
    /// Start vertex.
    pub start: LineVertex,
    /// End vertex.
    pub end: LineVertex,
}

/// Rasterization settings for [`GpuContext::draw_lines`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    /// Line width in pixels.
    pub width: f64,
    /// Anti-aliased, alpha-blended lines.
    pub smooth: bool,
}

/// Everything needed to draw one window through the host's pipeline.
#[derive(Clone, Copy, Debug)]
pub struct WindowDraw<'a> {
    /// The window.
    pub window: WindowId,
    /// Frame rectangle in output pixels.
    pub geometry: Rect,
    /// Model transform (screen space × window pose).
    pub transform: Transform3d,
    /// Paint attributes after the effect's multipliers.
    pub paint: PaintAttribs,
    /// Extra fragment programs.
    pub fragment: &'a FragmentStage,
    /// How the window's pixels are stored.
    pub texture_target: TextureTarget,
}

/// The host renderer, as seen by the effect.
pub trait GpuContext {
    /// Sets which color channels are written.
    fn set_color_mask(&mut self, mask: ColorMask) -> Result<(), GpuError>;

    /// Enables or disables the stencil test.
    fn set_stencil_test(&mut self, enabled: bool);

    /// Enables or disables writes to the stencil buffer.
    fn set_stencil_writes(&mut self, enabled: bool);

    /// Sets the stencil comparison.
    fn set_stencil_func(&mut self, func: StencilFunc, reference: u8, mask: u8);

    /// Sets the stencil operations.
    fn set_stencil_ops(&mut self, ops: StencilOps);

    /// Fills the stencil buffer with `value`.
    fn clear_stencil(&mut self, value: u8);

    /// Draws 1-pixel lines under an orthographic projection covering
    /// `width × height` output pixels, restoring both matrices afterwards.
    fn draw_overlay_lines(&mut self, width: f64, height: f64, lines: &[Line]);

    /// Draws colored lines under the current projection.
    fn draw_lines(&mut self, transform: &Transform3d, lines: &[Line3d], style: LineStyle);

    /// Saves the current projection matrix.
    fn push_projection(&mut self) -> Result<(), GpuError>;

    /// Replaces the current projection matrix.
    fn load_projection(&mut self, projection: &Transform3d);

    /// Restores the most recently saved projection matrix.
    fn pop_projection(&mut self) -> Result<(), GpuError>;

    /// Builds a fragment program applying `matrix` to texels fetched from a
    /// texture of kind `target`.
    fn create_program(
        &mut self,
        matrix: &ColorMatrix,
        target: TextureTarget,
    ) -> Result<ProgramId, GpuError>;

    /// Releases a program.
    fn destroy_program(&mut self, program: ProgramId);

    /// Uploads a rectangle texture from tightly packed BGRA bytes.
    fn create_texture(&mut self, width: u32, height: u32, bgra: &[u8])
    -> Result<TextureId, GpuError>;

    /// Releases a texture.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Draws `texture` over `rect` (pixel coordinates, one texel per pixel)
    /// with alpha blending.
    fn draw_textured_quad(&mut self, texture: TextureId, transform: &Transform3d, rect: Rect);

    /// Draws a window through the host's own window pipeline.
    fn draw_window(&mut self, draw: &WindowDraw<'_>) -> Result<(), GpuError>;
}
