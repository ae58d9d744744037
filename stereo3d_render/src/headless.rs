// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`GpuContext`] without a GPU.
//!
//! [`HeadlessGpu`] tracks the state a real driver would hold (write masks,
//! stencil configuration, the projection stack and live resources) and
//! records every call as a [`GpuCommand`]. Window draws capture the mask and
//! stencil state in effect, so a test can tell which eye a draw could reach.
//!
//! The `fail_*` switches make the matching calls report an error, for
//! exercising the degraded paths.

use std::collections::BTreeMap;

use kurbo::{Line, Rect};
use stereo3d_core::transform::Transform3d;
use stereo3d_core::window::{PaintAttribs, TextureTarget, WindowId};

use crate::error::GpuError;
use crate::gpu::{
    ColorMask, ColorMatrix, GpuContext, Line3d, LineStyle, StencilFunc, StencilOps, WindowDraw,
};
use crate::resource::{ProgramId, TextureId};

/// Color mask and stencil enables, for before/after comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskState {
    /// Color channel mask.
    pub color: ColorMask,
    /// Whether the stencil test is enabled.
    pub stencil_test: bool,
    /// Whether the stencil buffer is writable.
    pub stencil_writes: bool,
}

/// Stencil comparison as last set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StencilCompare {
    /// Comparison function.
    pub func: StencilFunc,
    /// Reference value.
    pub reference: u8,
    /// Comparison mask.
    pub mask: u8,
}

impl Default for StencilCompare {
    fn default() -> Self {
        Self {
            func: StencilFunc::Always,
            reference: 0,
            mask: u8::MAX,
        }
    }
}

/// A live texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessTexture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Uploaded BGRA bytes.
    pub bgra: Vec<u8>,
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCommand {
    /// [`GpuContext::set_color_mask`].
    ColorMask(ColorMask),
    /// [`GpuContext::set_stencil_test`].
    StencilTest(bool),
    /// [`GpuContext::set_stencil_writes`].
    StencilWrites(bool),
    /// [`GpuContext::set_stencil_func`].
    StencilFunc(StencilCompare),
    /// [`GpuContext::set_stencil_ops`].
    StencilOps(StencilOps),
    /// [`GpuContext::clear_stencil`].
    ClearStencil(u8),
    /// [`GpuContext::draw_overlay_lines`].
    OverlayLines {
        /// Overlay width.
        width: f64,
        /// Overlay height.
        height: f64,
        /// The lines.
        lines: Vec<Line>,
    },
    /// [`GpuContext::draw_lines`].
    Lines {
        /// Model transform.
        transform: Transform3d,
        /// The lines.
        lines: Vec<Line3d>,
        /// Width and smoothing.
        style: LineStyle,
    },
    /// [`GpuContext::push_projection`].
    PushProjection,
    /// [`GpuContext::load_projection`].
    LoadProjection(Transform3d),
    /// [`GpuContext::pop_projection`].
    PopProjection,
    /// [`GpuContext::create_program`].
    CreateProgram(ProgramId, TextureTarget),
    /// [`GpuContext::destroy_program`].
    DestroyProgram(ProgramId),
    /// [`GpuContext::create_texture`].
    CreateTexture(TextureId),
    /// [`GpuContext::destroy_texture`].
    DestroyTexture(TextureId),
    /// [`GpuContext::draw_textured_quad`].
    TexturedQuad {
        /// The texture.
        texture: TextureId,
        /// Projection in effect.
        projection: Transform3d,
        /// Model transform.
        transform: Transform3d,
        /// Destination rectangle in pixels.
        rect: Rect,
    },
    /// [`GpuContext::draw_window`].
    Window(WindowCommand),
}

/// A recorded window draw with the state it was drawn under.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCommand {
    /// The window.
    pub window: WindowId,
    /// Projection in effect.
    pub projection: Transform3d,
    /// Model transform.
    pub transform: Transform3d,
    /// Paint attributes.
    pub paint: PaintAttribs,
    /// Extra fragment programs.
    pub programs: Vec<ProgramId>,
    /// Color mask in effect.
    pub color_mask: ColorMask,
    /// Whether the stencil test was enabled.
    pub stencil_test: bool,
    /// Stencil comparison in effect.
    pub stencil: StencilCompare,
}

/// A state-tracking, command-recording [`GpuContext`].
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    color_mask: ColorMask,
    stencil_test: bool,
    stencil_writes: bool,
    stencil: StencilCompare,
    stencil_ops: StencilOps,
    stencil_clear: u8,
    projection: Transform3d,
    projection_stack: Vec<Transform3d>,
    programs: BTreeMap<ProgramId, (ColorMatrix, TextureTarget)>,
    textures: BTreeMap<TextureId, HeadlessTexture>,
    next_resource: u64,
    commands: Vec<GpuCommand>,
    /// Reject color mask changes.
    pub fail_color_mask: bool,
    /// Reject program builds.
    pub fail_programs: bool,
    /// Reject texture allocations.
    pub fail_textures: bool,
    /// Reject window draws.
    pub fail_window_draws: bool,
    /// Reject projection pushes.
    pub fail_projection_push: bool,
}

impl HeadlessGpu {
    /// Default GL state: all channels writable, stencil test off, identity
    /// projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stencil_writes: true,
            ..Self::default()
        }
    }

    /// Recorded calls, oldest first.
    #[must_use]
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Takes the recorded calls, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        core::mem::take(&mut self.commands)
    }

    /// Recorded window draws, oldest first.
    pub fn window_draws(&self) -> impl Iterator<Item = &WindowCommand> {
        self.commands.iter().filter_map(|c| match c {
            GpuCommand::Window(w) => Some(w),
            _ => None,
        })
    }

    /// Current color mask.
    #[must_use]
    pub fn color_mask(&self) -> ColorMask {
        self.color_mask
    }

    /// Current color mask and stencil enables.
    #[must_use]
    pub fn mask_state(&self) -> MaskState {
        MaskState {
            color: self.color_mask,
            stencil_test: self.stencil_test,
            stencil_writes: self.stencil_writes,
        }
    }

    /// Current stencil comparison.
    #[must_use]
    pub fn stencil_compare(&self) -> StencilCompare {
        self.stencil
    }

    /// Current stencil operations.
    #[must_use]
    pub fn stencil_ops(&self) -> StencilOps {
        self.stencil_ops
    }

    /// Value the stencil buffer was last cleared to.
    #[must_use]
    pub fn stencil_clear_value(&self) -> u8 {
        self.stencil_clear
    }

    /// Current projection matrix.
    #[must_use]
    pub fn projection(&self) -> Transform3d {
        self.projection
    }

    /// Number of saved projection matrices.
    #[must_use]
    pub fn projection_depth(&self) -> usize {
        self.projection_stack.len()
    }

    /// Number of live programs.
    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// The matrix and target a live program was built for.
    #[must_use]
    pub fn program(&self, id: ProgramId) -> Option<&(ColorMatrix, TextureTarget)> {
        self.programs.get(&id)
    }

    /// Number of live textures.
    #[must_use]
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// A live texture.
    #[must_use]
    pub fn texture(&self, id: TextureId) -> Option<&HeadlessTexture> {
        self.textures.get(&id)
    }

    fn allocate(&mut self) -> u64 {
        self.next_resource += 1;
        self.next_resource
    }
}

impl GpuContext for HeadlessGpu {
    fn set_color_mask(&mut self, mask: ColorMask) -> Result<(), GpuError> {
        if self.fail_color_mask {
            return Err(GpuError::State {
                operation: "color mask",
            });
        }
        self.color_mask = mask;
        self.commands.push(GpuCommand::ColorMask(mask));
        Ok(())
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.stencil_test = enabled;
        self.commands.push(GpuCommand::StencilTest(enabled));
    }

    fn set_stencil_writes(&mut self, enabled: bool) {
        self.stencil_writes = enabled;
        self.commands.push(GpuCommand::StencilWrites(enabled));
    }

    fn set_stencil_func(&mut self, func: StencilFunc, reference: u8, mask: u8) {
        self.stencil = StencilCompare {
            func,
            reference,
            mask,
        };
        self.commands.push(GpuCommand::StencilFunc(self.stencil));
    }

    fn set_stencil_ops(&mut self, ops: StencilOps) {
        self.stencil_ops = ops;
        self.commands.push(GpuCommand::StencilOps(ops));
    }

    fn clear_stencil(&mut self, value: u8) {
        self.stencil_clear = value;
        self.commands.push(GpuCommand::ClearStencil(value));
    }

    fn draw_overlay_lines(&mut self, width: f64, height: f64, lines: &[Line]) {
        self.commands.push(GpuCommand::OverlayLines {
            width,
            height,
            lines: lines.to_vec(),
        });
    }

    fn draw_lines(&mut self, transform: &Transform3d, lines: &[Line3d], style: LineStyle) {
        self.commands.push(GpuCommand::Lines {
            transform: *transform,
            lines: lines.to_vec(),
            style,
        });
    }

    fn push_projection(&mut self) -> Result<(), GpuError> {
        if self.fail_projection_push {
            return Err(GpuError::State {
                operation: "projection push",
            });
        }
        self.projection_stack.push(self.projection);
        self.commands.push(GpuCommand::PushProjection);
        Ok(())
    }

    fn load_projection(&mut self, projection: &Transform3d) {
        self.projection = *projection;
        self.commands.push(GpuCommand::LoadProjection(*projection));
    }

    fn pop_projection(&mut self) -> Result<(), GpuError> {
        self.projection = self.projection_stack.pop().ok_or(GpuError::StackUnderflow)?;
        self.commands.push(GpuCommand::PopProjection);
        Ok(())
    }

    fn create_program(
        &mut self,
        matrix: &ColorMatrix,
        target: TextureTarget,
    ) -> Result<ProgramId, GpuError> {
        if self.fail_programs {
            return Err(GpuError::Program {
                reason: String::from("program builds disabled"),
            });
        }
        let id = ProgramId(self.allocate());
        self.programs.insert(id, (*matrix, target));
        self.commands.push(GpuCommand::CreateProgram(id, target));
        Ok(id)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.commands.push(GpuCommand::DestroyProgram(program));
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        bgra: &[u8],
    ) -> Result<TextureId, GpuError> {
        let expected = u64::from(width) * u64::from(height) * 4;
        if self.fail_textures || width == 0 || height == 0 || bgra.len() as u64 != expected {
            return Err(GpuError::Texture { width, height });
        }
        let id = TextureId(self.allocate());
        self.textures.insert(
            id,
            HeadlessTexture {
                width,
                height,
                bgra: bgra.to_vec(),
            },
        );
        self.commands.push(GpuCommand::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.commands.push(GpuCommand::DestroyTexture(texture));
    }

    fn draw_textured_quad(&mut self, texture: TextureId, transform: &Transform3d, rect: Rect) {
        self.commands.push(GpuCommand::TexturedQuad {
            texture,
            projection: self.projection,
            transform: *transform,
            rect,
        });
    }

    fn draw_window(&mut self, draw: &WindowDraw<'_>) -> Result<(), GpuError> {
        if self.fail_window_draws {
            return Err(GpuError::State {
                operation: "window draw",
            });
        }
        self.commands.push(GpuCommand::Window(WindowCommand {
            window: draw.window,
            projection: self.projection,
            transform: draw.transform,
            paint: draw.paint,
            programs: draw.fragment.programs().to_vec(),
            color_mask: self.color_mask,
            stencil_test: self.stencil_test,
            stencil: self.stencil,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_stack_restores() {
        let mut gpu = HeadlessGpu::new();
        let m = Transform3d::from_translation(1.0, 2.0, 3.0);
        gpu.push_projection().unwrap();
        gpu.load_projection(&m);
        assert_eq!(gpu.projection(), m);
        gpu.pop_projection().unwrap();
        assert_eq!(gpu.projection(), Transform3d::IDENTITY);
        assert_eq!(gpu.pop_projection(), Err(GpuError::StackUnderflow));
    }

    #[test]
    fn failing_color_mask_keeps_state() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_color_mask = true;
        assert!(gpu.set_color_mask(ColorMask::NONE).is_err());
        assert_eq!(gpu.color_mask(), ColorMask::ALL);
        assert!(gpu.commands().is_empty());
    }

    #[test]
    fn texture_size_must_match_bytes() {
        let mut gpu = HeadlessGpu::new();
        assert!(gpu.create_texture(2, 2, &[0; 15]).is_err());
        let id = gpu.create_texture(2, 2, &[0; 16]).unwrap();
        assert_eq!(gpu.live_textures(), 1);
        gpu.destroy_texture(id);
        assert_eq!(gpu.live_textures(), 0);
    }
}
