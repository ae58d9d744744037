// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row or column interlacing through the stencil buffer.

use kurbo::Line;
use stereo3d_core::window::TextureTarget;

use crate::error::GpuError;
use crate::gpu::{ColorMask, FragmentStage, GpuContext, StencilFunc, StencilOp, StencilOps};

use super::StereoFilter;

/// Separates the eyes by alternating pixel lines.
///
/// [`prepare`](StereoFilter::prepare) marks every other row (or column),
/// starting with the first, in the stencil buffer. Eye 0 then draws where
/// the stencil is clear and eye 1 where it is set.
#[derive(Debug, Default)]
pub struct InterlacedFilter {
    columns: bool,
}

impl InterlacedFilter {
    /// Alternates horizontal lines.
    #[must_use]
    pub fn rows() -> Self {
        Self { columns: false }
    }

    /// Alternates vertical lines.
    #[must_use]
    pub fn columns() -> Self {
        Self { columns: true }
    }

    /// Whether this filter alternates columns.
    #[must_use]
    pub fn is_columns(&self) -> bool {
        self.columns
    }

    /// The 1-pixel lines marked in the stencil buffer, every 2 pixels across
    /// the whole output.
    #[must_use]
    pub fn mask_lines(&self, width: f64, height: f64) -> Vec<Line> {
        let extent = if self.columns { width } else { height };
        let mut lines = Vec::new();
        let mut at = 0.0;
        while at <= extent {
            lines.push(if self.columns {
                Line::new((at, 0.0), (at, height))
            } else {
                Line::new((0.0, at), (width, at))
            });
            at += 2.0;
        }
        lines
    }
}

impl StereoFilter for InterlacedFilter {
    fn prepare(
        &mut self,
        gpu: &mut dyn GpuContext,
        width: f64,
        height: f64,
    ) -> Result<(), GpuError> {
        gpu.set_stencil_test(true);
        if let Err(err) = gpu.set_color_mask(ColorMask::NONE) {
            gpu.set_stencil_test(false);
            return Err(err);
        }
        gpu.set_stencil_writes(true);
        gpu.clear_stencil(0);
        gpu.set_stencil_ops(StencilOps {
            fail: StencilOp::Invert,
            ..StencilOps::KEEP
        });
        gpu.set_stencil_func(StencilFunc::Never, 1, 1);

        gpu.draw_overlay_lines(width, height, &self.mask_lines(width, height));

        gpu.set_stencil_writes(false);
        gpu.set_stencil_ops(StencilOps::KEEP);
        gpu.set_stencil_func(StencilFunc::NotEqual, 0, 1);
        gpu.set_color_mask(ColorMask::ALL)
    }

    /// Eye 0 draws on the unmarked lines (`stencil == 0`) and eye 1 on the
    /// marked ones. Older stereo plugins used the opposite mapping, so a
    /// setup ported from them needs `invert_eyes` flipped.
    fn apply(
        &mut self,
        gpu: &mut dyn GpuContext,
        eye_index: u8,
        fragment: &mut FragmentStage,
        target: TextureTarget,
    ) -> Result<(), GpuError> {
        _ = (fragment, target);
        let func = if eye_index == 0 {
            StencilFunc::Equal
        } else {
            StencilFunc::NotEqual
        };
        gpu.set_stencil_func(func, 0, 1);
        Ok(())
    }

    fn cleanup(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        gpu.set_stencil_writes(true);
        gpu.clear_stencil(0);
        gpu.set_stencil_func(StencilFunc::Always, 0, u8::MAX);
        gpu.set_stencil_test(false);
        Ok(())
    }
}
