// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output filters that combine the two eye images into one framebuffer.
//!
//! A filter is driven in a fixed order each frame:
//!
//! 1. [`prepare`](StereoFilter::prepare) once, before any window is drawn;
//! 2. [`apply`](StereoFilter::apply) before every window draw, with the eye
//!    index the draw belongs to;
//! 3. [`cleanup`](StereoFilter::cleanup) once, after the last draw.
//!
//! [`init`](StereoFilter::init) and [`deinit`](StereoFilter::deinit) bracket
//! the time the effect is enabled on an output.
//!
//! Two filters exist. [`AnaglyphFilter`] separates the eyes by color channel;
//! [`InterlacedFilter`] separates them by alternating pixel rows or columns
//! through the stencil buffer. [`FilterSet`] owns one of each and picks the
//! right one for a [`StereoMode`].

mod anaglyph;
mod interlaced;

pub use anaglyph::AnaglyphFilter;
pub use interlaced::InterlacedFilter;

use stereo3d_core::options::StereoMode;
use stereo3d_core::window::TextureTarget;

use crate::error::GpuError;
use crate::gpu::{FragmentStage, GpuContext};

/// Combines left and right eye draws into one image.
pub trait StereoFilter {
    /// Acquires whatever the filter keeps while the effect is enabled.
    fn init(&mut self, gpu: &mut dyn GpuContext) {
        _ = gpu;
    }

    /// Releases everything acquired since [`init`](Self::init).
    fn deinit(&mut self, gpu: &mut dyn GpuContext) {
        _ = gpu;
    }

    /// Sets up masking for a `width × height` output, before the draw passes.
    fn prepare(&mut self, gpu: &mut dyn GpuContext, width: f64, height: f64)
    -> Result<(), GpuError>;

    /// Restricts the next window draw to eye `eye_index` (0 or 1).
    ///
    /// On error the filter has still done as much as it could; the draw can
    /// go ahead.
    fn apply(
        &mut self,
        gpu: &mut dyn GpuContext,
        eye_index: u8,
        fragment: &mut FragmentStage,
        target: TextureTarget,
    ) -> Result<(), GpuError>;

    /// Undoes [`prepare`](Self::prepare) and every [`apply`](Self::apply).
    fn cleanup(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError>;
}

/// One instance of every filter, owned by an output.
#[derive(Debug, Default)]
pub struct FilterSet {
    anaglyph: AnaglyphFilter,
    rows: InterlacedFilter,
    columns: InterlacedFilter,
}

impl FilterSet {
    /// Fresh filters with nothing allocated.
    #[must_use]
    pub fn new() -> Self {
        Self {
            anaglyph: AnaglyphFilter::new(),
            rows: InterlacedFilter::rows(),
            columns: InterlacedFilter::columns(),
        }
    }

    /// The filter used for `mode`.
    pub fn select(&mut self, mode: StereoMode) -> &mut dyn StereoFilter {
        match mode {
            StereoMode::Anaglyph25D | StereoMode::Anaglyph => &mut self.anaglyph,
            StereoMode::InterlacedRow => &mut self.rows,
            StereoMode::InterlacedColumn => &mut self.columns,
        }
    }

    /// Calls [`StereoFilter::init`] on every filter.
    pub fn init(&mut self, gpu: &mut dyn GpuContext) {
        self.anaglyph.init(gpu);
        self.rows.init(gpu);
        self.columns.init(gpu);
    }

    /// Calls [`StereoFilter::deinit`] on every filter.
    pub fn deinit(&mut self, gpu: &mut dyn GpuContext) {
        self.anaglyph.deinit(gpu);
        self.rows.deinit(gpu);
        self.columns.deinit(gpu);
    }
}
