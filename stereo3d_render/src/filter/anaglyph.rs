// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Red/cyan anaglyph filter.

use stereo3d_core::window::TextureTarget;

use crate::error::GpuError;
use crate::gpu::{ColorMask, ColorMatrix, FragmentStage, GpuContext};
use crate::resource::ProgramId;

use super::StereoFilter;

/// Separates the eyes by color channel.
///
/// Eye 0 writes green, blue and alpha; eye 1 writes red and alpha. Every
/// draw also runs [`ColorMatrix::ANAGLYPH`] so that saturated reds and blues
/// still reach both eyes. The program is built the first time a texture
/// target is seen and kept until [`deinit`](StereoFilter::deinit).
#[derive(Debug, Default)]
pub struct AnaglyphFilter {
    programs: [Option<ProgramId>; TextureTarget::COUNT],
}

impl AnaglyphFilter {
    /// A filter with no programs built yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached program for `target`, building it if needed.
    fn program(
        &mut self,
        gpu: &mut dyn GpuContext,
        target: TextureTarget,
    ) -> Result<ProgramId, GpuError> {
        let slot = &mut self.programs[target.index()];
        if let Some(program) = *slot {
            return Ok(program);
        }
        let program = gpu.create_program(&ColorMatrix::ANAGLYPH, target)?;
        log::debug!("built anaglyph program {program:?} for {target:?}");
        *slot = Some(program);
        Ok(program)
    }
}

impl StereoFilter for AnaglyphFilter {
    fn deinit(&mut self, gpu: &mut dyn GpuContext) {
        for program in self.programs.iter_mut().filter_map(Option::take) {
            gpu.destroy_program(program);
        }
    }

    fn prepare(
        &mut self,
        gpu: &mut dyn GpuContext,
        width: f64,
        height: f64,
    ) -> Result<(), GpuError> {
        _ = (gpu, width, height);
        Ok(())
    }

    fn apply(
        &mut self,
        gpu: &mut dyn GpuContext,
        eye_index: u8,
        fragment: &mut FragmentStage,
        target: TextureTarget,
    ) -> Result<(), GpuError> {
        let mask = if eye_index == 0 {
            ColorMask::CYAN
        } else {
            ColorMask::RED
        };
        let masked = gpu.set_color_mask(mask);
        let program = self.program(gpu, target).map(|p| fragment.push(p));
        masked.and(program)
    }

    fn cleanup(&mut self, gpu: &mut dyn GpuContext) -> Result<(), GpuError> {
        gpu.set_color_mask(ColorMask::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{GpuCommand, HeadlessGpu};

    #[test]
    fn eyes_write_complementary_channels() {
        let mut gpu = HeadlessGpu::new();
        let mut filter = AnaglyphFilter::new();
        let mut stage = FragmentStage::new();

        filter
            .apply(&mut gpu, 0, &mut stage, TextureTarget::Texture2d)
            .unwrap();
        assert_eq!(gpu.color_mask(), ColorMask::CYAN);
        filter
            .apply(&mut gpu, 1, &mut stage, TextureTarget::Texture2d)
            .unwrap();
        assert_eq!(gpu.color_mask(), ColorMask::RED);

        filter.cleanup(&mut gpu).unwrap();
        assert_eq!(gpu.color_mask(), ColorMask::ALL);
    }

    #[test]
    fn program_is_built_once_per_target() {
        let mut gpu = HeadlessGpu::new();
        let mut filter = AnaglyphFilter::new();

        let mut programs = Vec::new();
        for target in [
            TextureTarget::Texture2d,
            TextureTarget::Texture2d,
            TextureTarget::Rectangle,
        ] {
            let mut stage = FragmentStage::new();
            filter.apply(&mut gpu, 0, &mut stage, target).unwrap();
            assert_eq!(stage.programs().len(), 1, "one program appended");
            programs.push(stage.programs()[0]);
        }
        assert_eq!(programs[0], programs[1]);
        assert_ne!(programs[0], programs[2]);
        assert_eq!(gpu.live_programs(), 2);
        let (matrix, target) = gpu.program(programs[2]).unwrap();
        assert_eq!(*matrix, ColorMatrix::ANAGLYPH);
        assert_eq!(*target, TextureTarget::Rectangle);

        filter.deinit(&mut gpu);
        assert_eq!(gpu.live_programs(), 0);
        let destroyed = gpu
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::DestroyProgram(_)))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn failed_program_still_masks() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_programs = true;
        let mut filter = AnaglyphFilter::new();
        let mut stage = FragmentStage::new();

        let err = filter
            .apply(&mut gpu, 1, &mut stage, TextureTarget::Texture2d)
            .unwrap_err();
        assert!(matches!(err, GpuError::Program { .. }), "got {err:?}");
        assert!(stage.programs().is_empty());
        assert_eq!(gpu.color_mask(), ColorMask::RED);

        gpu.fail_programs = false;
        filter
            .apply(&mut gpu, 1, &mut stage, TextureTarget::Texture2d)
            .unwrap();
        assert_eq!(stage.programs().len(), 1, "retried after failure");
    }

    #[test]
    fn failed_mask_still_appends_program() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_color_mask = true;
        let mut filter = AnaglyphFilter::new();
        let mut stage = FragmentStage::new();

        let err = filter
            .apply(&mut gpu, 0, &mut stage, TextureTarget::Texture2d)
            .unwrap_err();
        assert!(matches!(err, GpuError::State { .. }), "got {err:?}");
        assert_eq!(stage.programs().len(), 1);
    }
}
