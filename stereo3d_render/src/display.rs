// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing host calls to the right output.

use std::collections::BTreeMap;

use kurbo::{Point, Rect};
use stereo3d_core::options::StereoOptions;
use stereo3d_core::output::OutputId;
use stereo3d_core::trace::{FrameSummary, Tracer};
use stereo3d_core::window::{WindowId, WindowInfo};

use crate::cursor::CursorSource;
use crate::damage::DamageRegion;
use crate::error::RenderError;
use crate::gpu::GpuContext;
use crate::screen::StereoScreen;

/// A key-bound action, addressed to one output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StereoAction {
    /// [`StereoScreen::push_closer`].
    PushCloser,
    /// [`StereoScreen::push_farther`].
    PushFarther,
    /// [`StereoScreen::reset_foreground`].
    ResetForeground,
    /// [`StereoScreen::toggle`].
    Toggle,
}

/// Every output the effect runs on.
#[derive(Debug, Default)]
pub struct StereoDisplay {
    screens: BTreeMap<OutputId, StereoScreen>,
}

impl StereoDisplay {
    /// No outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the effect on `output`, replacing any previous screen for
    /// it.
    pub fn add_output(
        &mut self,
        output: OutputId,
        geometry: Rect,
        options: StereoOptions,
        cursor_source: Box<dyn CursorSource>,
        gpu: &mut dyn GpuContext,
    ) -> Result<(), RenderError> {
        if let Some(old) = self.screens.remove(&output) {
            old.shutdown(gpu);
        }
        let screen = StereoScreen::new(output, geometry, options, cursor_source, gpu)?;
        self.screens.insert(output, screen);
        Ok(())
    }

    /// Deactivates the effect on `output`. Returns `false` if it was not
    /// active there.
    pub fn remove_output(&mut self, output: OutputId, gpu: &mut dyn GpuContext) -> bool {
        match self.screens.remove(&output) {
            Some(screen) => {
                screen.shutdown(gpu);
                true
            }
            None => false,
        }
    }

    /// Managed outputs, in order.
    pub fn outputs(&self) -> impl Iterator<Item = OutputId> + '_ {
        self.screens.keys().copied()
    }

    /// The screen for `output`.
    #[must_use]
    pub fn screen(&self, output: OutputId) -> Option<&StereoScreen> {
        self.screens.get(&output)
    }

    /// The screen for `output`, mutably.
    pub fn screen_mut(&mut self, output: OutputId) -> Option<&mut StereoScreen> {
        self.screens.get_mut(&output)
    }

    fn require(&mut self, output: OutputId) -> Result<&mut StereoScreen, RenderError> {
        self.screens
            .get_mut(&output)
            .ok_or(RenderError::UnknownOutput(output))
    }

    /// Runs a key-bound action. Returns `Ok(false)` for an unmanaged output.
    pub fn handle_action(
        &mut self,
        output: OutputId,
        action: StereoAction,
        gpu: &mut dyn GpuContext,
    ) -> Result<bool, RenderError> {
        let Some(screen) = self.screens.get_mut(&output) else {
            log::debug!("ignoring {action:?} for unmanaged {output}");
            return Ok(false);
        };
        match action {
            StereoAction::PushCloser => screen.push_closer(),
            StereoAction::PushFarther => screen.push_farther(),
            StereoAction::ResetForeground => screen.reset_foreground(),
            StereoAction::Toggle => screen.toggle(gpu)?,
        }
        Ok(true)
    }

    /// Forwards a polled pointer position. Returns `false` for an unmanaged
    /// output.
    pub fn pointer_moved(&mut self, output: OutputId, position: Point) -> bool {
        match self.screens.get_mut(&output) {
            Some(screen) => {
                screen.set_pointer(position);
                true
            }
            None => false,
        }
    }

    /// Applies new options to every output.
    ///
    /// Nothing changes anywhere if the options are rejected.
    pub fn set_options(&mut self, options: &StereoOptions) -> Result<(), RenderError> {
        let mut checked = options.clone();
        crate::config::sanitize(&mut checked);
        crate::config::match_set(&checked)
            .map_err(|(which, source)| RenderError::Match { which, source })?;
        for screen in self.screens.values_mut() {
            screen.set_options(checked.clone())?;
        }
        Ok(())
    }

    /// Starts tracking a window on `output`.
    pub fn add_window(
        &mut self,
        output: OutputId,
        info: WindowInfo,
    ) -> Result<WindowId, RenderError> {
        Ok(self.require(output)?.add_window(info))
    }

    /// Stops tracking a window. Returns `false` for an unmanaged output or a
    /// stale handle.
    pub fn remove_window(&mut self, output: OutputId, id: WindowId) -> bool {
        self.screens
            .get_mut(&output)
            .is_some_and(|screen| screen.remove_window(id))
    }

    /// Replaces a window's host properties. Returns `false` for an unmanaged
    /// output or a stale handle.
    pub fn update_window(&mut self, output: OutputId, id: WindowId, info: WindowInfo) -> bool {
        self.screens
            .get_mut(&output)
            .is_some_and(|screen| screen.update_window(id, info))
    }

    /// Puts an output's windows into the given bottom-to-top order.
    pub fn restack(&mut self, output: OutputId, order: &[WindowId]) -> Result<(), RenderError> {
        self.require(output)?.restack(order);
        Ok(())
    }

    /// [`StereoScreen::prepare_frame`] for `output`.
    pub fn prepare_frame(
        &mut self,
        output: OutputId,
        gpu: &mut dyn GpuContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RenderError> {
        self.require(output)?.prepare_frame(gpu, tracer)
    }

    /// [`StereoScreen::paint_output`] for `output`.
    pub fn paint_output(
        &mut self,
        output: OutputId,
        gpu: &mut dyn GpuContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<Option<FrameSummary>, RenderError> {
        Ok(self.require(output)?.paint_output(gpu, tracer))
    }

    /// [`StereoScreen::done_paint`] for `output`; no damage for an unmanaged
    /// output.
    #[must_use]
    pub fn done_paint(&self, output: OutputId) -> DamageRegion {
        self.screens
            .get(&output)
            .map_or(DamageRegion::None, StereoScreen::done_paint)
    }

    /// Damage across every output.
    #[must_use]
    pub fn damage(&self) -> DamageRegion {
        let mut damage = DamageRegion::None;
        for screen in self.screens.values() {
            damage.merge(&screen.done_paint());
        }
        damage
    }

    /// Deactivates the effect everywhere.
    pub fn shutdown(self, gpu: &mut dyn GpuContext) {
        for screen in self.screens.into_values() {
            screen.shutdown(gpu);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::StaticCursorSource;
    use crate::headless::HeadlessGpu;
    use stereo3d_core::window::WindowType;

    const LEFT: OutputId = OutputId(0);
    const RIGHT: OutputId = OutputId(1);

    fn two_outputs(gpu: &mut HeadlessGpu) -> StereoDisplay {
        let mut display = StereoDisplay::new();
        for (output, x) in [(LEFT, 0.0), (RIGHT, 1920.0)] {
            display
                .add_output(
                    output,
                    Rect::new(x, 0.0, x + 1920.0, 1080.0),
                    StereoOptions::default(),
                    Box::new(StaticCursorSource::new(None)),
                    gpu,
                )
                .unwrap();
        }
        display
    }

    #[test]
    fn actions_reach_only_their_output() {
        let mut gpu = HeadlessGpu::new();
        let mut display = two_outputs(&mut gpu);

        assert!(
            display
                .handle_action(RIGHT, StereoAction::PushFarther, &mut gpu)
                .unwrap()
        );
        let target = |d: &StereoDisplay, o| d.screen(o).unwrap().animation().foreground_target();
        assert!(target(&display, RIGHT) > 0.0);
        assert_eq!(target(&display, LEFT), 0.0);

        display
            .handle_action(LEFT, StereoAction::Toggle, &mut gpu)
            .unwrap();
        assert!(!display.screen(LEFT).unwrap().is_enabled());
        assert!(display.screen(RIGHT).unwrap().is_enabled());
    }

    #[test]
    fn unknown_outputs_are_ignored() {
        let mut gpu = HeadlessGpu::new();
        let mut display = two_outputs(&mut gpu);
        let unknown = OutputId(7);

        assert!(
            !display
                .handle_action(unknown, StereoAction::Toggle, &mut gpu)
                .unwrap()
        );
        assert!(!display.pointer_moved(unknown, Point::new(1.0, 1.0)));
        assert!(display.done_paint(unknown).is_empty());
        let err = display
            .add_window(unknown, WindowInfo::new(WindowType::Normal, Rect::ZERO))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownOutput(o) if o == unknown));
        let mut tracer = Tracer::none();
        assert!(display.prepare_frame(unknown, &mut gpu, &mut tracer).is_err());
    }

    #[test]
    fn damage_covers_enabled_outputs() {
        let mut gpu = HeadlessGpu::new();
        let mut display = two_outputs(&mut gpu);
        assert_eq!(
            display.damage(),
            DamageRegion::Full(Rect::new(0.0, 0.0, 3840.0, 1080.0))
        );

        display
            .handle_action(RIGHT, StereoAction::Toggle, &mut gpu)
            .unwrap();
        assert_eq!(
            display.damage(),
            DamageRegion::Full(Rect::new(0.0, 0.0, 1920.0, 1080.0))
        );
    }

    #[test]
    fn rejected_options_change_nothing() {
        let mut gpu = HeadlessGpu::new();
        let mut display = two_outputs(&mut gpu);
        let options = StereoOptions {
            desktop_match: String::new(),
            invert_eyes: true,
            ..StereoOptions::default()
        };
        assert!(display.set_options(&options).is_err());
        assert!(
            display
                .outputs()
                .all(|o| !display.screen(o).unwrap().options().invert_eyes)
        );
    }

    #[test]
    fn shutdown_releases_every_output() {
        let mut gpu = HeadlessGpu::new();
        let mut display = two_outputs(&mut gpu);
        let mut tracer = Tracer::none();
        for output in [LEFT, RIGHT] {
            display
                .add_window(output, WindowInfo::new(WindowType::Desktop, Rect::ZERO))
                .unwrap();
            display.prepare_frame(output, &mut gpu, &mut tracer).unwrap();
            display.paint_output(output, &mut gpu, &mut tracer).unwrap();
        }
        assert_eq!(gpu.live_textures(), 2);
        assert!(display.remove_output(LEFT, &mut gpu));
        assert!(!display.remove_output(LEFT, &mut gpu));
        display.shutdown(&mut gpu);
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(gpu.live_programs(), 0);
    }
}
