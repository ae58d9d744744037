// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-output render coordinator.
//!
//! [`StereoScreen`] is driven by three calls per output frame:
//!
//! 1. [`prepare_frame`](StereoScreen::prepare_frame): cursor bookkeeping,
//!    stereo geometry and projections, then one step of the depth animation.
//! 2. [`paint_output`](StereoScreen::paint_output): filter setup, every
//!    viewable window drawn once per eye with the cursor after its anchor
//!    window, filter cleanup.
//! 3. [`done_paint`](StereoScreen::done_paint): damage for the next frame.
//!
//! The mode, geometry and projections a frame uses are fixed by
//! `prepare_frame`; option changes in between apply to the next frame.

use kurbo::{Point, Rect};
use stereo3d_core::animation::{AnimationManager, FrameOutcome};
use stereo3d_core::classify::FloatingCategory;
use stereo3d_core::matching::WindowMatchSet;
use stereo3d_core::options::{StereoMode, StereoOptions};
use stereo3d_core::output::OutputId;
use stereo3d_core::projection::{
    DEFAULT_Z_CAMERA, Eye, EyeProjections, StereoGeometry, screen_space, world_z_correction,
};
use stereo3d_core::trace::{
    FrameEvent, FrameSummary, FrameSummaryBuilder, PassEvent, RenderPhase, Tracer, WarningEvent,
    WarningKind,
};
use stereo3d_core::transform::Transform3d;
use stereo3d_core::window::{WindowId, WindowInfo, WindowStore};

use crate::config::{match_set, sanitize};
use crate::cursor::{CursorCapture, CursorSource, CursorTexture};
use crate::damage::DamageRegion;
use crate::error::{GpuError, RenderError};
use crate::filter::{FilterSet, StereoFilter};
use crate::gpu::{ColorMask, FragmentStage, GpuContext, WindowDraw};
use crate::wireframe::{WIREFRAME_STYLE, background_wireframe};

/// Stereo rendering state for one output.
pub struct StereoScreen {
    output: OutputId,
    geometry: Rect,
    enabled: bool,
    mouse_drawing: bool,
    cursor_failed: bool,
    options: StereoOptions,
    rules: WindowMatchSet,
    windows: WindowStore,
    animation: AnimationManager,
    projections: EyeProjections,
    stereo: StereoGeometry,
    phase: RenderPhase,
    filters: FilterSet,
    cursor_source: Box<dyn CursorSource>,
    cursor: CursorTexture,
    frame_index: u64,
    frame: FrameEvent,
    outcome: FrameOutcome,
    frame_warnings: u32,
}

impl core::fmt::Debug for StereoScreen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StereoScreen")
            .field("output", &self.output)
            .field("geometry", &self.geometry)
            .field("enabled", &self.enabled)
            .field("mouse_drawing", &self.mouse_drawing)
            .field("mode", &self.options.mode)
            .field("phase", &self.phase)
            .field("windows", &self.windows.len())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl StereoScreen {
    /// Activates the effect on an output.
    ///
    /// Out-of-range numeric options are repaired. Fails if a match expression
    /// does not parse, the output has no area, or cursor drawing is on and
    /// the cursor texture cannot be created; nothing stays allocated on
    /// failure.
    pub fn new(
        output: OutputId,
        geometry: Rect,
        mut options: StereoOptions,
        cursor_source: Box<dyn CursorSource>,
        gpu: &mut dyn GpuContext,
    ) -> Result<Self, RenderError> {
        if geometry.width() <= 0.0 || geometry.height() <= 0.0 {
            return Err(RenderError::EmptyOutput { output });
        }
        sanitize(&mut options);
        let rules =
            match_set(&options).map_err(|(which, source)| RenderError::Match { which, source })?;

        let mut screen = Self {
            output,
            geometry,
            enabled: true,
            mouse_drawing: options.draw_mouse,
            cursor_failed: false,
            frame: FrameEvent {
                frame_index: 0,
                output,
                mode: options.mode,
                floating_count: 1,
                foreground_depth: 0.0,
                has_anchor: false,
            },
            options,
            rules,
            windows: WindowStore::new(),
            animation: AnimationManager::new(),
            projections: EyeProjections::default(),
            stereo: StereoGeometry::default(),
            phase: RenderPhase::Idle,
            filters: FilterSet::new(),
            cursor_source,
            cursor: CursorTexture::new(),
            frame_index: 0,
            outcome: FrameOutcome {
                floating_count: 1,
                anchor: None,
                background: None,
            },
            frame_warnings: 0,
        };

        screen.filters.init(gpu);
        if screen.mouse_drawing {
            if let Err(err) = screen.enable_mouse_drawing(gpu) {
                screen.filters.deinit(gpu);
                return Err(err);
            }
        }
        log::debug!("stereo effect active on {output}");
        Ok(screen)
    }

    // -- Windows ----------------------------------------------------------

    /// Starts tracking a window, on top of the stacking order.
    pub fn add_window(&mut self, info: WindowInfo) -> WindowId {
        self.windows.insert(info)
    }

    /// Stops tracking a window. Returns `false` for a stale handle.
    pub fn remove_window(&mut self, id: WindowId) -> bool {
        self.windows.remove(id).is_some()
    }

    /// Replaces a window's host properties. Returns `false` for a stale
    /// handle.
    pub fn update_window(&mut self, id: WindowId, info: WindowInfo) -> bool {
        self.windows.set_info(id, info)
    }

    /// Moves a window to the top of the stacking order.
    pub fn raise_window(&mut self, id: WindowId) -> bool {
        self.windows.raise(id)
    }

    /// Puts windows into the given bottom-to-top order.
    pub fn restack(&mut self, order: &[WindowId]) {
        self.windows.restack(order);
    }

    /// Tracked windows.
    #[must_use]
    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    // -- Options and input ------------------------------------------------

    /// Replaces the options, effective from the next frame.
    ///
    /// Fails, keeping the previous options, if a match expression does not
    /// parse.
    pub fn set_options(&mut self, mut options: StereoOptions) -> Result<(), RenderError> {
        sanitize(&mut options);
        self.rules =
            match_set(&options).map_err(|(which, source)| RenderError::Match { which, source })?;
        self.options = options;
        self.cursor_failed = false;
        Ok(())
    }

    /// Changes the output rectangle.
    pub fn resize(&mut self, geometry: Rect) -> Result<(), RenderError> {
        if geometry.width() <= 0.0 || geometry.height() <= 0.0 {
            return Err(RenderError::EmptyOutput {
                output: self.output,
            });
        }
        self.geometry = geometry;
        Ok(())
    }

    /// Sets where the cursor eases toward, in output pixels.
    pub fn set_pointer(&mut self, position: Point) {
        self.animation.set_mouse_target(position);
    }

    /// Moves the foreground one step toward the background.
    pub fn push_closer(&mut self) {
        self.animation.push_foreground_closer();
    }

    /// Moves the foreground one step toward the viewer.
    pub fn push_farther(&mut self) {
        self.animation.push_foreground_farther();
    }

    /// Puts the foreground back on the screen plane.
    pub fn reset_foreground(&mut self) {
        self.animation.reset_foreground_depth();
    }

    /// Switches the effect on or off.
    ///
    /// Switching off releases filter resources and the cursor texture;
    /// switching on acquires them again. If the cursor texture cannot be
    /// created the effect is still switched on, without cursor drawing, and
    /// the error is returned.
    pub fn toggle(&mut self, gpu: &mut dyn GpuContext) -> Result<(), RenderError> {
        self.enabled = !self.enabled;
        log::debug!(
            "stereo effect {} on {}",
            if self.enabled { "enabled" } else { "disabled" },
            self.output
        );
        if !self.enabled {
            self.filters.deinit(gpu);
            if self.mouse_drawing {
                self.disable_mouse_drawing(gpu);
            }
            return Ok(());
        }

        self.filters.init(gpu);
        if self.mouse_drawing {
            if let Err(err) = self.enable_mouse_drawing(gpu) {
                self.mouse_drawing = false;
                self.cursor_failed = true;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Re-captures the cursor image after the host reports a change.
    ///
    /// A source that has nothing to offer leaves the placeholder in place
    /// and is traced as [`WarningKind::CursorSourceUnavailable`].
    pub fn refresh_cursor(
        &mut self,
        gpu: &mut dyn GpuContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RenderError> {
        if !(self.enabled && self.mouse_drawing) {
            return Ok(());
        }
        let capture = self
            .cursor
            .update(gpu, &mut *self.cursor_source)
            .map_err(RenderError::CursorTexture)?;
        if capture == CursorCapture::Placeholder {
            tracer.warning(&WarningEvent {
                frame_index: self.frame.frame_index,
                output: self.output,
                kind: WarningKind::CursorSourceUnavailable,
            });
        }
        Ok(())
    }

    // -- Frame ------------------------------------------------------------

    /// Prepares the next frame. Does nothing while the effect is off.
    ///
    /// The frame is fully prepared even when an error is returned; the error
    /// reports that cursor drawing could not be switched on. It is not
    /// retried until the options change.
    pub fn prepare_frame(
        &mut self,
        gpu: &mut dyn GpuContext,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), RenderError> {
        if !self.enabled {
            return Ok(());
        }
        self.frame_warnings = 0;
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut result = Ok(());
        if self.options.draw_mouse && !self.mouse_drawing && !self.cursor_failed {
            match self.enable_mouse_drawing(gpu) {
                Ok(CursorCapture::Captured) => self.mouse_drawing = true,
                Ok(CursorCapture::Placeholder) => {
                    self.mouse_drawing = true;
                    self.warn(tracer, frame_index, WarningKind::CursorSourceUnavailable);
                }
                Err(err) => {
                    log::warn!("{}: cursor drawing unavailable: {err}", self.output);
                    self.cursor_failed = true;
                    result = Err(err);
                }
            }
        } else if !self.options.draw_mouse && self.mouse_drawing {
            self.mouse_drawing = false;
            self.disable_mouse_drawing(gpu);
        }

        let options = &self.options;
        self.stereo =
            StereoGeometry::compute(options.fov, options.max_disparity, self.geometry.width());
        self.projections.update(options.mode, self.stereo, options.fov);
        self.outcome = self.animation.advance_frame(
            &mut self.windows,
            &self.rules,
            options.depth,
            options.lighting_strength,
        );
        if self.outcome.anchor.is_none() {
            self.warn(tracer, frame_index, WarningKind::NoCursorAnchor);
        }

        self.frame = FrameEvent {
            frame_index,
            output: self.output,
            mode: self.options.mode,
            floating_count: self.outcome.floating_count,
            foreground_depth: self.animation.foreground_depth(),
            has_anchor: self.outcome.anchor.is_some(),
        };
        tracer.frame(&self.frame);
        result
    }

    /// Draws every viewable window.
    ///
    /// While the effect is on, each window is drawn once per eye through the
    /// active filter and a summary of the frame is returned. While it is off,
    /// each window is drawn once, unfiltered, and `None` is returned.
    ///
    /// GPU errors are logged and traced and drawing carries on. Every
    /// successful projection push is matched by a pop; if a push fails the
    /// window is still drawn, over whatever projection the host had, and no
    /// pop is issued for it.
    pub fn paint_output(
        &mut self,
        gpu: &mut dyn GpuContext,
        tracer: &mut Tracer<'_>,
    ) -> Option<FrameSummary> {
        let screen = screen_space(self.geometry, -DEFAULT_Z_CAMERA);
        if !self.enabled {
            self.paint_plain(gpu, &screen);
            return None;
        }

        let frame = self.frame;
        let mut summary = FrameSummaryBuilder::new(&frame);
        for _ in 0..self.frame_warnings {
            summary.warning();
        }
        let filter: &mut dyn StereoFilter = self.filters.select(frame.mode);
        if let Err(err) = filter.prepare(gpu, self.geometry.width(), self.geometry.height()) {
            report_gpu_error(tracer, &mut summary, &frame, &err);
        }

        let fov = self.options.fov;
        let passes: &[(RenderPhase, Option<Eye>)] = if frame.mode.is_stereo() {
            &[
                (RenderPhase::LeftEye, Some(Eye::Left)),
                (RenderPhase::RightEye, Some(Eye::Right)),
            ]
        } else {
            &[(RenderPhase::Mono, None)]
        };
        let cursor_transform =
            Transform3d::from_translation(0.0, 0.0, self.animation.foreground_depth()) * screen;

        for (id, record) in self.windows.iter() {
            if !record.info.visibility.viewable {
                continue;
            }
            let pushed = match gpu.push_projection() {
                Ok(()) => true,
                Err(err) => {
                    report_gpu_error(tracer, &mut summary, &frame, &err);
                    false
                }
            };

            for &(phase, eye) in passes {
                self.phase = phase;
                let mut pass = PassEvent {
                    frame_index: frame.frame_index,
                    output: frame.output,
                    phase,
                    windows_drawn: 0,
                };
                tracer.pass_begin(&pass);

                let (projection, offset) = match eye {
                    Some(eye) => (
                        self.projections.for_eye(eye),
                        self.stereo.eye_offset(eye, fov),
                    ),
                    None => (self.projections.mono, [0.0, 0.0, world_z_correction(fov)]),
                };
                gpu.load_projection(&projection.translated(offset[0], offset[1], offset[2]));

                let mut fragment = FragmentStage::new();
                if let Some(eye) = eye {
                    let eye_index = eye.filter_index(self.options.invert_eyes);
                    if let Err(err) =
                        filter.apply(gpu, eye_index, &mut fragment, record.info.texture_target)
                    {
                        report_gpu_error(tracer, &mut summary, &frame, &err);
                    }
                }

                if record.visual.category == FloatingCategory::Background {
                    let lines = background_wireframe(
                        self.geometry,
                        record.visual.current_depth(),
                        self.options.edges_strength,
                        self.options.lighting_strength,
                    );
                    gpu.draw_lines(&screen, &lines, WIREFRAME_STYLE);
                }

                let draw = WindowDraw {
                    window: id,
                    geometry: record.info.geometry,
                    transform: screen * record.visual.current.window_transform(record.info.geometry),
                    paint: record.visual.paint(record.info.paint),
                    fragment: &fragment,
                    texture_target: record.info.texture_target,
                };
                match gpu.draw_window(&draw) {
                    Ok(()) => pass.windows_drawn = 1,
                    Err(err) => report_gpu_error(tracer, &mut summary, &frame, &err),
                }

                if record.visual.cursor_anchor
                    && self.mouse_drawing
                    && self
                        .cursor
                        .draw(gpu, &cursor_transform, self.animation.mouse_position())
                {
                    summary.cursor_drawn();
                }

                tracer.pass_end(&pass);
                summary.pass(&pass);
            }

            if pushed {
                if let Err(err) = gpu.pop_projection() {
                    report_gpu_error(tracer, &mut summary, &frame, &err);
                }
            }
        }

        self.phase = RenderPhase::Cleanup;
        if let Err(err) = filter.cleanup(gpu) {
            report_gpu_error(tracer, &mut summary, &frame, &err);
        }
        self.phase = RenderPhase::Idle;

        let summary = summary.finish();
        tracer.frame_summary(&summary);
        Some(summary)
    }

    /// Damage to report once the frame is done: the whole output while the
    /// effect is on, since every frame animates.
    #[must_use]
    pub fn done_paint(&self) -> DamageRegion {
        if self.enabled {
            DamageRegion::Full(self.geometry)
        } else {
            DamageRegion::None
        }
    }

    /// Deactivates the effect, releasing everything it holds and restoring
    /// the color mask and stencil test.
    pub fn shutdown(mut self, gpu: &mut dyn GpuContext) {
        self.filters.deinit(gpu);
        if self.enabled && self.mouse_drawing {
            self.disable_mouse_drawing(gpu);
        }
        if let Err(err) = gpu.set_color_mask(ColorMask::ALL) {
            log::warn!("{}: failed to restore the color mask: {err}", self.output);
        }
        gpu.set_stencil_test(false);
        log::debug!("stereo effect removed from {}", self.output);
    }

    // -- Accessors --------------------------------------------------------

    /// The output this screen draws.
    #[must_use]
    pub fn output(&self) -> OutputId {
        self.output
    }

    /// Output rectangle in pixels.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Whether the effect is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the synthetic cursor is being drawn.
    #[must_use]
    pub fn is_mouse_drawing(&self) -> bool {
        self.mouse_drawing
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &StereoOptions {
        &self.options
    }

    /// Mode of the last prepared frame.
    #[must_use]
    pub fn frame_mode(&self) -> StereoMode {
        self.frame.mode
    }

    /// Where the coordinator is within a frame.
    #[must_use]
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Mouse and foreground animation.
    #[must_use]
    pub fn animation(&self) -> &AnimationManager {
        &self.animation
    }

    /// Projections of the last prepared frame.
    #[must_use]
    pub fn projections(&self) -> &EyeProjections {
        &self.projections
    }

    /// Convergence and parallax of the last prepared frame.
    #[must_use]
    pub fn stereo_geometry(&self) -> StereoGeometry {
        self.stereo
    }

    /// Layout decisions of the last prepared frame.
    #[must_use]
    pub fn outcome(&self) -> FrameOutcome {
        self.outcome
    }

    /// The cursor texture.
    #[must_use]
    pub fn cursor(&self) -> &CursorTexture {
        &self.cursor
    }

    /// Number of frames prepared so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    // -- Internals --------------------------------------------------------

    fn enable_mouse_drawing(
        &mut self,
        gpu: &mut dyn GpuContext,
    ) -> Result<CursorCapture, RenderError> {
        let capture = self
            .cursor
            .update(gpu, &mut *self.cursor_source)
            .map_err(RenderError::CursorTexture)?;
        self.cursor_source.set_system_cursor_visible(false);
        self.cursor_source.set_polling(true);
        if let Some(position) = self.cursor_source.pointer_position() {
            self.animation.jump_mouse_to(position);
        }
        Ok(capture)
    }

    fn disable_mouse_drawing(&mut self, gpu: &mut dyn GpuContext) {
        self.cursor_source.set_polling(false);
        self.cursor_source.set_system_cursor_visible(true);
        self.cursor.release(gpu);
    }

    fn paint_plain(&mut self, gpu: &mut dyn GpuContext, screen: &Transform3d) {
        let fragment = FragmentStage::new();
        for (id, record) in self.windows.iter() {
            if !record.info.visibility.viewable {
                continue;
            }
            let draw = WindowDraw {
                window: id,
                geometry: record.info.geometry,
                transform: *screen,
                paint: record.info.paint,
                fragment: &fragment,
                texture_target: record.info.texture_target,
            };
            if let Err(err) = gpu.draw_window(&draw) {
                log::warn!("{}: {err}", self.output);
            }
        }
    }

    fn warn(&mut self, tracer: &mut Tracer<'_>, frame_index: u64, kind: WarningKind) {
        self.frame_warnings += 1;
        tracer.warning(&WarningEvent {
            frame_index,
            output: self.output,
            kind,
        });
    }
}

fn report_gpu_error(
    tracer: &mut Tracer<'_>,
    summary: &mut FrameSummaryBuilder,
    frame: &FrameEvent,
    err: &GpuError,
) {
    log::warn!("{}: {err}", frame.output);
    let kind = match err {
        GpuError::Program { .. } => WarningKind::ProgramBuild,
        _ => WarningKind::GpuState,
    };
    tracer.warning(&WarningEvent {
        frame_index: frame.frame_index,
        output: frame.output,
        kind,
    });
    summary.warning();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{CursorImage, StaticCursorSource};
    use crate::gpu::StencilFunc;
    use crate::headless::{GpuCommand, HeadlessGpu};
    use stereo3d_core::trace::TraceSink;
    use stereo3d_core::window::WindowType;

    const OUTPUT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    fn source() -> Box<StaticCursorSource> {
        let mut source = StaticCursorSource::new(Some(CursorImage {
            width: 2,
            height: 2,
            hot_x: 1,
            hot_y: 1,
            pixels: vec![0xff00_0000; 4],
        }));
        source.pointer = Some(Point::new(100.0, 50.0));
        Box::new(source)
    }

    fn screen_with(options: StereoOptions, gpu: &mut HeadlessGpu) -> StereoScreen {
        StereoScreen::new(OutputId(0), OUTPUT, options, source(), gpu).unwrap()
    }

    /// Desktop at the bottom, then two normal windows.
    fn populate(screen: &mut StereoScreen) -> [WindowId; 3] {
        [
            screen.add_window(WindowInfo::new(WindowType::Desktop, OUTPUT)),
            screen.add_window(WindowInfo::new(
                WindowType::Normal,
                Rect::new(10.0, 10.0, 210.0, 110.0),
            )),
            screen.add_window(WindowInfo::new(
                WindowType::Normal,
                Rect::new(300.0, 200.0, 500.0, 400.0),
            )),
        ]
    }

    #[derive(Default)]
    struct WarningSink {
        warnings: Vec<WarningKind>,
    }

    impl TraceSink for WarningSink {
        fn on_warning(&mut self, e: &WarningEvent) {
            self.warnings.push(e.kind);
        }
    }

    fn count_lines(gpu: &HeadlessGpu) -> usize {
        gpu.commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::Lines { .. }))
            .count()
    }

    fn frame(screen: &mut StereoScreen, gpu: &mut HeadlessGpu) -> Option<FrameSummary> {
        let mut tracer = Tracer::none();
        screen.prepare_frame(gpu, &mut tracer).unwrap();
        screen.paint_output(gpu, &mut tracer)
    }

    #[test]
    fn empty_output_is_rejected() {
        let mut gpu = HeadlessGpu::new();
        let err = StereoScreen::new(
            OutputId(3),
            Rect::new(0.0, 0.0, 0.0, 600.0),
            StereoOptions::default(),
            source(),
            &mut gpu,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::EmptyOutput { output: OutputId(3) }));
    }

    #[test]
    fn bad_match_expression_is_rejected() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            dock_match: String::from("type=Nope"),
            ..StereoOptions::default()
        };
        let err = StereoScreen::new(OutputId(0), OUTPUT, options, source(), &mut gpu).unwrap_err();
        assert!(matches!(err, RenderError::Match { which: "dock", .. }), "got {err:?}");
        assert_eq!(gpu.live_textures(), 0);
    }

    #[test]
    fn anaglyph_frame_draws_each_window_per_eye() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        let [desktop, first, second] = populate(&mut screen);
        gpu.take_commands();

        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.passes, 6);
        assert_eq!(summary.window_draws, 6);
        assert_eq!(summary.floating_count, 2);
        assert!(summary.cursor_drawn);
        assert_eq!(summary.warnings, 0);

        let draws: Vec<_> = gpu.window_draws().collect();
        let order: Vec<_> = draws.iter().map(|d| d.window).collect();
        assert_eq!(order, [desktop, desktop, first, first, second, second]);
        for pair in draws.chunks(2) {
            assert_eq!(pair[0].color_mask, ColorMask::CYAN);
            assert_eq!(pair[1].color_mask, ColorMask::RED);
            assert_eq!(pair[0].programs.len(), 1, "color matrix applied");
        }

        let offset = screen.stereo_geometry().eye_offset(Eye::Left, screen.options().fov);
        let left = screen
            .projections()
            .left
            .translated(offset[0], offset[1], offset[2]);
        assert_eq!(draws[0].projection, left);

        assert_eq!(gpu.projection_depth(), 0);
        assert_eq!(gpu.color_mask(), ColorMask::ALL);
        assert_eq!(screen.phase(), RenderPhase::Idle);
    }

    #[test]
    fn wireframe_and_cursor_follow_their_windows() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        gpu.take_commands();
        frame(&mut screen, &mut gpu);

        let cmds = gpu.commands();
        let lines = cmds
            .iter()
            .filter(|c| matches!(c, GpuCommand::Lines { .. }))
            .count();
        assert_eq!(lines, 2, "one wireframe per eye");

        // The cursor is drawn right after the topmost floating window.
        let quads: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GpuCommand::TexturedQuad { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(quads.len(), 2);
        let windows: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GpuCommand::Window(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(quads[0], windows[4] + 1);
        assert_eq!(quads[1], windows[5] + 1);

        let GpuCommand::TexturedQuad { rect, .. } = &cmds[quads[0]] else {
            unreachable!()
        };
        assert_eq!(*rect, Rect::new(99.0, 49.0, 101.0, 51.0));
    }

    #[test]
    fn inverted_eyes_swap_filters() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            invert_eyes: true,
            ..StereoOptions::default()
        };
        let mut screen = screen_with(options, &mut gpu);
        populate(&mut screen);
        frame(&mut screen, &mut gpu);

        let draws: Vec<_> = gpu.window_draws().collect();
        assert_eq!(draws[0].color_mask, ColorMask::RED);
        assert_eq!(draws[1].color_mask, ColorMask::CYAN);
    }

    #[test]
    fn mono_mode_draws_once_without_filtering() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            mode: StereoMode::Anaglyph25D,
            ..StereoOptions::default()
        };
        let mut screen = screen_with(options, &mut gpu);
        populate(&mut screen);
        let summary = frame(&mut screen, &mut gpu).unwrap();

        assert_eq!(summary.passes, 3);
        let draws: Vec<_> = gpu.window_draws().collect();
        assert_eq!(draws.len(), 3);
        assert!(draws.iter().all(|d| d.color_mask == ColorMask::ALL));
        assert!(draws.iter().all(|d| d.programs.is_empty()));
        let mono = screen.projections().mono.translated(
            0.0,
            0.0,
            world_z_correction(screen.options().fov),
        );
        assert_eq!(draws[0].projection, mono);
    }

    #[test]
    fn interlaced_frame_selects_stencil_per_eye() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            mode: StereoMode::InterlacedRow,
            ..StereoOptions::default()
        };
        let mut screen = screen_with(options, &mut gpu);
        populate(&mut screen);
        frame(&mut screen, &mut gpu);

        let draws: Vec<_> = gpu.window_draws().collect();
        assert!(draws.iter().all(|d| d.stencil_test));
        assert_eq!(draws[0].stencil.func, StencilFunc::Equal);
        assert_eq!(draws[1].stencil.func, StencilFunc::NotEqual);
        assert!(!gpu.mask_state().stencil_test);
    }

    #[test]
    fn failed_draws_keep_projection_stack_balanced() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        gpu.fail_window_draws = true;

        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.window_draws, 0);
        assert_eq!(summary.warnings, 6);
        assert_eq!(gpu.projection_depth(), 0);
        let pushes = gpu
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::PushProjection))
            .count();
        let pops = gpu
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::PopProjection))
            .count();
        assert_eq!((pushes, pops), (3, 3));
    }

    #[test]
    fn mask_failure_is_a_warning() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        gpu.fail_color_mask = true;

        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.window_draws, 6, "drawing carries on");
        // Six applies and the cleanup.
        assert_eq!(summary.warnings, 7);
    }

    #[test]
    fn empty_store_warns_about_missing_anchor() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.warnings, 1);
        assert!(!summary.cursor_drawn);
        assert_eq!(summary.passes, 0);
    }

    #[test]
    fn toggle_releases_and_restores_resources() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        frame(&mut screen, &mut gpu);
        assert_eq!(gpu.live_textures(), 1);
        assert!(gpu.live_programs() > 0);
        assert_eq!(screen.done_paint(), DamageRegion::Full(OUTPUT));

        screen.toggle(&mut gpu).unwrap();
        assert!(!screen.is_enabled());
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(gpu.live_programs(), 0);
        assert!(screen.done_paint().is_empty());

        gpu.take_commands();
        assert!(frame(&mut screen, &mut gpu).is_none());
        assert_eq!(gpu.window_draws().count(), 3, "single plain pass");
        assert!(
            !gpu.commands()
                .iter()
                .any(|c| matches!(c, GpuCommand::PushProjection))
        );

        screen.toggle(&mut gpu).unwrap();
        assert!(screen.is_enabled());
        assert_eq!(gpu.live_textures(), 1);
    }

    #[test]
    fn draw_mouse_option_is_synced_each_frame() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        assert!(screen.is_mouse_drawing());

        let options = StereoOptions {
            draw_mouse: false,
            ..StereoOptions::default()
        };
        screen.set_options(options).unwrap();
        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert!(!screen.is_mouse_drawing());
        assert!(!summary.cursor_drawn);
        assert_eq!(gpu.live_textures(), 0);

        screen.set_options(StereoOptions::default()).unwrap();
        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert!(summary.cursor_drawn);
        assert_eq!(
            screen.animation().mouse_position(),
            Point::new(100.0, 50.0),
            "mouse snapped to the pointer"
        );
    }

    #[test]
    fn cursor_failure_is_not_retried() {
        let mut gpu = HeadlessGpu::new();
        gpu.fail_textures = true;
        let err = StereoScreen::new(
            OutputId(0),
            OUTPUT,
            StereoOptions::default(),
            source(),
            &mut gpu,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::CursorTexture(_)), "got {err:?}");

        let options = StereoOptions {
            draw_mouse: false,
            ..StereoOptions::default()
        };
        let mut screen = screen_with(options, &mut gpu);
        screen.set_options(StereoOptions::default()).unwrap();
        let mut tracer = Tracer::none();
        assert!(screen.prepare_frame(&mut gpu, &mut tracer).is_err());
        assert!(screen.prepare_frame(&mut gpu, &mut tracer).is_ok());
        assert!(!screen.is_mouse_drawing());
        assert_eq!(screen.frame_count(), 2);
    }

    #[test]
    fn placeholder_cursor_is_a_warning() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            draw_mouse: false,
            ..StereoOptions::default()
        };
        let mut screen = StereoScreen::new(
            OutputId(0),
            OUTPUT,
            options,
            Box::new(StaticCursorSource::new(None)),
            &mut gpu,
        )
        .unwrap();
        populate(&mut screen);
        screen.set_options(StereoOptions::default()).unwrap();

        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.warnings, 1);
        assert!(summary.cursor_drawn);
        assert_eq!(screen.cursor().size(), (1, 1));
    }

    #[test]
    fn mode_changes_wait_for_the_next_frame() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        let mut tracer = Tracer::none();
        screen.prepare_frame(&mut gpu, &mut tracer).unwrap();

        let options = StereoOptions {
            mode: StereoMode::InterlacedColumn,
            ..StereoOptions::default()
        };
        screen.set_options(options).unwrap();
        screen.paint_output(&mut gpu, &mut tracer);
        assert_eq!(screen.frame_mode(), StereoMode::Anaglyph);
        assert!(gpu.window_draws().all(|d| !d.stencil_test));

        gpu.take_commands();
        frame(&mut screen, &mut gpu);
        assert_eq!(screen.frame_mode(), StereoMode::InterlacedColumn);
        assert!(gpu.window_draws().all(|d| d.stencil_test));
    }

    #[test]
    fn invalid_options_keep_previous_ones() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        let options = StereoOptions {
            window_match: String::from("(type=Normal"),
            invert_eyes: true,
            ..StereoOptions::default()
        };
        assert!(screen.set_options(options).is_err());
        assert!(!screen.options().invert_eyes);
    }

    #[test]
    fn foreground_actions_reach_the_animation() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        screen.push_farther();
        assert!((screen.animation().foreground_target() - 0.02).abs() < 1e-12);
        screen.reset_foreground();
        assert_eq!(screen.animation().foreground_target(), 0.0);
    }

    #[test]
    fn shutdown_restores_gpu_state() {
        let mut gpu = HeadlessGpu::new();
        let options = StereoOptions {
            mode: StereoMode::InterlacedColumn,
            ..StereoOptions::default()
        };
        let mut screen = screen_with(options, &mut gpu);
        populate(&mut screen);
        frame(&mut screen, &mut gpu);
        screen.shutdown(&mut gpu);

        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(gpu.live_programs(), 0);
        assert_eq!(gpu.color_mask(), ColorMask::ALL);
        assert!(!gpu.mask_state().stencil_test);
    }

    #[test]
    fn every_background_window_gets_a_wireframe() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        screen.add_window(WindowInfo::new(WindowType::Desktop, OUTPUT));
        screen.add_window(WindowInfo::new(WindowType::Desktop, OUTPUT));
        screen.add_window(WindowInfo::new(
            WindowType::Normal,
            Rect::new(10.0, 10.0, 210.0, 110.0),
        ));
        gpu.take_commands();
        frame(&mut screen, &mut gpu);
        assert_eq!(count_lines(&gpu), 4, "two backgrounds, two eyes each");

        let options = StereoOptions {
            mode: StereoMode::Anaglyph25D,
            ..StereoOptions::default()
        };
        screen.set_options(options).unwrap();
        gpu.take_commands();
        frame(&mut screen, &mut gpu);
        assert_eq!(count_lines(&gpu), 2);
    }

    #[test]
    fn failed_projection_push_still_draws() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = screen_with(StereoOptions::default(), &mut gpu);
        populate(&mut screen);
        gpu.fail_projection_push = true;
        gpu.take_commands();

        let summary = frame(&mut screen, &mut gpu).unwrap();
        assert_eq!(summary.window_draws, 6);
        assert_eq!(summary.warnings, 3, "one per window");
        assert_eq!(gpu.projection_depth(), 0);
        assert!(
            !gpu.commands()
                .iter()
                .any(|c| matches!(c, GpuCommand::PopProjection))
        );
    }

    #[test]
    fn refresh_without_an_image_is_a_warning() {
        let mut gpu = HeadlessGpu::new();
        let mut screen = StereoScreen::new(
            OutputId(0),
            OUTPUT,
            StereoOptions::default(),
            Box::new(StaticCursorSource::new(None)),
            &mut gpu,
        )
        .unwrap();

        let mut sink = WarningSink::default();
        let mut tracer = Tracer::new(&mut sink);
        screen.refresh_cursor(&mut gpu, &mut tracer).unwrap();
        drop(tracer);

        assert_eq!(screen.cursor().size(), (1, 1));
        assert_eq!(gpu.live_textures(), 1);
        let expected: &[WarningKind] = if cfg!(feature = "trace") {
            &[WarningKind::CursorSourceUnavailable]
        } else {
            &[]
        };
        assert_eq!(sink.warnings, expected);
    }
}
