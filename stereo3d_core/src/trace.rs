// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the stereo frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! render coordinator calls at each stage of an output frame. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] collects pass and warning counts during a frame and
//! produces a [`FrameSummary`] at the end.

use crate::options::StereoMode;
use crate::output::OutputId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where the render coordinator is within an output frame.
///
/// Stereo frames go `Idle → LeftEye → RightEye → Cleanup → Idle`; the 2.5D
/// mode goes `Idle → Mono → Cleanup → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    /// Between frames.
    #[default]
    Idle,
    /// Drawing the left-eye image.
    LeftEye,
    /// Drawing the right-eye image.
    RightEye,
    /// Drawing the single centered image.
    Mono,
    /// Restoring filter state after the draw passes.
    Cleanup,
}

impl RenderPhase {
    /// Short lowercase name, used by the debug sinks.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LeftEye => "left-eye",
            Self::RightEye => "right-eye",
            Self::Mono => "mono",
            Self::Cleanup => "cleanup",
        }
    }
}

/// What went wrong, for a [`WarningEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// No window qualified as the cursor anchor; the cursor was not drawn.
    NoCursorAnchor,
    /// The cursor source returned nothing; a placeholder texture is used.
    CursorSourceUnavailable,
    /// The GPU rejected a state change (color mask, stencil, projection).
    GpuState,
    /// A filter's fragment program could not be built.
    ProgramBuild,
}

impl WarningKind {
    /// Short lowercase name, used by the debug sinks.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoCursorAnchor => "no-cursor-anchor",
            Self::CursorSourceUnavailable => "cursor-source-unavailable",
            Self::GpuState => "gpu-state",
            Self::ProgramBuild => "program-build",
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after an output's frame state has been prepared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameEvent {
    /// Per-output frame counter.
    pub frame_index: u64,
    /// Which output.
    pub output: OutputId,
    /// Stereo mode in effect for this frame.
    pub mode: StereoMode,
    /// Number of floating windows (at least 1).
    pub floating_count: u32,
    /// Current foreground depth after easing.
    pub foreground_depth: f64,
    /// Whether a cursor anchor was found.
    pub has_anchor: bool,
}

/// Marks the beginning or end of one draw pass.
///
/// A pass draws one window for one eye (or for the single 2.5D view), so a
/// stereo frame with `n` viewable windows has `2n` passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which output.
    pub output: OutputId,
    /// The pass.
    pub phase: RenderPhase,
    /// 1 if the window draw succeeded, 0 otherwise (always 0 at the
    /// beginning).
    pub windows_drawn: u32,
}

/// A recoverable problem during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarningEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which output.
    pub output: OutputId,
    /// What went wrong.
    pub kind: WarningKind,
}

/// Per-frame summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Which output.
    pub output: OutputId,
    /// Stereo mode in effect.
    pub mode: StereoMode,
    /// Number of floating windows (at least 1).
    pub floating_count: u32,
    /// Number of draw passes run.
    pub passes: u32,
    /// Window draws across all passes.
    pub window_draws: u32,
    /// Whether the cursor was drawn in at least one pass.
    pub cursor_drawn: bool,
    /// Warnings raised during the frame.
    pub warnings: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called once the frame's animation and projections are ready.
    fn on_frame(&mut self, e: &FrameEvent) {
        _ = e;
    }

    /// Called before a draw pass starts.
    fn on_pass_begin(&mut self, e: &PassEvent) {
        _ = e;
    }

    /// Called after a draw pass finishes.
    fn on_pass_end(&mut self, e: &PassEvent) {
        _ = e;
    }

    /// Called for each recoverable problem.
    fn on_warning(&mut self, e: &WarningEvent) {
        _ = e;
    }

    /// Called with the per-frame summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameEvent`].
    #[inline]
    pub fn frame(&mut self, e: &FrameEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the beginning of a pass.
    #[inline]
    pub fn pass_begin(&mut self, e: &PassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits the end of a pass.
    #[inline]
    pub fn pass_end(&mut self, e: &PassEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pass_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WarningEvent`].
    #[inline]
    pub fn warning(&mut self, e: &WarningEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_warning(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Counts passes, draws and warnings during a frame and produces a
/// [`FrameSummary`].
#[derive(Debug)]
pub struct FrameSummaryBuilder {
    frame: FrameEvent,
    passes: u32,
    window_draws: u32,
    cursor_drawn: bool,
    warnings: u32,
}

impl FrameSummaryBuilder {
    /// Starts a summary for the given frame.
    #[must_use]
    pub fn new(frame: &FrameEvent) -> Self {
        Self {
            frame: *frame,
            passes: 0,
            window_draws: 0,
            cursor_drawn: false,
            warnings: 0,
        }
    }

    /// Records a finished pass.
    pub fn pass(&mut self, e: &PassEvent) {
        self.passes += 1;
        self.window_draws += e.windows_drawn;
    }

    /// Records that the cursor was drawn.
    pub fn cursor_drawn(&mut self) {
        self.cursor_drawn = true;
    }

    /// Records a warning.
    pub fn warning(&mut self) {
        self.warnings += 1;
    }

    /// Consumes the builder and produces the final [`FrameSummary`].
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        FrameSummary {
            frame_index: self.frame.frame_index,
            output: self.frame.output,
            mode: self.frame.mode,
            floating_count: self.frame.floating_count,
            passes: self.passes,
            window_draws: self.window_draws,
            cursor_drawn: self.cursor_drawn,
            warnings: self.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> FrameEvent {
        FrameEvent {
            frame_index: 42,
            output: OutputId(0),
            mode: StereoMode::Anaglyph,
            floating_count: 3,
            foreground_depth: 0.0,
            has_anchor: true,
        }
    }

    fn pass(phase: RenderPhase, windows_drawn: u32) -> PassEvent {
        PassEvent {
            frame_index: 42,
            output: OutputId(0),
            phase,
            windows_drawn,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_frame(&sample_frame());
        sink.on_pass_begin(&pass(RenderPhase::LeftEye, 0));
        sink.on_warning(&WarningEvent {
            frame_index: 42,
            output: OutputId(0),
            kind: WarningKind::NoCursorAnchor,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame(&sample_frame());
        tracer.pass_end(&pass(RenderPhase::Mono, 4));
    }

    #[test]
    fn summary_builder_counts_passes_and_draws() {
        let mut builder = FrameSummaryBuilder::new(&sample_frame());
        builder.pass(&pass(RenderPhase::LeftEye, 4));
        builder.pass(&pass(RenderPhase::RightEye, 4));
        builder.cursor_drawn();
        builder.warning();

        let summary = builder.finish();
        assert_eq!(summary.passes, 2);
        assert_eq!(summary.window_draws, 8);
        assert!(summary.cursor_drawn);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.frame_index, 42);
        assert_eq!(summary.floating_count, 3);
    }

    #[test]
    fn summary_builder_empty_frame() {
        let summary = FrameSummaryBuilder::new(&sample_frame()).finish();
        assert_eq!(summary.passes, 0);
        assert_eq!(summary.window_draws, 0);
        assert!(!summary.cursor_drawn);
    }

    #[test]
    fn phase_and_warning_names() {
        assert_eq!(RenderPhase::LeftEye.name(), "left-eye");
        assert_eq!(RenderPhase::default(), RenderPhase::Idle);
        assert_eq!(WarningKind::GpuState.name(), "gpu-state");
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            warnings: Vec<WarningKind>,
        }
        impl TraceSink for RecordingSink {
            fn on_warning(&mut self, e: &WarningEvent) {
                self.warnings.push(e.kind);
            }
        }

        let mut sink = RecordingSink {
            warnings: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.warning(&WarningEvent {
            frame_index: 1,
            output: OutputId(0),
            kind: WarningKind::ProgramBuild,
        });
        drop(tracer);
        assert_eq!(sink.warnings, &[WarningKind::ProgramBuild]);
    }
}
