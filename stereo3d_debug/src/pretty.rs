// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use stereo3d_core::options::StereoMode;
use stereo3d_core::trace::{FrameEvent, FrameSummary, PassEvent, TraceSink, WarningEvent};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub(crate) fn mode_name(mode: StereoMode) -> &'static str {
    match mode {
        StereoMode::Anaglyph25D => "anaglyph-2.5d",
        StereoMode::Anaglyph => "anaglyph",
        StereoMode::InterlacedRow => "interlaced-row",
        StereoMode::InterlacedColumn => "interlaced-column",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame(&mut self, e: &FrameEvent) {
        let anchor = if e.has_anchor { "yes" } else { "NONE" };
        let _ = writeln!(
            self.writer,
            "[frame] frame={} output={} mode={} floating={} foreground={:.3} anchor={anchor}",
            e.frame_index,
            e.output.0,
            mode_name(e.mode),
            e.floating_count,
            e.foreground_depth,
        );
    }

    fn on_pass_begin(&mut self, e: &PassEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:begin] frame={} {}",
            e.frame_index,
            e.phase.name(),
        );
    }

    fn on_pass_end(&mut self, e: &PassEvent) {
        let _ = writeln!(
            self.writer,
            "[pass:end] frame={} {} windows={}",
            e.frame_index,
            e.phase.name(),
            e.windows_drawn,
        );
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        let _ = writeln!(
            self.writer,
            "[warning] frame={} output={} {}",
            e.frame_index,
            e.output.0,
            e.kind.name(),
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let cursor = if s.cursor_drawn { "drawn" } else { "hidden" };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} mode={} passes={} draws={} cursor={cursor} warnings={}",
            s.frame_index,
            mode_name(s.mode),
            s.passes,
            s.window_draws,
            s.warnings,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo3d_core::output::OutputId;
    use stereo3d_core::trace::{RenderPhase, WarningKind};

    #[test]
    fn pretty_print_frame() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame(&FrameEvent {
            frame_index: 1,
            output: OutputId(0),
            mode: StereoMode::InterlacedRow,
            floating_count: 2,
            foreground_depth: 0.0,
            has_anchor: false,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.contains("[frame]"), "got: {output}");
        assert!(output.contains("mode=interlaced-row"), "got: {output}");
        assert!(output.contains("anchor=NONE"), "got: {output}");
    }

    #[test]
    fn pretty_print_pass_and_warning() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_pass_end(&PassEvent {
            frame_index: 3,
            output: OutputId(0),
            phase: RenderPhase::RightEye,
            windows_drawn: 5,
        });
        sink.on_warning(&WarningEvent {
            frame_index: 3,
            output: OutputId(1),
            kind: WarningKind::CursorSourceUnavailable,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "got: {output}");
        assert_eq!(lines[0], "[pass:end] frame=3 right-eye windows=5");
        assert_eq!(lines[1], "[warning] frame=3 output=1 cursor-source-unavailable");
    }
}
