// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use stereo3d_core::options::StereoMode;
use stereo3d_core::output::OutputId;
use stereo3d_core::trace::{
    FrameEvent, FrameSummary, PassEvent, RenderPhase, TraceSink, WarningEvent, WarningKind,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_FRAME: u8 = 1;
const TAG_PASS_BEGIN: u8 = 2;
const TAG_PASS_END: u8 = 3;
const TAG_WARNING: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_mode(&mut self, m: StereoMode) {
        self.write_u8(m.index());
    }

    fn write_phase(&mut self, p: RenderPhase) {
        self.write_u8(match p {
            RenderPhase::Idle => 0,
            RenderPhase::LeftEye => 1,
            RenderPhase::RightEye => 2,
            RenderPhase::Mono => 3,
            RenderPhase::Cleanup => 4,
        });
    }

    fn write_warning(&mut self, k: WarningKind) {
        self.write_u8(match k {
            WarningKind::NoCursorAnchor => 0,
            WarningKind::CursorSourceUnavailable => 1,
            WarningKind::GpuState => 2,
            WarningKind::ProgramBuild => 3,
        });
    }

    fn write_pass(&mut self, tag: u8, e: &PassEvent) {
        self.write_u8(tag);
        self.write_u64(e.frame_index);
        self.write_u32(e.output.0);
        self.write_phase(e.phase);
        self.write_u32(e.windows_drawn);
    }
}

impl TraceSink for RecorderSink {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.write_u8(TAG_FRAME);
        self.write_u64(e.frame_index);
        self.write_u32(e.output.0);
        self.write_mode(e.mode);
        self.write_u32(e.floating_count);
        self.write_f64(e.foreground_depth);
        self.write_bool(e.has_anchor);
    }

    fn on_pass_begin(&mut self, e: &PassEvent) {
        self.write_pass(TAG_PASS_BEGIN, e);
    }

    fn on_pass_end(&mut self, e: &PassEvent) {
        self.write_pass(TAG_PASS_END, e);
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        self.write_u8(TAG_WARNING);
        self.write_u64(e.frame_index);
        self.write_u32(e.output.0);
        self.write_warning(e.kind);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.output.0);
        self.write_mode(s.mode);
        self.write_u32(s.floating_count);
        self.write_u32(s.passes);
        self.write_u32(s.window_draws);
        self.write_bool(s.cursor_drawn);
        self.write_u32(s.warnings);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`FrameEvent`].
    Frame(FrameEvent),
    /// The beginning of a pass.
    PassBegin(PassEvent),
    /// The end of a pass.
    PassEnd(PassEvent),
    /// A [`WarningEvent`].
    Warning(WarningEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_mode(&mut self) -> Option<StereoMode> {
        StereoMode::from_index(self.read_u8()?)
    }

    fn read_phase(&mut self) -> Option<RenderPhase> {
        Some(match self.read_u8()? {
            0 => RenderPhase::Idle,
            1 => RenderPhase::LeftEye,
            2 => RenderPhase::RightEye,
            3 => RenderPhase::Mono,
            _ => RenderPhase::Cleanup,
        })
    }

    fn read_warning(&mut self) -> Option<WarningKind> {
        Some(match self.read_u8()? {
            0 => WarningKind::NoCursorAnchor,
            1 => WarningKind::CursorSourceUnavailable,
            2 => WarningKind::GpuState,
            _ => WarningKind::ProgramBuild,
        })
    }

    fn decode_frame(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Frame(FrameEvent {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            mode: self.read_mode()?,
            floating_count: self.read_u32()?,
            foreground_depth: self.read_f64()?,
            has_anchor: self.read_bool()?,
        }))
    }

    fn decode_pass(&mut self) -> Option<PassEvent> {
        Some(PassEvent {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            phase: self.read_phase()?,
            windows_drawn: self.read_u32()?,
        })
    }

    fn decode_warning(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Warning(WarningEvent {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            kind: self.read_warning()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            output: OutputId(self.read_u32()?),
            mode: self.read_mode()?,
            floating_count: self.read_u32()?,
            passes: self.read_u32()?,
            window_draws: self.read_u32()?,
            cursor_drawn: self.read_bool()?,
            warnings: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_FRAME => self.decode_frame(),
            TAG_PASS_BEGIN => self.decode_pass().map(RecordedEvent::PassBegin),
            TAG_PASS_END => self.decode_pass().map(RecordedEvent::PassEnd),
            TAG_WARNING => self.decode_warning(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None, // unknown tag → stop iteration
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
            frame_index: 7,
            output: OutputId(1),
            mode: StereoMode::InterlacedColumn,
            floating_count: 4,
            foreground_depth: -0.04,
            has_anchor: true,
        }
    }

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 7,
            output: OutputId(1),
            mode: StereoMode::Anaglyph25D,
            floating_count: 1,
            passes: 1,
            window_draws: 3,
            cursor_drawn: false,
            warnings: 2,
        }
    }

    #[test]
    fn frame_event_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&sample_frame());
        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events, [RecordedEvent::Frame(sample_frame())]);
    }

    #[test]
    fn frame_sequence_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&sample_frame());
        for phase in [RenderPhase::LeftEye, RenderPhase::RightEye] {
            let pass = PassEvent {
                frame_index: 7,
                output: OutputId(1),
                phase,
                windows_drawn: 0,
            };
            rec.on_pass_begin(&pass);
            rec.on_pass_end(&PassEvent {
                windows_drawn: 3,
                ..pass
            });
        }
        rec.on_warning(&WarningEvent {
            frame_index: 7,
            output: OutputId(1),
            kind: WarningKind::GpuState,
        });
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 7);
        assert!(matches!(events[0], RecordedEvent::Frame(_)));
        match &events[4] {
            RecordedEvent::PassEnd(e) => {
                assert_eq!(e.phase, RenderPhase::RightEye);
                assert_eq!(e.windows_drawn, 3);
            }
            other => panic!("expected PassEnd, got {other:?}"),
        }
        match &events[5] {
            RecordedEvent::Warning(e) => assert_eq!(e.kind, WarningKind::GpuState),
            other => panic!("expected Warning, got {other:?}"),
        }
        assert_eq!(events[6], RecordedEvent::FrameSummary(sample_summary()));
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_frame(&sample_frame());
        rec.on_frame(&sample_frame());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
