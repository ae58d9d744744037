// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated compositor frame loop driving the stereo effect headlessly.
//!
//! Two side-by-side outputs, a desktop, a dock and a few windows. Over 90
//! frames the pointer wanders, the foreground is pushed back and reset, the
//! mode switches to row interlacing and the effect is toggled off and on.
//! Events go to a [`PrettyPrintSink`] on stdout and a [`RecorderSink`], which
//! is exported as Chrome trace JSON at the end.
//!
//! Pass a TOML options file as the first argument to override the defaults.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use kurbo::{Point, Rect};
use stereo3d_core::options::StereoMode;
use stereo3d_core::output::OutputId;
use stereo3d_core::trace::{
    FrameEvent, FrameSummary, PassEvent, TraceSink, Tracer, WarningEvent,
};
use stereo3d_core::window::{WindowInfo, WindowType};
use stereo3d_render::headless::HeadlessGpu;
use stereo3d_render::{CursorImage, StaticCursorSource, StereoAction, StereoDisplay, config};

use stereo3d_debug::pretty::PrettyPrintSink;
use stereo3d_debug::recorder::RecorderSink;

const FRAME_COUNT: u64 = 90;
const OUTPUTS: [(OutputId, Rect); 2] = [
    (OutputId(0), Rect::new(0.0, 0.0, 1920.0, 1080.0)),
    (OutputId(1), Rect::new(1920.0, 0.0, 3840.0, 1080.0)),
];

/// Sends every event to both sinks.
struct Tee<'a> {
    pretty: &'a mut PrettyPrintSink,
    recorder: &'a mut RecorderSink,
}

impl TraceSink for Tee<'_> {
    fn on_frame(&mut self, e: &FrameEvent) {
        self.pretty.on_frame(e);
        self.recorder.on_frame(e);
    }

    fn on_pass_begin(&mut self, e: &PassEvent) {
        self.pretty.on_pass_begin(e);
        self.recorder.on_pass_begin(e);
    }

    fn on_pass_end(&mut self, e: &PassEvent) {
        self.pretty.on_pass_end(e);
        self.recorder.on_pass_end(e);
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        self.pretty.on_warning(e);
        self.recorder.on_warning(e);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.pretty.on_frame_summary(s);
        self.recorder.on_frame_summary(s);
    }
}

/// A 4×4 arrow-ish cursor with its hot spot in the top-left corner.
fn cursor_image() -> CursorImage {
    let mut pixels = vec![0x0000_0000; 16];
    for (i, px) in pixels.iter_mut().enumerate() {
        if i % 4 <= i / 4 {
            *px = 0xff20_2020;
        }
    }
    CursorImage {
        width: 4,
        height: 4,
        hot_x: 0,
        hot_y: 0,
        pixels,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut options = config::load_or_default(args.get(1).map(Path::new))?;

    let mut gpu = HeadlessGpu::new();
    let mut display = StereoDisplay::new();

    // -- outputs and windows ------------------------------------------------
    for (output, geometry) in OUTPUTS {
        let mut source = StaticCursorSource::new(Some(cursor_image()));
        source.pointer = Some(geometry.center());
        display.add_output(output, geometry, options.clone(), Box::new(source), &mut gpu)?;

        let local = Rect::from_origin_size(Point::ZERO, geometry.size());
        display.add_window(output, WindowInfo::new(WindowType::Desktop, local))?;
        display.add_window(
            output,
            WindowInfo::new(WindowType::Dock, Rect::new(0.0, 1040.0, 1920.0, 1080.0))
                .with_class("Panel"),
        )?;
        for (i, title) in ["Terminal", "Editor", "Browser"].into_iter().enumerate() {
            let offset = 120.0 * i as f64;
            display.add_window(
                output,
                WindowInfo::new(
                    WindowType::Normal,
                    Rect::new(200.0 + offset, 150.0 + offset, 1000.0 + offset, 750.0 + offset),
                )
                .with_title(title),
            )?;
        }
    }

    // -- sinks ----------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- simulated loop -------------------------------------------------------
    for frame in 0..FRAME_COUNT {
        match frame {
            20..=22 => {
                display.handle_action(OutputId(0), StereoAction::PushCloser, &mut gpu)?;
            }
            40 => {
                display.handle_action(OutputId(0), StereoAction::ResetForeground, &mut gpu)?;
            }
            45 => {
                options.mode = StereoMode::InterlacedRow;
                display.set_options(&options)?;
            }
            60 | 70 => {
                display.handle_action(OutputId(1), StereoAction::Toggle, &mut gpu)?;
            }
            _ => {}
        }

        for (output, geometry) in OUTPUTS {
            let t = frame as f64 / FRAME_COUNT as f64;
            let wander = Point::new(
                geometry.width() * (0.25 + 0.5 * t),
                geometry.height() * (0.5 + 0.25 * (t * 6.0).sin()),
            );
            display.pointer_moved(output, wander);

            let mut tee = Tee {
                pretty: &mut pretty,
                recorder: &mut recorder,
            };
            let mut tracer = Tracer::new(&mut tee);
            if let Err(err) = display.prepare_frame(output, &mut gpu, &mut tracer) {
                log::warn!("{output}: {err}");
            }
            display.paint_output(output, &mut gpu, &mut tracer)?;
        }

        let damage = display.damage();
        log::debug!("frame {frame}: damage {damage:?}");
        gpu.take_commands();
    }

    display.shutdown(&mut gpu);
    log::info!(
        "after shutdown: {} textures, {} programs live",
        gpu.live_textures(),
        gpu.live_programs()
    );

    // -- export Chrome trace --------------------------------------------------
    let path = "stereo3d-trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    stereo3d_debug::chrome::export(recorder.as_bytes(), &mut writer)?;

    println!("Wrote {path} ({FRAME_COUNT} frames, {} outputs)", OUTPUTS.len());
    Ok(())
}
