// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns a [`RecorderSink`](super::recorder::RecorderSink)
//! recording into a JSON array that `chrome://tracing` and
//! [Perfetto](https://ui.perfetto.dev/) can load.
//!
//! Layout on the timeline:
//!
//! - one process row per output, named `output N`
//! - eye passes as duration slices on thread 0
//! - frame and summary markers as process-scoped instants
//! - warnings as thread-scoped instants on thread 1, so they stand out
//!
//! Recorded events carry no wall-clock time, so `ts` is the event's position
//! in the recording (one microsecond apart).

use std::collections::BTreeSet;
use std::io::{self, Write};

use serde_json::{Map, Value, json};

use crate::pretty::mode_name;
use crate::recorder::{RecordedEvent, decode};

const PASS_TID: u32 = 0;
const WARNING_TID: u32 = 1;

/// One Chrome trace event, before its `ts` is assigned.
struct Slice {
    ph: &'static str,
    name: &'static str,
    cat: &'static str,
    pid: u32,
    tid: u32,
    /// Instant scope, `"p"` or `"t"`; `None` for duration events.
    scope: Option<&'static str>,
    args: Value,
}

impl Slice {
    fn from_recorded(recorded: &RecordedEvent) -> Self {
        match recorded {
            RecordedEvent::Frame(e) => Self {
                ph: "i",
                name: "frame",
                cat: "animation",
                pid: e.output.0,
                tid: PASS_TID,
                scope: Some("p"),
                args: json!({
                    "frame_index": e.frame_index,
                    "mode": mode_name(e.mode),
                    "floating_count": e.floating_count,
                    "foreground_depth": e.foreground_depth,
                    "has_anchor": e.has_anchor,
                }),
            },
            RecordedEvent::PassBegin(e) | RecordedEvent::PassEnd(e) => {
                let begin = matches!(recorded, RecordedEvent::PassBegin(_));
                let mut args = json!({ "frame_index": e.frame_index });
                if !begin {
                    args["windows_drawn"] = json!(e.windows_drawn);
                }
                Self {
                    ph: if begin { "B" } else { "E" },
                    name: e.phase.name(),
                    cat: "pass",
                    pid: e.output.0,
                    tid: PASS_TID,
                    scope: None,
                    args,
                }
            }
            RecordedEvent::Warning(e) => Self {
                ph: "i",
                name: e.kind.name(),
                cat: "warning",
                pid: e.output.0,
                tid: WARNING_TID,
                scope: Some("t"),
                args: json!({ "frame_index": e.frame_index }),
            },
            RecordedEvent::FrameSummary(s) => Self {
                ph: "i",
                name: "summary",
                cat: "summary",
                pid: s.output.0,
                tid: PASS_TID,
                scope: Some("p"),
                args: json!({
                    "frame_index": s.frame_index,
                    "mode": mode_name(s.mode),
                    "floating_count": s.floating_count,
                    "passes": s.passes,
                    "window_draws": s.window_draws,
                    "cursor_drawn": s.cursor_drawn,
                    "warnings": s.warnings,
                }),
            },
        }
    }

    fn into_json(self, ts: u64) -> Value {
        let mut obj = Map::new();
        obj.insert("ph".into(), self.ph.into());
        obj.insert("name".into(), self.name.into());
        obj.insert("cat".into(), self.cat.into());
        obj.insert("ts".into(), ts.into());
        obj.insert("pid".into(), self.pid.into());
        obj.insert("tid".into(), self.tid.into());
        if let Some(scope) = self.scope {
            obj.insert("s".into(), scope.into());
        }
        obj.insert("args".into(), self.args);
        Value::Object(obj)
    }
}

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// Trailing bytes that do not decode to a whole event are ignored.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut outputs = BTreeSet::new();
    let mut events: Vec<Value> = Vec::new();
    for (ts, recorded) in (0_u64..).zip(decode(bytes)) {
        let slice = Slice::from_recorded(&recorded);
        outputs.insert(slice.pid);
        events.push(slice.into_json(ts));
    }

    // Metadata rows go first so viewers label processes before their events.
    let names = outputs.into_iter().map(|pid| {
        json!({
            "ph": "M",
            "name": "process_name",
            "pid": pid,
            "tid": PASS_TID,
            "args": { "name": format!("output {pid}") },
        })
    });
    let all: Vec<Value> = names.chain(events).collect();

    serde_json::to_writer_pretty(writer, &all)?;
    Ok(())
}
