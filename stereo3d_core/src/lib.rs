// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection math, window classification and depth animation for a
//! stereoscopic desktop effect.
//!
//! `stereo3d_core` holds everything about the effect that does not touch a
//! GPU. It is `no_std` compatible (with `alloc`) so the same state machine can
//! be driven by any compositor frame loop.
//!
//! # Architecture
//!
//! Data flows one way per frame:
//!
//! ```text
//!   WindowStore (stacking order)
//!       │
//!       ▼
//!   classify() ──► AnimationManager::advance_frame() ──► WindowVisualState
//!                                                            │
//!                 ┌──────────────────────────────────────────┘
//!                 ▼
//!   EyeProjections + StereoGeometry ──► render coordinator (stereo3d_render)
//! ```
//!
//! **[`projection`]** — Off-axis frustum matrices, per-eye convergence and
//! parallax, and the camera-distance correction applied per eye.
//!
//! **[`window`]** — Generational window handles, the window store kept in
//! stacking order, and the host-supplied window properties.
//!
//! **[`matching`]** — Window match expressions (`type=Dock | class=Foo`)
//! and the [`MatchRules`](matching::MatchRules) seam.
//!
//! **[`classify`]** — Maps a window to its floating category.
//!
//! **[`animation`]** — Per-window depth targets, lighting multipliers,
//! exponential easing, mouse and foreground-depth animation.
//!
//! **[`options`]** — Effect options and the stereo output mode.
//!
//! **[`transform`]** — Column-major 4×4 transform type.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` for
//!   [`StereoOptions`](options::StereoOptions) and its field types.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod classify;
pub mod matching;
pub mod options;
pub mod output;
pub mod projection;
pub mod trace;
pub mod transform;
pub mod window;
