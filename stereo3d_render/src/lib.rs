// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stereo rendering for a compositing window manager.
//!
//! This crate drives the per-output frame loop on top of
//! [`stereo3d_core`]'s animation and projection state. It defines:
//!
//! - [`GpuContext`](gpu::GpuContext): the host renderer as seen by the
//!   effect, with [`HeadlessGpu`](headless::HeadlessGpu) as a GPU-free
//!   implementation
//! - [`StereoFilter`](filter::StereoFilter): anaglyph and interlaced output
//!   filters
//! - [`StereoScreen`]: the render coordinator for one output
//! - [`StereoDisplay`]: dispatch of host calls and key-bound actions across
//!   outputs
//! - [`config`]: options from TOML
//!
//! # Frame flow
//!
//! ```text
//!   prepare_frame ──► filter.prepare ──► per window: push projection
//!                                          ├─ left eye:  load, apply, draw, cursor
//!                                          ├─ right eye: load, apply, draw, cursor
//!                                          └─ pop projection
//!                     filter.cleanup ──► done_paint (damage)
//! ```
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Forwards frame, pass and warning events
//!   to a [`TraceSink`](stereo3d_core::trace::TraceSink).

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
mod cursor;
mod damage;
mod display;
mod error;
pub mod filter;
pub mod gpu;
pub mod headless;
mod resource;
mod screen;
mod wireframe;

pub use cursor::{CursorCapture, CursorImage, CursorSource, CursorTexture, StaticCursorSource};
pub use damage::DamageRegion;
pub use display::{StereoAction, StereoDisplay};
pub use error::{ConfigError, GpuError, RenderError};
pub use resource::{ProgramId, TextureId};
pub use screen::StereoScreen;
pub use wireframe::{WIREFRAME_STYLE, background_wireframe, wireframe_alphas};
