// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracked windows.
//!
//! Each window known to an output has:
//!
//! - An identity ([`WindowId`]): a generational handle that goes stale when
//!   the window is destroyed.
//! - Host properties ([`WindowInfo`]): geometry, visibility, type, class,
//!   title and base paint attributes, refreshed by the host.
//! - Effect state ([`WindowVisualState`](crate::animation::WindowVisualState))
//!   with classification, current and target pose, lighting multipliers.
//!
//! [`WindowStore`] owns all three and keeps windows in stacking order
//! (bottom to top), which is the traversal order used by classification,
//! depth assignment and drawing.

mod id;
mod info;
mod store;
mod traverse;

pub use id::WindowId;
pub use info::{PaintAttribs, TextureTarget, Visibility, WindowInfo, WindowType};
pub use store::{WindowRecord, WindowStore};
pub use traverse::Stacking;
