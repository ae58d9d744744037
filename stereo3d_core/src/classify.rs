// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating-category classification.

use crate::matching::MatchRules;
use crate::window::WindowInfo;

/// How a window takes part in the depth layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FloatingCategory {
    /// The desktop background, pushed to the back plane.
    Background,
    /// A dock or panel, kept on the screen plane.
    Dock,
    /// An ordinary window, staggered in depth among its peers.
    Window,
    /// Not laid out; its pose is left alone.
    #[default]
    None,
}

/// Classifies a window.
///
/// Windows that are override-redirect, unmapped or shaded are
/// [`FloatingCategory::None`]. Otherwise the rules are tried in the fixed
/// order desktop, dock, window, and the first match wins; a window matching
/// both the desktop and dock rules is therefore a background.
#[must_use]
pub fn classify<R: MatchRules + ?Sized>(info: &WindowInfo, rules: &R) -> FloatingCategory {
    if !info.visibility.is_layout_candidate() {
        FloatingCategory::None
    } else if rules.is_desktop(info) {
        FloatingCategory::Background
    } else if rules.is_dock(info) {
        FloatingCategory::Dock
    } else if rules.is_window(info) {
        FloatingCategory::Window
    } else {
        FloatingCategory::None
    }
}
