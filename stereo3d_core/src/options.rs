// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effect options.
//!
//! [`StereoOptions`] is the full set of user-facing knobs. The host owns the
//! option schema and hands a snapshot to the render coordinator; every frame
//! reads the snapshot afresh, so changing an option takes effect on the next
//! frame without any cache invalidation.

use alloc::string::String;

use crate::matching::{DEFAULT_DESKTOP_MATCH, DEFAULT_DOCK_MATCH, DEFAULT_WINDOW_MATCH};

/// How the two eye images are combined on the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StereoMode {
    /// Single centered eye; depth is conveyed only by layering and lighting.
    #[cfg_attr(feature = "serde", serde(rename = "anaglyph-2.5d"))]
    Anaglyph25D,
    /// Red/cyan color-channel separation.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "anaglyph"))]
    Anaglyph,
    /// Alternating rows go to alternating eyes.
    #[cfg_attr(feature = "serde", serde(rename = "interlaced-row"))]
    InterlacedRow,
    /// Alternating columns go to alternating eyes.
    #[cfg_attr(feature = "serde", serde(rename = "interlaced-column"))]
    InterlacedColumn,
}

impl StereoMode {
    /// Maps the numeric option value (0 to 3) to a mode.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Anaglyph25D),
            1 => Some(Self::Anaglyph),
            2 => Some(Self::InterlacedRow),
            3 => Some(Self::InterlacedColumn),
            _ => None,
        }
    }

    /// The numeric option value for this mode.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Anaglyph25D => 0,
            Self::Anaglyph => 1,
            Self::InterlacedRow => 2,
            Self::InterlacedColumn => 3,
        }
    }

    /// Whether this mode renders two eyes.
    #[must_use]
    pub const fn is_stereo(self) -> bool {
        !matches!(self, Self::Anaglyph25D)
    }
}

/// User-facing options for one output.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StereoOptions {
    /// How eye images are combined.
    pub mode: StereoMode,
    /// Vertical field of view in degrees.
    pub fov: f64,
    /// Maximum on-screen disparity between the eyes, in pixels.
    pub max_disparity: f64,
    /// Depth of the background plane, in scene units.
    pub depth: f64,
    /// How strongly distant windows are darkened and desaturated (0 to 1).
    pub lighting_strength: f64,
    /// Opacity of the depth wireframe behind the background (0 to 1).
    pub edges_strength: f64,
    /// Swap which eye receives which filter channel.
    pub invert_eyes: bool,
    /// Draw a synthetic cursor at foreground depth.
    pub draw_mouse: bool,
    /// Match expression selecting the background (desktop) window.
    pub desktop_match: String,
    /// Match expression selecting docks and panels.
    pub dock_match: String,
    /// Match expression selecting floating windows.
    pub window_match: String,
}

impl Default for StereoOptions {
    fn default() -> Self {
        Self {
            mode: StereoMode::Anaglyph,
            fov: 60.0,
            max_disparity: 15.0,
            depth: 0.5,
            lighting_strength: 0.5,
            edges_strength: 0.5,
            invert_eyes: false,
            draw_mouse: true,
            desktop_match: String::from(DEFAULT_DESKTOP_MATCH),
            dock_match: String::from(DEFAULT_DOCK_MATCH),
            window_match: String::from(DEFAULT_WINDOW_MATCH),
        }
    }
}
