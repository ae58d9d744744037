// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage reported back to the host after a frame.

/// The part of an output the host must repaint next frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing changed on behalf of the effect.
    #[default]
    None,
    /// The whole output, in output pixels.
    Full(kurbo::Rect),
}

impl DamageRegion {
    /// Returns `true` if no region needs redrawing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (*self, *other) {
            (_, Self::None) => {}
            (Self::None, _) => *self = *other,
            (Self::Full(a), Self::Full(b)) => *self = Self::Full(a.union(b)),
        }
    }
}
