// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window identity.

use core::fmt;

/// A handle to a window in a [`WindowStore`](super::WindowStore).
///
/// Holds a slot index and a generation counter. Once the window is removed
/// the slot's generation moves on, so a handle kept past the window's
/// lifetime resolves to nothing instead of aliasing a newer window.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl WindowId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({}@gen{})", self.idx, self.generation)
    }
}
