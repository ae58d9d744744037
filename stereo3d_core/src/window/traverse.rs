// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking-order traversal.

use super::id::WindowId;
use super::store::{WindowRecord, WindowStore};

/// An iterator over live windows from bottom to top of the stack.
///
/// Created by [`WindowStore::iter`].
#[derive(Debug)]
pub struct Stacking<'a> {
    store: &'a WindowStore,
    pos: usize,
}

impl<'a> Stacking<'a> {
    pub(crate) fn new(store: &'a WindowStore) -> Self {
        Self { store, pos: 0 }
    }
}

impl<'a> Iterator for Stacking<'a> {
    type Item = (WindowId, &'a WindowRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = *self.store.stacking.get(self.pos)?;
        self.pos += 1;
        let record = self.store.slots[idx as usize].as_ref()?;
        Some((
            WindowId {
                idx,
                generation: self.store.generation[idx as usize],
            },
            record,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.stacking.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Stacking<'_> {}
