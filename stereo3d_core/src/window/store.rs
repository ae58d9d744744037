// Copyright 2026 the Stereo3d Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage for tracked windows, kept in stacking order.

use alloc::vec::Vec;

use crate::animation::WindowVisualState;

use super::id::WindowId;
use super::info::WindowInfo;
use super::traverse::Stacking;

/// Host properties and effect state of one window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowRecord {
    /// Properties read from the host.
    pub info: WindowInfo,
    /// Classification, animation and lighting state owned by the effect.
    pub visual: WindowVisualState,
}

/// Storage for every window known to one output.
///
/// Windows are addressed by [`WindowId`]. Removed slots go on a free list and
/// are reused; a generation counter per slot makes stale handles resolve to
/// `None`. The stacking order (bottom to top) is the traversal order of every
/// per-frame pass and is stable within a frame.
#[derive(Debug, Default)]
pub struct WindowStore {
    pub(crate) slots: Vec<Option<WindowRecord>>,
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) stacking: Vec<u32>,
}

impl WindowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a window and places it on top of the stack.
    ///
    /// The window starts unclassified with an identity pose.
    pub fn insert(&mut self, info: WindowInfo) -> WindowId {
        let record = WindowRecord {
            info,
            visual: WindowVisualState::new(),
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(record);
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Some(record));
            self.generation.push(0);
            idx
        };
        self.stacking.push(idx);
        WindowId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Stops tracking a window and returns its last state.
    ///
    /// Returns `None` for stale handles.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowRecord> {
        if !self.is_alive(id) {
            return None;
        }
        let record = self.slots[id.idx as usize].take();
        self.generation[id.idx as usize] = self.generation[id.idx as usize].wrapping_add(1);
        self.free_list.push(id.idx);
        self.stacking.retain(|&idx| idx != id.idx);
        record
    }

    /// Returns whether `id` refers to a live window.
    #[must_use]
    pub fn is_alive(&self, id: WindowId) -> bool {
        let i = id.idx as usize;
        i < self.slots.len() && self.generation[i] == id.generation && self.slots[i].is_some()
    }

    /// Returns the record for `id`, if live.
    #[must_use]
    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        if self.is_alive(id) {
            self.slots[id.idx as usize].as_ref()
        } else {
            None
        }
    }

    /// Returns the record for `id` mutably, if live.
    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        if self.is_alive(id) {
            self.slots[id.idx as usize].as_mut()
        } else {
            None
        }
    }

    /// Replaces the host properties of a window.
    ///
    /// Returns `false` for stale handles.
    pub fn set_info(&mut self, id: WindowId, info: WindowInfo) -> bool {
        match self.get_mut(id) {
            Some(record) => {
                record.info = info;
                true
            }
            None => false,
        }
    }

    /// Moves a window to the top of the stack.
    ///
    /// Returns `false` for stale handles.
    pub fn raise(&mut self, id: WindowId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.stacking.retain(|&idx| idx != id.idx);
        self.stacking.push(id.idx);
        true
    }

    /// Replaces the stacking order, bottom to top.
    ///
    /// Stale and duplicate handles are skipped. Live windows missing from
    /// `order` keep their relative order and end up below the listed ones.
    pub fn restack(&mut self, order: &[WindowId]) {
        let mut listed: Vec<u32> = Vec::with_capacity(order.len());
        for &id in order {
            if self.is_alive(id) && !listed.contains(&id.idx) {
                listed.push(id.idx);
            }
        }
        let mut stacking: Vec<u32> = self
            .stacking
            .iter()
            .copied()
            .filter(|idx| !listed.contains(idx))
            .collect();
        stacking.extend(listed);
        self.stacking = stacking;
    }

    /// Number of live windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacking.len()
    }

    /// Whether no window is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacking.is_empty()
    }

    /// Iterates live windows bottom to top.
    #[must_use]
    pub fn iter(&self) -> Stacking<'_> {
        Stacking::new(self)
    }

    /// Handles of live windows bottom to top.
    #[must_use]
    pub fn ids(&self) -> Vec<WindowId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Calls `f` on every live window, bottom to top, with mutable access.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(WindowId, &mut WindowRecord)) {
        for &idx in &self.stacking {
            if let Some(record) = self.slots[idx as usize].as_mut() {
                let id = WindowId {
                    idx,
                    generation: self.generation[idx as usize],
                };
                f(id, record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowType;

    fn info(t: WindowType) -> WindowInfo {
        WindowInfo::new(t, kurbo::Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn insert_stacks_on_top() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Desktop));
        let b = store.insert(info(WindowType::Normal));
        assert_eq!(store.ids(), [a, b]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stale_handle_after_slot_reuse() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Normal));
        assert!(store.remove(a).is_some());
        let b = store.insert(info(WindowType::Dialog));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!store.is_alive(a));
        assert!(store.get(a).is_none());
        assert!(store.remove(a).is_none());
        assert_eq!(store.get(b).unwrap().info.window_type, WindowType::Dialog);
    }

    #[test]
    fn raise_moves_to_top() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Normal));
        let b = store.insert(info(WindowType::Normal));
        let c = store.insert(info(WindowType::Normal));
        assert!(store.raise(a));
        assert_eq!(store.ids(), [b, c, a]);
    }

    #[test]
    fn restack_keeps_unlisted_below() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Desktop));
        let b = store.insert(info(WindowType::Normal));
        let c = store.insert(info(WindowType::Normal));
        store.restack(&[c, b, c]);
        assert_eq!(store.ids(), [a, c, b]);
    }

    #[test]
    fn removal_drops_from_stacking() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Normal));
        let b = store.insert(info(WindowType::Normal));
        store.remove(a);
        assert_eq!(store.ids(), [b]);
        let mut seen = 0;
        store.for_each_mut(|id, _| {
            assert_eq!(id, b);
            seen += 1;
        });
        assert_eq!(seen, 1);
    }

    #[test]
    fn set_info_rejects_stale() {
        let mut store = WindowStore::new();
        let a = store.insert(info(WindowType::Normal));
        assert!(store.set_info(a, info(WindowType::Dock)));
        store.remove(a);
        assert!(!store.set_info(a, info(WindowType::Dock)));
    }
}
