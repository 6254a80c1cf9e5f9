//! Pointer source: stable small identifiers for mouse, touch and pen contacts.

use std::collections::HashMap;
use std::hash::BuildHasher;

use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec2;

use crate::constants::{DEFAULT_MAX_POINTERS, MOUSE_ID};

pub type PointerId = usize;

/// Platform identity of a pointer before it is mapped to a [`PointerId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKey {
    Mouse,
    Touch(u64),
    Pen(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Up,
    /// Movement while pressed.
    Drag,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub id: PointerId,
    /// Pixel coordinates, origin top-left.
    pub position: Vec2,
}

/// Last-known pixel position per pointer identifier.
pub trait PointerPositions {
    fn position(&self, id: PointerId) -> Option<Vec2>;
}

impl<S: BuildHasher> PointerPositions for HashMap<PointerId, Vec2, S> {
    fn position(&self, id: PointerId) -> Option<Vec2> {
        self.get(&id).copied()
    }
}

#[derive(Clone, Debug)]
pub struct PointerTracker {
    mouse_id: PointerId,
    max_pointers: usize,
    assigned: FnvHashMap<PointerKey, PointerId>,
    pressed: FnvHashSet<PointerId>,
    positions_by_id: FnvHashMap<PointerId, Vec2>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTERS)
    }
}

impl PointerTracker {
    pub fn new(max_pointers: usize) -> Self {
        Self {
            mouse_id: MOUSE_ID,
            max_pointers,
            assigned: FnvHashMap::default(),
            pressed: FnvHashSet::default(),
            positions_by_id: FnvHashMap::default(),
        }
    }

    pub fn with_mouse_id(mut self, mouse_id: PointerId) -> Self {
        self.mouse_id = mouse_id;
        self
    }

    pub fn mouse_id(&self) -> PointerId {
        self.mouse_id
    }

    pub fn max_pointers(&self) -> usize {
        self.max_pointers
    }

    /// Identifier currently mapped to `key`, if any. The mouse always has one.
    pub fn id_of(&self, key: PointerKey) -> Option<PointerId> {
        match key {
            PointerKey::Mouse => Some(self.mouse_id),
            other => self.assigned.get(&other).copied(),
        }
    }

    pub fn is_pressed(&self, id: PointerId) -> bool {
        self.pressed.contains(&id)
    }

    pub fn positions(&self) -> &FnvHashMap<PointerId, Vec2> {
        &self.positions_by_id
    }

    /// Contact start. Returns `None` when every identifier is taken.
    pub fn press(&mut self, key: PointerKey, position: Vec2) -> Option<PointerEvent> {
        let id = match self.id_of(key) {
            Some(id) => id,
            None => self.allocate(key)?,
        };
        self.pressed.insert(id);
        self.positions_by_id.insert(id, position);
        Some(PointerEvent {
            phase: PointerPhase::Down,
            id,
            position,
        })
    }

    /// Contact end (or cancel). Touch and pen identifiers become free again.
    pub fn release(&mut self, key: PointerKey, position: Vec2) -> Option<PointerEvent> {
        let id = self.id_of(key)?;
        self.positions_by_id.insert(id, position);
        if key != PointerKey::Mouse {
            self.assigned.remove(&key);
        }
        if !self.pressed.remove(&id) {
            return None;
        }
        Some(PointerEvent {
            phase: PointerPhase::Up,
            id,
            position,
        })
    }

    /// Records the position; yields a drag event only while the pointer is pressed.
    pub fn moved(&mut self, key: PointerKey, position: Vec2) -> Option<PointerEvent> {
        let id = self.id_of(key)?;
        self.positions_by_id.insert(id, position);
        self.is_pressed(id).then_some(PointerEvent {
            phase: PointerPhase::Drag,
            id,
            position,
        })
    }

    fn allocate(&mut self, key: PointerKey) -> Option<PointerId> {
        let free = (0..self.max_pointers)
            .filter(|&id| id != self.mouse_id)
            .find(|id| !self.assigned.values().any(|taken| taken == id));
        match free {
            Some(id) => {
                self.assigned.insert(key, id);
                log::debug!("[pointer] {:?} -> id {}", key, id);
                Some(id)
            }
            None => {
                log::warn!(
                    "[pointer] all {} pointer ids in use; ignoring {:?}",
                    self.max_pointers,
                    key
                );
                None
            }
        }
    }
}

impl PointerPositions for PointerTracker {
    fn position(&self, id: PointerId) -> Option<Vec2> {
        self.positions_by_id.get(&id).copied()
    }
}
