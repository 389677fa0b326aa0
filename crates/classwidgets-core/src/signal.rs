// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous observer lists.
//!
//! A [`Signal`] holds callbacks that are invoked in registration order, on the
//! emitting thread, before `emit` returns. Slots may connect further slots
//! while being invoked; those only see subsequent emissions.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Slot<T> = Rc<dyn Fn(&T)>;

/// An ordered list of observers for events of type `T`.
pub struct Signal<T> {
    slots: RefCell<Vec<Slot<T>>>,
}

impl<T> Signal<T> {
    /// Creates a signal with no observers.
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Registers an observer. Observers run in the order they were connected.
    pub fn connect(&self, slot: impl Fn(&T) + 'static) {
        self.slots.borrow_mut().push(Rc::new(slot));
    }

    /// Invokes every observer with `event`.
    pub fn emit(&self, event: &T) {
        // Snapshot so slots can connect new observers without a borrow conflict.
        let slots: Vec<Slot<T>> = self.slots.borrow().clone();
        for slot in slots {
            slot(event);
        }
    }

    /// Returns the number of connected observers.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Returns true if nothing is connected.
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal").field("slots", &self.len()).finish()
    }
}
