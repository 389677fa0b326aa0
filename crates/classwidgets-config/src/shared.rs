// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The UI-thread handle to a [`ConfigStore`].
//!
//! [`SharedConfig`] replaces a plain `Rc<RefCell<ConfigStore>>`. Its mutable
//! borrow queues store events and delivers them when the borrow drops, after
//! the `RefCell` is released, so an observer can read or mutate the store it
//! is observing.

use std::cell::{BorrowError, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::store::{ConfigEvents, ConfigStore};

/// Shared, single-threaded ownership of a [`ConfigStore`].
#[derive(Clone)]
pub struct SharedConfig {
    store: Rc<RefCell<ConfigStore>>,
    events: Rc<ConfigEvents>,
}

impl SharedConfig {
    pub fn new(store: ConfigStore) -> Self {
        let events = Rc::clone(store.events());
        events.defer();
        Self {
            store: Rc::new(RefCell::new(store)),
            events,
        }
    }

    /// Immutably borrows the store.
    ///
    /// # Panics
    ///
    /// Panics if the store is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, ConfigStore> {
        self.store.borrow()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, ConfigStore>, BorrowError> {
        self.store.try_borrow()
    }

    /// Mutably borrows the store. Events raised through the borrow are
    /// delivered when it drops.
    ///
    /// # Panics
    ///
    /// Panics if the store is currently borrowed.
    pub fn borrow_mut(&self) -> ConfigMut<'_> {
        ConfigMut {
            store: Some(self.store.borrow_mut()),
            events: &self.events,
        }
    }

    /// True if both handles point at the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.try_borrow() {
            Ok(store) => f.debug_tuple("SharedConfig").field(&*store).finish(),
            Err(_) => f.write_str("SharedConfig(<borrowed>)"),
        }
    }
}

/// A mutable borrow of a [`SharedConfig`]; see [`SharedConfig::borrow_mut`].
pub struct ConfigMut<'a> {
    store: Option<RefMut<'a, ConfigStore>>,
    events: &'a ConfigEvents,
}

impl Deref for ConfigMut<'_> {
    type Target = ConfigStore;

    fn deref(&self) -> &ConfigStore {
        // Only `drop` takes the borrow.
        self.store.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for ConfigMut<'_> {
    fn deref_mut(&mut self) -> &mut ConfigStore {
        self.store.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for ConfigMut<'_> {
    fn drop(&mut self) {
        drop(self.store.take());
        self.events.flush();
    }
}
