// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Module search order used while an external entry module is resolved.
//!
//! The loader prepends a plugin's directories for the duration of a
//! [`SearchPathScope`]. Scopes nest; dropping a scope restores exactly the
//! order that was in effect when it was opened, on every exit path.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use tracing::trace;

/// Subdirectory of a plugin searched before the plugin directory itself.
pub const LIBS_DIR: &str = "libs";

/// Ordered list of directories searched for sibling modules.
#[derive(Debug, Default)]
pub struct SearchPath {
    entries: RefCell<Vec<PathBuf>>,
    depth: Cell<usize>,
}

impl SearchPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search path with fixed base entries that every scope sees last.
    pub fn with_base(entries: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: RefCell::new(entries.into_iter().collect()),
            depth: Cell::new(0),
        }
    }

    /// Prepends `dir` (and `dir/libs` ahead of it, if that exists) until the
    /// returned scope is dropped.
    pub fn scoped(&self, dir: &Path) -> SearchPathScope<'_> {
        let saved = self.entries.borrow().clone();

        let mut front = Vec::with_capacity(2);
        let libs = dir.join(LIBS_DIR);
        if libs.is_dir() {
            front.push(libs);
        }
        front.push(dir.to_path_buf());

        {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|e| !front.contains(e));
            front.append(&mut entries);
            *entries = front;
        }
        self.depth.set(self.depth.get() + 1);
        trace!(dir = %dir.display(), depth = self.depth.get(), "search path scope opened");

        SearchPathScope { owner: self, saved }
    }

    /// Current entries, highest priority first.
    pub fn entries(&self) -> Vec<PathBuf> {
        self.entries.borrow().clone()
    }

    /// Number of scopes currently open.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// First existing `entry/file_name` in search order.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        self.entries
            .borrow()
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
    }
}

/// Restores the previous search order when dropped.
#[must_use = "the search path is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct SearchPathScope<'a> {
    owner: &'a SearchPath,
    saved: Vec<PathBuf>,
}

impl Drop for SearchPathScope<'_> {
    fn drop(&mut self) {
        *self.owner.entries.borrow_mut() = std::mem::take(&mut self.saved);
        self.owner.depth.set(self.owner.depth.get().saturating_sub(1));
        trace!(depth = self.owner.depth.get(), "search path scope closed");
    }
}
