// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enumerated event taxonomy delivered through [`Signal`](crate::Signal)s.

use serde_json::Value;

/// Events raised by the configuration store.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    /// The change sink fired: something in the tree was mutated.
    Changed,
    /// A dotted-path `set` completed. Raised after `Changed`.
    PathSet { path: String, value: Value },
    /// The tree was replaced by `load()`.
    Reloaded,
}

/// Events raised by the plugin manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    /// A plugin finished `on_load` and is registered.
    Loaded { id: String },
    /// Loading a plugin failed; the plugin is not registered.
    LoadFailed { id: String, reason: String },
    /// A plugin's `on_unload` ran and its instance was discarded.
    Unloaded { id: String },
    /// The catalog or the enabled set changed.
    ListChanged,
    /// An archive import produced new plugins.
    ImportSucceeded { ids: Vec<String> },
    /// An archive import failed; the reason is human-readable.
    ImportFailed { reason: String },
}
