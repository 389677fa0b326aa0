// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins compiled into the host.

pub mod widgets;

use classwidgets_core::Plugin;

use crate::api::PluginApi;
use crate::manifest::PluginManifest;

/// Constructs a builtin plugin instance bound to the bridge.
pub type BuiltinFactory = fn(PluginApi) -> Box<dyn Plugin>;

/// A compiled-in plugin: its manifest and constructor.
#[derive(Clone)]
pub struct BuiltinPlugin {
    pub manifest: PluginManifest,
    pub factory: BuiltinFactory,
}

impl std::fmt::Debug for BuiltinPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinPlugin")
            .field("id", &self.manifest.id)
            .finish_non_exhaustive()
    }
}

/// Every plugin shipped with the host.
pub fn builtin_plugins() -> Vec<BuiltinPlugin> {
    vec![widgets::plugin()]
}
