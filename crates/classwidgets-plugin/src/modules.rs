// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-plugin module namespaces.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::entry::EntryModule;

/// Synthesized namespace for a plugin's entry module.
pub fn module_name(plugin_id: &str) -> String {
    format!("cw_plugin_{plugin_id}")
}

/// Loaded entry modules keyed by their synthesized name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Rc<dyn EntryModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: Rc<dyn EntryModule>) {
        let name = module.name().to_string();
        if self.modules.insert(name.clone(), module).is_some() {
            debug!(module = %name, "replaced module registration");
        }
    }

    /// Drops the registration for `name`. Returns true if one existed.
    pub fn evict(&mut self, name: &str) -> bool {
        let evicted = self.modules.remove(name).is_some();
        if evicted {
            debug!(module = %name, "evicted module");
        }
        evicted
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn EntryModule>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.modules.keys()).finish()
    }
}
