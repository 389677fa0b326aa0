// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! UI-thread facade over the catalog and the loader.
//!
//! The manager owns the enabled set (persisted as `plugins.enabled`), turns
//! enable/disable/uninstall requests into loader calls, and reports what
//! happened through a [`Signal`] of [`PluginEvent`]s. Observers of that
//! signal run while the manager is mid-operation and must not borrow it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use classwidgets_config::SharedConfig;
use classwidgets_core::{ClassWidgetsError, PluginEvent, Signal};
use tracing::{error, info, warn};

use crate::api::PluginApi;
use crate::builtin::builtin_plugins;
use crate::catalog::{CatalogEntry, PluginCatalog, PluginSource};
use crate::loader::PluginLoader;
use crate::manifest::PluginManifest;
use crate::wasm::WasmEntryLoader;

/// Outcome of [`PluginManager::load_enabled`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    /// Plugin id and failure reason.
    pub failed: Vec<(String, String)>,
    /// Enabled ids with no catalog entry.
    pub missing: Vec<String>,
}

pub struct PluginManager {
    catalog: PluginCatalog,
    loader: PluginLoader,
    config: SharedConfig,
    enabled: BTreeSet<String>,
    events: Rc<Signal<PluginEvent>>,
}

impl PluginManager {
    /// Builds a manager and scans the catalog.
    ///
    /// The enabled set is read from `plugins.enabled`.
    pub fn new(catalog: PluginCatalog, loader: PluginLoader, config: SharedConfig) -> Self {
        let enabled = config
            .borrow()
            .config()
            .plugins
            .enabled
            .iter()
            .cloned()
            .collect();
        let mut manager = Self {
            catalog,
            loader,
            config,
            enabled,
            events: Rc::new(Signal::new()),
        };
        manager.catalog.scan();
        info!("plugin manager initialized");
        manager
    }

    /// Manager with the shipped builtins and the WebAssembly entry loader.
    pub fn with_defaults(
        api: PluginApi,
        external_root: impl Into<PathBuf>,
    ) -> Result<Self, ClassWidgetsError> {
        let config = api.services().config().clone();
        let catalog = PluginCatalog::new(builtin_plugins(), external_root);
        let loader = PluginLoader::new(api, Rc::new(WasmEntryLoader::new()?));
        Ok(Self::new(catalog, loader, config))
    }

    /// Registers an observer for lifecycle events.
    pub fn subscribe(&self, observer: impl Fn(&PluginEvent) + 'static) {
        self.events.connect(observer);
    }

    pub(crate) fn events(&self) -> Rc<Signal<PluginEvent>> {
        Rc::clone(&self.events)
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    pub fn loader(&self) -> &PluginLoader {
        &self.loader
    }

    /// Every known plugin, builtins first.
    pub fn plugins(&self) -> Vec<PluginManifest> {
        self.catalog
            .entries()
            .iter()
            .map(|entry| entry.manifest.clone())
            .collect()
    }

    pub fn external_root(&self) -> &Path {
        self.catalog.external_root()
    }

    /// Rescans the catalog. Loaded instances are unaffected.
    pub fn rescan(&mut self) -> usize {
        self.catalog.scan()
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled.contains(id)
    }

    /// Enabled ids, sorted.
    pub fn enabled(&self) -> Vec<String> {
        self.enabled.iter().cloned().collect()
    }

    /// Whether a known plugin accepts the host API. Unknown ids are not.
    pub fn is_compatible(&self, id: &str) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|entry| self.loader.is_compatible(&entry.manifest))
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.loader.is_loaded(id)
    }

    /// Existing on-disk folder of an external plugin.
    pub fn plugin_folder(&self, id: &str) -> Option<PathBuf> {
        let Some(entry) = self.catalog.get(id) else {
            warn!(plugin = %id, "plugin not found, no folder to show");
            return None;
        };
        match entry.root() {
            Some(dir) if dir.is_dir() => Some(dir.to_path_buf()),
            Some(dir) => {
                warn!(plugin = %id, dir = %dir.display(), "plugin folder does not exist");
                None
            }
            None => None,
        }
    }

    /// Loads every enabled plugin. Failures are contained per plugin.
    pub fn load_enabled(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        let ids: Vec<String> = self.enabled.iter().cloned().collect();
        for id in ids {
            let Some(entry) = self.catalog.get(&id).cloned() else {
                warn!(plugin = %id, "enabled plugin not found in catalog");
                report.missing.push(id);
                continue;
            };
            match self.load_entry(&entry) {
                Ok(()) => report.loaded.push(id),
                Err(e) => report.failed.push((id, e.to_string())),
            }
        }
        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            missing = report.missing.len(),
            "loaded enabled plugins"
        );
        report
    }

    fn load_entry(&mut self, entry: &CatalogEntry) -> Result<(), ClassWidgetsError> {
        let id = entry.id().to_string();
        if self.loader.is_loaded(&id) {
            return Ok(());
        }
        match self.loader.load(entry) {
            Ok(()) => {
                self.events.emit(&PluginEvent::Loaded { id });
                Ok(())
            }
            Err(e) => {
                error!(plugin = %id, error = %e, "failed to load plugin");
                self.events.emit(&PluginEvent::LoadFailed {
                    id,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Enables or disables a plugin, loading or unloading it accordingly.
    ///
    /// The enabled set is persisted before the plugin is touched, so a
    /// failed load leaves the plugin enabled; the load error is returned.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), ClassWidgetsError> {
        let entry = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ClassWidgetsError::PluginNotFound(id.to_string()))?;

        let result = if enabled {
            info!(plugin = %id, "enabled plugin");
            self.enabled.insert(id.to_string());
            self.persist_enabled();
            self.load_entry(&entry)
        } else {
            info!(plugin = %id, "disabled plugin");
            self.enabled.remove(id);
            self.persist_enabled();
            if self.loader.unload(id) {
                self.events.emit(&PluginEvent::Unloaded { id: id.to_string() });
            }
            Ok(())
        };
        self.events.emit(&PluginEvent::ListChanged);
        result
    }

    /// Unloads every plugin; used at shutdown.
    pub fn cleanup(&mut self) {
        for id in self.loader.loaded_ids() {
            if self.loader.unload(&id) {
                self.events.emit(&PluginEvent::Unloaded { id });
            }
        }
        self.loader.cleanup();
    }

    /// Removes an external plugin from disk.
    ///
    /// The plugin is unloaded first and dropped from the enabled set.
    /// Builtins are refused.
    pub fn uninstall(&mut self, id: &str) -> Result<(), ClassWidgetsError> {
        let entry = self
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| ClassWidgetsError::PluginNotFound(id.to_string()))?;
        let PluginSource::External(dir) = &entry.source else {
            warn!(plugin = %id, "builtin plugins cannot be uninstalled");
            return Err(ClassWidgetsError::BuiltinProtected(id.to_string()));
        };

        if self.loader.unload(id) {
            self.events.emit(&PluginEvent::Unloaded { id: id.to_string() });
        }
        self.loader.evict(id);

        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| ClassWidgetsError::persistence(dir, e))?;
            info!(plugin = %id, dir = %dir.display(), "uninstalled plugin");
        }

        self.enabled.remove(id);
        self.persist_enabled();
        self.catalog.scan();
        self.events.emit(&PluginEvent::ListChanged);
        Ok(())
    }

    fn persist_enabled(&self) {
        let enabled = self.enabled();
        let mut store = self.config.borrow_mut();
        store.edit().plugins.enabled = enabled;
        store.save(true);
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("catalog", &self.catalog.ids())
            .field("enabled", &self.enabled)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}
