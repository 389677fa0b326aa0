// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin instantiation and lifecycle.
//!
//! The loader owns every live plugin instance. Per plugin id the lifecycle
//! is `discovered -> compatible -> instantiated -> loaded -> unloaded`.
//! Builtins are constructed from their factory; external plugins have their
//! entry file executed as an isolated module inside a search path scope that
//! is restored on every exit path. A failure in one plugin only aborts that
//! plugin's load.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use classwidgets_core::{ClassWidgetsError, Plugin};
use tracing::{debug, error, info, warn};

use crate::api::{PluginApi, PluginContext};
use crate::builtin::BuiltinFactory;
use crate::catalog::{CatalogEntry, PluginSource};
use crate::entry::{EntryLoader, EntryModule};
use crate::manifest::PluginManifest;
use crate::modules::{ModuleRegistry, module_name};
use crate::search_path::SearchPath;
use crate::version::{HOST_API_VERSION, check_api_version};

struct LoadedPlugin {
    manifest: PluginManifest,
    instance: Box<dyn Plugin>,
}

/// Drives plugin instances through their lifecycle.
pub struct PluginLoader {
    api: PluginApi,
    entry_loader: Rc<dyn EntryLoader>,
    search_path: SearchPath,
    modules: ModuleRegistry,
    instances: BTreeMap<String, LoadedPlugin>,
    host_api_version: String,
}

impl PluginLoader {
    /// `api` is the host-level bridge; each plugin gets its own handle
    /// derived from it.
    pub fn new(api: PluginApi, entry_loader: Rc<dyn EntryLoader>) -> Self {
        Self {
            api,
            entry_loader,
            search_path: SearchPath::new(),
            modules: ModuleRegistry::new(),
            instances: BTreeMap::new(),
            host_api_version: HOST_API_VERSION.to_string(),
        }
    }

    /// Overrides the API version plugins are checked against.
    pub fn with_host_api_version(mut self, version: impl Into<String>) -> Self {
        self.host_api_version = version.into();
        self
    }

    pub fn host_api_version(&self) -> &str {
        &self.host_api_version
    }

    pub fn api(&self) -> &PluginApi {
        &self.api
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn is_compatible(&self, manifest: &PluginManifest) -> bool {
        check_api_version(&manifest.api_version, &self.host_api_version)
    }

    /// Instantiates the plugin and runs its `on_load` hook.
    ///
    /// Loading an already loaded plugin does nothing.
    pub fn load(&mut self, entry: &CatalogEntry) -> Result<(), ClassWidgetsError> {
        let manifest = &entry.manifest;
        if self.instances.contains_key(&manifest.id) {
            debug!(plugin = %manifest.id, "plugin already loaded");
            return Ok(());
        }
        info!(
            plugin = %manifest.id,
            name = %manifest.name,
            version = %manifest.version,
            kind = %manifest.kind,
            "loading plugin"
        );

        let instantiated = match &entry.source {
            PluginSource::Builtin(factory) => self.instantiate_builtin(manifest, *factory),
            PluginSource::External(dir) => self.instantiate_external(manifest, dir),
        };
        let instance = match instantiated {
            Ok(instance) => instance,
            Err(e) => {
                self.api.services().release_plugin(&manifest.id);
                return Err(e);
            }
        };

        self.instances.insert(
            manifest.id.clone(),
            LoadedPlugin {
                manifest: manifest.clone(),
                instance,
            },
        );
        info!(plugin = %manifest.id, version = %manifest.version, "loaded plugin");
        Ok(())
    }

    fn instantiate_builtin(
        &mut self,
        manifest: &PluginManifest,
        factory: BuiltinFactory,
    ) -> Result<Box<dyn Plugin>, ClassWidgetsError> {
        if !self.is_compatible(manifest) {
            // Builtins ship with the host, so a mismatch is only reported.
            error!(
                plugin = %manifest.id,
                requirement = %manifest.api_version,
                host = %self.host_api_version,
                "builtin plugin is not compatible with the host api, loading anyway"
            );
        }

        let api = self.api.for_plugin();
        let mut instance = factory(api.clone());
        api.inject(PluginContext {
            root: None,
            manifest: manifest.clone(),
        });
        run_on_load(&manifest.id, instance.as_mut())?;
        Ok(instance)
    }

    fn instantiate_external(
        &mut self,
        manifest: &PluginManifest,
        dir: &Path,
    ) -> Result<Box<dyn Plugin>, ClassWidgetsError> {
        let id = &manifest.id;
        if !self.is_compatible(manifest) {
            return Err(ClassWidgetsError::IncompatibleApi {
                plugin_id: id.clone(),
                requirement: manifest.api_version.clone(),
                host: self.host_api_version.clone(),
            });
        }

        let entry_path = dir.join(&manifest.entry);
        if !entry_path.is_file() {
            return Err(ClassWidgetsError::EntryMissing {
                plugin_id: id.clone(),
                path: entry_path,
            });
        }

        let name = module_name(id);
        self.modules.evict(&name);

        let _scope = self.search_path.scoped(dir);
        let module = self
            .entry_loader
            .load_module(id, &name, &entry_path, &self.search_path)?;
        self.modules.insert(Rc::clone(&module));

        let loaded = construct_and_load(&self.api, module.as_ref(), manifest, dir);
        if loaded.is_err() {
            self.modules.evict(&name);
        }
        loaded
    }

    /// Runs `on_unload` and discards the instance. Returns false if the
    /// plugin was not loaded. Hook failures are logged.
    pub fn unload(&mut self, id: &str) -> bool {
        let Some(mut loaded) = self.instances.remove(id) else {
            return false;
        };
        if let Err(e) = loaded.instance.on_unload() {
            error!(plugin = %id, error = %e, "failed to unload plugin");
        }
        self.api.services().release_plugin(id);
        self.modules.evict(&module_name(id));
        info!(plugin = %id, name = %loaded.manifest.name, "unloaded plugin");
        true
    }

    /// Drops the module registration of a plugin that is not loaded.
    pub fn evict(&mut self, id: &str) -> bool {
        self.modules.evict(&module_name(id))
    }

    /// Unloads every plugin. The instance registry is always left empty.
    pub fn cleanup(&mut self) {
        let ids: Vec<String> = self.instances.keys().cloned().collect();
        for id in &ids {
            self.unload(id);
        }
        self.instances.clear();
        if !ids.is_empty() {
            info!(count = ids.len(), "unloaded all plugins");
        }
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    /// Ids of loaded plugins, sorted.
    pub fn loaded_ids(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }

    pub fn loaded_manifest(&self, id: &str) -> Option<&PluginManifest> {
        self.instances.get(id).map(|loaded| &loaded.manifest)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("loaded", &self.loaded_ids())
            .field("modules", &self.modules)
            .field("host_api_version", &self.host_api_version)
            .finish_non_exhaustive()
    }
}

fn construct_and_load(
    api: &PluginApi,
    module: &dyn EntryModule,
    manifest: &PluginManifest,
    root: &Path,
) -> Result<Box<dyn Plugin>, ClassWidgetsError> {
    let class = module
        .entry_class()
        .ok_or_else(|| ClassWidgetsError::EntryMalformed {
            plugin_id: manifest.id.clone(),
            message: "entry module does not expose an entry class".into(),
        })?;

    let plugin_api = api.for_plugin();
    let mut instance = class.construct(plugin_api.clone())?;
    plugin_api.inject(PluginContext {
        root: Some(root.to_path_buf()),
        manifest: manifest.clone(),
    });
    run_on_load(&manifest.id, instance.as_mut())?;
    Ok(instance)
}

/// Calls `on_load`; on failure makes a best-effort `on_unload` and reports
/// the `on_load` error.
fn run_on_load(plugin_id: &str, instance: &mut dyn Plugin) -> Result<(), ClassWidgetsError> {
    let Err(e) = instance.on_load() else {
        return Ok(());
    };
    warn!(plugin = %plugin_id, error = %e, "on_load failed, unloading");
    if let Err(unload) = instance.on_unload() {
        debug!(plugin = %plugin_id, error = %unload, "unload after failed on_load also failed");
    }
    Err(match e {
        ClassWidgetsError::LoadHook { .. } => e,
        other => ClassWidgetsError::LoadHook {
            plugin_id: plugin_id.to_string(),
            hook: "on_load",
            message: other.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use classwidgets_core::PluginKind;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::test_support::services;
    use crate::entry::EntryClass;

    thread_local! {
        static CALLS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn record(call: &str) {
        CALLS.with(|calls| calls.borrow_mut().push(call.to_string()));
    }

    fn calls() -> Vec<String> {
        CALLS.with(|calls| calls.borrow().clone())
    }

    struct Recording {
        fail_load: bool,
    }

    impl Plugin for Recording {
        fn on_load(&mut self) -> Result<(), ClassWidgetsError> {
            record("load");
            if self.fail_load {
                Err(ClassWidgetsError::Internal("load exploded".into()))
            } else {
                Ok(())
            }
        }

        fn on_unload(&mut self) -> Result<(), ClassWidgetsError> {
            record("unload");
            Err(ClassWidgetsError::Internal("unload exploded".into()))
        }
    }

    fn healthy(_: PluginApi) -> Box<dyn Plugin> {
        Box::new(Recording { fail_load: false })
    }

    fn broken(_: PluginApi) -> Box<dyn Plugin> {
        Box::new(Recording { fail_load: true })
    }

    fn builtin_entry(id: &str, api_version: &str, factory: BuiltinFactory) -> CatalogEntry {
        CatalogEntry {
            manifest: PluginManifest::builtin(id, id, "1.0.0", api_version, "T"),
            source: PluginSource::Builtin(factory),
        }
    }

    struct NoEntryLoader;

    impl EntryLoader for NoEntryLoader {
        fn load_module(
            &self,
            plugin_id: &str,
            _module_name: &str,
            _entry: &Path,
            _search: &SearchPath,
        ) -> Result<Rc<dyn EntryModule>, ClassWidgetsError> {
            Err(ClassWidgetsError::EntryMalformed {
                plugin_id: plugin_id.to_string(),
                message: "unused".into(),
            })
        }
    }

    fn loader(dir: &Path) -> PluginLoader {
        PluginLoader::new(PluginApi::new(services(dir)), Rc::new(NoEntryLoader))
    }

    #[test]
    #[traced_test]
    fn incompatible_builtin_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = loader(dir.path());
        let entry = builtin_entry("b", ">=99.0", healthy);

        loader.load(&entry).unwrap();
        assert!(loader.is_loaded("b"));
        assert!(logs_contain("not compatible with the host api"));
        assert_eq!(loader.loaded_manifest("b").unwrap().kind, PluginKind::Builtin);
    }

    #[test]
    fn failed_load_unloads_and_wraps_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = loader(dir.path());
        let entry = builtin_entry("f", "*", broken);

        let err = loader.load(&entry).unwrap_err();
        assert!(matches!(err, ClassWidgetsError::LoadHook { hook: "on_load", .. }));
        assert!(err.to_string().contains("load exploded"));
        assert!(!loader.is_loaded("f"));
        assert_eq!(calls(), vec!["load", "unload"]);
    }

    #[test]
    fn cleanup_clears_despite_unload_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = loader(dir.path());
        for id in ["a", "b"] {
            let entry = builtin_entry(id, "*", healthy);
            loader.load(&entry).unwrap();
        }
        assert_eq!(loader.len(), 2);

        loader.cleanup();
        assert!(loader.is_empty());
        assert_eq!(calls(), vec!["load", "load", "unload", "unload"]);
    }

    #[test]
    fn load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = loader(dir.path());
        let entry = builtin_entry("once", "*", healthy);
        loader.load(&entry).unwrap();
        loader.load(&entry).unwrap();
        assert_eq!(calls(), vec!["load"]);
        assert!(loader.unload("once"));
        assert!(!loader.unload("once"));
    }

    #[test]
    fn missing_entry_class_is_malformed() {
        struct Empty;
        impl EntryModule for Empty {
            fn name(&self) -> &str {
                "cw_plugin_x"
            }
            fn entry_class(&self) -> Option<Rc<dyn EntryClass>> {
                None
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let api = PluginApi::new(services(dir.path()));
        let manifest = PluginManifest::builtin("x", "X", "1", "*", "T");
        let err = construct_and_load(&api, &Empty, &manifest, dir.path()).err().unwrap();
        assert!(matches!(err, ClassWidgetsError::EntryMalformed { .. }));
    }
}
