// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebAssembly entry modules using wasmtime.
//!
//! An external plugin's entry file is a `.wasm` binary or `.wat` text
//! module. Its entry class is the pair of exported `on_load`/`on_unload`
//! functions; a missing hook behaves like an empty one. The module may
//! import from the host namespace `classwidgets`:
//!
//! - `log(level, ptr, len)` writes to the host log
//! - `notify(level, title_ptr, title_len, msg_ptr, msg_len)` pushes a
//!   notification through a provider named after the plugin
//!
//! Any other import namespace `<name>` is satisfied by a sibling module
//! `<name>.wasm` or `<name>.wat`, looked up through the scoped search path
//! and instantiated privately for this plugin.
//!
//! Host calls are queued in the store and forwarded to the bridge after each
//! hook returns, so wasm code never re-enters the host's registries. Every
//! hook runs with a fresh fuel allowance; a module that exhausts it traps.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use classwidgets_core::{ClassWidgetsError, NotificationLevel, Plugin};
use tracing::{debug, error, info, trace, warn};
use wasmtime::{Caller, Config, Engine, Extern, Instance, Linker, Module, Store, Trap, TypedFunc};

use crate::api::{PluginApi, ProviderHandle};
use crate::entry::{EntryClass, EntryLoader, EntryModule};
use crate::search_path::SearchPath;

/// Import namespace providing host functions.
pub const HOST_MODULE: &str = "classwidgets";

/// Fuel granted to instantiation and to each hook call.
pub const DEFAULT_FUEL: u64 = 10_000_000;

const HOOKS: [&str; 2] = ["on_load", "on_unload"];
const LIBRARY_EXTENSIONS: [&str; 2] = ["wasm", "wat"];

/// A host call made by wasm code, delivered after the call returns.
#[derive(Debug, Clone, PartialEq)]
enum HostCall {
    Log {
        level: i32,
        message: String,
    },
    Notify {
        level: NotificationLevel,
        title: String,
        message: String,
    },
}

/// Per-plugin store data.
struct HostState {
    plugin_id: String,
    outbox: Vec<HostCall>,
}

/// Compiles and instantiates WebAssembly entry files.
///
/// The [`Engine`] is shared by every plugin; each plugin gets its own
/// [`Store`] and [`Linker`].
pub struct WasmEntryLoader {
    engine: Engine,
    fuel: u64,
}

impl WasmEntryLoader {
    /// Creates a loader with fuel metering and [`DEFAULT_FUEL`] per call.
    pub fn new() -> Result<Self, ClassWidgetsError> {
        Self::with_fuel(DEFAULT_FUEL)
    }

    pub fn with_fuel(fuel: u64) -> Result<Self, ClassWidgetsError> {
        let mut config = Config::new();
        config.consume_fuel(true);

        let engine = Engine::new(&config).map_err(|e| {
            ClassWidgetsError::Internal(format!("failed to create wasmtime engine: {e}"))
        })?;

        info!(fuel, "WASM plugin runtime initialized");
        Ok(Self { engine, fuel })
    }

    pub fn fuel(&self) -> u64 {
        self.fuel
    }

    /// Compiles, links, and instantiates every non-host import of `module`.
    fn link_libraries(
        &self,
        plugin_id: &str,
        module: &Module,
        search: &SearchPath,
        linker: &mut Linker<HostState>,
        store: &mut Store<HostState>,
        linked: &mut BTreeSet<String>,
    ) -> Result<(), ClassWidgetsError> {
        let malformed = |message: String| ClassWidgetsError::EntryMalformed {
            plugin_id: plugin_id.to_string(),
            message,
        };

        let namespaces: BTreeSet<String> = module
            .imports()
            .map(|import| import.module().to_string())
            .filter(|name| name != HOST_MODULE)
            .collect();

        for name in namespaces {
            if !linked.insert(name.clone()) {
                continue;
            }
            let path = resolve_library(search, &name)
                .ok_or_else(|| malformed(format!("cannot resolve imported module `{name}`")))?;
            debug!(plugin = %plugin_id, library = %name, path = %path.display(), "linking library module");

            let library = Module::from_file(&self.engine, &path)
                .map_err(|e| malformed(format!("failed to compile {}: {e:#}", path.display())))?;
            self.link_libraries(plugin_id, &library, search, linker, store, linked)?;

            let instance = linker
                .instantiate(&mut *store, &library)
                .map_err(|e| malformed(format!("failed to instantiate `{name}`: {e:#}")))?;
            linker
                .instance(&mut *store, &name, instance)
                .map_err(|e| malformed(format!("failed to register `{name}`: {e:#}")))?;
        }
        Ok(())
    }
}

impl EntryLoader for WasmEntryLoader {
    fn load_module(
        &self,
        plugin_id: &str,
        module_name: &str,
        entry: &Path,
        search: &SearchPath,
    ) -> Result<Rc<dyn EntryModule>, ClassWidgetsError> {
        let malformed = |message: String| ClassWidgetsError::EntryMalformed {
            plugin_id: plugin_id.to_string(),
            message,
        };

        let module = Module::from_file(&self.engine, entry)
            .map_err(|e| malformed(format!("failed to compile {}: {e:#}", entry.display())))?;

        let mut store = Store::new(
            &self.engine,
            HostState {
                plugin_id: plugin_id.to_string(),
                outbox: Vec::new(),
            },
        );
        store
            .set_fuel(self.fuel)
            .map_err(|e| malformed(format!("failed to set fuel: {e}")))?;

        let mut linker = Linker::new(&self.engine);
        define_host_functions(&mut linker).map_err(|e| linker_err(plugin_id, e))?;

        let mut linked = BTreeSet::new();
        self.link_libraries(plugin_id, &module, search, &mut linker, &mut store, &mut linked)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| malformed(format!("failed to instantiate entry module: {e:#}")))?;

        let has_hooks = HOOKS
            .iter()
            .any(|hook| instance.get_export(&mut store, hook).is_some());
        debug!(plugin = %plugin_id, module = %module_name, has_hooks, "loaded WASM entry module");

        let class: Option<Rc<dyn EntryClass>> = if has_hooks {
            Some(Rc::new(WasmEntryClass {
                plugin_id: plugin_id.to_string(),
                fuel: self.fuel,
                slot: RefCell::new(Some(Instantiated { store, instance })),
            }))
        } else {
            None
        };

        Ok(Rc::new(WasmEntryModule {
            name: module_name.to_string(),
            class,
        }))
    }
}

impl std::fmt::Debug for WasmEntryLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmEntryLoader")
            .field("fuel", &self.fuel)
            .finish_non_exhaustive()
    }
}

struct WasmEntryModule {
    name: String,
    class: Option<Rc<dyn EntryClass>>,
}

impl EntryModule for WasmEntryModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn entry_class(&self) -> Option<Rc<dyn EntryClass>> {
        self.class.clone()
    }
}

struct Instantiated {
    store: Store<HostState>,
    instance: Instance,
}

/// The instantiated module, waiting to be turned into a plugin.
struct WasmEntryClass {
    plugin_id: String,
    fuel: u64,
    slot: RefCell<Option<Instantiated>>,
}

impl WasmEntryClass {
    fn hook(
        &self,
        store: &mut Store<HostState>,
        instance: &Instance,
        hook: &str,
    ) -> Result<Option<TypedFunc<(), ()>>, ClassWidgetsError> {
        if instance.get_export(&mut *store, hook).is_none() {
            return Ok(None);
        }
        instance
            .get_typed_func::<(), ()>(&mut *store, hook)
            .map(Some)
            .map_err(|e| ClassWidgetsError::NotAPlugin {
                plugin_id: self.plugin_id.clone(),
                message: format!("`{hook}` must be a function without parameters or results: {e}"),
            })
    }
}

impl EntryClass for WasmEntryClass {
    fn construct(&self, api: PluginApi) -> Result<Box<dyn Plugin>, ClassWidgetsError> {
        let Instantiated {
            mut store,
            instance,
        } = self
            .slot
            .borrow_mut()
            .take()
            .ok_or_else(|| ClassWidgetsError::EntryMalformed {
                plugin_id: self.plugin_id.clone(),
                message: "entry module was already constructed".into(),
            })?;

        let on_load = self.hook(&mut store, &instance, "on_load")?;
        let on_unload = self.hook(&mut store, &instance, "on_unload")?;

        Ok(Box::new(WasmPlugin {
            plugin_id: self.plugin_id.clone(),
            api,
            store,
            on_load,
            on_unload,
            fuel: self.fuel,
            provider: None,
        }))
    }
}

/// A live WebAssembly plugin instance.
pub struct WasmPlugin {
    plugin_id: String,
    api: PluginApi,
    store: Store<HostState>,
    on_load: Option<TypedFunc<(), ()>>,
    on_unload: Option<TypedFunc<(), ()>>,
    fuel: u64,
    provider: Option<ProviderHandle>,
}

impl WasmPlugin {
    fn call_hook(
        &mut self,
        hook: &'static str,
        func: Option<TypedFunc<(), ()>>,
    ) -> Result<(), ClassWidgetsError> {
        let Some(func) = func else {
            return Ok(());
        };
        let hook_error = |message: String| ClassWidgetsError::LoadHook {
            plugin_id: self.plugin_id.clone(),
            hook,
            message,
        };

        self.store
            .set_fuel(self.fuel)
            .map_err(|e| hook_error(format!("failed to set fuel: {e}")))?;
        let result = func.call(&mut self.store, ());
        let outcome = result.map_err(|e| {
            if matches!(e.downcast_ref::<Trap>(), Some(Trap::OutOfFuel)) {
                hook_error(format!("exceeded fuel limit ({} units)", self.fuel))
            } else {
                hook_error(format!("{e:#}"))
            }
        });

        // Calls made before a trap are still delivered.
        self.flush();
        outcome
    }

    fn flush(&mut self) {
        let calls = std::mem::take(&mut self.store.data_mut().outbox);
        for call in calls {
            match call {
                HostCall::Log { level, message } => log_from_plugin(&self.plugin_id, level, &message),
                HostCall::Notify {
                    level,
                    title,
                    message,
                } => self.notify(level, &title, &message),
            }
        }
    }

    fn notify(&mut self, level: NotificationLevel, title: &str, message: &str) {
        if self.provider.is_none() {
            let context = self.api.context();
            let name = context
                .as_ref()
                .map_or_else(|| self.plugin_id.clone(), |c| c.manifest.name.clone());
            let icon = context.as_ref().and_then(|c| c.manifest.icon.clone());
            match self
                .api
                .notifications()
                .register_provider(&self.plugin_id, Some(&name), icon.as_deref(), false)
            {
                Ok(handle) => self.provider = Some(handle),
                Err(e) => {
                    warn!(plugin = %self.plugin_id, error = %e, "plugin notification dropped");
                    return;
                }
            }
        }
        if let Some(provider) = &self.provider {
            let message = (!message.is_empty()).then_some(message);
            provider.push(level, title, message, false);
        }
    }
}

impl Plugin for WasmPlugin {
    fn on_load(&mut self) -> Result<(), ClassWidgetsError> {
        let func = self.on_load.clone();
        self.call_hook("on_load", func)
    }

    fn on_unload(&mut self) -> Result<(), ClassWidgetsError> {
        let func = self.on_unload.clone();
        self.call_hook("on_unload", func)
    }
}

impl std::fmt::Debug for WasmPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WasmPlugin")
            .field("plugin_id", &self.plugin_id)
            .field("fuel", &self.fuel)
            .finish_non_exhaustive()
    }
}

fn resolve_library(search: &SearchPath, name: &str) -> Option<PathBuf> {
    LIBRARY_EXTENSIONS
        .iter()
        .find_map(|ext| search.resolve(&format!("{name}.{ext}")))
}

fn log_from_plugin(plugin_id: &str, level: i32, message: &str) {
    match level {
        0 => trace!(plugin = %plugin_id, "{message}"),
        1 => debug!(plugin = %plugin_id, "{message}"),
        3 => warn!(plugin = %plugin_id, "{message}"),
        4 => error!(plugin = %plugin_id, "{message}"),
        _ => info!(plugin = %plugin_id, "{message}"),
    }
}

/// Defines the `classwidgets` host namespace in the linker.
fn define_host_functions(linker: &mut Linker<HostState>) -> wasmtime::Result<()> {
    linker.func_wrap(
        HOST_MODULE,
        "log",
        |mut caller: Caller<'_, HostState>, level: i32, ptr: i32, len: i32| -> wasmtime::Result<()> {
            let message = read_string_from_memory(&mut caller, ptr, len)?;
            caller
                .data_mut()
                .outbox
                .push(HostCall::Log { level, message });
            Ok(())
        },
    )?;

    linker.func_wrap(
        HOST_MODULE,
        "notify",
        |mut caller: Caller<'_, HostState>,
         level: i32,
         title_ptr: i32,
         title_len: i32,
         msg_ptr: i32,
         msg_len: i32|
         -> wasmtime::Result<()> {
            let title = read_string_from_memory(&mut caller, title_ptr, title_len)?;
            let message = read_string_from_memory(&mut caller, msg_ptr, msg_len)?;
            trace!(plugin = %caller.data().plugin_id, %title, "plugin queued notification");
            caller.data_mut().outbox.push(HostCall::Notify {
                level: NotificationLevel::from_code(level),
                title,
                message,
            });
            Ok(())
        },
    )?;
    Ok(())
}

/// Reads a UTF-8 string out of the module's exported memory.
fn read_string_from_memory(
    caller: &mut Caller<'_, HostState>,
    ptr: i32,
    len: i32,
) -> wasmtime::Result<String> {
    if len == 0 {
        return Ok(String::new());
    }
    let memory = match caller.get_export("memory") {
        Some(Extern::Memory(mem)) => mem,
        _ => return Err(wasmtime::Error::msg("module does not export memory")),
    };
    let (Ok(ptr), Ok(len)) = (usize::try_from(ptr), usize::try_from(len)) else {
        return Err(wasmtime::Error::msg("negative pointer or length"));
    };

    let data = memory.data(&*caller);
    let end = ptr
        .checked_add(len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| wasmtime::Error::msg("string out of bounds"))?;
    String::from_utf8(data[ptr..end].to_vec())
        .map_err(|_| wasmtime::Error::msg("string is not valid UTF-8"))
}

fn linker_err(plugin_id: &str, e: wasmtime::Error) -> ClassWidgetsError {
    ClassWidgetsError::EntryMalformed {
        plugin_id: plugin_id.to_string(),
        message: format!("failed to define host function: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use classwidgets_test_utils::wat;
    use tracing_test::traced_test;

    use super::*;
    use crate::api::test_support::{external_context, services};

    fn load(dir: &Path, source: &str) -> Result<Rc<dyn EntryModule>, ClassWidgetsError> {
        let entry = dir.join("main.wat");
        fs::write(&entry, source).unwrap();
        let loader = WasmEntryLoader::new().unwrap();
        let search = SearchPath::new();
        let _scope = search.scoped(dir);
        loader.load_module("demo", "cw_plugin_demo", &entry, &search)
    }

    #[test]
    fn engine_meters_fuel() {
        let loader = WasmEntryLoader::with_fuel(42).unwrap();
        let mut store = Store::new(
            &loader.engine,
            HostState {
                plugin_id: "p".into(),
                outbox: Vec::new(),
            },
        );
        store.set_fuel(42).unwrap();
        assert_eq!(store.get_fuel().unwrap(), 42);
        assert_eq!(loader.fuel(), 42);
    }

    #[test]
    fn module_without_hooks_has_no_entry_class() {
        let dir = tempfile::tempdir().unwrap();
        let module = load(dir.path(), wat::NO_HOOKS).unwrap();
        assert_eq!(module.name(), "cw_plugin_demo");
        assert!(module.entry_class().is_none());
    }

    #[test]
    fn wrong_hook_signature_is_not_a_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let module = load(dir.path(), wat::WRONG_HOOK_SIGNATURE).unwrap();
        let class = module.entry_class().unwrap();
        let api = PluginApi::new(services(dir.path()));
        let err = class.construct(api).err().unwrap();
        assert!(matches!(err, ClassWidgetsError::NotAPlugin { .. }), "{err}");
    }

    #[test]
    fn class_constructs_once() {
        let dir = tempfile::tempdir().unwrap();
        let module = load(dir.path(), wat::NOOP_PLUGIN).unwrap();
        let class = module.entry_class().unwrap();
        let api = PluginApi::new(services(dir.path()));
        assert!(class.construct(api.clone()).is_ok());
        assert!(matches!(
            class.construct(api).err().unwrap(),
            ClassWidgetsError::EntryMalformed { .. }
        ));
    }

    #[test]
    fn invalid_text_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path(), "(module (func $broken").err().unwrap();
        assert!(matches!(err, ClassWidgetsError::EntryMalformed { .. }));
    }

    #[test]
    #[traced_test]
    fn host_calls_reach_log_and_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let module = load(dir.path(), wat::NOTIFY_PLUGIN).unwrap();
        let api = PluginApi::new(services(dir.path())).for_plugin();
        api.inject(external_context("demo", dir.path()));

        let mut plugin = module.entry_class().unwrap().construct(api.clone()).unwrap();
        plugin.on_load().unwrap();

        assert!(logs_contain("from wasm"));
        let providers = api.services().notifications().providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].id, "demo");
        assert_eq!(providers[0].name, "Plugin demo");
    }

    #[test]
    fn spinning_hook_runs_out_of_fuel() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("main.wat");
        fs::write(&entry, wat::SPIN_ON_LOAD).unwrap();
        let loader = WasmEntryLoader::with_fuel(10_000).unwrap();
        let search = SearchPath::new();
        let module = loader
            .load_module("spin", "cw_plugin_spin", &entry, &search)
            .unwrap();

        let api = PluginApi::new(services(dir.path()));
        let mut plugin = module.entry_class().unwrap().construct(api).unwrap();
        let err = plugin.on_load().unwrap_err();
        assert!(err.to_string().contains("fuel"), "{err}");
        assert!(plugin.on_unload().is_ok());
    }
}
