// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin system for Class Widgets.
//!
//! Plugins are discovered from builtins and from directories holding a
//! `cwplugin.json` manifest. External plugins ship a WebAssembly entry
//! module executed through wasmtime; each instance talks to the host only
//! through its [`PluginApi`] handle.
//!
//! # Components
//!
//! - [`PluginCatalog`] - discovery and manifest validation
//! - [`PluginLoader`] - module isolation, lifecycle hooks, search path scoping
//! - [`PluginManager`] - enabled set, enable/disable/uninstall, events
//! - [`import_archive`] - installing zip archives
//! - [`api`] - the runtime bridge

pub mod api;
pub mod builtin;
pub mod catalog;
pub mod entry;
pub mod import;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod modules;
pub mod search_path;
pub mod version;
pub mod wasm;

pub use api::{HostServices, PluginApi, PluginContext, WidgetDescriptor};
pub use builtin::{BuiltinFactory, BuiltinPlugin, builtin_plugins};
pub use catalog::{CatalogEntry, PluginCatalog, PluginSource};
pub use entry::{EntryClass, EntryLoader, EntryModule};
pub use import::{extract_archive, import_archive};
pub use loader::PluginLoader;
pub use manager::{LoadReport, PluginManager};
pub use manifest::{MANIFEST_FILE, PluginManifest, load_manifest, parse_manifest};
pub use modules::{ModuleRegistry, module_name};
pub use search_path::SearchPath;
pub use version::{HOST_API_VERSION, check_api_version};
pub use wasm::WasmEntryLoader;
