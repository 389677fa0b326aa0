// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Port through which the loader turns an entry file into plugin instances.
//!
//! The loader never touches a concrete module format. It asks an
//! [`EntryLoader`] to execute the entry file as an isolated module, asks the
//! module for its entry class, and constructs the class with the bridge.

use std::path::Path;
use std::rc::Rc;

use classwidgets_core::{ClassWidgetsError, Plugin};

use crate::api::PluginApi;
use crate::search_path::SearchPath;

/// Loads and executes entry files.
pub trait EntryLoader {
    /// Executes `entry` as the module `module_name`.
    ///
    /// Sibling modules are resolved through `search`. Execution failures are
    /// reported as [`ClassWidgetsError::EntryMalformed`].
    fn load_module(
        &self,
        plugin_id: &str,
        module_name: &str,
        entry: &Path,
        search: &SearchPath,
    ) -> Result<Rc<dyn EntryModule>, ClassWidgetsError>;
}

/// An executed entry module living in its own namespace.
pub trait EntryModule {
    fn name(&self) -> &str;

    /// The class the module exposes, if any.
    fn entry_class(&self) -> Option<Rc<dyn EntryClass>>;
}

/// Constructor of plugin instances.
pub trait EntryClass {
    /// Builds an instance bound to `api`.
    ///
    /// Returns [`ClassWidgetsError::NotAPlugin`] when the class does not
    /// satisfy the plugin interface.
    fn construct(&self, api: PluginApi) -> Result<Box<dyn Plugin>, ClassWidgetsError>;
}
