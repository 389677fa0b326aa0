// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Class Widgets crate.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across the config store, plugin system, and
/// notification registry.
#[derive(Debug, Error)]
pub enum ClassWidgetsError {
    /// Configuration errors (unknown path, rejected value, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing persisted state failed.
    #[error("persistence error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A plugin manifest is unreadable or misses a required field.
    #[error("invalid plugin manifest in {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    /// The plugin's declared API requirement excludes the running host API.
    #[error("plugin {plugin_id} (api_version {requirement}) is not compatible with host api {host}")]
    IncompatibleApi {
        plugin_id: String,
        requirement: String,
        host: String,
    },

    /// The manifest's entry file does not exist.
    #[error("entry file not found for plugin {plugin_id}: {path}")]
    EntryMissing { plugin_id: String, path: PathBuf },

    /// The entry file could not be executed or does not expose an entry class.
    #[error("malformed entry for plugin {plugin_id}: {message}")]
    EntryMalformed { plugin_id: String, message: String },

    /// The constructed entry class does not implement the plugin capability.
    #[error("entry class of plugin {plugin_id} does not implement the plugin interface: {message}")]
    NotAPlugin { plugin_id: String, message: String },

    /// A lifecycle hook (`on_load`/`on_unload`) failed.
    #[error("plugin {plugin_id} {hook} hook failed: {message}")]
    LoadHook {
        plugin_id: String,
        hook: &'static str,
        message: String,
    },

    /// Importing a plugin archive failed.
    #[error("plugin import failed: {0}")]
    Import(String),

    /// No plugin with this identifier is known to the catalog.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// The operation is not permitted on builtin plugins.
    #[error("plugin {0} is builtin and cannot be modified on disk")]
    BuiltinProtected(String),

    /// A bridge call was made before the loader injected the plugin context.
    #[error("no plugin context available; call this from within a loaded plugin")]
    NoPluginContext,

    /// An external collaborator (tray, audio, schedule runtime) failed.
    #[error("{collaborator} error: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClassWidgetsError {
    /// Wraps an I/O or serialization failure at `path`.
    pub fn persistence(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Returns the plugin identifier this error belongs to, if any.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            Self::IncompatibleApi { plugin_id, .. }
            | Self::EntryMissing { plugin_id, .. }
            | Self::EntryMalformed { plugin_id, .. }
            | Self::NotAPlugin { plugin_id, .. }
            | Self::LoadHook { plugin_id, .. } => Some(plugin_id),
            Self::PluginNotFound(id) | Self::BuiltinProtected(id) => Some(id),
            _ => None,
        }
    }
}
