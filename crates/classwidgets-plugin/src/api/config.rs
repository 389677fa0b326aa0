// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin-owned configuration models persisted under `plugins.configs`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use classwidgets_config::SharedConfig;
use classwidgets_core::ClassWidgetsError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::PluginApi;

/// Live handle to a plugin's typed settings model.
///
/// Clones share the model. Every [`update`](PluginConfig::update) writes the
/// model back into the config tree and fires the tree's change sink.
pub struct PluginConfig<T> {
    plugin_id: String,
    model: Rc<RefCell<T>>,
    config: SharedConfig,
}

impl<T> Clone for PluginConfig<T> {
    fn clone(&self) -> Self {
        Self {
            plugin_id: self.plugin_id.clone(),
            model: Rc::clone(&self.model),
            config: self.config.clone(),
        }
    }
}

impl<T: Serialize> PluginConfig<T> {
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Runs `f` against the current model.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.model.borrow())
    }

    /// Mutates the model and syncs it into the config tree.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> Result<(), ClassWidgetsError> {
        f(&mut self.model.borrow_mut());
        self.sync()
    }

    fn sync(&self) -> Result<(), ClassWidgetsError> {
        let value = serde_json::to_value(&*self.model.borrow()).map_err(|e| {
            ClassWidgetsError::Internal(format!("serializing config of {}: {e}", self.plugin_id))
        })?;
        self.config
            .borrow_mut()
            .put_plugin_config(&self.plugin_id, value);
        Ok(())
    }
}

impl<T: Serialize + Clone> PluginConfig<T> {
    pub fn get(&self) -> T {
        self.model.borrow().clone()
    }
}

impl<T> std::fmt::Debug for PluginConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("plugin_id", &self.plugin_id)
            .finish_non_exhaustive()
    }
}

pub struct ConfigApi<'a> {
    api: &'a PluginApi,
}

impl<'a> ConfigApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Registers the calling plugin's settings model.
    ///
    /// A stored document that parses as `T` is restored; otherwise `default`
    /// is used. The effective model is written back immediately.
    pub fn register_model<T>(&self, default: T) -> Result<PluginConfig<T>, ClassWidgetsError>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let context = self.api.require_context()?;
        let plugin_id = context.id().to_string();
        let config = self.api.services().config().clone();

        let stored = config.borrow().plugin_config(&plugin_id).cloned();
        let model = match stored {
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(restored) => restored,
                Err(e) => {
                    warn!(plugin = %plugin_id, error = %e, "stored plugin config does not match its model, using defaults");
                    default
                }
            },
            None => default,
        };

        let handle = PluginConfig {
            plugin_id: plugin_id.clone(),
            model: Rc::new(RefCell::new(model)),
            config,
        };
        handle.sync()?;

        let erased: Rc<dyn Any> = handle.model.clone();
        self.api
            .services()
            .plugin_models
            .borrow_mut()
            .insert(plugin_id.clone(), erased);
        debug!(plugin = %plugin_id, "registered plugin config model");
        Ok(handle)
    }

    /// The model the calling plugin registered, if its type is `T`.
    pub fn model<T: 'static>(&self) -> Option<PluginConfig<T>> {
        let context = self.api.context()?;
        let erased = self
            .api
            .services()
            .plugin_models
            .borrow()
            .get(context.id())
            .cloned()?;
        let model = erased.downcast::<RefCell<T>>().ok()?;
        Some(PluginConfig {
            plugin_id: context.id().to_string(),
            model,
            config: self.api.services().config().clone(),
        })
    }

    /// Serialized copy of the whole configuration tree.
    pub fn snapshot(&self) -> Result<Value, ClassWidgetsError> {
        serde_json::to_value(self.api.services().config().borrow().config())
            .map_err(|e| ClassWidgetsError::Internal(format!("serializing config: {e}")))
    }

    /// Saves the configuration tree now. Returns false if writing failed.
    pub fn save(&self) -> bool {
        self.api.services().config().borrow().save(false)
    }
}
