// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Widget registration.

use std::path::PathBuf;

use classwidgets_core::ClassWidgetsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::PluginApi;

/// Declarative description of a widget type offered by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    /// Unique widget type, e.g. `classwidgets.time`.
    pub type_id: String,
    pub name: String,
    /// Widget view, relative to the plugin root unless absolute.
    pub qml_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_qml: Option<PathBuf>,
    #[serde(default)]
    pub default_settings: Value,
    /// Plugin that registered the widget. Filled in on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
}

impl WidgetDescriptor {
    pub fn new(type_id: impl Into<String>, name: impl Into<String>, qml_path: impl Into<PathBuf>) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            qml_path: qml_path.into(),
            settings_qml: None,
            default_settings: Value::Null,
            plugin_id: None,
        }
    }

    pub fn with_settings(mut self, settings_qml: impl Into<PathBuf>, defaults: Value) -> Self {
        self.settings_qml = Some(settings_qml.into());
        self.default_settings = defaults;
        self
    }
}

/// Registers widget types on behalf of the calling plugin.
pub struct WidgetsApi<'a> {
    api: &'a PluginApi,
}

impl<'a> WidgetsApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Registers `descriptor`, resolving its paths against the plugin root.
    ///
    /// A widget with the same type id is replaced.
    pub fn register(&self, mut descriptor: WidgetDescriptor) -> Result<(), ClassWidgetsError> {
        let context = self.api.require_context()?;
        descriptor.qml_path = context.resolve(&descriptor.qml_path);
        descriptor.settings_qml = descriptor.settings_qml.map(|p| context.resolve(p));
        descriptor.plugin_id = Some(context.id().to_string());

        let type_id = descriptor.type_id.clone();
        let previous = self
            .api
            .services()
            .widgets
            .borrow_mut()
            .insert(type_id.clone(), descriptor);
        match previous {
            Some(old) => warn!(
                widget = %type_id,
                plugin = %context.id(),
                previous_plugin = ?old.plugin_id,
                "widget type registered twice, replacing"
            ),
            None => debug!(widget = %type_id, plugin = %context.id(), "registered widget"),
        }
        Ok(())
    }

    /// Widgets registered by the calling plugin.
    pub fn registered(&self) -> Vec<WidgetDescriptor> {
        let id = self.api.context().map(|c| c.manifest.id);
        self.api
            .services()
            .widgets()
            .into_iter()
            .filter(|w| w.plugin_id == id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::api::test_support::{external_context, services};

    #[test]
    fn register_resolves_paths_and_tags_owner() {
        let dir = tempfile::tempdir().unwrap();
        let api = PluginApi::new(services(dir.path())).for_plugin();
        api.inject(external_context("clock", Path::new("/plugins/clock")));

        api.widgets()
            .register(
                WidgetDescriptor::new("clock.big", "Big clock", "qml/Big.qml")
                    .with_settings("qml/Settings.qml", serde_json::json!({"seconds": true})),
            )
            .unwrap();

        let widget = api.services().widget("clock.big").unwrap();
        assert_eq!(widget.qml_path, Path::new("/plugins/clock/qml/Big.qml"));
        assert_eq!(
            widget.settings_qml.as_deref(),
            Some(Path::new("/plugins/clock/qml/Settings.qml"))
        );
        assert_eq!(widget.plugin_id.as_deref(), Some("clock"));
        assert_eq!(api.widgets().registered().len(), 1);
    }

    #[test]
    fn register_requires_context() {
        let dir = tempfile::tempdir().unwrap();
        let api = PluginApi::new(services(dir.path()));
        let err = api
            .widgets()
            .register(WidgetDescriptor::new("w", "W", "w.qml"))
            .unwrap_err();
        assert!(matches!(err, ClassWidgetsError::NoPluginContext));
        assert!(api.services().widgets().is_empty());
    }
}
