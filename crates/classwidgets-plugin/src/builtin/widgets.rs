// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The default widget set.

use classwidgets_config::model::DEFAULT_ENABLED_PLUGIN;
use classwidgets_core::{ClassWidgetsError, Plugin};
use serde_json::json;
use tracing::info;

use super::BuiltinPlugin;
use crate::api::{PluginApi, WidgetDescriptor};
use crate::manifest::PluginManifest;
use crate::version::HOST_API_VERSION;

pub fn plugin() -> BuiltinPlugin {
    BuiltinPlugin {
        manifest: PluginManifest::builtin(
            DEFAULT_ENABLED_PLUGIN,
            "Class Widgets Widgets",
            env!("CARGO_PKG_VERSION"),
            format!(">={HOST_API_VERSION}"),
            "Class Widgets Contributors",
        )
        .with_description("Clock, current activity, upcoming activities and countdown widgets"),
        factory: |api| -> Box<dyn Plugin> { Box::new(BuiltinWidgets { api }) },
    }
}

/// Widgets every installation starts with.
pub fn default_widgets() -> Vec<WidgetDescriptor> {
    vec![
        WidgetDescriptor::new("classwidgets.time", "Time", "widgets/Time.qml")
            .with_settings("widgets/settings/Time.qml", json!({"show_seconds": false})),
        WidgetDescriptor::new(
            "classwidgets.currentActivity",
            "Current Activity",
            "widgets/CurrentActivity.qml",
        ),
        WidgetDescriptor::new(
            "classwidgets.nextActivities",
            "Next Activities",
            "widgets/NextActivities.qml",
        )
        .with_settings("widgets/settings/NextActivities.qml", json!({"count": 3})),
        WidgetDescriptor::new("classwidgets.event", "Countdown", "widgets/Event.qml")
            .with_settings(
                "widgets/settings/Event.qml",
                json!({"title": "", "date": null}),
            ),
    ]
}

struct BuiltinWidgets {
    api: PluginApi,
}

impl Plugin for BuiltinWidgets {
    fn on_load(&mut self) -> Result<(), ClassWidgetsError> {
        let widgets = default_widgets();
        let count = widgets.len();
        for widget in widgets {
            self.api.widgets().register(widget)?;
        }
        info!(count, "registered builtin widgets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::api::PluginContext;
    use crate::api::test_support::services;

    #[test]
    fn widget_type_ids_are_unique() {
        let ids: BTreeSet<_> = default_widgets().into_iter().map(|w| w.type_id).collect();
        assert_eq!(ids.len(), default_widgets().len());
        assert!(ids.contains("classwidgets.time"));
        assert!(ids.contains("classwidgets.currentActivity"));
    }

    #[test]
    fn on_load_registers_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let builtin = plugin();
        let api = PluginApi::new(services(dir.path())).for_plugin();
        api.inject(PluginContext {
            root: None,
            manifest: builtin.manifest.clone(),
        });

        let mut instance = (builtin.factory)(api.clone());
        instance.on_load().unwrap();

        let widgets = api.services().widgets();
        assert_eq!(widgets.len(), default_widgets().len());
        assert!(
            widgets
                .iter()
                .all(|w| w.plugin_id.as_deref() == Some(DEFAULT_ENABLED_PLUGIN))
        );
        assert!(instance.on_unload().is_ok());
    }
}
