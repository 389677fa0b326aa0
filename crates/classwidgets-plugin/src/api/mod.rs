// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime bridge handed to every plugin instance.
//!
//! A [`PluginApi`] is the only way plugin code reaches the host. It is split
//! into capability-scoped sub-APIs (widgets, notifications, schedule,
//! runtime, theme, config, automation, ui), all backed by one shared
//! [`HostServices`]. Each plugin receives its own handle whose
//! [`PluginContext`] is injected by the loader right after construction.

pub mod automation;
pub mod config;
pub mod notify;
pub mod schedule;
pub mod theme;
pub mod ui;
pub mod widgets;

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use classwidgets_config::SharedConfig;
use classwidgets_core::{
    AutomationTask, ClassWidgetsError, ScheduleRuntime, ScheduleSource, Signal,
};
use classwidgets_notification::NotificationRegistry;
use tracing::debug;

use crate::manifest::PluginManifest;

pub use automation::AutomationApi;
pub use config::{ConfigApi, PluginConfig};
pub use notify::{NotificationApi, ProviderHandle};
pub use schedule::{RuntimeApi, ScheduleApi};
pub use theme::ThemeApi;
pub use ui::{SettingsPage, UiApi};
pub use widgets::{WidgetDescriptor, WidgetsApi};

/// Identity injected into a plugin instance after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginContext {
    /// Filesystem root of the plugin; `None` for builtins.
    pub root: Option<PathBuf>,
    pub manifest: PluginManifest,
}

impl PluginContext {
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// Resolves a relative path against the plugin root.
    ///
    /// Absolute paths, and any path for a plugin without a root, are
    /// returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Host state reachable through the bridge.
///
/// Registries are owned here; plugins only ever see them through the
/// sub-APIs of [`PluginApi`].
pub struct HostServices {
    config: SharedConfig,
    notifications: Rc<NotificationRegistry>,
    schedule: Option<Rc<dyn ScheduleSource>>,
    runtime: Option<Rc<dyn ScheduleRuntime>>,
    widgets: RefCell<BTreeMap<String, WidgetDescriptor>>,
    settings_pages: RefCell<Vec<SettingsPage>>,
    pages_changed: Signal<()>,
    automation: RefCell<Vec<OwnedTask>>,
    plugin_models: RefCell<BTreeMap<String, Rc<dyn Any>>>,
    plugin_providers: RefCell<BTreeMap<String, Vec<String>>>,
}

/// An automation task and the plugin that registered it.
pub(crate) struct OwnedTask {
    pub(crate) owner: Option<String>,
    pub(crate) task: Box<dyn AutomationTask>,
}

impl HostServices {
    pub fn new(config: SharedConfig, notifications: Rc<NotificationRegistry>) -> Self {
        Self {
            config,
            notifications,
            schedule: None,
            runtime: None,
            widgets: RefCell::new(BTreeMap::new()),
            settings_pages: RefCell::new(Vec::new()),
            pages_changed: Signal::new(),
            automation: RefCell::new(Vec::new()),
            plugin_models: RefCell::new(BTreeMap::new()),
            plugin_providers: RefCell::new(BTreeMap::new()),
        }
    }

    /// Attach the owner of the loaded schedule document.
    pub fn with_schedule(mut self, schedule: Rc<dyn ScheduleSource>) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Attach the live schedule runtime.
    pub fn with_runtime(mut self, runtime: Rc<dyn ScheduleRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn notifications(&self) -> &Rc<NotificationRegistry> {
        &self.notifications
    }

    /// Every registered widget, ordered by type id.
    pub fn widgets(&self) -> Vec<WidgetDescriptor> {
        self.widgets.borrow().values().cloned().collect()
    }

    pub fn widget(&self, type_id: &str) -> Option<WidgetDescriptor> {
        self.widgets.borrow().get(type_id).cloned()
    }

    /// Registered settings pages, in registration order.
    pub fn settings_pages(&self) -> Vec<SettingsPage> {
        self.settings_pages.borrow().clone()
    }

    /// Fires whenever the set of settings pages changes.
    pub fn pages_changed(&self) -> &Signal<()> {
        &self.pages_changed
    }

    /// Identifiers of registered automation tasks.
    pub fn automation_tasks(&self) -> Vec<String> {
        self.automation
            .borrow()
            .iter()
            .map(|owned| owned.task.id().to_string())
            .collect()
    }

    pub(crate) fn record_provider(&self, plugin_id: &str, provider_id: &str) {
        let mut owned = self.plugin_providers.borrow_mut();
        let ids = owned.entry(plugin_id.to_string()).or_default();
        if !ids.iter().any(|id| id == provider_id) {
            ids.push(provider_id.to_string());
        }
    }

    /// Drops everything `plugin_id` registered through the bridge: widgets,
    /// settings pages, automation tasks, notification providers and its
    /// in-memory config model. Persisted settings and provider policies stay
    /// in the config tree.
    pub fn release_plugin(&self, plugin_id: &str) {
        let widgets = {
            let mut widgets = self.widgets.borrow_mut();
            let before = widgets.len();
            widgets.retain(|_, w| w.plugin_id.as_deref() != Some(plugin_id));
            before - widgets.len()
        };
        let pages = {
            let mut pages = self.settings_pages.borrow_mut();
            let before = pages.len();
            pages.retain(|p| p.plugin_id != plugin_id);
            before - pages.len()
        };
        let tasks = {
            let mut tasks = self.automation.borrow_mut();
            let before = tasks.len();
            tasks.retain(|t| t.owner.as_deref() != Some(plugin_id));
            before - tasks.len()
        };
        let providers = self
            .plugin_providers
            .borrow_mut()
            .remove(plugin_id)
            .unwrap_or_default();
        for provider in &providers {
            self.notifications.unregister_provider(provider);
        }
        self.plugin_models.borrow_mut().remove(plugin_id);

        if pages > 0 {
            self.pages_changed.emit(&());
        }
        if widgets + pages + tasks + providers.len() > 0 {
            debug!(
                plugin = %plugin_id,
                widgets,
                pages,
                tasks,
                providers = providers.len(),
                "released plugin registrations"
            );
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("widgets", &self.widgets.borrow().len())
            .field("settings_pages", &self.settings_pages.borrow().len())
            .field("automation", &self.automation.borrow().len())
            .field("schedule", &self.schedule.is_some())
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

/// Capability object passed to plugin constructors.
///
/// Cloning shares both the host services and the plugin context.
#[derive(Clone)]
pub struct PluginApi {
    services: Rc<HostServices>,
    context: Rc<RefCell<Option<PluginContext>>>,
}

impl PluginApi {
    /// Host-level handle with no plugin context.
    pub fn new(services: Rc<HostServices>) -> Self {
        Self {
            services,
            context: Rc::new(RefCell::new(None)),
        }
    }

    /// A fresh handle for one plugin instance, sharing the host services.
    pub fn for_plugin(&self) -> Self {
        Self::new(Rc::clone(&self.services))
    }

    pub fn services(&self) -> &Rc<HostServices> {
        &self.services
    }

    /// Binds this handle (and every clone of it) to a plugin.
    pub fn inject(&self, context: PluginContext) {
        *self.context.borrow_mut() = Some(context);
    }

    pub fn context(&self) -> Option<PluginContext> {
        self.context.borrow().clone()
    }

    /// The injected context, or [`ClassWidgetsError::NoPluginContext`].
    pub fn require_context(&self) -> Result<PluginContext, ClassWidgetsError> {
        self.context()
            .ok_or(ClassWidgetsError::NoPluginContext)
    }

    pub fn widgets(&self) -> WidgetsApi<'_> {
        WidgetsApi::new(self)
    }

    pub fn notifications(&self) -> NotificationApi<'_> {
        NotificationApi::new(self)
    }

    pub fn schedule(&self) -> ScheduleApi<'_> {
        ScheduleApi::new(self)
    }

    pub fn runtime(&self) -> RuntimeApi<'_> {
        RuntimeApi::new(self)
    }

    pub fn theme(&self) -> ThemeApi<'_> {
        ThemeApi::new(self)
    }

    pub fn config(&self) -> ConfigApi<'_> {
        ConfigApi::new(self)
    }

    pub fn automation(&self) -> AutomationApi<'_> {
        AutomationApi::new(self)
    }

    pub fn ui(&self) -> UiApi<'_> {
        UiApi::new(self)
    }
}

impl std::fmt::Debug for PluginApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plugin = self.context.borrow().as_ref().map(|c| c.manifest.id.clone());
        f.debug_struct("PluginApi")
            .field("plugin", &plugin)
            .finish_non_exhaustive()
    }
}
