// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host assembly: wires the config store, the notification registry, and
//! the plugin manager into one object owned by the UI thread.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use classwidgets_config::{ConfigStore, SharedConfig, default_config_dir};
use classwidgets_core::{ClassWidgetsError, Shared, SystemNotifier, shared};
use classwidgets_notification::NotificationRegistry;
use classwidgets_plugin::{HostServices, PluginApi, PluginManager};
use tracing::info;

/// Name of the external plugin directory inside the config directory.
pub const PLUGINS_DIR: &str = "plugins";

/// Resolved on-disk locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    pub config_dir: PathBuf,
    pub plugins_dir: PathBuf,
}

impl HostPaths {
    /// Fills in defaults for whatever was not given on the command line.
    pub fn resolve(config_dir: Option<PathBuf>, plugins_dir: Option<PathBuf>) -> Self {
        let config_dir = config_dir.unwrap_or_else(default_config_dir);
        let plugins_dir = plugins_dir.unwrap_or_else(|| config_dir.join(PLUGINS_DIR));
        Self {
            config_dir,
            plugins_dir,
        }
    }
}

/// Loads the store for `config_dir`. Failures fall back to defaults.
pub fn open_config(config_dir: &Path) -> SharedConfig {
    let mut store = ConfigStore::in_dir(config_dir);
    store.load();
    store.into_shared()
}

pub struct Host {
    config: SharedConfig,
    notifications: Rc<NotificationRegistry>,
    manager: Shared<PluginManager>,
}

impl Host {
    /// Builds the host around an already loaded config store and scans the
    /// plugin directory.
    pub fn assemble(config: SharedConfig, paths: &HostPaths) -> Result<Self, ClassWidgetsError> {
        let notifications = Rc::new(
            NotificationRegistry::new(config.clone()).with_system_notifier(Rc::new(LogNotifier)),
        );
        let services = Rc::new(HostServices::new(config.clone(), Rc::clone(&notifications)));
        let manager = PluginManager::with_defaults(PluginApi::new(services), paths.plugins_dir.clone())?;
        info!(
            config = %paths.config_dir.display(),
            plugins = %paths.plugins_dir.display(),
            "host assembled"
        );
        Ok(Self {
            config,
            notifications,
            manager: shared(manager),
        })
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn notifications(&self) -> &Rc<NotificationRegistry> {
        &self.notifications
    }

    pub fn manager(&self) -> &Shared<PluginManager> {
        &self.manager
    }

    /// Unloads every plugin.
    pub fn shutdown(&self) {
        self.manager.borrow_mut().cleanup();
    }
}

/// Routes system notifications to the log when running headless.
struct LogNotifier;

impl SystemNotifier for LogNotifier {
    fn push_notification(&self, title: &str, text: &str, icon: Option<&str>) -> Result<(), ClassWidgetsError> {
        info!(title, text, icon = ?icon, "system notification");
        Ok(())
    }
}
