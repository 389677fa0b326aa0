// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings pages contributed by plugins.

use std::path::{Path, PathBuf};

use classwidgets_core::ClassWidgetsError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PluginApi;

/// Icon used for settings pages that do not name one.
pub const DEFAULT_PAGE_ICON: &str = "ic_fluent_cube_20_regular";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPage {
    /// Owning plugin.
    pub plugin_id: String,
    /// Page view, resolved against the plugin root.
    pub page: PathBuf,
    pub title: String,
    pub icon: String,
}

pub struct UiApi<'a> {
    api: &'a PluginApi,
}

impl<'a> UiApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Adds a settings page for the calling plugin.
    ///
    /// `title` defaults to the plugin name and `icon` to
    /// [`DEFAULT_PAGE_ICON`].
    pub fn register_settings_page(
        &self,
        page: impl AsRef<Path>,
        title: Option<&str>,
        icon: Option<&str>,
    ) -> Result<(), ClassWidgetsError> {
        let context = self.api.require_context()?;
        let entry = SettingsPage {
            plugin_id: context.id().to_string(),
            page: context.resolve(page),
            title: title.map_or_else(|| context.manifest.name.clone(), str::to_string),
            icon: icon.unwrap_or(DEFAULT_PAGE_ICON).to_string(),
        };
        debug!(plugin = %entry.plugin_id, page = %entry.page.display(), "registered settings page");

        let services = self.api.services();
        services.settings_pages.borrow_mut().push(entry);
        services.pages_changed().emit(&());
        Ok(())
    }

    /// Removes every page registered at `page`. Returns how many were removed.
    pub fn unregister_settings_page(&self, page: impl AsRef<Path>) -> usize {
        let page = match self.api.context() {
            Some(context) => context.resolve(page),
            None => page.as_ref().to_path_buf(),
        };
        let services = self.api.services();
        let removed = {
            let mut pages = services.settings_pages.borrow_mut();
            let before = pages.len();
            pages.retain(|p| p.page != page);
            before - pages.len()
        };
        if removed > 0 {
            debug!(page = %page.display(), "unregistered settings page");
        }
        services.pages_changed().emit(&());
        removed
    }

    pub fn pages(&self) -> Vec<SettingsPage> {
        self.api.services().settings_pages()
    }
}
