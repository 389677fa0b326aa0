// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use classwidgets_core::ConfigEvent;

use super::PluginApi;

/// Dotted config path holding the active theme.
pub const THEME_PATH: &str = "preferences.current_theme";

pub struct ThemeApi<'a> {
    api: &'a PluginApi,
}

impl<'a> ThemeApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    pub fn current(&self) -> String {
        self.api
            .services()
            .config()
            .borrow()
            .config()
            .preferences
            .current_theme
            .clone()
    }

    /// Calls `observer` with the new theme whenever it is set by path.
    pub fn on_changed(&self, observer: impl Fn(&str) + 'static) {
        self.api
            .services()
            .config()
            .borrow()
            .subscribe(move |event: &ConfigEvent| {
                if let ConfigEvent::PathSet { path, value } = event
                    && path == THEME_PATH
                    && let Some(theme) = value.as_str()
                {
                    observer(theme);
                }
            });
    }
}
