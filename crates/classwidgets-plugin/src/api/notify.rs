// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification providers created by plugins.

use std::rc::Rc;

use classwidgets_core::{ClassWidgetsError, NotificationLevel, NotificationProvider};
use classwidgets_notification::{Delivery, NotificationEvent, NotificationPayload, NotificationRegistry};
use tracing::debug;

use super::PluginApi;

/// Provider identity owned by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PluginProvider {
    id: String,
    name: String,
    icon: Option<String>,
    use_system_notify: bool,
}

impl NotificationProvider for PluginProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn use_system_notify(&self) -> bool {
        self.use_system_notify
    }
}

/// A registered provider that plugins push notifications through.
#[derive(Clone)]
pub struct ProviderHandle {
    provider: Rc<PluginProvider>,
    registry: Rc<NotificationRegistry>,
}

impl ProviderHandle {
    pub fn id(&self) -> &str {
        &self.provider.id
    }

    pub fn name(&self) -> &str {
        &self.provider.name
    }

    pub fn icon(&self) -> Option<&str> {
        self.provider.icon.as_deref()
    }

    /// Dispatches a notification from this provider under its policy.
    pub fn push(
        &self,
        level: NotificationLevel,
        title: &str,
        message: Option<&str>,
        silent: bool,
    ) -> Delivery {
        let mut event = NotificationEvent::new(&self.provider.id, level, title).silent(silent);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        self.registry.dispatch(&event)
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.provider.id)
            .finish_non_exhaustive()
    }
}

pub struct NotificationApi<'a> {
    api: &'a PluginApi,
}

impl<'a> NotificationApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Registers a provider for the calling plugin.
    ///
    /// `name` defaults to `Plugin Provider (<id>)`; a relative `icon` is
    /// resolved against the plugin root.
    pub fn register_provider(
        &self,
        provider_id: &str,
        name: Option<&str>,
        icon: Option<&str>,
        use_system_notify: bool,
    ) -> Result<ProviderHandle, ClassWidgetsError> {
        let context = self.api.require_context()?;
        let provider = Rc::new(PluginProvider {
            id: provider_id.to_string(),
            name: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("Plugin Provider ({provider_id})")),
            icon: icon.map(|icon| context.resolve(icon).to_string_lossy().into_owned()),
            use_system_notify,
        });

        let registry = Rc::clone(self.api.services().notifications());
        if !registry.register_provider(provider.clone()) {
            return Err(ClassWidgetsError::Config(format!(
                "notification provider `{provider_id}` needs an id and a name"
            )));
        }
        self.api.services().record_provider(context.id(), provider_id);
        debug!(plugin = %context.id(), provider = %provider_id, icon = ?provider.icon, "created notification provider");
        Ok(ProviderHandle { provider, registry })
    }

    /// Calls `observer` with `"title: message"` for every in-app notification.
    pub fn on_pushed(&self, observer: impl Fn(&str) + 'static) {
        self.api
            .services()
            .notifications()
            .notified()
            .connect(move |payload: &NotificationPayload| observer(&payload.event.display_text()));
    }
}
