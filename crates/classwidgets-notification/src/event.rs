// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification data carried through the registry.

use classwidgets_core::NotificationLevel;
use serde::{Deserialize, Serialize};

/// A notification raised by a provider. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub provider_id: String,
    pub level: NotificationLevel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Suppresses the notification sound.
    #[serde(default)]
    pub silent: bool,
}

impl NotificationEvent {
    pub fn new(provider_id: impl Into<String>, level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            level,
            title: title.into(),
            message: None,
            silent: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// `"title: message"`, or just the title when there is no message.
    pub fn display_text(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => format!("{}: {message}", self.title),
            _ => self.title.clone(),
        }
    }
}

/// What in-app observers receive: the event plus the resolved system flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(flatten)]
    pub event: NotificationEvent,
    /// Whether the policy also routed this event to the system tray.
    pub use_system: bool,
}

/// One registered provider with its effective policy, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub enabled: bool,
    pub use_system_notify: bool,
    pub use_app_notify: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_joins_title_and_message() {
        let event = NotificationEvent::new("p", NotificationLevel::Info, "Class begins");
        assert_eq!(event.display_text(), "Class begins");
        assert_eq!(event.clone().with_message("").display_text(), "Class begins");
        assert_eq!(event.with_message("Math").display_text(), "Class begins: Math");
    }

    #[test]
    fn payload_flattens_event() {
        let payload = NotificationPayload {
            event: NotificationEvent::new("p", NotificationLevel::Warning, "t"),
            use_system: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["provider_id"], "p");
        assert_eq!(json["level"], "warning");
        assert_eq!(json["use_system"], true);
    }
}
