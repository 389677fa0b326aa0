// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification provider identity and delivery collaborators.

use crate::error::ClassWidgetsError;
use crate::types::NotificationLevel;

/// Identity of a notification source registered with the notification registry.
pub trait NotificationProvider {
    /// Unique provider identifier; used as the policy key.
    fn id(&self) -> &str;

    /// Human-readable name shown in the settings UI.
    fn name(&self) -> &str;

    /// Optional icon (URI or icon-library name).
    fn icon(&self) -> Option<&str> {
        None
    }

    /// Whether this provider is able to emit system-level notifications.
    fn use_system_notify(&self) -> bool {
        false
    }
}

/// Native notification surface (system tray balloon, desktop notifications).
pub trait SystemNotifier {
    /// Pushes a system notification.
    fn push_notification(
        &self,
        title: &str,
        text: &str,
        icon: Option<&str>,
    ) -> Result<(), ClassWidgetsError>;
}

/// Audio collaborator playing notification sounds.
pub trait SoundPlayer {
    /// Plays the sound configured for `provider_id` at `level`.
    fn play_notification_sound(
        &self,
        provider_id: &str,
        level: NotificationLevel,
    ) -> Result<(), ClassWidgetsError>;
}
