// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording stand-ins for the tray and audio collaborators.
//!
//! Both mocks capture every call for assertion and can be switched into a
//! failing mode to exercise the containment paths of the dispatcher.

use std::cell::{Cell, RefCell};

use classwidgets_core::{ClassWidgetsError, NotificationLevel, SoundPlayer, SystemNotifier};

/// One captured system notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushedNotification {
    pub title: String,
    pub text: String,
    pub icon: Option<String>,
}

/// A [`SystemNotifier`] that records pushes.
#[derive(Debug, Default)]
pub struct MockNotifier {
    pushed: RefCell<Vec<PushedNotification>>,
    fail: Cell<bool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every push fails.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.set(true);
        notifier
    }

    /// Everything pushed so far.
    pub fn pushed(&self) -> Vec<PushedNotification> {
        self.pushed.borrow().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushed.borrow().len()
    }
}

impl SystemNotifier for MockNotifier {
    fn push_notification(
        &self,
        title: &str,
        text: &str,
        icon: Option<&str>,
    ) -> Result<(), ClassWidgetsError> {
        if self.fail.get() {
            return Err(ClassWidgetsError::Collaborator {
                collaborator: "tray",
                message: "tray icon unavailable".to_string(),
            });
        }
        self.pushed.borrow_mut().push(PushedNotification {
            title: title.to_string(),
            text: text.to_string(),
            icon: icon.map(str::to_string),
        });
        Ok(())
    }
}

/// A [`SoundPlayer`] that records requests.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    played: RefCell<Vec<(String, NotificationLevel)>>,
    fail: Cell<bool>,
}

impl MockSoundPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A player whose every request fails.
    pub fn failing() -> Self {
        let player = Self::default();
        player.fail.set(true);
        player
    }

    /// Provider id and level of every request, in order.
    pub fn played(&self) -> Vec<(String, NotificationLevel)> {
        self.played.borrow().clone()
    }

    pub fn play_count(&self) -> usize {
        self.played.borrow().len()
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play_notification_sound(
        &self,
        provider_id: &str,
        level: NotificationLevel,
    ) -> Result<(), ClassWidgetsError> {
        // Recorded before failing so tests can see the attempt.
        self.played
            .borrow_mut()
            .push((provider_id.to_string(), level));
        if self.fail.get() {
            return Err(ClassWidgetsError::Collaborator {
                collaborator: "audio",
                message: "no output device".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_records_and_fails_on_demand() {
        let ok = MockNotifier::new();
        ok.push_notification("t", "m", Some("icon")).unwrap();
        assert_eq!(ok.pushed()[0].icon.as_deref(), Some("icon"));

        let broken = MockNotifier::failing();
        assert!(broken.push_notification("t", "m", None).is_err());
        assert_eq!(broken.push_count(), 0);
    }

    #[test]
    fn sound_player_records_attempts() {
        let player = MockSoundPlayer::failing();
        assert!(
            player
                .play_notification_sound("p", NotificationLevel::Warning)
                .is_err()
        );
        assert_eq!(player.played(), vec![("p".to_string(), NotificationLevel::Warning)]);
    }
}
