// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry and notification dispatch.
//!
//! The [`NotificationRegistry`] maps provider identifiers to providers and
//! resolves each provider's delivery policy from the configuration tree. A
//! dispatched event may go to the system tray, to in-app observers, or both;
//! failures in one channel are logged and never reach the caller.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use classwidgets_config::SharedConfig;
use classwidgets_config::model::ProviderPolicy;
use classwidgets_core::{NotificationProvider, Signal, SoundPlayer, SystemNotifier};
use tracing::{debug, error, info, warn};

use crate::event::{NotificationEvent, NotificationPayload, ProviderInfo};

/// How a dispatched event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// The system tray accepted the notification.
    pub system: bool,
    /// In-app observers were notified.
    pub app: bool,
}

impl Delivery {
    /// True if the event went nowhere.
    pub fn is_dropped(&self) -> bool {
        !self.system && !self.app
    }
}

/// Maps provider ids to providers and dispatches their notifications.
///
/// Methods take `&self` so that observers may register providers or
/// dispatch further events while being notified.
pub struct NotificationRegistry {
    providers: RefCell<BTreeMap<String, Rc<dyn NotificationProvider>>>,
    config: SharedConfig,
    system: Option<Rc<dyn SystemNotifier>>,
    sound: Option<Rc<dyn SoundPlayer>>,
    notified: Signal<NotificationPayload>,
}

impl NotificationRegistry {
    /// Create a registry reading policies from `config`, with no collaborators.
    pub fn new(config: SharedConfig) -> Self {
        Self {
            providers: RefCell::new(BTreeMap::new()),
            config,
            system: None,
            sound: None,
            notified: Signal::new(),
        }
    }

    /// Attach the tray collaborator used for system notifications.
    pub fn with_system_notifier(mut self, notifier: Rc<dyn SystemNotifier>) -> Self {
        self.system = Some(notifier);
        self
    }

    /// Attach the audio collaborator used for notification sounds.
    pub fn with_sound_player(mut self, player: Rc<dyn SoundPlayer>) -> Self {
        self.sound = Some(player);
        self
    }

    /// Observers of in-app notifications.
    pub fn notified(&self) -> &Signal<NotificationPayload> {
        &self.notified
    }

    /// Registers `provider`, replacing any provider with the same id.
    ///
    /// A provider with an empty id or name is rejected with a warning and
    /// `false` is returned. A default policy is stored for providers that do
    /// not have one yet.
    pub fn register_provider(&self, provider: Rc<dyn NotificationProvider>) -> bool {
        let id = provider.id().trim().to_string();
        if id.is_empty() || provider.name().trim().is_empty() {
            warn!(
                provider = %provider.id(),
                name = %provider.name(),
                "invalid provider registration, id and name are required"
            );
            return false;
        }

        self.materialize_policy(&id);
        if self
            .providers
            .borrow_mut()
            .insert(id.clone(), provider)
            .is_some()
        {
            debug!(provider = %id, "replaced notification provider");
        } else {
            debug!(provider = %id, "registered notification provider");
        }
        true
    }

    fn materialize_policy(&self, id: &str) {
        let mut store = self.config.borrow_mut();
        if store.config().notifications.providers.contains_key(id) {
            return;
        }
        store
            .edit()
            .notifications
            .providers
            .insert(id.to_string(), ProviderPolicy::default());
    }

    /// Removes a provider. Its stored policy is kept.
    pub fn unregister_provider(&self, provider_id: &str) -> bool {
        let removed = self.providers.borrow_mut().remove(provider_id).is_some();
        if removed {
            debug!(provider = %provider_id, "unregistered notification provider");
        }
        removed
    }

    /// Returns the registered provider with this id.
    pub fn provider(&self, provider_id: &str) -> Option<Rc<dyn NotificationProvider>> {
        self.providers.borrow().get(provider_id).cloned()
    }

    /// Stored policy for `provider_id`, or the default policy.
    pub fn policy(&self, provider_id: &str) -> ProviderPolicy {
        self.config
            .borrow()
            .config()
            .notifications
            .providers
            .get(provider_id)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the provider's policy allows delivery.
    pub fn is_enabled(&self, provider_id: &str) -> bool {
        self.policy(provider_id).enabled
    }

    /// Every registered provider with its effective policy, ordered by id.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        let providers: Vec<Rc<dyn NotificationProvider>> =
            self.providers.borrow().values().cloned().collect();
        providers
            .into_iter()
            .map(|provider| {
                let policy = self.policy(provider.id());
                ProviderInfo {
                    id: provider.id().to_string(),
                    name: provider.name().to_string(),
                    icon: provider.icon().map(str::to_string),
                    enabled: policy.enabled,
                    use_system_notify: policy.use_system_notify,
                    use_app_notify: policy.use_app_notify,
                }
            })
            .collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.borrow().is_empty()
    }

    /// Dispatches `event` under its provider's stored policy.
    pub fn dispatch(&self, event: &NotificationEvent) -> Delivery {
        let policy = self.policy(&event.provider_id);
        self.dispatch_with(event, policy)
    }

    /// Dispatches `event` under an explicit policy.
    ///
    /// Nothing happens when notifications are globally off, the policy is
    /// disabled, or the policy enables neither channel.
    pub fn dispatch_with(&self, event: &NotificationEvent, policy: ProviderPolicy) -> Delivery {
        info!(
            provider = %event.provider_id,
            level = %event.level,
            title = %event.title,
            "dispatching notification"
        );
        let mut delivery = Delivery::default();

        let globally_enabled = self.config.borrow().config().notifications.enabled;
        if !globally_enabled || !policy.enabled {
            debug!(provider = %event.provider_id, "notification suppressed by policy");
            return delivery;
        }
        if !policy.use_system_notify && !policy.use_app_notify {
            return delivery;
        }

        if policy.use_system_notify {
            delivery.system = self.push_system(event);
        }

        if policy.use_app_notify {
            self.notified.emit(&NotificationPayload {
                event: event.clone(),
                use_system: policy.use_system_notify,
            });
            delivery.app = true;

            if !event.silent
                && let Some(sound) = &self.sound
                && let Err(e) = sound.play_notification_sound(&event.provider_id, event.level)
            {
                error!(provider = %event.provider_id, error = %e, "notification sound failed");
            }
        }
        delivery
    }

    fn push_system(&self, event: &NotificationEvent) -> bool {
        let Some(system) = &self.system else {
            debug!("no system notifier attached");
            return false;
        };
        let icon = self
            .provider(&event.provider_id)
            .and_then(|p| p.icon().map(str::to_string));
        match system.push_notification(
            &event.title,
            event.message.as_deref().unwrap_or_default(),
            icon.as_deref(),
        ) {
            Ok(()) => true,
            Err(e) => {
                error!(provider = %event.provider_id, error = %e, "system notification failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for NotificationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationRegistry")
            .field("providers", &self.providers.borrow().keys().collect::<Vec<_>>())
            .field("system", &self.system.is_some())
            .field("sound", &self.sound.is_some())
            .finish()
    }
}
