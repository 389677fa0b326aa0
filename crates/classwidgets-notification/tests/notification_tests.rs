// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for provider registration and dispatch policy.

use std::cell::RefCell;
use std::rc::Rc;

use classwidgets_config::SharedConfig;
use classwidgets_config::model::ProviderPolicy;
use classwidgets_core::{NotificationLevel, NotificationProvider};
use classwidgets_notification::{NotificationEvent, NotificationPayload, NotificationRegistry};
use classwidgets_test_utils::{MockNotifier, MockSoundPlayer, fixtures};
use tempfile::TempDir;

struct TestProvider {
    id: &'static str,
    icon: Option<&'static str>,
}

impl NotificationProvider for TestProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        "Test provider"
    }

    fn icon(&self) -> Option<&str> {
        self.icon
    }
}

struct Harness {
    _dir: TempDir,
    config: SharedConfig,
    notifier: Rc<MockNotifier>,
    sound: Rc<MockSoundPlayer>,
    registry: NotificationRegistry,
    received: Rc<RefCell<Vec<NotificationPayload>>>,
}

fn harness_with(notifier: MockNotifier, sound: MockSoundPlayer) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = fixtures::config_store(dir.path()).into_shared();
    let notifier = Rc::new(notifier);
    let sound = Rc::new(sound);
    let registry = NotificationRegistry::new(config.clone())
        .with_system_notifier(notifier.clone())
        .with_sound_player(sound.clone());

    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    registry
        .notified()
        .connect(move |payload: &NotificationPayload| sink.borrow_mut().push(payload.clone()));

    Harness {
        _dir: dir,
        config,
        notifier,
        sound,
        registry,
        received,
    }
}

fn harness() -> Harness {
    harness_with(MockNotifier::new(), MockSoundPlayer::new())
}

fn set_policy(h: &Harness, id: &str, policy: ProviderPolicy) {
    h.config
        .borrow_mut()
        .edit()
        .notifications
        .providers
        .insert(id.to_string(), policy);
}

fn event(provider: &str) -> NotificationEvent {
    NotificationEvent::new(provider, NotificationLevel::Announcement, "Class begins").with_message("Math")
}

#[test]
fn registration_materializes_default_policy() {
    let h = harness();
    assert!(h.registry.register_provider(Rc::new(TestProvider { id: "p", icon: None })));

    let policy = h.config.borrow().config().notifications.providers.get("p").copied();
    assert_eq!(policy, Some(ProviderPolicy::default()));
}

#[test]
fn registration_keeps_existing_policy() {
    let h = harness();
    let custom = ProviderPolicy {
        enabled: false,
        use_system_notify: true,
        use_app_notify: false,
    };
    set_policy(&h, "p", custom);
    h.registry.register_provider(Rc::new(TestProvider { id: "p", icon: None }));
    assert_eq!(h.registry.policy("p"), custom);
}

#[test]
fn default_policy_delivers_in_app_with_sound() {
    let h = harness();
    let delivery = h.registry.dispatch(&event("unregistered"));

    assert!(delivery.app);
    assert!(!delivery.system);
    assert_eq!(h.notifier.push_count(), 0);
    assert_eq!(h.received.borrow().len(), 1);
    assert!(!h.received.borrow()[0].use_system);
    assert_eq!(
        h.sound.played(),
        vec![("unregistered".to_string(), NotificationLevel::Announcement)]
    );
}

#[test]
fn globally_disabled_has_no_side_effects() {
    let h = harness();
    set_policy(
        &h,
        "p",
        ProviderPolicy {
            enabled: true,
            use_system_notify: true,
            use_app_notify: true,
        },
    );
    h.config.borrow_mut().edit().notifications.enabled = false;

    let delivery = h.registry.dispatch(&event("p"));
    assert!(delivery.is_dropped());
    assert_eq!(h.notifier.push_count(), 0);
    assert_eq!(h.sound.play_count(), 0);
    assert!(h.received.borrow().is_empty());
}

#[test]
fn disabled_provider_is_suppressed() {
    let h = harness();
    set_policy(
        &h,
        "p",
        ProviderPolicy {
            enabled: false,
            ..ProviderPolicy::default()
        },
    );
    assert!(!h.registry.is_enabled("p"));
    assert!(h.registry.dispatch(&event("p")).is_dropped());
    assert!(h.received.borrow().is_empty());
}

#[test]
fn no_channel_enabled_short_circuits() {
    let h = harness();
    let policy = ProviderPolicy {
        enabled: true,
        use_system_notify: false,
        use_app_notify: false,
    };
    assert!(h.registry.dispatch_with(&event("p"), policy).is_dropped());
    assert_eq!(h.sound.play_count(), 0);
}

#[test]
fn system_and_app_delivery_with_provider_icon() {
    let h = harness();
    h.registry.register_provider(Rc::new(TestProvider {
        id: "p",
        icon: Some("ic_bell"),
    }));
    set_policy(
        &h,
        "p",
        ProviderPolicy {
            enabled: true,
            use_system_notify: true,
            use_app_notify: true,
        },
    );

    let delivery = h.registry.dispatch(&event("p"));
    assert!(delivery.system && delivery.app);

    let pushed = h.notifier.pushed();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].title, "Class begins");
    assert_eq!(pushed[0].text, "Math");
    assert_eq!(pushed[0].icon.as_deref(), Some("ic_bell"));
    assert!(h.received.borrow()[0].use_system);
}

#[test]
fn system_only_skips_app_signal_and_sound() {
    let h = harness();
    let policy = ProviderPolicy {
        enabled: true,
        use_system_notify: true,
        use_app_notify: false,
    };
    let delivery = h.registry.dispatch_with(&event("p"), policy);
    assert!(delivery.system);
    assert!(!delivery.app);
    assert!(h.received.borrow().is_empty());
    assert_eq!(h.sound.play_count(), 0);
}

#[test]
fn silent_event_plays_no_sound() {
    let h = harness();
    h.registry.dispatch(&event("p").silent(true));
    assert_eq!(h.received.borrow().len(), 1);
    assert_eq!(h.sound.play_count(), 0);
}

#[test]
fn collaborator_failures_are_contained() {
    let h = harness_with(MockNotifier::failing(), MockSoundPlayer::failing());
    let policy = ProviderPolicy {
        enabled: true,
        use_system_notify: true,
        use_app_notify: true,
    };

    let delivery = h.registry.dispatch_with(&event("p"), policy);
    assert!(!delivery.system);
    assert!(delivery.app);
    assert_eq!(h.received.borrow().len(), 1);
    assert_eq!(h.sound.play_count(), 1);
}

#[test]
fn listing_reports_policy_flags() {
    let h = harness();
    h.registry.register_provider(Rc::new(TestProvider { id: "b", icon: None }));
    h.registry.register_provider(Rc::new(TestProvider {
        id: "a",
        icon: Some("ic_a"),
    }));
    set_policy(
        &h,
        "b",
        ProviderPolicy {
            enabled: false,
            use_system_notify: true,
            use_app_notify: true,
        },
    );

    let listed = h.registry.providers();
    let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(listed[0].icon.as_deref(), Some("ic_a"));
    assert!(!listed[1].enabled);
    assert!(listed[1].use_system_notify);
}

#[test]
fn unregister_keeps_policy() {
    let h = harness();
    h.registry.register_provider(Rc::new(TestProvider { id: "p", icon: None }));
    assert!(h.registry.unregister_provider("p"));
    assert!(!h.registry.unregister_provider("p"));
    assert!(h.registry.providers().is_empty());
    assert!(h.config.borrow().config().notifications.providers.contains_key("p"));
}

#[test]
fn observer_may_dispatch_again() {
    let h = harness();
    let registry = Rc::new(h.registry);
    let inner = Rc::clone(&registry);
    let depth = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&depth);
    registry.notified().connect(move |payload: &NotificationPayload| {
        let mut d = seen.borrow_mut();
        *d += 1;
        if payload.event.provider_id == "outer" {
            drop(d);
            inner.dispatch(&event("inner"));
        }
    });

    registry.dispatch(&event("outer"));
    assert_eq!(*depth.borrow(), 2);
    assert_eq!(h.received.borrow().len(), 2);
}
