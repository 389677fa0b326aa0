// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Class Widgets configuration store.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use classwidgets_config::{BuildInfo, CONFIG_FILE_NAME, ConfigStore, spawn_autosave};
use classwidgets_core::ConfigEvent;
use serde_json::json;

fn store_in(dir: &Path) -> ConfigStore {
    ConfigStore::new(dir, CONFIG_FILE_NAME, BuildInfo::new("2.0.0", "beta"))
}

fn record_events(store: &ConfigStore) -> Rc<RefCell<Vec<ConfigEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    log
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn saved_tree_loads_back_equal() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());
    {
        let mut cfg = store.edit();
        cfg.preferences.opacity = 0.75;
        cfg.preferences.display = Some("HDMI-1".into());
        cfg.plugins.enabled.push("demo.plugin".into());
        cfg.schedule.reschedule_day.insert("2026-11-02".into(), json!(4));
    }
    assert!(store.save(false));
    let expected = store.config().clone();

    let mut reloaded = store_in(dir.path());
    reloaded.load_as_of(today());
    assert_eq!(reloaded.config(), &expected);
}

#[test]
fn persisted_file_uses_four_space_indent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path());
    store.try_save().unwrap();

    let text = std::fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert!(text.starts_with("{\n    \"app\": {\n        \"debug_mode\""), "{text}");
}

#[test]
fn set_fires_changed_once_then_path_set() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());
    let log = record_events(&store);

    store.set("app.debug_mode", json!(true)).unwrap();
    assert_eq!(store.get("app.debug_mode"), Some(json!(true)));
    assert!(store.config().app.debug_mode);
    assert_eq!(
        *log.borrow(),
        vec![
            ConfigEvent::Changed,
            ConfigEvent::PathSet {
                path: "app.debug_mode".into(),
                value: json!(true)
            }
        ]
    );
}

#[test]
fn setting_same_value_still_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());
    let log = record_events(&store);

    store.set("preferences.mini_mode", json!(false)).unwrap();
    store.set("preferences.mini_mode", json!(false)).unwrap();
    let changed = log
        .borrow()
        .iter()
        .filter(|e| **e == ConfigEvent::Changed)
        .count();
    assert_eq!(changed, 2);
}

#[test]
fn set_nested_and_map_paths() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());

    store.set("interactions.hide.in_class", json!(true)).unwrap();
    store
        .set("schedule.reschedule_day.2099-01-01", json!(3))
        .unwrap();
    store
        .set("preferences.widgets_presets.default.0.type_id", json!("classwidgets.clock"))
        .unwrap();

    assert!(store.config().interactions.hide.in_class);
    assert_eq!(store.get("schedule.reschedule_day.2099-01-01"), Some(json!(3)));
    assert_eq!(
        store.config().preferences.widgets_presets["default"][0].type_id,
        "classwidgets.clock"
    );
}

#[test]
fn rejected_set_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_in(dir.path());
    let before = store.config().clone();
    let log = record_events(&store);

    assert!(store.set("app.nonexistent", json!(1)).is_err());
    assert!(store.set("missing.section", json!(1)).is_err());
    assert!(store.set("preferences.opacity", json!("opaque")).is_err());
    assert!(store.set("preferences.opacity", json!(3.0)).is_err());
    assert!(store.set("", json!(1)).is_err());

    assert_eq!(store.config(), &before);
    assert!(log.borrow().is_empty());
}

#[test]
fn corrupt_file_falls_back_to_defaults_and_is_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "{ this is not json").unwrap();

    let mut store = store_in(dir.path());
    let log = record_events(&store);
    store.load_as_of(today());

    assert_eq!(store.config().preferences.opacity, 1.0);
    assert_eq!(*log.borrow(), vec![ConfigEvent::Reloaded]);

    let rewritten: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rewritten["app"]["version"], "2.0.0");
}

#[test]
fn unknown_key_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"preferences": {"opacity": 0.3, "sparkles": true}}"#,
    )
    .unwrap();

    let mut store = store_in(dir.path());
    store.load_as_of(today());
    assert_eq!(store.config().preferences.opacity, 1.0);
}

#[test]
fn invalid_semantics_are_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"preferences": {"current_preset": "gone"}}"#,
    )
    .unwrap();

    let mut store = store_in(dir.path());
    store.load_as_of(today());
    assert_eq!(store.config().preferences.current_preset, "default");
}

#[test]
fn load_restamps_other_build() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"app": {"version": "1.0.0", "channel": "alpha", "tutorial_completed": true}}"#,
    )
    .unwrap();

    let mut store = store_in(dir.path());
    store.load_as_of(today());
    assert_eq!(store.config().app.version, "2.0.0");
    assert_eq!(store.config().app.channel, "beta");
    assert!(store.config().app.tutorial_completed);

    let mut again = store_in(dir.path());
    again.load_as_of(today());
    assert_eq!(again.config().app.version, "2.0.0");
}

#[test]
fn load_discards_past_reschedules() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"schedule": {"reschedule_day": {"2026-10-18": 1, "2026-10-19": 2, "2026-10-20": 3}}}"#,
    )
    .unwrap();

    let mut store = store_in(dir.path());
    store.load_as_of(today());
    let keys: Vec<_> = store
        .config()
        .schedule
        .reschedule_day
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["2026-10-19", "2026-10-20"]);
}

#[test]
fn loaded_tree_reports_changes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"interactions": {"hide": {"clicked": false}}}"#,
    )
    .unwrap();

    let mut store = store_in(dir.path());
    store.load_as_of(today());
    assert!(!store.config().interactions.hide.clicked);

    let log = record_events(&store);
    store.edit().interactions.hide.fullscreen = true;
    assert_eq!(*log.borrow(), vec![ConfigEvent::Changed]);
}

#[test]
fn save_into_unwritable_location_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let store = store_in(&blocker);
    assert!(!store.save(true));
    assert!(store.try_save().is_err());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn autosave_writes_after_interval() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(dir.path()).into_shared();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let handle = spawn_autosave(&store, Duration::from_secs(60));
            tokio::time::sleep(Duration::from_secs(30)).await;
            assert!(!path.exists());
            tokio::time::sleep(Duration::from_secs(31)).await;
            assert!(path.exists());
            handle.abort();
        })
        .await;
}
