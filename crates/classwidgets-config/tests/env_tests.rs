// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment overrides and persistence.
//!
//! Every test here runs inside `figment::Jail`, which serializes access to
//! the process environment. Keep env-dependent tests in this binary only.

use std::path::Path;

use chrono::NaiveDate;
use classwidgets_config::{BuildInfo, CONFIG_FILE_NAME, ConfigStore};
use serde_json::{Value, json};

fn store_in(dir: &Path) -> ConfigStore {
    ConfigStore::new(dir, CONFIG_FILE_NAME, BuildInfo::new("2.0.0", "beta"))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn read_saved(dir: &Path) -> Value {
    let text = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME)).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn env_override_is_not_written_back() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE_NAME, r#"{"schedule": {"preparation_time": 3}}"#)?;
        jail.set_env("CLASSWIDGETS_APP__DEBUG_MODE", "true");
        jail.set_env("CLASSWIDGETS_SCHEDULE__PREPARATION_TIME", "5");

        let mut store = store_in(jail.directory());
        store.load_as_of(today());
        assert!(store.config().app.debug_mode);
        assert_eq!(store.config().schedule.preparation_time, 5);
        assert_eq!(
            store.env_overridden().collect::<Vec<_>>(),
            vec!["app.debug_mode", "schedule.preparation_time"]
        );

        store.edit().preferences.opacity = 0.5;
        assert!(store.save(true));

        let saved = read_saved(jail.directory());
        assert_eq!(saved["app"]["debug_mode"], json!(false));
        assert_eq!(saved["schedule"]["preparation_time"], json!(3));
        assert_eq!(saved["preferences"]["opacity"], json!(0.5));
        assert_eq!(store.config().schedule.preparation_time, 5);
        Ok(())
    });
}

#[test]
fn assigned_path_survives_env_override() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("CLASSWIDGETS_APP__DEBUG_MODE", "true");

        let mut store = store_in(jail.directory());
        store.load_as_of(today());
        assert_eq!(read_saved(jail.directory())["app"]["debug_mode"], json!(false));

        store.set("app.debug_mode", json!(true)).unwrap();
        assert_eq!(store.env_overridden().count(), 0);
        store.try_save().unwrap();
        assert_eq!(read_saved(jail.directory())["app"]["debug_mode"], json!(true));
        Ok(())
    });
}
