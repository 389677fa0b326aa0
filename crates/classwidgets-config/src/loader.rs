// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Field defaults from the serde model
//! 2. The persisted JSON document
//! 3. `CLASSWIDGETS_<SECTION>__<FIELD>` environment variables
//!
//! Defaults are not merged as a Figment layer. Merging dictionaries would
//! union map-valued fields such as `preferences.widgets_presets` with the
//! defaults, so a preset removed by the user would come back on every load.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json},
};

use crate::model::RootConfig;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "CLASSWIDGETS_";

/// Name of the persisted configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Per-user configuration directory, e.g. `~/.config/ClassWidgets`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("ClassWidgets"))
        .unwrap_or_else(|| PathBuf::from("config"))
}

/// Load configuration from a specific file path with env var overrides.
///
/// A missing file is not an error; the environment and field defaults still
/// apply.
pub fn load_config_from_path(path: &Path) -> Result<RootConfig, figment::Error> {
    build_figment(path).extract()
}

/// Load configuration from a JSON string only (no file, no environment).
pub fn load_config_from_str(json: &str) -> Result<RootConfig, figment::Error> {
    Figment::new().merge(Json::string(json)).extract()
}

/// Load the persisted JSON document at `path` without environment overrides.
pub fn load_persisted(path: &Path) -> Result<RootConfig, figment::Error> {
    Figment::new().merge(Json::file(path)).extract()
}

/// The environment overrides alone, as a nested document such as
/// `{"app": {"debug_mode": true}}`.
pub fn env_overrides() -> Result<serde_json::Value, figment::Error> {
    Figment::from(env_provider()).extract()
}

/// Build the Figment used for loading `path`, before extraction.
pub fn build_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Json::file(path))
        .merge(env_provider())
}

/// Environment provider mapping `CLASSWIDGETS_APP__DEBUG_MODE` to
/// `app.debug_mode`.
///
/// Nesting uses a double underscore because field names contain single
/// underscores. Variables without a section separator are ignored so that
/// unrelated `CLASSWIDGETS_*` variables do not trip the strict schema.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .filter(|key| key.as_str().contains("__"))
        .split("__")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn presets_are_not_merged_with_defaults() {
        let json = r#"{"preferences": {"widgets_presets": {"work": []}, "current_preset": "work"}}"#;
        let config = load_config_from_str(json).unwrap();
        assert_eq!(config.preferences.widgets_presets.len(), 1);
        assert!(config.preferences.widgets_presets.contains_key("work"));
    }

    #[test]
    fn env_override_is_applied() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, r#"{"app": {"debug_mode": false}}"#)?;
            jail.set_env("CLASSWIDGETS_APP__DEBUG_MODE", "true");
            jail.set_env("CLASSWIDGETS_SCHEDULE__PREPARATION_TIME", "5");
            jail.set_env("CLASSWIDGETS_UNRELATED", "ignored");

            let config = load_config_from_path(Path::new(CONFIG_FILE_NAME))?;
            assert!(config.app.debug_mode);
            assert_eq!(config.schedule.preparation_time, 5);
            Ok(())
        });
    }

    #[test]
    fn persisted_layer_ignores_environment() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, r#"{"app": {"debug_mode": false}}"#)?;
            jail.set_env("CLASSWIDGETS_APP__DEBUG_MODE", "true");

            let persisted = load_persisted(Path::new(CONFIG_FILE_NAME))?;
            assert!(!persisted.app.debug_mode);
            let overrides = env_overrides()?;
            assert_eq!(overrides, serde_json::json!({"app": {"debug_mode": true}}));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.schedule.current_schedule, "New Schedule 1");
    }
}
