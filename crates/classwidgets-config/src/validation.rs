// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that serde attributes cannot express, such as
//! value ranges and keys that must refer to existing map entries.

use chrono::NaiveDate;
use classwidgets_core::ClassWidgetsError;

use crate::model::RootConfig;

/// Date format of `schedule.reschedule_day` keys.
pub const RESCHEDULE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &RootConfig) -> Result<(), Vec<ClassWidgetsError>> {
    let mut errors = Vec::new();
    let prefs = &config.preferences;

    if !(0.0..=1.0).contains(&prefs.opacity) {
        errors.push(ClassWidgetsError::Config(format!(
            "preferences.opacity must be between 0 and 1, got {}",
            prefs.opacity
        )));
    }

    if !(prefs.scale_factor.is_finite() && prefs.scale_factor > 0.0) {
        errors.push(ClassWidgetsError::Config(format!(
            "preferences.scale_factor must be positive, got {}",
            prefs.scale_factor
        )));
    }

    if !prefs.widgets_presets.contains_key(&prefs.current_preset) {
        errors.push(ClassWidgetsError::Config(format!(
            "preferences.current_preset `{}` does not name a preset in widgets_presets",
            prefs.current_preset
        )));
    }

    let network = &config.network;
    if !network.mirrors.is_empty() && !network.mirrors.contains_key(&network.current_mirror) {
        errors.push(ClassWidgetsError::Config(format!(
            "network.current_mirror `{}` does not name a configured mirror",
            network.current_mirror
        )));
    }

    for key in config.schedule.reschedule_day.keys() {
        if NaiveDate::parse_from_str(key, RESCHEDULE_DATE_FORMAT).is_err() {
            errors.push(ClassWidgetsError::Config(format!(
                "schedule.reschedule_day key `{key}` is not a YYYY-MM-DD date"
            )));
        }
    }

    for id in &config.plugins.enabled {
        if id.trim().is_empty() {
            errors.push(ClassWidgetsError::Config(
                "plugins.enabled must not contain empty identifiers".to_string(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Joins collected validation errors into one line for logging.
pub fn describe(errors: &[ClassWidgetsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
