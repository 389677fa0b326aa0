// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Class Widgets.
//!
//! This crate provides the error type, event taxonomy, observer lists, and
//! capability traits shared by the config store, the plugin system, and the
//! notification registry.

pub mod error;
pub mod events;
pub mod signal;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClassWidgetsError;
pub use events::{ConfigEvent, PluginEvent};
pub use signal::Signal;
pub use types::{NotificationLevel, PluginKind, RuntimeSnapshot, Shared, shared};

pub use traits::{
    AutomationTask, NotificationProvider, Plugin, ScheduleRuntime, ScheduleSource, SoundPlayer,
    SystemNotifier,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_name_their_plugin() {
        let err = ClassWidgetsError::IncompatibleApi {
            plugin_id: "demo".into(),
            requirement: ">=99.0".into(),
            host: "1.0.0".into(),
        };
        assert_eq!(err.plugin_id(), Some("demo"));
        assert!(err.to_string().contains(">=99.0"));

        let err = ClassWidgetsError::Config("bad".into());
        assert_eq!(err.plugin_id(), None);
    }

    #[test]
    fn persistence_error_keeps_path() {
        let err = ClassWidgetsError::persistence("/tmp/config.json", std::io::Error::other("disk"));
        assert!(err.to_string().contains("/tmp/config.json"));
    }

    #[test]
    fn plugin_hooks_default_to_ok() {
        struct Noop;
        impl Plugin for Noop {}

        let mut p = Noop;
        assert!(p.on_load().is_ok());
        assert!(p.on_unload().is_ok());
    }
}
