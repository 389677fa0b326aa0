// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Class Widgets.
//!
//! Provides the typed configuration tree with change propagation, a Figment
//! loader with environment overrides, semantic validation, and the
//! [`ConfigStore`] that persists the tree as JSON, shared on the UI thread
//! through [`SharedConfig`].

pub mod loader;
pub mod model;
pub mod node;
mod path;
pub mod shared;
pub mod store;
pub mod validation;

pub use loader::{CONFIG_FILE_NAME, default_config_dir};
pub use model::RootConfig;
pub use node::{ChangeSink, ConfigNode};
pub use shared::{ConfigMut, SharedConfig};
pub use store::{AUTOSAVE_INTERVAL, BuildInfo, ConfigGuard, ConfigStore, spawn_autosave};

/// Version of this build.
pub const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Release channel of this build.
pub const BUILD_CHANNEL: &str = "alpha";
