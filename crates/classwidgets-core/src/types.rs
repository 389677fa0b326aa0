// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the config store, plugins, and notifications.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Single-threaded shared ownership for UI-thread services.
///
/// Every component in the core is mutated from exactly one thread, so shared
/// services are reference counted with dynamic borrow checking instead of
/// locks.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value into a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Severity of a notification. Ordered: `Info < Announcement < Warning < System`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    /// General messages, e.g. pushed by plugins.
    #[default]
    Info,
    /// Class begin/end reminders.
    Announcement,
    /// Things the user should act on, e.g. available updates.
    Warning,
    /// Reserved for the host itself.
    System,
}

impl NotificationLevel {
    /// Numeric code used across the WebAssembly host boundary.
    pub fn code(self) -> i32 {
        match self {
            Self::Info => 0,
            Self::Announcement => 1,
            Self::Warning => 2,
            Self::System => 3,
        }
    }

    /// Maps a numeric code back to a level. Unknown codes fall back to `Info`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Announcement,
            2 => Self::Warning,
            3 => Self::System,
            _ => Self::Info,
        }
    }
}

/// Where a plugin comes from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PluginKind {
    /// Compiled into the host binary; fully trusted.
    Builtin,
    /// Discovered under the external plugin root.
    External,
}

/// Point-in-time view of the schedule runtime exposed to plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    /// Current entry type (`class`, `break`, `activity`, `free`, ...).
    pub current_status: String,
    /// Title of the current entry, if any.
    pub current_title: Option<String>,
    /// Seconds left in the current entry.
    pub remaining_secs: u64,
    /// Progress through the current entry, `0.0..=1.0`.
    pub progress: f64,
    /// 1-based week number within the term.
    pub current_week: u32,
    /// 0-based day of week (Monday = 0).
    pub current_day_of_week: u32,
}

impl Default for RuntimeSnapshot {
    fn default() -> Self {
        Self {
            current_status: "free".to_string(),
            current_title: None,
            remaining_secs: 0,
            progress: 0.0,
            current_week: 1,
            current_day_of_week: 0,
        }
    }
}
