// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side collaborators reachable from plugins through the bridge.

use serde_json::Value;

use crate::error::ClassWidgetsError;
use crate::types::RuntimeSnapshot;

/// Owner of the loaded schedule document.
pub trait ScheduleSource {
    /// Returns the current schedule document, if one is loaded.
    fn current(&self) -> Option<Value>;

    /// Reloads the schedule from its backing store.
    fn reload(&self) -> Result<(), ClassWidgetsError>;
}

/// Live schedule runtime (current entry, remaining time, progress).
pub trait ScheduleRuntime {
    /// Returns a snapshot of the runtime state.
    fn snapshot(&self) -> RuntimeSnapshot;
}

/// An automation task registered by a plugin.
pub trait AutomationTask {
    /// Unique task identifier.
    fn id(&self) -> &str;

    /// Runs the task once.
    fn run(&mut self) -> Result<(), ClassWidgetsError>;
}
