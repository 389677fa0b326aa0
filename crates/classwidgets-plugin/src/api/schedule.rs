// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schedule document and schedule runtime access.

use classwidgets_core::{ClassWidgetsError, RuntimeSnapshot};
use serde_json::Value;

use super::PluginApi;

pub struct ScheduleApi<'a> {
    api: &'a PluginApi,
}

impl<'a> ScheduleApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// The loaded schedule document, if a schedule source is attached and
    /// has one.
    pub fn current(&self) -> Option<Value> {
        self.api.services().schedule.as_ref()?.current()
    }

    /// Asks the schedule source to reload from its backing store.
    pub fn reload(&self) -> Result<(), ClassWidgetsError> {
        match &self.api.services().schedule {
            Some(source) => source.reload(),
            None => Err(ClassWidgetsError::Collaborator {
                collaborator: "schedule",
                message: "no schedule source attached".into(),
            }),
        }
    }
}

pub struct RuntimeApi<'a> {
    api: &'a PluginApi,
}

impl<'a> RuntimeApi<'a> {
    pub(crate) fn new(api: &'a PluginApi) -> Self {
        Self { api }
    }

    /// Current runtime state; the idle snapshot when no runtime is attached.
    pub fn snapshot(&self) -> RuntimeSnapshot {
        self.api
            .services()
            .runtime
            .as_ref()
            .map(|runtime| runtime.snapshot())
            .unwrap_or_default()
    }

    pub fn current_status(&self) -> String {
        self.snapshot().current_status
    }

    pub fn progress(&self) -> f64 {
        self.snapshot().progress
    }
}
