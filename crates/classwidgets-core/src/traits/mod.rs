// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability interfaces at the seams between the core and its collaborators.
//!
//! Plugins implement [`Plugin`], notification sources implement
//! [`NotificationProvider`], and the surrounding GUI shell supplies the
//! collaborator traits ([`SystemNotifier`], [`SoundPlayer`],
//! [`ScheduleSource`], [`ScheduleRuntime`]).

pub mod host;
pub mod notification;
pub mod plugin;

pub use host::{AutomationTask, ScheduleRuntime, ScheduleSource};
pub use notification::{NotificationProvider, SoundPlayer, SystemNotifier};
pub use plugin::Plugin;
