// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification dispatch for Class Widgets.
//!
//! Providers register with the [`NotificationRegistry`]; each provider's
//! delivery policy lives in the `notifications.providers` section of the
//! configuration tree.

pub mod event;
pub mod registry;

pub use event::{NotificationEvent, NotificationPayload, ProviderInfo};
pub use registry::{Delivery, NotificationRegistry};
