// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Class Widgets integration tests.
//!
//! # Components
//!
//! - [`MockNotifier`] / [`MockSoundPlayer`] - recording collaborators
//! - [`fixtures`] - plugin directories, zip archives, config stores on disk
//! - [`wat`] - WebAssembly text entry modules

pub mod fixtures;
pub mod mock_collaborators;
pub mod wat;

pub use mock_collaborators::{MockNotifier, MockSoundPlayer, PushedNotification};
