// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base capability every plugin instance implements.

use crate::error::ClassWidgetsError;

/// A live plugin instance driven by the plugin loader.
///
/// The loader calls [`on_load`](Plugin::on_load) exactly once after
/// construction and [`on_unload`](Plugin::on_unload) exactly once before the
/// instance is discarded. Both hooks default to doing nothing.
pub trait Plugin {
    /// Called once after the plugin context has been injected.
    fn on_load(&mut self) -> Result<(), ClassWidgetsError> {
        Ok(())
    }

    /// Called once on disable, uninstall, or host shutdown.
    fn on_unload(&mut self) -> Result<(), ClassWidgetsError> {
        Ok(())
    }
}
