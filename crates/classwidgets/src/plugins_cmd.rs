// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classwidgets plugins` subcommands.

use std::fmt::Write;
use std::path::PathBuf;

use clap::Subcommand;
use classwidgets_core::ClassWidgetsError;
use classwidgets_plugin::{PluginManager, import_archive};

use crate::host::Host;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PluginsCommand {
    /// List builtin and installed plugins.
    List,
    /// Install plugins from a zip archive.
    Import { archive: PathBuf },
    /// Delete an installed plugin from disk.
    Uninstall { id: String },
    /// Enable a plugin and check that it loads.
    Enable { id: String },
    /// Disable a plugin.
    Disable { id: String },
}

pub async fn run_plugins(host: &Host, command: PluginsCommand) -> Result<(), ClassWidgetsError> {
    match command {
        PluginsCommand::List => print!("{}", render_list(&host.manager().borrow())),
        PluginsCommand::Import { archive } => {
            let ids = import_archive(host.manager(), &archive).await?;
            println!("imported {}", ids.join(", "));
        }
        PluginsCommand::Uninstall { id } => {
            host.manager().borrow_mut().uninstall(&id)?;
            println!("uninstalled {id}");
        }
        PluginsCommand::Enable { id } => {
            host.manager().borrow_mut().set_enabled(&id, true)?;
            println!("enabled {id}");
        }
        PluginsCommand::Disable { id } => {
            host.manager().borrow_mut().set_enabled(&id, false)?;
            println!("disabled {id}");
        }
    }
    Ok(())
}

/// One line per plugin: id, version, kind, state, and name.
pub fn render_list(manager: &PluginManager) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<36} {:<10} {:<9} {:<9} NAME", "ID", "VERSION", "KIND", "STATE");
    for manifest in manager.plugins() {
        let state = match (
            manager.is_enabled(&manifest.id),
            manager.is_compatible(&manifest.id),
        ) {
            (_, false) => "outdated",
            (true, true) => "enabled",
            (false, true) => "disabled",
        };
        let _ = writeln!(
            out,
            "{:<36} {:<10} {:<9} {:<9} {}",
            manifest.id, manifest.version, manifest.kind, state, manifest.name
        );
    }
    out
}
