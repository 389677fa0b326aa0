// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Class Widgets - desktop schedule widgets with a plugin system.
//!
//! This is the binary entry point. Everything runs on one thread inside a
//! `LocalSet`, mirroring the UI-thread model of the libraries.

mod config_cmd;
mod host;
mod plugins_cmd;
mod run;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use classwidgets_config::model::AppConfig;
use classwidgets_config::{CONFIG_FILE_NAME, RootConfig, loader};
use classwidgets_core::ClassWidgetsError;
use tracing::error;

use crate::config_cmd::ConfigCommand;
use crate::host::{Host, HostPaths, open_config};
use crate::plugins_cmd::PluginsCommand;

/// Class Widgets - desktop schedule widgets.
#[derive(Parser, Debug)]
#[command(name = "classwidgets", version, about, long_about = None)]
struct Cli {
    /// Directory holding config.json.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Directory scanned for external plugins. Defaults to `plugins/` in the config directory.
    #[arg(long, global = true, value_name = "DIR")]
    plugins_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Load enabled plugins and run until Ctrl-C (the default).
    Run,
    /// Manage plugins.
    #[command(subcommand)]
    Plugins(PluginsCommand),
    /// Read and write configuration values.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let paths = HostPaths::resolve(cli.config_dir, cli.plugins_dir);

    let local = tokio::task::LocalSet::new();
    if let Err(e) = local.run_until(dispatch(cli.command, paths)).await {
        error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn dispatch(command: Option<Commands>, paths: HostPaths) -> Result<(), ClassWidgetsError> {
    init_tracing(&startup_app_settings(&paths.config_dir.join(CONFIG_FILE_NAME)));
    let config = open_config(&paths.config_dir);

    match command.unwrap_or(Commands::Run) {
        Commands::Config(command) => config_cmd::run_config(&config, command),
        Commands::Run => {
            let host = Host::assemble(config, &paths)?;
            run::run(&host).await
        }
        Commands::Plugins(command) => {
            let host = Host::assemble(config, &paths)?;
            let result = plugins_cmd::run_plugins(&host, command).await;
            host.shutdown();
            result
        }
    }
}

/// App settings peeked before tracing exists.
///
/// Read failures fall back to defaults silently; the full load that follows
/// reports them once a subscriber is installed.
fn startup_app_settings(path: &Path) -> AppConfig {
    loader::load_config_from_path(path)
        .map(|root| root.app)
        .unwrap_or_else(|_| RootConfig::default().app)
}

/// `RUST_LOG` wins; otherwise the level follows the app settings.
fn filter_directive(app: &AppConfig) -> String {
    if app.no_logs {
        "error".to_string()
    } else if app.debug_mode {
        "classwidgets=debug,warn".to_string()
    } else {
        "classwidgets=info,warn".to_string()
    }
}

fn init_tracing(app: &AppConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(app)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
