// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classwidgets run`: load enabled plugins and keep the host alive.
//!
//! Must run inside a `LocalSet`; the autosave task is spawned locally.

use std::future::Future;

use classwidgets_config::{AUTOSAVE_INTERVAL, spawn_autosave};
use classwidgets_core::{ClassWidgetsError, PluginEvent};
use classwidgets_notification::NotificationPayload;
use tracing::{info, warn};

use crate::host::Host;

/// Runs until Ctrl-C.
pub async fn run(host: &Host) -> Result<(), ClassWidgetsError> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c, shutting down");
        }
    };
    run_until(host, shutdown).await
}

/// Runs until `shutdown` completes, then unloads plugins and saves.
pub async fn run_until(host: &Host, shutdown: impl Future<Output = ()>) -> Result<(), ClassWidgetsError> {
    info!("starting classwidgets");

    host.manager().borrow().subscribe(|event| match event {
        PluginEvent::LoadFailed { id, reason } => warn!(plugin = %id, %reason, "plugin failed to load"),
        other => info!(event = ?other, "plugin event"),
    });
    host.notifications()
        .notified()
        .connect(|payload: &NotificationPayload| {
            println!("[{}] {}", payload.event.level, payload.event.display_text());
        });

    let report = host.manager().borrow_mut().load_enabled();
    if !report.failed.is_empty() {
        warn!(failed = ?report.failed, "some plugins failed to load");
    }

    let autosave = spawn_autosave(host.config(), AUTOSAVE_INTERVAL);
    shutdown.await;
    info!("shutdown requested");
    autosave.abort();

    host.shutdown();
    host.config().borrow().try_save()?;
    info!("classwidgets shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use classwidgets_config::model::DEFAULT_ENABLED_PLUGIN;
    use classwidgets_test_utils::{fixtures, wat};

    use super::*;
    use crate::host::{HostPaths, open_config};

    #[tokio::test]
    async fn loads_enabled_plugins_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_plugin(
            &dir.path().join("plugins"),
            "noop",
            &fixtures::manifest("noop", "main.wat"),
            &[("main.wat", wat::NOOP_PLUGIN)],
        );
        let paths = HostPaths::resolve(Some(dir.path().to_path_buf()), None);
        let config = open_config(&paths.config_dir);
        config.borrow_mut().edit().plugins.enabled =
            vec![DEFAULT_ENABLED_PLUGIN.to_string(), "noop".to_string()];
        let host = Host::assemble(config, &paths).unwrap();

        let observed = std::rc::Rc::new(std::cell::Cell::new(0));
        let local = tokio::task::LocalSet::new();
        local
            .run_until(run_until(&host, {
                let observed = std::rc::Rc::clone(&observed);
                let manager = std::rc::Rc::clone(host.manager());
                async move {
                    observed.set(manager.borrow().loader().len());
                }
            }))
            .await
            .unwrap();

        assert_eq!(observed.get(), 2);
        assert!(host.manager().borrow().loader().is_empty());
        let saved = open_config(&paths.config_dir);
        assert_eq!(
            saved.borrow().config().plugins.enabled,
            vec![DEFAULT_ENABLED_PLUGIN.to_string(), "noop".to_string()]
        );
    }
}
