// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installing plugins from zip archives.
//!
//! Extraction runs on the blocking pool; the catalog rescan and every
//! notification happen back on the calling task. An archive whose members
//! all live under one top-level directory is extracted as-is into the
//! external root. Anything else is wrapped in a directory named after the
//! archive.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use classwidgets_core::{ClassWidgetsError, PluginEvent, Shared};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::manager::PluginManager;

/// Extracts `archive` under `root` and returns the directory it landed in.
pub fn extract_archive(archive: &Path, root: &Path) -> Result<PathBuf, ClassWidgetsError> {
    let file = File::open(archive).map_err(|e| {
        ClassWidgetsError::Import(format!("cannot open {}: {e}", archive.display()))
    })?;
    let mut zip = ZipArchive::new(file)
        .map_err(|e| ClassWidgetsError::Import(format!("not a zip archive: {e}")))?;
    if zip.is_empty() {
        return Err(ClassWidgetsError::Import("archive is empty".into()));
    }

    let mut members = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let member = zip
            .by_index(index)
            .map_err(|e| ClassWidgetsError::Import(format!("unreadable archive member: {e}")))?;
        let Some(path) = member.enclosed_name() else {
            return Err(ClassWidgetsError::Import(format!(
                "archive member escapes the target directory: {}",
                member.name()
            )));
        };
        members.push((path, member.is_dir()));
    }

    fs::create_dir_all(root).map_err(|e| ClassWidgetsError::persistence(root, e))?;

    let target = match common_root(&members) {
        Some(top) => {
            debug!(archive = %archive.display(), "archive has a single top-level directory");
            zip.extract(root)
                .map_err(|e| ClassWidgetsError::Import(format!("extraction failed: {e}")))?;
            root.join(top)
        }
        None => {
            let stem = archive
                .file_stem()
                .ok_or_else(|| ClassWidgetsError::Import("archive has no file name".into()))?;
            let target = root.join(stem);
            if target.exists() {
                warn!(dir = %target.display(), "replacing existing plugin directory");
                fs::remove_dir_all(&target)
                    .map_err(|e| ClassWidgetsError::persistence(&target, e))?;
            }
            fs::create_dir_all(&target).map_err(|e| ClassWidgetsError::persistence(&target, e))?;
            zip.extract(&target)
                .map_err(|e| ClassWidgetsError::Import(format!("extraction failed: {e}")))?;
            target
        }
    };
    info!(archive = %archive.display(), dir = %target.display(), "extracted plugin archive");
    Ok(target)
}

/// The top-level directory shared by every member, if there is one.
///
/// Files sitting directly at the archive root rule it out.
fn common_root(members: &[(PathBuf, bool)]) -> Option<OsString> {
    let mut root: Option<OsString> = None;
    let mut has_file = false;
    for (path, is_dir) in members {
        let mut components = path.components();
        let first = components.next()?.as_os_str().to_os_string();
        if !is_dir {
            has_file = true;
            components.next()?;
        }
        match &root {
            None => root = Some(first),
            Some(existing) if *existing == first => {}
            Some(_) => return None,
        }
    }
    if has_file { root } else { None }
}

/// Imports a plugin archive and rescans the catalog.
///
/// Succeeds only when the rescan finds plugin ids that were not there
/// before; those ids are returned sorted. Observers receive
/// `ImportSucceeded` plus `ListChanged`, or `ImportFailed`, after the
/// manager borrow is released.
pub async fn import_archive(
    manager: &Shared<PluginManager>,
    archive: &Path,
) -> Result<Vec<String>, ClassWidgetsError> {
    let (root, before, events) = {
        let manager = manager.borrow();
        (
            manager.external_root().to_path_buf(),
            manager.catalog().ids(),
            manager.events(),
        )
    };
    info!(archive = %archive.display(), "importing plugin archive");

    let source = archive.to_path_buf();
    let extracted = tokio::task::spawn_blocking(move || extract_archive(&source, &root))
        .await
        .map_err(|e| ClassWidgetsError::Import(format!("import worker failed: {e}")))
        .and_then(|result| result);

    let outcome = extracted.and_then(|_| {
        let mut manager = manager.borrow_mut();
        manager.rescan();
        let added: Vec<String> = manager
            .catalog()
            .ids()
            .difference(&before)
            .cloned()
            .collect();
        if added.is_empty() {
            Err(ClassWidgetsError::Import(
                "no new valid plugin found in archive".into(),
            ))
        } else {
            Ok(added)
        }
    });

    match outcome {
        Ok(added) => {
            info!(plugins = ?added, "imported plugins");
            events.emit(&PluginEvent::ImportSucceeded { ids: added.clone() });
            events.emit(&PluginEvent::ListChanged);
            Ok(added)
        }
        Err(e) => {
            warn!(archive = %archive.display(), error = %e, "plugin import failed");
            events.emit(&PluginEvent::ImportFailed {
                reason: e.to_string(),
            });
            Err(e)
        }
    }
}
