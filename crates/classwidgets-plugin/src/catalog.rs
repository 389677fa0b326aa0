// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery of builtin and external plugins.
//!
//! A scan rebuilds the catalog from scratch: builtins first, then every
//! immediate subdirectory of the external root that holds a manifest file.
//! Invalid manifests are skipped with a warning and never abort the scan.
//! Identifiers are unique; when two plugins claim the same id the first one
//! found wins, so builtins always shadow external plugins.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::builtin::{BuiltinFactory, BuiltinPlugin};
use crate::manifest::{MANIFEST_FILE, PluginManifest, load_manifest};

/// Where a catalog entry's code comes from.
#[derive(Clone)]
pub enum PluginSource {
    /// Compiled into the host.
    Builtin(BuiltinFactory),
    /// Plugin directory under the external root.
    External(PathBuf),
}

impl std::fmt::Debug for PluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(_) => f.write_str("Builtin"),
            Self::External(dir) => f.debug_tuple("External").field(dir).finish(),
        }
    }
}

/// One discovered plugin.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub manifest: PluginManifest,
    pub source: PluginSource,
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// Plugin directory; `None` for builtins.
    pub fn root(&self) -> Option<&Path> {
        match &self.source {
            PluginSource::Builtin(_) => None,
            PluginSource::External(dir) => Some(dir),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.source, PluginSource::Builtin(_))
    }
}

/// The current set of discovered plugin manifests.
#[derive(Debug)]
pub struct PluginCatalog {
    builtins: Vec<BuiltinPlugin>,
    external_root: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl PluginCatalog {
    /// An empty catalog; call [`scan`](Self::scan) to populate it.
    pub fn new(builtins: Vec<BuiltinPlugin>, external_root: impl Into<PathBuf>) -> Self {
        Self {
            builtins,
            external_root: external_root.into(),
            entries: Vec::new(),
        }
    }

    /// Rebuilds the catalog. Returns the number of plugins found.
    pub fn scan(&mut self) -> usize {
        self.entries.clear();

        let builtins: Vec<CatalogEntry> = self
            .builtins
            .iter()
            .map(|builtin| CatalogEntry {
                manifest: builtin.manifest.clone(),
                source: PluginSource::Builtin(builtin.factory),
            })
            .collect();
        for entry in builtins {
            self.push(entry);
        }

        for dir in discover_plugin_dirs(&self.external_root) {
            match load_manifest(&dir) {
                Ok(manifest) => self.push(CatalogEntry {
                    manifest,
                    source: PluginSource::External(dir),
                }),
                Err(e) => warn!(dir = %dir.display(), error = %e, "plugin manifest invalid, skipped"),
            }
        }

        info!(
            count = self.entries.len(),
            root = %self.external_root.display(),
            "found plugins (builtin + external)"
        );
        self.entries.len()
    }

    fn push(&mut self, entry: CatalogEntry) {
        if let Some(existing) = self.get(entry.id()) {
            warn!(
                plugin = %entry.id(),
                kept = ?existing.root(),
                skipped = ?entry.root(),
                "duplicate plugin id, keeping the first"
            );
            return;
        }
        debug!(plugin = %entry.id(), kind = %entry.manifest.kind, "discovered plugin");
        self.entries.push(entry);
    }

    /// Entries in discovery order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.manifest.id == id)
    }

    pub fn ids(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.manifest.id.clone()).collect()
    }

    pub fn external_root(&self) -> &Path {
        &self.external_root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immediate subdirectories of `root` containing a manifest, sorted.
///
/// A missing or unreadable root yields nothing.
pub fn discover_plugin_dirs(root: &Path) -> Vec<PathBuf> {
    let read = match fs::read_dir(root) {
        Ok(read) => read,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "external plugin root not readable");
            return Vec::new();
        }
    };
    let mut dirs: Vec<PathBuf> = read
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join(MANIFEST_FILE).is_file())
        .collect();
    dirs.sort();
    dirs
}
