// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk fixtures: plugin directories, import archives, config stores.
//!
//! Helpers panic on I/O errors; they only run inside tests.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use classwidgets_config::{BuildInfo, CONFIG_FILE_NAME, ConfigStore};
use serde_json::{Value, json};
use zip::write::SimpleFileOptions;

/// File name of a plugin manifest.
pub const MANIFEST_FILE: &str = "cwplugin.json";

/// Host build used by fixture stores.
pub fn test_build() -> BuildInfo {
    BuildInfo::new("1.0.0", "test")
}

/// A config store rooted at `dir`, stamped with [`test_build`].
pub fn config_store(dir: &Path) -> ConfigStore {
    ConfigStore::new(dir, CONFIG_FILE_NAME, test_build())
}

/// A complete manifest accepting any host API.
pub fn manifest(id: &str, entry: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Plugin {id}"),
        "version": "0.1.0",
        "api_version": "*",
        "entry": entry,
        "author": "Test Author",
    })
}

/// Writes `files` plus a manifest into `root/dir_name` and returns the
/// plugin directory. File paths may contain `/`.
pub fn write_plugin(root: &Path, dir_name: &str, manifest: &Value, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(dir_name);
    fs::create_dir_all(&dir).expect("create plugin dir");
    let text = serde_json::to_string_pretty(manifest).expect("serialize manifest");
    fs::write(dir.join(MANIFEST_FILE), text).expect("write manifest");
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, content).expect("write plugin file");
    }
    dir
}

/// Writes a zip archive at `path`. Names ending in `/` become directories.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let file = File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).expect("add directory");
        } else {
            zip.start_file(*name, options).expect("start file");
            zip.write_all(content.as_bytes()).expect("write file");
        }
    }
    zip.finish().expect("finish archive");
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_plugin_creates_manifest_and_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = write_plugin(
            dir.path(),
            "demo",
            &manifest("demo", "main.wat"),
            &[("main.wat", "(module)"), ("libs/helper.wat", "(module)")],
        );
        assert!(plugin.join(MANIFEST_FILE).is_file());
        assert!(plugin.join("libs/helper.wat").is_file());
    }

    #[test]
    fn write_zip_produces_readable_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_zip(&dir.path().join("a.zip"), &[("foo/", ""), ("foo/x.txt", "hi")]);
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
    }
}
