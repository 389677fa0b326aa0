// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `cwplugin.json` files.

use std::fs;
use std::path::{Path, PathBuf};

use classwidgets_core::{ClassWidgetsError, PluginKind};
use serde::{Deserialize, Serialize};

/// File name of the manifest inside a plugin directory.
pub const MANIFEST_FILE: &str = "cwplugin.json";

/// Fields that must be present and non-empty, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 6] = ["id", "name", "version", "api_version", "entry", "author"];

/// Parsed plugin manifest. Immutable once the catalog produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique identifier, e.g. `com.example.weather`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// Host API requirement, e.g. `>=1.0` or `*`.
    pub api_version: String,
    /// Entry file relative to the plugin directory.
    pub entry: String,
    pub author: String,
    /// Icon path, resolved against the plugin directory for external plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Origin of the plugin.
    pub kind: PluginKind,
    /// Plugin directory; `None` for builtins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Raw `cwplugin.json` document. Required fields are optional here so that
/// a missing field produces a precise error instead of a serde message.
#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    entry: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl ManifestFile {
    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "id" => &self.id,
            "name" => &self.name,
            "version" => &self.version,
            "api_version" => &self.api_version,
            "entry" => &self.entry,
            "author" => &self.author,
            _ => return None,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

impl PluginManifest {
    /// Manifest for a plugin compiled into the host.
    pub fn builtin(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        api_version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            api_version: api_version.into(),
            entry: String::new(),
            author: author.into(),
            icon: None,
            description: None,
            url: None,
            kind: PluginKind::Builtin,
            path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.kind == PluginKind::Builtin
    }
}

/// Parse an external plugin manifest from JSON content.
///
/// `dir` is the plugin directory; it is stamped into the manifest and used
/// to resolve a relative icon.
pub fn parse_manifest(json: &str, dir: &Path) -> Result<PluginManifest, ClassWidgetsError> {
    let invalid = |reason: String| ClassWidgetsError::ManifestInvalid {
        path: dir.join(MANIFEST_FILE),
        reason,
    };

    let raw: ManifestFile =
        serde_json::from_str(json).map_err(|e| invalid(format!("not a manifest document: {e}")))?;

    for field in REQUIRED_FIELDS {
        if raw.field(field).is_none() {
            return Err(invalid(format!("missing required field `{field}`")));
        }
    }
    let required = |field: &str| raw.field(field).unwrap_or_default().to_string();

    let icon = raw
        .icon
        .as_deref()
        .filter(|icon| !icon.trim().is_empty())
        .map(|icon| dir.join(icon).to_string_lossy().into_owned());

    Ok(PluginManifest {
        id: required("id"),
        name: required("name"),
        version: required("version"),
        api_version: required("api_version"),
        entry: required("entry"),
        author: required("author"),
        icon,
        description: raw.description.clone(),
        url: raw.url.clone(),
        kind: PluginKind::External,
        path: Some(dir.to_path_buf()),
    })
}

/// Reads and parses `dir/cwplugin.json`.
pub fn load_manifest(dir: &Path) -> Result<PluginManifest, ClassWidgetsError> {
    let path = dir.join(MANIFEST_FILE);
    let json = fs::read_to_string(&path).map_err(|e| ClassWidgetsError::ManifestInvalid {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    parse_manifest(&json, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "id": "com.example.clock",
        "name": "Clock",
        "version": "1.2.0",
        "api_version": ">=1.0",
        "entry": "main.wasm",
        "author": "Example",
        "icon": "icon.png",
        "description": "Shows a clock",
        "homepage_color": "ignored"
    }"#;

    #[test]
    fn parse_valid_manifest() {
        let dir = Path::new("/plugins/clock");
        let manifest = parse_manifest(VALID, dir).unwrap();
        assert_eq!(manifest.id, "com.example.clock");
        assert_eq!(manifest.entry, "main.wasm");
        assert_eq!(manifest.kind, PluginKind::External);
        assert_eq!(manifest.path.as_deref(), Some(dir));
        assert_eq!(
            manifest.icon.as_deref(),
            Some(dir.join("icon.png").to_string_lossy().as_ref())
        );
        assert_eq!(manifest.description.as_deref(), Some("Shows a clock"));
        assert!(manifest.url.is_none());
    }

    #[test]
    fn each_required_field_is_enforced() {
        for field in REQUIRED_FIELDS {
            let mut doc: serde_json::Value = serde_json::from_str(VALID).unwrap();
            doc.as_object_mut().unwrap().remove(field);
            let err = parse_manifest(&doc.to_string(), Path::new("/p")).unwrap_err();
            assert!(
                err.to_string().contains(&format!("`{field}`")),
                "missing {field}: {err}"
            );
        }
    }

    #[test]
    fn blank_required_field_is_missing() {
        let json = VALID.replace("\"Example\"", "\"  \"");
        let err = parse_manifest(&json, Path::new("/p")).unwrap_err();
        assert!(err.to_string().contains("`author`"));
    }

    #[test]
    fn non_json_is_invalid() {
        let err = parse_manifest("id = 'toml'", Path::new("/p")).unwrap_err();
        assert!(matches!(err, ClassWidgetsError::ManifestInvalid { .. }));
    }

    #[test]
    fn builtin_manifest_has_no_path() {
        let manifest = PluginManifest::builtin("b", "B", "1.0.0", "*", "Host");
        assert!(manifest.is_builtin());
        assert!(manifest.path.is_none());
    }
}
