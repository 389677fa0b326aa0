// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted-path navigation over the serialized configuration tree.
//!
//! Segments address object keys; a numeric segment addresses an array
//! element. `preferences.widgets_presets.default.0.type_id` is a valid path.

use serde_json::Value;

fn segments(path: &str) -> Result<Vec<&str>, String> {
    if path.is_empty() {
        return Err("empty path".to_string());
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(format!("malformed path `{path}`"));
    }
    Ok(parts)
}

fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get_mut(index),
            Err(_) => None,
        },
        _ => None,
    }
}

/// Resolves `path` inside `doc`.
pub(crate) fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path)
        .ok()?
        .into_iter()
        .try_fold(doc, |node, segment| step(node, segment))
}

/// Writes `value` at `path` inside `doc`.
///
/// Every segment but the last must already exist. The last segment may add a
/// new key to an object; whether that key is allowed is decided when the
/// document is deserialized back into the typed tree.
pub(crate) fn assign(doc: &mut Value, path: &str, value: Value) -> Result<(), String> {
    let parts = segments(path)?;
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| format!("malformed path `{path}`"))?;

    let mut node = doc;
    for (depth, segment) in parents.iter().enumerate() {
        node = step_mut(node, segment).ok_or_else(|| {
            format!("unknown path segment `{}`", parents[..=depth].join("."))
        })?;
    }

    match node {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            match last.parse::<usize>().ok().filter(|i| *i < items.len()) {
                Some(index) => {
                    items[index] = value;
                    Ok(())
                }
                None => Err(format!("index `{last}` out of range in `{path}`")),
            }
        }
        _ => Err(format!("`{path}` does not address a field")),
    }
}

/// Dotted paths of every non-object value in `doc`, in key order.
pub(crate) fn leaves(doc: &Value) -> Vec<String> {
    fn walk(node: &Value, prefix: &str, out: &mut Vec<String>) {
        match node {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    let path = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    walk(child, &path, out);
                }
            }
            _ if !prefix.is_empty() => out.push(prefix.to_string()),
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(doc, "", &mut out);
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn leaves_lists_nested_scalars() {
        let doc = json!({"app": {"debug_mode": true}, "schedule": {"preparation_time": 5}});
        assert_eq!(leaves(&doc), vec!["app.debug_mode", "schedule.preparation_time"]);
        assert!(leaves(&json!({})).is_empty());
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        assert_eq!(lookup(&doc, "a.b.1.c"), Some(&json!(2)));
        assert_eq!(lookup(&doc, "a.x"), None);
        assert_eq!(lookup(&doc, "a.b.9"), None);
        assert_eq!(lookup(&doc, ""), None);
        assert_eq!(lookup(&doc, "a..b"), None);
    }

    #[test]
    fn assign_inserts_and_replaces() {
        let mut doc = json!({"a": {"b": [0, 1]}});
        assign(&mut doc, "a.c", json!("new")).unwrap();
        assign(&mut doc, "a.b.1", json!(5)).unwrap();
        assert_eq!(doc, json!({"a": {"b": [0, 5], "c": "new"}}));
    }

    #[test]
    fn assign_rejects_missing_parents() {
        let mut doc = json!({"a": {}});
        let err = assign(&mut doc, "a.b.c", json!(1)).unwrap_err();
        assert!(err.contains("a.b"), "{err}");
        assert!(assign(&mut doc, "a.b.c", json!(1)).is_err());
        assert_eq!(doc, json!({"a": {}}));
    }

    #[test]
    fn assign_rejects_scalar_parent() {
        let mut doc = json!({"a": 1});
        assert!(assign(&mut doc, "a.b", json!(1)).is_err());
    }
}
