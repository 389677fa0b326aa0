// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `classwidgets config` subcommands.

use clap::Subcommand;
use classwidgets_config::{ConfigStore, SharedConfig};
use classwidgets_core::ClassWidgetsError;
use serde_json::Value;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the value at a dotted path, e.g. `preferences.opacity`.
    Get { path: String },
    /// Assign a value at a dotted path. Input that is not JSON is stored as a string.
    Set { path: String, value: String },
    /// Print the location of config.json.
    Path,
}

pub fn run_config(store: &SharedConfig, command: ConfigCommand) -> Result<(), ClassWidgetsError> {
    match command {
        ConfigCommand::Get { path } => {
            let value = read_value(&store.borrow(), &path)?;
            println!("{value}");
        }
        ConfigCommand::Set { path, value } => {
            let mut store = store.borrow_mut();
            store.set(&path, parse_value(&value))?;
            store.try_save()?;
            println!("{path} = {}", read_value(&store, &path)?);
        }
        ConfigCommand::Path => println!("{}", store.borrow().path().display()),
    }
    Ok(())
}

fn read_value(store: &ConfigStore, path: &str) -> Result<String, ClassWidgetsError> {
    let value = store
        .get(path)
        .ok_or_else(|| ClassWidgetsError::Config(format!("no value at `{path}`")))?;
    serde_json::to_string_pretty(&value).map_err(|e| ClassWidgetsError::Internal(e.to_string()))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::host::open_config;

    #[test]
    fn raw_text_becomes_a_string() {
        assert_eq!(parse_value("0.5"), json!(0.5));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("dark"), json!("dark"));
        assert_eq!(parse_value("[\"a\"]"), json!(["a"]));
    }

    #[test]
    fn set_persists_and_get_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_config(dir.path());

        run_config(
            &store,
            ConfigCommand::Set {
                path: "preferences.opacity".into(),
                value: "0.5".into(),
            },
        )
        .unwrap();

        let reopened = open_config(dir.path());
        assert_eq!(reopened.borrow().get("preferences.opacity"), Some(json!(0.5)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_config(dir.path());

        let err = run_config(
            &store,
            ConfigCommand::Set {
                path: "preferences.opacity".into(),
                value: "7".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ClassWidgetsError::Config(_)));
        assert_eq!(store.borrow().get("preferences.opacity"), Some(json!(1.0)));
    }

    #[test]
    fn unknown_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_config(dir.path());
        let err = read_value(&store.borrow(), "nope.nothing").unwrap_err();
        assert!(err.to_string().contains("nope.nothing"));
    }
}
