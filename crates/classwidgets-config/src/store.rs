// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration store: owns the tree, persists it, and raises events.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chrono::NaiveDate;
use classwidgets_core::{ClassWidgetsError, ConfigEvent, Signal};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::loader::{self, CONFIG_FILE_NAME};
use crate::model::RootConfig;
use crate::node::{ChangeSink, ConfigNode};
use crate::path;
use crate::shared::SharedConfig;
use crate::validation::{self, RESCHEDULE_DATE_FORMAT};

/// Interval of the periodic saver.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

/// Version and channel of the running build.
///
/// A persisted tree written by a different build is re-stamped on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub channel: String,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            channel: channel.into(),
        }
    }

    /// The build this binary was compiled as.
    pub fn current() -> Self {
        Self::new(crate::BUILD_VERSION, crate::BUILD_CHANNEL)
    }
}

/// Observers of a store, with an optional delivery queue.
///
/// A standalone store delivers each event inside the mutating call. Once the
/// store is wrapped in a [`SharedConfig`], events are queued and delivered
/// after the mutable borrow ends, so observers may use the store freely.
#[derive(Default)]
pub(crate) struct ConfigEvents {
    signal: Signal<ConfigEvent>,
    pending: RefCell<VecDeque<ConfigEvent>>,
    deferred: Cell<bool>,
}

impl ConfigEvents {
    pub(crate) fn raise(&self, event: ConfigEvent) {
        if self.deferred.get() {
            self.pending.borrow_mut().push_back(event);
        } else {
            self.signal.emit(&event);
        }
    }

    pub(crate) fn defer(&self) {
        self.deferred.set(true);
    }

    /// Delivers queued events in order. Events raised by observers while
    /// flushing are delivered by the same loop.
    pub(crate) fn flush(&self) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(event) => self.signal.emit(&event),
                None => break,
            }
        }
    }
}

/// Owns the configuration tree and its persisted form.
///
/// The store is confined to the UI thread. Hosts share it as a
/// [`SharedConfig`]; observers connected through [`ConfigStore::subscribe`]
/// then run after the mutating borrow is released.
///
/// Values taken from `CLASSWIDGETS_*` environment overrides live in the
/// tree but are never written back: [`ConfigStore::try_save`] persists the
/// file's own value for each overridden path until that path is assigned
/// through [`ConfigStore::set`].
pub struct ConfigStore {
    dir: PathBuf,
    file_name: String,
    build: BuildInfo,
    root: RootConfig,
    sink: ChangeSink,
    events: Rc<ConfigEvents>,
    masked: Vec<(String, Value)>,
}

impl ConfigStore {
    /// Creates a store holding the default tree. Nothing is read until
    /// [`ConfigStore::load`].
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>, build: BuildInfo) -> Self {
        let events = Rc::new(ConfigEvents::default());
        let sink_events = Rc::clone(&events);
        let sink = ChangeSink::new(move || sink_events.raise(ConfigEvent::Changed));

        let mut root = RootConfig::for_build(&build.version, &build.channel);
        root.bind(&sink);

        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            build,
            root,
            sink,
            events,
            masked: Vec::new(),
        }
    }

    /// Wraps the store for sharing on the UI thread.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self)
    }

    pub(crate) fn events(&self) -> &Rc<ConfigEvents> {
        &self.events
    }

    /// Store for `config.json` in `dir`, stamped with the current build.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, CONFIG_FILE_NAME, BuildInfo::current())
    }

    /// Full path of the persisted file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn build(&self) -> &BuildInfo {
        &self.build
    }

    /// Read access to the tree.
    pub fn config(&self) -> &RootConfig {
        &self.root
    }

    /// The sink every node of the tree is bound to.
    pub fn sink(&self) -> &ChangeSink {
        &self.sink
    }

    /// Registers an observer for store events.
    pub fn subscribe(&self, observer: impl Fn(&ConfigEvent) + 'static) {
        self.events.signal.connect(observer);
    }

    /// Dotted paths whose value came from the environment and is not saved.
    pub fn env_overridden(&self) -> impl Iterator<Item = &str> {
        self.masked.iter().map(|(path, _)| path.as_str())
    }

    /// Loads the persisted tree, then saves it back.
    ///
    /// A missing, unreadable, or invalid file leaves the default tree in
    /// place and is only logged. Reschedule entries dated before today are
    /// discarded.
    pub fn load(&mut self) {
        self.load_as_of(chrono::Local::now().date_naive());
    }

    /// [`ConfigStore::load`] with an explicit notion of today.
    pub fn load_as_of(&mut self, today: NaiveDate) {
        let path = self.path();
        match self.read(&path) {
            Ok(mut root) => {
                if root.app.version != self.build.version || root.app.channel != self.build.channel
                {
                    warn!(
                        found_version = %root.app.version,
                        found_channel = %root.app.channel,
                        version = %self.build.version,
                        channel = %self.build.channel,
                        "config written by another build, updating"
                    );
                    root.app.version = self.build.version.clone();
                    root.app.channel = self.build.channel.clone();
                }
                root.bind(&self.sink);
                self.root = root;
                self.masked = Self::env_masks(&path);
                self.clean_outdated_reschedules(today);
                info!(path = %path.display(), "config loaded");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            }
        }
        self.events.raise(ConfigEvent::Reloaded);
        self.save(false);
    }

    /// Pairs every environment-overridden path with its persisted value.
    fn env_masks(path: &Path) -> Vec<(String, Value)> {
        let overrides = match loader::env_overrides() {
            Ok(overrides) => overrides,
            Err(e) => {
                warn!(error = %e, "failed to read environment overrides");
                return Vec::new();
            }
        };
        let overridden = path::leaves(&overrides);
        if overridden.is_empty() {
            return Vec::new();
        }

        let persisted = loader::load_persisted(path)
            .ok()
            .and_then(|root| serde_json::to_value(root).ok())
            .unwrap_or(Value::Null);
        overridden
            .into_iter()
            .filter_map(|leaf| {
                let value = path::lookup(&persisted, &leaf)?.clone();
                debug!(path = %leaf, "config value overridden from environment");
                Some((leaf, value))
            })
            .collect()
    }

    fn read(&self, path: &Path) -> Result<RootConfig, ClassWidgetsError> {
        let root = loader::load_config_from_path(path)
            .map_err(|e| ClassWidgetsError::Config(e.to_string()))?;
        validation::validate_config(&root)
            .map_err(|errors| ClassWidgetsError::Config(validation::describe(&errors)))?;
        Ok(root)
    }

    /// Writes the tree to disk, logging instead of returning failures.
    ///
    /// Returns true on success. `silent` suppresses the success log line.
    pub fn save(&self, silent: bool) -> bool {
        match self.try_save() {
            Ok(()) => {
                if !silent {
                    info!(path = %self.path().display(), "config saved");
                }
                true
            }
            Err(e) => {
                error!(error = %e, "failed to save config");
                false
            }
        }
    }

    /// Writes the tree to disk as 4-space indented JSON.
    ///
    /// The document is written to a sibling temporary file first and renamed
    /// over the target, so a crash never leaves a truncated file behind.
    pub fn try_save(&self) -> Result<(), ClassWidgetsError> {
        let path = self.path();
        fs::create_dir_all(&self.dir).map_err(|e| ClassWidgetsError::persistence(&self.dir, e))?;

        let persisted = self.persisted_tree()?;
        let root = persisted.as_ref().unwrap_or(&self.root);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        root.serialize(&mut ser)
            .map_err(|e| ClassWidgetsError::persistence(&path, e))?;
        buf.push(b'\n');

        let tmp = self.dir.join(format!("{}.tmp", self.file_name));
        fs::write(&tmp, &buf).map_err(|e| ClassWidgetsError::persistence(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| ClassWidgetsError::persistence(&path, e))?;
        Ok(())
    }

    /// The tree with environment overrides swapped for their persisted
    /// values, or `None` when nothing is overridden.
    fn persisted_tree(&self) -> Result<Option<RootConfig>, ClassWidgetsError> {
        if self.masked.is_empty() {
            return Ok(None);
        }
        let mut doc = serde_json::to_value(&self.root)
            .map_err(|e| ClassWidgetsError::Internal(format!("serializing config: {e}")))?;
        for (masked, value) in &self.masked {
            path::assign(&mut doc, masked, value.clone())
                .map_err(|e| ClassWidgetsError::Internal(format!("restoring `{masked}`: {e}")))?;
        }
        serde_json::from_value(doc)
            .map(Some)
            .map_err(|e| ClassWidgetsError::Internal(format!("restoring persisted values: {e}")))
    }

    /// Mutable access to the tree. The sink fires once when the guard drops.
    ///
    /// Sections replaced through the guard are rebound before the sink fires.
    pub fn edit(&mut self) -> ConfigGuard<'_> {
        ConfigGuard { store: self }
    }

    /// Reads the value at a dotted path of the serialized tree.
    pub fn get(&self, path: &str) -> Option<Value> {
        let doc = serde_json::to_value(&self.root).ok()?;
        path::lookup(&doc, path).cloned()
    }

    /// Assigns `value` at a dotted path.
    ///
    /// The whole tree is re-validated; on failure nothing changes and no
    /// event is raised. On success the sink fires exactly once, followed by
    /// [`ConfigEvent::PathSet`]. An assigned path is persisted even if the
    /// environment overrode it.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), ClassWidgetsError> {
        let mut doc = serde_json::to_value(&self.root)
            .map_err(|e| ClassWidgetsError::Internal(format!("serializing config: {e}")))?;
        path::assign(&mut doc, path, value.clone()).map_err(ClassWidgetsError::Config)?;

        let mut updated: RootConfig = serde_json::from_value(doc)
            .map_err(|e| ClassWidgetsError::Config(format!("invalid value for `{path}`: {e}")))?;
        validation::validate_config(&updated)
            .map_err(|errors| ClassWidgetsError::Config(validation::describe(&errors)))?;

        updated.bind(&self.sink);
        self.root = updated;
        let nested = format!("{path}.");
        self.masked
            .retain(|(masked, _)| masked != path && !masked.starts_with(&nested));
        debug!(path, "config value set");

        self.root.notify_changed();
        self.events.raise(ConfigEvent::PathSet {
            path: path.to_string(),
            value,
        });
        Ok(())
    }

    /// Removes reschedule entries dated strictly before `today`.
    ///
    /// Dates compare as `YYYY-MM-DD` strings. Returns how many were removed.
    pub fn clean_outdated_reschedules(&mut self, today: NaiveDate) -> usize {
        let today = today.format(RESCHEDULE_DATE_FORMAT).to_string();
        let days = &mut self.root.schedule.reschedule_day;
        let before = days.len();
        days.retain(|date, _| date.as_str() >= today.as_str());
        let removed = before - days.len();
        if removed > 0 {
            info!(removed, "discarded outdated reschedule entries");
        }
        removed
    }

    /// Settings document stored for a plugin.
    pub fn plugin_config(&self, plugin_id: &str) -> Option<&Value> {
        self.root.plugins.configs.get(plugin_id)
    }

    /// Replaces the settings document of a plugin and fires the sink.
    pub fn put_plugin_config(&mut self, plugin_id: &str, value: Value) {
        self.root
            .plugins
            .configs
            .insert(plugin_id.to_string(), value);
        self.root.plugins.notify_changed();
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path())
            .field("build", &self.build)
            .finish_non_exhaustive()
    }
}

/// Scoped mutable access to the tree; see [`ConfigStore::edit`].
pub struct ConfigGuard<'a> {
    store: &'a mut ConfigStore,
}

impl Deref for ConfigGuard<'_> {
    type Target = RootConfig;

    fn deref(&self) -> &RootConfig {
        &self.store.root
    }
}

impl DerefMut for ConfigGuard<'_> {
    fn deref_mut(&mut self) -> &mut RootConfig {
        &mut self.store.root
    }
}

impl Drop for ConfigGuard<'_> {
    fn drop(&mut self) {
        let sink = self.store.sink.clone();
        self.store.root.bind(&sink);
        sink.notify();
    }
}

/// Spawns the periodic saver on the current `LocalSet`.
///
/// Every `period` the store is saved silently. A tick that finds the store
/// borrowed is skipped.
pub fn spawn_autosave(store: &SharedConfig, period: Duration) -> tokio::task::JoinHandle<()> {
    let store = store.clone();
    tokio::task::spawn_local(async move {
        let start = tokio::time::Instant::now() + period;
        let mut ticker = tokio::time::interval_at(start, period);
        loop {
            ticker.tick().await;
            match store.try_borrow() {
                Ok(store) => {
                    store.save(true);
                }
                Err(_) => debug!("config store busy, autosave skipped"),
            }
        }
    })
}
