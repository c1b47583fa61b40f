//! Layered config store with overrides, hot reload and change notification.
//!
//! The store keeps two layers: `base`, rebuilt from the domain files on every
//! load, and `overrides`, which accumulates runtime changes until shutdown.
//! Readers only ever see the merged view, which is recomputed from the two
//! layers after each mutation.
//!
//! Locking: config data sits behind one reader-writer lock and the callback
//! table behind its own mutex. Mutations collect their change events while
//! holding the data lock and dispatch them only after it is released, so a
//! callback may call back into any store API.

mod files;


pub use files::{DEFAULTS_FILE, DOMAIN_FILES, default_document};

use crate::merge::{merge_values, merged};
use crate::notifier::{ChangeCallback, ChangeEvent, ChangeNotifier};
use crate::path::ConfigPath;
use crate::validator::{self, ValidationResult};
use crate::value::{ConfigSection, ConfigValue, FromConfigValue, empty_object, lookup, section_of};
use crate::watch::FileWatchRegistry;
use crate::ConfigError;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options controlling store behavior.
#[derive(Debug, Clone)]
pub struct ConfigStoreOptions {
    /// Whether `check_for_updates` polls the tracked files.
    pub hot_reload: bool,
    /// Whether `validate_all_configs` logs its findings.
    pub validation_logging: bool,
    /// Domain files loaded on initialize/reload, lowest precedence first.
    pub domain_files: Vec<String>,
}

impl Default for ConfigStoreOptions {
    fn default() -> Self {
        Self {
            hot_reload: true,
            validation_logging: true,
            domain_files: DOMAIN_FILES.iter().map(|file| file.to_string()).collect(),
        }
    }
}

impl ConfigStoreOptions {
    /// Replace the domain file list.
    pub fn with_domain_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable hot reload polling.
    pub fn with_hot_reload(mut self, enabled: bool) -> Self {
        self.hot_reload = enabled;
        self
    }
}

#[derive(Debug)]
struct StoreState {
    config_dir: Option<PathBuf>,
    base: ConfigValue,
    overrides: ConfigValue,
    merged: ConfigValue,
    watch: FileWatchRegistry,
    loaded_files: Vec<String>,
    last_reload: Option<DateTime<Utc>>,
    initialized: bool,
    hot_reload: bool,
    validation_logging: bool,
}

impl StoreState {
    fn new(options: &ConfigStoreOptions) -> Self {
        Self {
            config_dir: None,
            base: empty_object(),
            overrides: empty_object(),
            merged: empty_object(),
            watch: FileWatchRegistry::new(),
            loaded_files: Vec::new(),
            last_reload: None,
            initialized: false,
            hot_reload: options.hot_reload,
            validation_logging: options.validation_logging,
        }
    }

    fn rebuild_merged(&mut self) {
        self.merged = merged(&self.base, &self.overrides);
    }

    /// Rebuild `base` from the domain files in order.
    fn load_all(&mut self, dir: &Path, files: &[String]) {
        self.base = empty_object();
        self.watch.clear();
        self.loaded_files.clear();
        for filename in files {
            self.load_file(dir, filename);
        }
        self.rebuild_merged();
    }

    fn load_file(&mut self, dir: &Path, filename: &str) {
        let path = dir.join(filename);
        if !path.exists() {
            if filename != DEFAULTS_FILE {
                info!("optional config file not found (file={filename})");
                return;
            }
            if let Err(err) = files::write_document(&path, &default_document()) {
                error!("failed to create default config (path={}): {err}", path.display());
                return;
            }
            info!("created default config (path={})", path.display());
        }

        match files::read_document(&path) {
            Ok(document) => {
                merge_values(&mut self.base, &document);
                self.watch.record(dir, filename);
                self.loaded_files.push(filename.to_string());
                info!("loaded config file (file={filename})");
            }
            Err(err) => {
                error!("failed to load config file (file={filename}): {err}");
            }
        }
    }
}

/// Shared, thread-safe configuration store.
pub struct ConfigStore {
    domain_files: Vec<String>,
    state: RwLock<StoreState>,
    notifier: ChangeNotifier,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("ConfigStore")
            .field("config_dir", &state.config_dir)
            .field("initialized", &state.initialized)
            .field("loaded_files", &state.loaded_files)
            .finish()
    }
}

impl ConfigStore {
    /// Create an uninitialized store with default options.
    pub fn new() -> Self {
        Self::with_options(ConfigStoreOptions::default())
    }

    /// Create an uninitialized store with explicit options.
    pub fn with_options(options: ConfigStoreOptions) -> Self {
        Self {
            state: RwLock::new(StoreState::new(&options)),
            domain_files: options.domain_files,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Create the config directory if needed and load every domain file.
    ///
    /// A second call while initialized is a no-op. Individual files that are
    /// missing or malformed are skipped; only failing to create the directory
    /// is an error.
    pub fn initialize(&self, dir: impl AsRef<Path>) -> Result<(), ConfigError> {
        let dir = dir.as_ref();
        let mut state = self.state.write();
        if state.initialized {
            warn!("config store already initialized, skipping (dir={})", dir.display());
            return Ok(());
        }

        fs::create_dir_all(dir)?;
        state.load_all(dir, &self.domain_files);
        state.config_dir = Some(dir.to_path_buf());
        state.initialized = true;
        state.last_reload = Some(Utc::now());
        info!(
            "config store initialized (dir={}, files={})",
            dir.display(),
            state.loaded_files.len()
        );
        Ok(())
    }

    /// Drop all layers, file tracking and subscriptions.
    ///
    /// The store can be initialized again afterwards.
    pub fn shutdown(&self) {
        let mut state = self.state.write();
        if !state.initialized {
            return;
        }
        self.notifier.clear();
        state.base = empty_object();
        state.overrides = empty_object();
        state.merged = empty_object();
        state.watch.clear();
        state.loaded_files.clear();
        state.config_dir = None;
        state.last_reload = None;
        state.initialized = false;
        info!("config store shut down");
    }

    /// Whether `initialize` has completed and `shutdown` has not been called since.
    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// Resolve `path` in the merged view and convert it, or return `default`.
    ///
    /// Before initialization the layers are empty, so defaults come back
    /// unless values were set explicitly.
    pub fn get_value<T: FromConfigValue>(&self, path: &str, default: T) -> T {
        match self.get_raw(path) {
            Some(value) => T::from_config_value(&value).unwrap_or_else(|| {
                debug!("config value has unexpected type, using default (path={path})");
                default
            }),
            None => default,
        }
    }

    /// Raw merged value at `path`.
    pub fn get_raw(&self, path: &str) -> Option<ConfigValue> {
        let path = match ConfigPath::parse(path) {
            Ok(path) => path,
            Err(err) => {
                warn!("{err}");
                return None;
            }
        };
        let state = self.state.read();
        if !state.initialized {
            debug!("config store read before initialize (path={path})");
        }
        let value = lookup(&state.merged, &path).cloned();
        if value.is_none() {
            debug!("config path not found (path={path})");
        }
        value
    }

    /// Whether `path` resolves in the merged view.
    pub fn has_key(&self, path: &str) -> bool {
        self.get_raw(path).is_some()
    }

    /// Immediate children of the object at `path`; empty when missing or not an object.
    pub fn get_section(&self, path: &str) -> ConfigSection {
        let state = self.state.read();
        let section = section_of(&state.merged, path);
        if section.is_empty() {
            debug!("config section empty or missing (path={path})");
        }
        section
    }

    /// Whether `path` resolves to an object.
    pub fn has_section(&self, path: &str) -> bool {
        self.get_raw(path).is_some_and(|value| value.is_object())
    }

    /// Top-level section names of the merged view, sorted.
    pub fn sections(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state
            .merged
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Set one override value.
    pub fn set_value(&self, path: &str, value: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        self.set_values([(path.to_string(), value.into())])
    }

    /// Set one floating point override, rejecting NaN and infinities.
    pub fn set_float(&self, path: &str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NonFiniteValue(path.to_string()));
        }
        self.set_value(path, value)
    }

    /// Apply a batch of override values and notify subscribers.
    ///
    /// Every path is validated before anything is applied, so a malformed
    /// path rejects the whole batch. Intermediate objects are created as
    /// needed; a non-object value in the way is replaced by an object. Each
    /// subscriber of a set path receives the previous override value (or
    /// `Null`) and the new one, after the data lock has been released.
    pub fn set_values<I, K>(&self, values: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, ConfigValue)>,
        K: AsRef<str>,
    {
        let entries = values
            .into_iter()
            .map(|(path, value)| ConfigPath::parse(path.as_ref()).map(|path| (path, value)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        if entries.is_empty() {
            return Ok(());
        }

        let events = {
            let mut state = self.state.write();
            let mut events = Vec::with_capacity(entries.len());
            for (path, value) in entries {
                let parent = object_at(&mut state.overrides, path.parent_segments());
                let old_value = parent
                    .insert(path.leaf().to_string(), value.clone())
                    .unwrap_or(Value::Null);
                debug!("config override set (path={path}, value={value})");
                events.push(ChangeEvent::new(path.to_string(), old_value, value));
            }
            state.rebuild_merged();
            events
        };

        self.notifier.dispatch(&events);
        Ok(())
    }

    /// Merge a document into the override layer.
    ///
    /// Subscribers of paths whose merged value changed are notified.
    pub fn load_config_override(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let document = files::read_document(path).inspect_err(|err| {
            error!("failed to load config override (path={}): {err}", path.display());
        })?;

        let watched = self.notifier.subscribed_paths();
        let events = {
            let mut state = self.state.write();
            let previous = state.merged.clone();
            merge_values(&mut state.overrides, &document);
            state.rebuild_merged();
            diff_watched(&previous, &state.merged, &watched)
        };
        info!("loaded config override (path={})", path.display());

        self.notifier.dispatch(&events);
        Ok(())
    }

    /// Reload if hot reload is on and any tracked file changed on disk.
    ///
    /// Returns whether a reload happened.
    pub fn check_for_updates(&self) -> bool {
        let changed = {
            let state = self.state.read();
            if !state.hot_reload || !state.initialized {
                return false;
            }
            match state.config_dir.as_deref() {
                Some(dir) => state.watch.changed_files(dir),
                None => return false,
            }
        };
        if changed.is_empty() {
            return false;
        }

        info!("config files modified, reloading (files={})", changed.join(","));
        self.reload_configs()
    }

    /// Rebuild the base layer from disk, keeping overrides.
    ///
    /// Subscribers of paths whose merged value differs after the reload are
    /// notified with the old and new merged values. Returns `false` when the
    /// store is not initialized.
    pub fn reload_configs(&self) -> bool {
        let watched = self.notifier.subscribed_paths();
        let events = {
            let mut state = self.state.write();
            let Some(dir) = state.config_dir.clone().filter(|_| state.initialized) else {
                warn!("cannot reload configs, store not initialized");
                return false;
            };
            let previous = state.merged.clone();
            state.load_all(&dir, &self.domain_files);
            state.last_reload = Some(Utc::now());
            info!("config reloaded (files={})", state.loaded_files.len());
            diff_watched(&previous, &state.merged, &watched)
        };

        self.notifier.dispatch(&events);
        true
    }

    /// Write the merged view as pretty-printed JSON.
    pub fn save_current_config(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let state = self.state.read();
        files::write_document(path, &state.merged).inspect_err(|err| {
            error!("failed to save config (path={}): {err}", path.display());
        })?;
        info!("config saved (path={})", path.display());
        Ok(())
    }

    /// Export the merged view for inspection.
    pub fn export_merged_config(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        self.save_current_config(path)
    }

    /// Validate every section of the merged view.
    pub fn validate_all_configs(&self) -> ValidationResult {
        let state = self.state.read();
        let result = validator::validate_all(&state.merged);
        if state.validation_logging {
            result.log();
        }
        result
    }

    /// Validate one named section of the merged view.
    pub fn validate_section(&self, section: &str) -> Result<ValidationResult, ConfigError> {
        let state = self.state.read();
        validator::validate_section(&state.merged, section)
    }

    /// Subscribe to changes of an exact path.
    pub fn register_change_callback<F>(&self, path: impl Into<String>, callback: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let callback: ChangeCallback = Arc::new(callback);
        self.notifier.register(path, callback);
    }

    /// Remove every callback subscribed to `path`.
    pub fn unregister_change_callback(&self, path: &str) {
        self.notifier.unregister(path);
    }

    /// Remove all subscriptions.
    pub fn clear_change_callbacks(&self) {
        self.notifier.clear();
    }

    /// Turn hot reload polling on or off.
    pub fn enable_hot_reload(&self, enabled: bool) {
        self.state.write().hot_reload = enabled;
        info!("hot reload {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether hot reload polling is on.
    pub fn is_hot_reload_enabled(&self) -> bool {
        self.state.read().hot_reload
    }

    /// Turn logging of validation findings on or off.
    pub fn enable_validation_logging(&self, enabled: bool) {
        self.state.write().validation_logging = enabled;
    }

    /// Files loaded by the last initialize/reload, in load order.
    pub fn loaded_files(&self) -> Vec<String> {
        self.state.read().loaded_files.clone()
    }

    /// Files tracked for hot reload, sorted.
    pub fn tracked_files(&self) -> Vec<String> {
        self.state.read().watch.files()
    }

    /// When the base layer was last (re)loaded.
    pub fn last_reload_time(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_reload
    }

    /// Number of top-level sections in the merged view.
    pub fn config_size(&self) -> usize {
        self.state.read().merged.as_object().map_or(0, Map::len)
    }

    /// Directory passed to `initialize`.
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.state.read().config_dir.clone()
    }

    /// Copy of the merged view.
    pub fn merged_snapshot(&self) -> ConfigValue {
        self.state.read().merged.clone()
    }

    /// Copy of the override layer.
    pub fn overrides_snapshot(&self) -> ConfigValue {
        self.state.read().overrides.clone()
    }
}

/// Walk `segments` from `root`, creating objects along the way.
fn object_at<'a>(
    root: &'a mut ConfigValue,
    segments: &[String],
) -> &'a mut Map<String, ConfigValue> {
    let mut node = ensure_object(root);
    for key in segments {
        node = ensure_object(node.entry(key.clone()).or_insert_with(empty_object));
    }
    node
}

fn ensure_object(node: &mut ConfigValue) -> &mut Map<String, ConfigValue> {
    if !node.is_object() {
        *node = empty_object();
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was replaced with an object"),
    }
}

/// Change events for watched paths whose value differs between two trees.
fn diff_watched(before: &ConfigValue, after: &ConfigValue, watched: &[String]) -> Vec<ChangeEvent> {
    watched
        .iter()
        .filter_map(|raw| {
            let path = ConfigPath::parse(raw).ok()?;
            let old_value = lookup(before, &path).cloned().unwrap_or(Value::Null);
            let new_value = lookup(after, &path).cloned().unwrap_or(Value::Null);
            (old_value != new_value).then(|| ChangeEvent::new(raw.clone(), old_value, new_value))
        })
        .collect()
}
