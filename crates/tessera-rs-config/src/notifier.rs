//! Per-path change subscriptions.

use crate::value::ConfigValue;
use chrono::{DateTime, Utc};
use log::{debug, error};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// A single config change delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Dotted path that changed.
    pub path: String,
    /// Value before the change (`Null` when absent).
    pub old_value: ConfigValue,
    /// Value after the change (`Null` when removed).
    pub new_value: ConfigValue,
    /// When the change was applied.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Build an event stamped with the current time.
    pub fn new(path: impl Into<String>, old_value: ConfigValue, new_value: ConfigValue) -> Self {
        Self {
            path: path.into(),
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }
}

/// Callback invoked for changes on a subscribed path.
pub type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Callback table keyed by exact path.
///
/// The table has its own lock so subscribing never contends with config data
/// access. Callbacks run after the table lock is released, which lets them
/// register or unregister subscriptions themselves.
#[derive(Default)]
pub struct ChangeNotifier {
    callbacks: Mutex<HashMap<String, Vec<ChangeCallback>>>,
}

impl ChangeNotifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback for `path`. Several callbacks per path are allowed.
    pub fn register(&self, path: impl Into<String>, callback: ChangeCallback) {
        let path = path.into();
        debug!("registering change callback (path={path})");
        self.callbacks.lock().entry(path).or_default().push(callback);
    }

    /// Drop every callback registered for `path`.
    pub fn unregister(&self, path: &str) {
        debug!("unregistering change callbacks (path={path})");
        self.callbacks.lock().remove(path);
    }

    /// Drop all subscriptions.
    pub fn clear(&self) {
        self.callbacks.lock().clear();
    }

    /// Paths that currently have at least one callback.
    pub fn subscribed_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.callbacks.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of callbacks registered for `path`.
    pub fn callback_count(&self, path: &str) -> usize {
        self.callbacks.lock().get(path).map_or(0, Vec::len)
    }

    /// Deliver each event to the callbacks subscribed to its path, in order.
    ///
    /// A panicking callback is logged and does not stop delivery to the rest.
    pub fn dispatch(&self, events: &[ChangeEvent]) {
        for event in events {
            let callbacks = match self.callbacks.lock().get(&event.path) {
                Some(callbacks) => callbacks.clone(),
                None => continue,
            };
            for callback in callbacks {
                let outcome = catch_unwind(AssertUnwindSafe(|| callback(event)));
                if outcome.is_err() {
                    error!("config change callback panicked (path={})", event.path);
                }
            }
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("paths", &self.subscribed_paths())
            .finish()
    }
}
