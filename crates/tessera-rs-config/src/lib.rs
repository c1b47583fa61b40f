//! Layered game balance configuration.
//!
//! This crate owns the config store used by the simulation: JSON domain files
//! merged into one tree, a runtime override layer, per-path change
//! notification, timestamp-based hot reload and domain validation.

mod error;
mod merge;
mod notifier;
mod path;
mod store;
mod validator;
mod value;
mod watch;

/// Public error type returned by config loading and mutation APIs.
pub use error::ConfigError;
/// Recursive object merge used to layer documents.
pub use merge::{merge_values, merged};
/// Change subscription types.
pub use notifier::{ChangeCallback, ChangeEvent, ChangeNotifier};
/// Dotted path parsing helpers.
pub use path::{ConfigPath, PATH_SEPARATOR, is_valid_path, join_path, split_path};
/// The config store and its file layout.
pub use store::{ConfigStore, ConfigStoreOptions, DEFAULTS_FILE, DOMAIN_FILES, default_document};
/// Domain validation.
pub use validator::{ValidationResult, ValidationSection, validate_all, validate_section};
/// Dynamic values and typed conversions.
pub use value::{
    ConfigSection, ConfigValue, FromConfigValue, empty_object, lookup, lookup_or, section_of,
};
/// Modification-time tracking.
pub use watch::FileWatchRegistry;
