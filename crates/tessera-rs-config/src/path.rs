//! Dot-separated config paths such as `economics.tax.base_rate`.

use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// A validated, non-empty sequence of config keys.
///
/// Every segment is non-empty and made of ASCII alphanumerics or `_`, so the
/// textual form never has leading, trailing or doubled separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    segments: Vec<String>,
}

impl ConfigPath {
    /// Parse and validate a dotted path.
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        if !is_valid_path(path) {
            return Err(ConfigError::InvalidPath(path.to_string()));
        }
        Ok(Self {
            segments: path.split(PATH_SEPARATOR).map(str::to_string).collect(),
        })
    }

    /// Build a path from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || !segments.iter().all(|segment| is_valid_segment(segment)) {
            return Err(ConfigError::InvalidPath(segments.join(".")));
        }
        Ok(Self { segments })
    }

    /// Path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final key of the path.
    pub fn leaf(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments leading to the leaf.
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// Return a new path with `key` appended.
    pub fn child(&self, key: &str) -> Result<Self, ConfigError> {
        if !is_valid_segment(key) {
            return Err(ConfigError::InvalidPath(format!("{self}.{key}")));
        }
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Ok(Self { segments })
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_path(&self.segments))
    }
}

impl FromStr for ConfigPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split a dotted path into segments, rejecting malformed input.
pub fn split_path(path: &str) -> Result<Vec<String>, ConfigError> {
    ConfigPath::parse(path).map(|path| path.segments)
}

/// Join segments with the path separator.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

/// Check whether a dotted path is well formed.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.split(PATH_SEPARATOR).all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
