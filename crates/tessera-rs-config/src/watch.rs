//! Modification-time tracking for hot reload polling.

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Last observed modification time per loaded config file.
#[derive(Debug, Clone, Default)]
pub struct FileWatchRegistry {
    timestamps: HashMap<String, SystemTime>,
}

impl FileWatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current modification time of `dir/filename`.
    ///
    /// Files whose metadata cannot be read are left untracked.
    pub fn record(&mut self, dir: &Path, filename: &str) {
        match modified_time(&dir.join(filename)) {
            Some(modified) => {
                self.timestamps.insert(filename.to_string(), modified);
            }
            None => debug!("unable to stat config file (file={filename})"),
        }
    }

    /// Files whose on-disk modification time is newer than the recorded one.
    ///
    /// Stat failures count as unchanged.
    pub fn changed_files(&self, dir: &Path) -> Vec<String> {
        let mut changed: Vec<String> = self
            .timestamps
            .iter()
            .filter(|(filename, recorded)| {
                modified_time(&dir.join(filename.as_str()))
                    .is_some_and(|current| current > **recorded)
            })
            .map(|(filename, _)| filename.clone())
            .collect();
        changed.sort();
        changed
    }

    /// Whether any tracked file changed on disk.
    pub fn has_changes(&self, dir: &Path) -> bool {
        !self.changed_files(dir).is_empty()
    }

    /// Recorded modification time for a tracked file.
    pub fn last_modified(&self, filename: &str) -> Option<SystemTime> {
        self.timestamps.get(filename).copied()
    }

    /// Whether a file is tracked.
    pub fn is_tracked(&self, filename: &str) -> bool {
        self.timestamps.contains_key(filename)
    }

    /// Tracked file names, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.timestamps.keys().cloned().collect();
        files.sort();
        files
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Forget every tracked file.
    pub fn clear(&mut self) {
        self.timestamps.clear();
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::FileWatchRegistry;
    use pretty_assertions::assert_eq;
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    #[test]
    fn detects_newer_modification_time() {
        let dir = tempdir().expect("dir");
        let path = dir.path().join("economics.json");
        fs::write(&path, "{}").expect("write");

        let mut registry = FileWatchRegistry::new();
        registry.record(dir.path(), "economics.json");
        assert!(registry.is_tracked("economics.json"));
        assert!(!registry.has_changes(dir.path()));

        let later = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(&path)
            .expect("open")
            .set_modified(later)
            .expect("touch");

        assert_eq!(registry.changed_files(dir.path()), vec!["economics.json".to_string()]);
    }

    #[test]
    fn missing_files_are_untracked_and_unchanged() {
        let dir = tempdir().expect("dir");
        let mut registry = FileWatchRegistry::new();
        registry.record(dir.path(), "missing.json");
        assert!(registry.is_empty());

        fs::write(dir.path().join("ui.json"), "{}").expect("write");
        registry.record(dir.path(), "ui.json");
        fs::remove_file(dir.path().join("ui.json")).expect("remove");
        assert!(!registry.has_changes(dir.path()));

        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
