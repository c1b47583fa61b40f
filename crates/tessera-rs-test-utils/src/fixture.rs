use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Temporary config directory populated with JSON documents.
#[derive(Debug)]
pub struct ConfigFixture {
    dir: TempDir,
    touches: AtomicU64,
}

impl ConfigFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp config dir"),
            touches: AtomicU64::new(0),
        }
    }

    pub fn with_file(self, name: &str, document: Value) -> Self {
        self.write(name, &document);
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, document: &Value) {
        let contents = serde_json::to_string_pretty(document).expect("encode document");
        self.write_raw(name, &contents);
    }

    pub fn write_raw(&self, name: &str, contents: &str) {
        fs::write(self.file_path(name), contents).expect("write config file");
    }

    pub fn read(&self, name: &str) -> Value {
        let contents = fs::read_to_string(self.file_path(name)).expect("read config file");
        serde_json::from_str(&contents).expect("decode config file")
    }

    /// Rewrite a document and push its modification time forward, so polling
    /// sees it as changed even on coarse-grained filesystems.
    pub fn update(&self, name: &str, document: &Value) {
        self.write(name, document);
        self.touch(name);
    }

    /// Move a file's modification time forward by a distinct amount on every call.
    pub fn touch(&self, name: &str) {
        let step = self.touches.fetch_add(1, Ordering::SeqCst) + 1;
        let modified = SystemTime::now() + Duration::from_secs(10 * step);
        File::options()
            .write(true)
            .open(self.file_path(name))
            .expect("open config file")
            .set_modified(modified)
            .expect("set modification time");
    }
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}
