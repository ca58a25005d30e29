use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use cogmind_graph::Run;

/// A parsed record as stored on disk; `None` marks a record that was read
/// successfully but carries no chartable run.
pub type Record = Option<(String, Run)>;

/// Parsed records keyed by file identity, one JSON file per record.
#[derive(Clone, Debug)]
pub struct RecordCache {
    dir: PathBuf,
}

impl RecordCache {
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn key(path: &Path) -> Result<String> {
        let meta =
            fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
        let size = meta.len();
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let dur = modified
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        let mtime = (dur.as_secs(), dur.subsec_nanos());

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        path.to_string_lossy().hash(&mut hasher);
        size.hash(&mut hasher);
        mtime.hash(&mut hasher);
        Ok(format!("{:016x}", hasher.finish()))
    }

    fn entry(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn get(&self, key: &str) -> Option<Record> {
        let text = fs::read_to_string(self.entry(key)).ok()?;
        serde_json::from_str(&text).ok()
    }

    pub fn put(&self, key: &str, record: &Record) -> Result<()> {
        let path = self.entry(key);
        let text = serde_json::to_string(record)?;
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))
    }
}
