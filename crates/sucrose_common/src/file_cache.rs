use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Source files read during a compilation, kept around so errors can quote them afterwards.
#[derive(Clone, Debug, Default)]
pub struct FileCache {
    files: BTreeMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        FileCache {
            files: BTreeMap::new(),
        }
    }

    pub fn read(&mut self, path: impl AsRef<Path>) -> io::Result<&str> {
        let canonical = path.as_ref().canonicalize()?;
        let content = match self.files.entry(canonical) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                let content = fs::read_to_string(entry.key())?;
                entry.insert(content)
            }
        };
        Ok(content)
    }

    /// Looks up a file that was previously `read`. Returns `None` for files the cache has never
    /// seen.
    pub fn read_cached(&self, path: impl AsRef<Path>) -> Option<&str> {
        let canonical = path.as_ref().canonicalize().ok()?;
        self.files.get(&canonical).map(String::as_str)
    }
}
