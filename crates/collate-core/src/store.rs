//! Storage backends for reference tables
//!
//! A store holds named tables as raw bytes. Replacing a table keeps the
//! previous contents as `<name>.bak`, dropping any older backup.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Named table storage
pub trait TableStore {
    /// Current contents of a table, or `None` if it has never been written
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Rotate the backup and write new contents
    fn replace(&mut self, name: &str, contents: &[u8]) -> Result<()>;
}

/// Name of the backup kept for a table
pub fn backup_name(name: &str) -> String {
    format!("{}.bak", name)
}

/// Tables stored as files in one directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the tables
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a table file
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl TableStore for FileStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::FileRead { path, source: e }),
        }
    }

    fn replace(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.path(name);
        let backup = self.path(&backup_name(name));
        if path.is_file() {
            if backup.is_file() {
                fs::remove_file(&backup).map_err(write_error(&backup))?;
            }
            fs::rename(&path, &backup).map_err(write_error(&path))?;
            debug!("Rotated {} to {}", path.display(), backup.display());
        }

        fs::write(&path, contents).map_err(write_error(&path))?;
        Ok(())
    }
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::FileWrite { path, source }
}

/// Tables held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table without rotating backups
    pub fn insert<C: Into<Vec<u8>>>(&mut self, name: &str, contents: C) {
        self.files.insert(name.to_string(), contents.into());
    }

    /// Raw contents of a table or backup
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// Contents of a table or backup as text
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Names of everything stored, backups included
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl TableStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.files.get(name).cloned())
    }

    fn replace(&mut self, name: &str, contents: &[u8]) -> Result<()> {
        if let Some(current) = self.files.remove(name) {
            self.files.insert(backup_name(name), current);
        }
        self.files.insert(name.to_string(), contents.to_vec());
        Ok(())
    }
}
