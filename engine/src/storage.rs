use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::StatblockError;

/// String key/value persistence with local-storage semantics: whole values,
/// synchronous writes, no transactions.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StatblockError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StatblockError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StatblockError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StatblockError::Storage(format!("reading '{}': {}", key, e))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StatblockError> {
        let storage_err = |e: io::Error| StatblockError::Storage(format!("writing '{}': {}", key, e));
        fs::create_dir_all(&self.dir).map_err(storage_err)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(storage_err)?;
        fs::rename(&tmp, &target).map_err(storage_err)?;
        tracing::debug!(key, path = %target.display(), "stored");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StatblockError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StatblockError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
