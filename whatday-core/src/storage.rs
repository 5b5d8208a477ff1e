//! Local key-value storage.
//!
//! Each key maps to one JSON document. [`FileStorage`] keeps them as
//! `<key>.json` files in the data directory; [`MemoryStorage`] keeps them in
//! memory for tests and dry runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{WhatDayError, WhatDayResult};

pub trait Storage {
    /// Raw document stored under `key`, `None` if nothing was stored yet.
    fn read(&self, key: &str) -> WhatDayResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> WhatDayResult<()>;

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> WhatDayResult<Option<T>>
    where
        Self: Sized,
    {
        match self.read(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| WhatDayError::Serialization(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> WhatDayResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)
            .map_err(|e| WhatDayError::Serialization(format!("{key}: {e}")))?;
        self.write(key, &raw)
    }
}

/// JSON files in a directory, one per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> WhatDayResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| WhatDayError::Storage(format!("Could not read {}: {e}", path.display())))
    }

    fn write(&self, key: &str, value: &str) -> WhatDayResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            WhatDayError::Storage(format!("Could not create {}: {e}", self.dir.display()))
        })?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{key}.json.tmp"));

        std::fs::write(&temp, value)
            .and_then(|_| std::fs::rename(&temp, &path))
            .map_err(|e| WhatDayError::Storage(format!("Could not write {}: {e}", path.display())))
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> WhatDayResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| WhatDayError::Storage("memory storage poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> WhatDayResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| WhatDayError::Storage("memory storage poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: Storage> Storage for &S {
    fn read(&self, key: &str) -> WhatDayResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> WhatDayResult<()> {
        (**self).write(key, value)
    }
}
