// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{RecordStore, new_id};
use crate::error::{FinError, Result};
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Local backend: a single JSON key-value blob on disk holding each
/// collection under its storage key. Every call re-reads the file.
pub struct LocalStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocalStore {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_blob(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            FinError::Persistence(format!("corrupt local store {}: {}", self.path.display(), e))
        })
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut blob = self.load_blob()?;
        match blob.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v)
                .map(Some)
                .map_err(|e| FinError::Persistence(format!("corrupt {} entry: {}", key, e))),
        }
    }

    fn write_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let mut blob = self.load_blob()?;
        let value = serde_json::to_value(value)
            .map_err(|e| FinError::Persistence(format!("encode {}: {}", key, e)))?;
        blob.insert(key.to_string(), value);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(&blob)
            .map_err(|e| FinError::Persistence(format!("encode local store: {}", e)))?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    fn read(&self, kind: RecordKind) -> Result<Vec<Record>> {
        Ok(self.read_key(kind.storage_key())?.unwrap_or_default())
    }

    fn write(&self, kind: RecordKind, records: &[Record]) -> Result<()> {
        self.write_key(kind.storage_key(), records)
    }

    /// Value stored under `key`, or the default when the key is absent.
    pub fn entry<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        self.with_lock(|| Ok(self.read_key(key)?.unwrap_or_default()))
    }

    /// Read, change and write back the value under `key` while holding the lock.
    /// Nothing is written when `f` fails.
    pub fn modify_entry<T, R>(&self, key: &str, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        self.with_lock(|| {
            let mut value: T = self.read_key(key)?.unwrap_or_default();
            let out = f(&mut value)?;
            self.write_key(key, &value)?;
            Ok(out)
        })
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _held = self
            .guard
            .lock()
            .map_err(|_| FinError::Persistence("local store lock poisoned".into()))?;
        f()
    }
}

impl RecordStore for LocalStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        self.with_lock(|| self.read(kind))
    }

    fn get_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>> {
        self.with_lock(|| Ok(self.read(kind)?.into_iter().find(|r| r.id == id)))
    }

    fn create(&self, kind: RecordKind, new: NewRecord) -> Result<Record> {
        let record = new.into_record(kind, new_id)?;
        self.with_lock(|| {
            let mut records = self.read(kind)?;
            if records.iter().any(|r| r.id == record.id) {
                return Err(FinError::Persistence(format!(
                    "{} id '{}' already exists",
                    kind, record.id
                )));
            }
            records.insert(0, record.clone());
            self.write(kind, &records)?;
            debug!(kind = %kind, id = %record.id, "record created");
            Ok(record)
        })
    }

    fn update(&self, kind: RecordKind, id: &str, patch: &RecordPatch) -> Result<Option<Record>> {
        self.with_lock(|| {
            let mut records = self.read(kind)?;
            let Some(slot) = records.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            if patch.is_empty_for(kind) {
                return Ok(Some(slot.clone()));
            }
            patch.apply(kind, slot);
            let updated = slot.clone();
            self.write(kind, &records)?;
            Ok(Some(updated))
        })
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool> {
        self.with_lock(|| {
            let mut records = self.read(kind)?;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Ok(false);
            }
            self.write(kind, &records)?;
            Ok(true)
        })
    }

    fn clear(&self, kind: RecordKind) -> Result<()> {
        self.with_lock(|| self.write(kind, &[]))
    }

    fn replace_all(&self, kind: RecordKind, records: &[Record]) -> Result<()> {
        self.with_lock(|| {
            self.write(kind, records)?;
            debug!(kind = %kind, count = records.len(), "collection replaced");
            Ok(())
        })
    }
}
