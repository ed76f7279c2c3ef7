// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record persistence.
//!
//! Every backend implements [`RecordStore`] for both collections. Writes are
//! persisted before the call returns; there is no caching layer, no retry, and
//! no locking across calls, so concurrent writers race with last write wins.

mod api;
mod local;
mod sqlite;

pub use api::ApiStore;
pub use local::LocalStore;
pub use sqlite::SqliteStore;

use crate::config::{BackendKind, Config};
use crate::error::Result;
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use anyhow::Context;
use tracing::info;

pub trait RecordStore: Send + Sync {
    /// All records of `kind`, newest first.
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Record>>;

    fn get_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>>;

    /// Persist a new record. A missing id is generated; a supplied one is kept.
    fn create(&self, kind: RecordKind, new: NewRecord) -> Result<Record>;

    /// Merge `patch` onto the stored record. `None` when `id` is unknown.
    fn update(&self, kind: RecordKind, id: &str, patch: &RecordPatch) -> Result<Option<Record>>;

    /// `false` when `id` is unknown.
    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool>;

    fn clear(&self, kind: RecordKind) -> Result<()>;

    /// Overwrite the whole collection so that `get_all` afterwards returns
    /// `records` in the given order.
    fn replace_all(&self, kind: RecordKind, records: &[Record]) -> Result<()>;
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Open the backend chosen by `cfg`.
pub fn open_store(cfg: &Config) -> anyhow::Result<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match cfg.backend {
        BackendKind::Sqlite => {
            let path = cfg.resolved_db_path()?;
            info!(path = %path.display(), "using sqlite store");
            Box::new(SqliteStore::open(&path)?)
        }
        BackendKind::Local => {
            let path = cfg.resolved_local_path()?;
            info!(path = %path.display(), "using local store");
            Box::new(LocalStore::new(path))
        }
        BackendKind::Api => {
            info!(url = %cfg.api_url, "using api store");
            Box::new(
                ApiStore::new(&cfg.api_url)
                    .with_context(|| format!("Build HTTP client for {}", cfg.api_url))?,
            )
        }
    };
    Ok(store)
}
