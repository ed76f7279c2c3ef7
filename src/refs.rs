// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Amount references: a short saved list of named amounts kept next to the
//! local collections. They are not records, never appear in totals, and are
//! not part of backups.

use crate::error::{FinError, Result};
use crate::store::{LocalStore, new_id};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

pub const REFS_KEY: &str = "amount_refs_v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRef {
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "crate::models::compact_amount")]
    pub amount: f64,
}

pub struct RefBook {
    store: LocalStore,
}

impl RefBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RefBook {
            store: LocalStore::new(path),
        }
    }

    /// Saved references, newest first.
    pub fn list(&self) -> Result<Vec<AmountRef>> {
        self.store.entry(REFS_KEY)
    }

    /// Title must be non-blank after trimming; amount finite and above zero.
    pub fn add(&self, title: &str, amount: f64) -> Result<AmountRef> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FinError::InvalidPayload("Title is required".into()));
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(FinError::InvalidPayload("Amount must be > 0".into()));
        }
        let entry = AmountRef {
            id: new_id(),
            title: title.to_string(),
            amount,
        };
        self.store
            .modify_entry(REFS_KEY, |refs: &mut Vec<AmountRef>| {
                refs.insert(0, entry.clone());
                Ok(())
            })?;
        debug!(id = %entry.id, "amount reference saved");
        Ok(entry)
    }

    /// `false` when no reference has `id`.
    pub fn delete(&self, id: &str) -> Result<bool> {
        self.store
            .modify_entry(REFS_KEY, |refs: &mut Vec<AmountRef>| {
                let before = refs.len();
                refs.retain(|r| r.id != id);
                Ok(refs.len() != before)
            })
    }
}
