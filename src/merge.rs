// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::parse_backup;
use crate::error::Result;
use crate::models::{Record, RecordKind};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Union of incoming and existing, first occurrence per id wins.
    Merge,
    /// Incoming replaces the collection wholesale.
    Replace,
}

impl MergePolicy {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge {
            MergePolicy::Merge
        } else {
            MergePolicy::Replace
        }
    }
}

/// Reconcile one collection.
///
/// Under `Merge` the result is `incoming ++ existing` with later duplicates
/// of an id dropped, so an incoming record overwrites a stored one with the
/// same id even when the stored copy is newer.
pub fn resolve(incoming: Vec<Record>, existing: Vec<Record>, policy: MergePolicy) -> Vec<Record> {
    match policy {
        MergePolicy::Replace => incoming,
        MergePolicy::Merge => {
            let mut seen: HashSet<String> = HashSet::new();
            incoming
                .into_iter()
                .chain(existing)
                .filter(|r| seen.insert(r.id.clone()))
                .collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub policy: MergePolicy,
    pub expenses: usize,
    pub incomes: usize,
}

/// Parse `content` and write each kind back through `store`.
///
/// Nothing is written when parsing fails. Expenses are written before
/// incomes and the two writes are independent: a failure on incomes leaves
/// expenses already updated.
pub fn import_backup(
    store: &dyn RecordStore,
    content: &str,
    policy: MergePolicy,
) -> Result<ImportReport> {
    let contents = parse_backup(content)?;
    let expenses = import_kind(store, RecordKind::Expense, contents.expenses, policy)?;
    let incomes = import_kind(store, RecordKind::Income, contents.incomes, policy)?;
    info!(?policy, expenses, incomes, "backup imported");
    Ok(ImportReport {
        policy,
        expenses,
        incomes,
    })
}

fn import_kind(
    store: &dyn RecordStore,
    kind: RecordKind,
    incoming: Vec<Record>,
    policy: MergePolicy,
) -> Result<usize> {
    let existing = match policy {
        MergePolicy::Merge => store.get_all(kind)?,
        MergePolicy::Replace => Vec::new(),
    };
    let (incoming, repeated) =
        first_per_id(incoming.into_iter().map(|r| r.for_kind(kind)).collect());
    if repeated > 0 {
        warn!(kind = %kind, repeated, "backup repeats ids, keeping the first copy of each");
    }
    let overwritten = match policy {
        MergePolicy::Merge => {
            let ids: HashSet<&str> = incoming.iter().map(|r| r.id.as_str()).collect();
            existing.iter().filter(|r| ids.contains(r.id.as_str())).count()
        }
        MergePolicy::Replace => 0,
    };
    if overwritten > 0 {
        warn!(kind = %kind, overwritten, "imported records replace stored records with the same id");
    }
    let resolved = resolve(incoming, existing, policy);
    store.replace_all(kind, &resolved).map_err(|e| {
        warn!(kind = %kind, error = %e, "import write-back failed");
        e
    })?;
    Ok(resolved.len())
}

// Drops later copies of an id; returns the kept records and how many were dropped.
fn first_per_id(records: Vec<Record>) -> (Vec<Record>, usize) {
    let total = records.len();
    let mut seen: HashSet<String> = HashSet::new();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
