// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::merge::{ImportReport, MergePolicy, import_backup};
use crate::store::RecordStore;
use anyhow::{Context, Result};

pub fn handle(store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<ImportReport> {
    let path = sub
        .get_one::<String>("path")
        .context("--path is required")?
        .trim();
    let policy = MergePolicy::from_merge_flag(!sub.get_flag("replace"));
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open backup {}", path))?;
    let report = import_backup(store, &raw, policy)
        .with_context(|| format!("Import failed for {}", path))?;
    println!(
        "Imported {} ({:?}): {} expenses, {} incomes now stored",
        path, report.policy, report.expenses, report.incomes
    );
    Ok(report)
}
