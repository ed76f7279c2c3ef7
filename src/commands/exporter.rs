// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::{ExportFormat, YearMonth, backup_file_name, export_monthly};
use crate::store::RecordStore;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn handle(store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<PathBuf> {
    let ym = match sub.get_one::<String>("month") {
        Some(m) => m.parse::<YearMonth>()?,
        None => YearMonth::current(),
    };
    let fmt: ExportFormat = sub
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json")
        .parse()?;
    let out = sub
        .get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(backup_file_name(ym, fmt)));

    let content = export_monthly(store, ym, fmt)?;
    std::fs::write(&out, content).with_context(|| format!("Write {}", out.display()))?;
    println!("Exported {} backup for {} to {}", fmt.extension(), ym, out.display());
    Ok(out)
}
