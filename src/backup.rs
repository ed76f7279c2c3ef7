// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly backups.
//!
//! JSON backups carry both collections separately and can be imported again.
//! CSV is export-only: one flat `kind,date,title,amount` table sorted latest first.

use crate::error::{FinError, Result};
use crate::models::{Record, RecordKind};
use crate::store::RecordStore;
use crate::summary::tag_and_sort;
use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

pub const BACKUP_VERSION: u32 = 1;
const CSV_HEADER: &str = "kind,date,title,amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(FinError::InvalidPayload(format!(
                "Invalid month number {}",
                month
            )));
        }
        Ok(YearMonth { year, month })
    }

    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        YearMonth {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Exact match on the parsed year and month of `record.date`.
    /// Unparseable dates never match.
    pub fn contains(&self, record: &Record) -> bool {
        record.year_month() == Some((self.year, self.month))
    }
}

impl FromStr for YearMonth {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let d = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").map_err(|_| {
            FinError::InvalidPayload(format!("Invalid month '{}', expected YYYY-MM", s))
        })?;
        YearMonth::new(d.year(), d.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(FinError::InvalidPayload(format!(
                "Unknown format: {} (use csv|json)",
                other
            ))),
        }
    }
}

/// On-disk JSON backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub year: i32,
    pub month: u32,
    pub exported_at: String,
    pub expenses: Vec<Record>,
    pub incomes: Vec<Record>,
}

/// The part of a backup that import cares about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackupContents {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub expenses: Vec<Record>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub incomes: Vec<Record>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn filter_by_month(records: &[Record], ym: YearMonth) -> Vec<Record> {
    records.iter().filter(|r| ym.contains(r)).cloned().collect()
}

pub fn build_backup(
    expenses: &[Record],
    incomes: &[Record],
    ym: YearMonth,
    exported_at: DateTime<Utc>,
) -> Backup {
    Backup {
        version: BACKUP_VERSION,
        year: ym.year,
        month: ym.month,
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        expenses: filter_by_month(expenses, ym),
        incomes: filter_by_month(incomes, ym),
    }
}

pub fn to_json(backup: &Backup) -> Result<String> {
    serde_json::to_string_pretty(backup)
        .map_err(|e| FinError::Persistence(format!("encode backup: {}", e)))
}

/// Flat CSV of the given (already filtered) records. Every data field is
/// quoted; an empty input yields an empty string.
pub fn to_csv(expenses: &[Record], incomes: &[Record]) -> Result<String> {
    let rows = tag_and_sort(expenses.to_vec(), incomes.to_vec());
    if rows.is_empty() {
        return Ok(String::new());
    }
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in &rows {
        let amount = row.record.amount.to_string();
        wtr.write_record([
            row.kind.label(),
            row.record.date.as_str(),
            row.record.title.as_str(),
            amount.as_str(),
        ])?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| FinError::Persistence(format!("flush csv: {}", e)))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| FinError::Persistence(format!("csv is not utf-8: {}", e)))?;
    Ok(format!("{}\n{}", CSV_HEADER, body.trim_end_matches('\n')))
}

/// Render the month's backup from explicit collections.
pub fn render(
    expenses: &[Record],
    incomes: &[Record],
    ym: YearMonth,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(&build_backup(expenses, incomes, ym, exported_at)),
        ExportFormat::Csv => to_csv(
            &filter_by_month(expenses, ym),
            &filter_by_month(incomes, ym),
        ),
    }
}

/// Read both collections from `store` and render the month's backup.
pub fn export_monthly(store: &dyn RecordStore, ym: YearMonth, format: ExportFormat) -> Result<String> {
    let expenses = store.get_all(RecordKind::Expense)?;
    let incomes = store.get_all(RecordKind::Income)?;
    let out = render(&expenses, &incomes, ym, format, Utc::now())?;
    info!(month = %ym, format = format.extension(), bytes = out.len(), "backup rendered");
    Ok(out)
}

pub fn backup_file_name(ym: YearMonth, format: ExportFormat) -> String {
    format!("backup-{}.{}", ym, format.extension())
}

/// Parse a JSON backup. Missing collections read as empty.
pub fn parse_backup(content: &str) -> Result<BackupContents> {
    serde_json::from_str(content).map_err(FinError::MalformedBackup)
}
