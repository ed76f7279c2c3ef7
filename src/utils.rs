// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use anyhow::Context;
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};

const UA: &str = concat!("fintrack/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}

/// Entry-form checks: title present after trimming, amount finite and above zero.
pub fn validate_entry(title: &str, amount: f64) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Title is required");
    }
    validate_amount(amount)
}

pub fn validate_amount(amount: f64) -> anyhow::Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        anyhow::bail!("Amount must be greater than 0");
    }
    Ok(())
}

pub fn fmt_amount(v: f64) -> String {
    format!("{:.2}", v)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> anyhow::Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
