// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::backup::{YearMonth, filter_by_month};
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use crate::store::RecordStore;
use crate::utils::{
    fmt_amount, maybe_print_json, parse_date, pretty_table, today, validate_amount,
    validate_entry,
};
use anyhow::{Context, Result, anyhow};

pub fn handle(store: &dyn RecordStore, kind: RecordKind, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, kind, sub)?,
        Some(("list", sub)) => list(store, kind, sub)?,
        Some(("show", sub)) => show(store, kind, sub)?,
        Some(("update", sub)) => update(store, kind, sub)?,
        Some(("delete", sub)) => delete(store, kind, sub)?,
        Some(("clear", _)) => {
            store.clear(kind)?;
            println!("Cleared all {}", kind.resource());
        }
        _ => {}
    }
    Ok(())
}

fn opt_string(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id).map(|s| s.trim().to_string())
}

fn add(store: &dyn RecordStore, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let title = sub
        .get_one::<String>("title")
        .ok_or_else(|| anyhow!("--title is required"))?
        .trim()
        .to_string();
    let amount = *sub
        .get_one::<f64>("amount")
        .ok_or_else(|| anyhow!("--amount is required"))?;
    validate_entry(&title, amount)?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?.to_string(),
        None => today(),
    };
    let classifier = opt_string(sub, "classifier").filter(|s| !s.is_empty());
    let mut new = NewRecord {
        title: Some(title),
        amount: Some(amount),
        date: Some(date),
        notes: opt_string(sub, "notes").filter(|s| !s.is_empty()),
        ..Default::default()
    };
    match kind {
        RecordKind::Expense => new.category = classifier,
        RecordKind::Income => new.source = classifier,
    }
    let created = store
        .create(kind, new)
        .with_context(|| format!("Failed to create {}", kind.label().to_lowercase()))?;
    println!(
        "Recorded {} '{}' {} on {} (id: {})",
        kind.label().to_lowercase(),
        created.title,
        fmt_amount(created.amount),
        created.date,
        created.id
    );
    Ok(())
}

/// Records of `kind` as stored, optionally narrowed with `--month`.
pub fn query_rows(
    store: &dyn RecordStore,
    kind: RecordKind,
    sub: &clap::ArgMatches,
) -> Result<Vec<Record>> {
    let all = store.get_all(kind)?;
    match sub.get_one::<String>("month") {
        Some(month) => {
            let ym: YearMonth = month.parse()?;
            Ok(filter_by_month(&all, ym))
        }
        None => Ok(all),
    }
}

fn list(store: &dyn RecordStore, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, kind, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.date.clone(),
                    r.title.clone(),
                    fmt_amount(r.amount),
                    r.classifier(kind).unwrap_or_default().to_string(),
                    r.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        let classifier_header = match kind {
            RecordKind::Expense => "Category",
            RecordKind::Income => "Source",
        };
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Title", "Amount", classifier_header, "Notes"],
                rows
            )
        );
    }
    Ok(())
}

fn show(store: &dyn RecordStore, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id missing")?;
    match store.get_by_id(kind, id)? {
        Some(r) => {
            if !maybe_print_json(sub.get_flag("json"), &r)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Field", "Value"],
                        vec![
                            vec!["id".into(), r.id.clone()],
                            vec!["title".into(), r.title.clone()],
                            vec!["amount".into(), fmt_amount(r.amount)],
                            vec!["date".into(), r.date.clone()],
                            vec![
                                kind.classifier_field().into(),
                                r.classifier(kind).unwrap_or_default().to_string(),
                            ],
                            vec!["notes".into(), r.notes.clone().unwrap_or_default()],
                        ],
                    )
                );
            }
        }
        None => println!("No {} with id '{}'", kind.label().to_lowercase(), id),
    }
    Ok(())
}

// Given but blank clears the field.
fn clearable(sub: &clap::ArgMatches, id: &str) -> Option<Option<String>> {
    opt_string(sub, id).map(|s| Some(s).filter(|s| !s.is_empty()))
}

/// Build a patch from the `update` flags, applying the entry-form rules to
/// the fields that are given. A blank classifier or note clears it.
pub fn patch_from_args(kind: RecordKind, sub: &clap::ArgMatches) -> Result<RecordPatch> {
    let mut patch = RecordPatch {
        title: opt_string(sub, "title"),
        amount: sub.get_one::<f64>("amount").copied(),
        notes: clearable(sub, "notes"),
        ..Default::default()
    };
    if let Some(title) = &patch.title {
        if title.is_empty() {
            return Err(anyhow!("Title is required"));
        }
    }
    if let Some(amount) = patch.amount {
        validate_amount(amount)?;
    }
    if let Some(d) = sub.get_one::<String>("date") {
        patch.date = Some(parse_date(d)?.to_string());
    }
    let classifier = clearable(sub, "classifier");
    match kind {
        RecordKind::Expense => patch.category = classifier,
        RecordKind::Income => patch.source = classifier,
    }
    Ok(patch)
}

fn update(store: &dyn RecordStore, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id missing")?;
    let patch = patch_from_args(kind, sub)?;
    match store.update(kind, id, &patch)? {
        Some(r) => println!(
            "Updated {} '{}' {} on {}",
            kind.label().to_lowercase(),
            r.title,
            fmt_amount(r.amount),
            r.date
        ),
        None => println!("No {} with id '{}'", kind.label().to_lowercase(), id),
    }
    Ok(())
}

fn delete(store: &dyn RecordStore, kind: RecordKind, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id missing")?;
    if store.delete(kind, id)? {
        println!("Deleted {} {}", kind.label().to_lowercase(), id);
    } else {
        println!("No {} with id '{}'", kind.label().to_lowercase(), id);
    }
    Ok(())
}
