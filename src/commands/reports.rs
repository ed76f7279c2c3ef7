// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{KindedRecord, RecordKind};
use crate::store::RecordStore;
use crate::summary::{Summary, summarize, unified_feed};
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn summary(store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let expenses = store.get_all(RecordKind::Expense)?;
    let incomes = store.get_all(RecordKind::Income)?;
    let s: Summary = summarize(&expenses, &incomes);
    if !maybe_print_json(sub.get_flag("json"), &s)? {
        let rows = vec![
            vec![
                "Total Income".into(),
                fmt_amount(s.total_income),
                format!("{} entries", incomes.len()),
            ],
            vec![
                "Total Expense".into(),
                fmt_amount(s.total_expense),
                format!("{} entries", expenses.len()),
            ],
            vec!["Net".into(), fmt_amount(s.net), "Income - Expense".into()],
        ];
        println!("{}", pretty_table(&["", "Amount", ""], rows));
    }
    Ok(())
}

pub fn feed_rows(store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<Vec<KindedRecord>> {
    let expenses = store.get_all(RecordKind::Expense)?;
    let incomes = store.get_all(RecordKind::Income)?;
    let mut feed = unified_feed(&expenses, &incomes);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        feed.truncate(*limit);
    }
    Ok(feed)
}

pub fn feed(store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let data = feed_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|k| {
                vec![
                    k.record.date.clone(),
                    k.kind.label().to_string(),
                    k.record.title.clone(),
                    fmt_amount(k.record.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Kind", "Title", "Amount"], rows));
    }
    Ok(())
}
