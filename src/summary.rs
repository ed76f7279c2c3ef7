// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{KindedRecord, Record, RecordKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
}

fn total(records: &[Record]) -> f64 {
    records
        .iter()
        .map(|r| r.amount)
        .filter(|a| a.is_finite())
        .sum()
}

/// Totals over both collections. Recomputed from scratch on every call.
pub fn summarize(expenses: &[Record], incomes: &[Record]) -> Summary {
    let total_income = total(incomes);
    let total_expense = total(expenses);
    Summary {
        total_income,
        total_expense,
        net: total_income - total_expense,
    }
}

/// Stable sort on `date`, latest first. Same-day entries keep their
/// incoming relative order.
pub fn sort_newest_first(entries: &mut [KindedRecord]) {
    entries.sort_by(|a, b| b.record.date.cmp(&a.record.date));
}

/// Tag, concatenate (incomes, then expenses), and sort newest first.
pub fn tag_and_sort(expenses: Vec<Record>, incomes: Vec<Record>) -> Vec<KindedRecord> {
    let mut feed: Vec<KindedRecord> = incomes
        .into_iter()
        .map(|r| KindedRecord::new(RecordKind::Income, r))
        .chain(
            expenses
                .into_iter()
                .map(|r| KindedRecord::new(RecordKind::Expense, r)),
        )
        .collect();
    sort_newest_first(&mut feed);
    feed
}

pub fn unified_feed(expenses: &[Record], incomes: &[Record]) -> Vec<KindedRecord> {
    tag_and_sort(expenses.to_vec(), incomes.to_vec())
}
