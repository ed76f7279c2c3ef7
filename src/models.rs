// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::FinError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The two independent record collections. Resource names outside this set
/// cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Expense,
    Income,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Expense, RecordKind::Income];

    /// REST resource name, also the SQLite table name.
    pub fn resource(self) -> &'static str {
        match self {
            RecordKind::Expense => "expenses",
            RecordKind::Income => "incomes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Expense => "Expense",
            RecordKind::Income => "Income",
        }
    }

    /// Name of the optional free-text classifier column for this kind.
    pub fn classifier_field(self) -> &'static str {
        match self {
            RecordKind::Expense => "category",
            RecordKind::Income => "source",
        }
    }

    /// Key under which the local store keeps this collection.
    pub fn storage_key(self) -> &'static str {
        match self {
            RecordKind::Expense => "expenses_v1",
            RecordKind::Income => "incomes_v1",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for RecordKind {
    type Err = FinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expenses" => Ok(RecordKind::Expense),
            "incomes" => Ok(RecordKind::Income),
            other => Err(FinError::UnknownResource(other.to_string())),
        }
    }
}

/// A stored expense or income entry. Expenses carry `category`, incomes carry `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "compact_amount"
    )]
    pub amount: f64,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Record {
    pub fn classifier(&self, kind: RecordKind) -> Option<&str> {
        match kind {
            RecordKind::Expense => self.category.as_deref(),
            RecordKind::Income => self.source.as_deref(),
        }
    }

    /// Drops the classifier that does not belong to `kind`.
    pub fn for_kind(mut self, kind: RecordKind) -> Self {
        match kind {
            RecordKind::Expense => self.source = None,
            RecordKind::Income => self.category = None,
        }
        self
    }

    /// Year and month components of `date`, or `None` when they do not parse.
    pub fn year_month(&self) -> Option<(i32, u32)> {
        let mut parts = self.date.split('-');
        let year = parts.next()?.trim().parse::<i32>().ok()?;
        let month = parts.next()?.trim().parse::<u32>().ok()?;
        Some((year, month))
    }
}

// Numbers pass through, numeric strings are parsed, anything else reads as zero.
fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let amount = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if amount.is_finite() { amount } else { 0.0 })
}

// Whole amounts are written without a fractional part, `900` rather than `900.0`.
pub(crate) fn compact_amount<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if amount.fract() == 0.0 && amount.abs() <= MAX_EXACT {
        serializer.serialize_i64(*amount as i64)
    } else {
        serializer.serialize_f64(*amount)
    }
}

/// Create payload. `id` is optional and generated by the store when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewRecord {
    /// Builds the stored record, assigning `make_id()` when the payload has no id.
    /// Only presence is checked here; positivity belongs to the entry form.
    pub fn into_record(
        self,
        kind: RecordKind,
        make_id: impl FnOnce() -> String,
    ) -> Result<Record, FinError> {
        let title = self
            .title
            .ok_or_else(|| FinError::InvalidPayload("title is required".into()))?;
        let amount = self
            .amount
            .ok_or_else(|| FinError::InvalidPayload("amount is required".into()))?;
        let date = self
            .date
            .ok_or_else(|| FinError::InvalidPayload("date is required".into()))?;
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(make_id);
        Ok(Record {
            id,
            title,
            amount,
            date,
            category: self.category,
            source: self.source,
            notes: self.notes,
        }
        .for_kind(kind))
    }
}

impl From<Record> for NewRecord {
    fn from(r: Record) -> Self {
        NewRecord {
            id: Some(r.id),
            title: Some(r.title),
            amount: Some(r.amount),
            date: Some(r.date),
            category: r.category,
            source: r.source,
            notes: r.notes,
        }
    }
}

/// Partial update. Unset fields are left as stored; the id never changes.
///
/// The optional text fields distinguish "not given" (`None`) from an
/// explicit `null` (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "given", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "given", skip_serializing_if = "Option::is_none")]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "given", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

// Only called when the key is present, so `null` becomes `Some(None)`.
fn given<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

impl RecordPatch {
    /// True when the patch sets no field that `kind` stores.
    pub fn is_empty_for(&self, kind: RecordKind) -> bool {
        let classifier = match kind {
            RecordKind::Expense => &self.category,
            RecordKind::Income => &self.source,
        };
        self.title.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && classifier.is_none()
            && self.notes.is_none()
    }

    pub fn apply(&self, kind: RecordKind, record: &mut Record) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(date) = &self.date {
            record.date = date.clone();
        }
        match kind {
            RecordKind::Expense => {
                if let Some(c) = &self.category {
                    record.category = c.clone();
                }
            }
            RecordKind::Income => {
                if let Some(s) = &self.source {
                    record.source = s.clone();
                }
            }
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
    }
}

/// A record tagged with its collection, used by the unified feed and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindedRecord {
    pub kind: RecordKind,
    #[serde(flatten)]
    pub record: Record,
}

impl KindedRecord {
    pub fn new(kind: RecordKind, record: Record) -> Self {
        KindedRecord { kind, record }
    }
}
