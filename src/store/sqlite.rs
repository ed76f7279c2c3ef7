// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{RecordStore, new_id};
use crate::error::{FinError, Result};
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Durable backend: one SQLite table per kind, listed newest first by rowid.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_schema(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = crate::db::open_or_init(path)?;
        Ok(Self::new(conn)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FinError::Persistence("sqlite connection lock poisoned".into()))
    }
}

// Table and column names come from `RecordKind`, never from callers.
fn select_sql(kind: RecordKind) -> String {
    format!(
        "SELECT id, title, amount, date, {}, notes FROM {}",
        kind.classifier_field(),
        kind.resource()
    )
}

fn insert_sql(kind: RecordKind) -> String {
    format!(
        "INSERT INTO {}(id, title, amount, date, {}, notes) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        kind.resource(),
        kind.classifier_field()
    )
}

fn row_to_record(kind: RecordKind, r: &Row<'_>) -> rusqlite::Result<Record> {
    let classifier: Option<String> = r.get(4)?;
    let mut record = Record {
        id: r.get(0)?,
        title: r.get(1)?,
        amount: r.get(2)?,
        date: r.get(3)?,
        category: None,
        source: None,
        notes: r.get(5)?,
    };
    match kind {
        RecordKind::Expense => record.category = classifier,
        RecordKind::Income => record.source = classifier,
    }
    Ok(record)
}

fn insert(conn: &Connection, kind: RecordKind, r: &Record) -> rusqlite::Result<usize> {
    conn.execute(
        &insert_sql(kind),
        params![
            r.id,
            r.title,
            r.amount,
            r.date,
            r.classifier(kind),
            r.notes
        ],
    )
}

fn fetch(conn: &Connection, kind: RecordKind, id: &str) -> rusqlite::Result<Option<Record>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", select_sql(kind)),
        params![id],
        |r| row_to_record(kind, r),
    )
    .optional()
}

impl RecordStore for SqliteStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY rowid DESC", select_sql(kind)))?;
        let rows = stmt.query_map([], |r| row_to_record(kind, r))?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn get_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>> {
        let conn = self.lock()?;
        Ok(fetch(&conn, kind, id)?)
    }

    fn create(&self, kind: RecordKind, new: NewRecord) -> Result<Record> {
        let record = new.into_record(kind, new_id)?;
        let conn = self.lock()?;
        insert(&conn, kind, &record)?;
        debug!(kind = %kind, id = %record.id, "record created");
        fetch(&conn, kind, &record.id)?
            .ok_or_else(|| FinError::Persistence(format!("{} {} vanished after insert", kind, record.id)))
    }

    fn update(&self, kind: RecordKind, id: &str, patch: &RecordPatch) -> Result<Option<Record>> {
        let conn = self.lock()?;
        let Some(mut record) = fetch(&conn, kind, id)? else {
            return Ok(None);
        };
        if patch.is_empty_for(kind) {
            return Ok(Some(record));
        }
        patch.apply(kind, &mut record);
        conn.execute(
            &format!(
                "UPDATE {} SET title = ?1, amount = ?2, date = ?3, {} = ?4, notes = ?5 WHERE id = ?6",
                kind.resource(),
                kind.classifier_field()
            ),
            params![
                record.title,
                record.amount,
                record.date,
                record.classifier(kind),
                record.notes,
                id
            ],
        )?;
        debug!(kind = %kind, id, "record updated");
        Ok(fetch(&conn, kind, id)?)
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changes = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.resource()),
            params![id],
        )?;
        Ok(changes > 0)
    }

    fn clear(&self, kind: RecordKind) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute(&format!("DELETE FROM {}", kind.resource()), [])?;
        debug!(kind = %kind, removed, "collection cleared");
        Ok(())
    }

    fn replace_all(&self, kind: RecordKind, records: &[Record]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(&format!("DELETE FROM {}", kind.resource()), [])?;
        // Listing is newest first, so insert back to front.
        for record in records.iter().rev() {
            insert(&tx, kind, record)?;
        }
        tx.commit()?;
        debug!(kind = %kind, count = records.len(), "collection replaced");
        Ok(())
    }
}
