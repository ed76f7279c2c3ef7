// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fintrack::backup::{ExportFormat, YearMonth, export_monthly};
use fintrack::merge::{MergePolicy, import_backup};
use fintrack::models::{NewRecord, Record, RecordKind};
use fintrack::store::{LocalStore, RecordStore, SqliteStore};
use fintrack::{cli, commands::importer};
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn draft(id: &str, title: &str, amount: f64, date: &str) -> NewRecord {
    NewRecord {
        id: Some(id.into()),
        title: Some(title.into()),
        amount: Some(amount),
        date: Some(date.into()),
        ..Default::default()
    }
}

fn backup_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(store: &dyn RecordStore, path: &str, replace: bool) -> anyhow::Result<()> {
    let mut argv = vec!["fintrack", "import", "--path", path];
    if replace {
        argv.push("--replace");
    }
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(store, import_m).map(|_| ())
    } else {
        panic!("no import subcommand");
    }
}

fn ids(store: &dyn RecordStore, kind: RecordKind) -> Vec<String> {
    store
        .get_all(kind)
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect()
}

#[test]
fn merge_import_prefers_incoming_on_collision() {
    let store = SqliteStore::in_memory().unwrap();
    store
        .create(RecordKind::Expense, draft("a", "Stored", 9.0, "2025-02-01"))
        .unwrap();
    store
        .create(RecordKind::Expense, draft("b", "Untouched", 1.0, "2025-02-02"))
        .unwrap();

    let file = backup_file(
        r#"{"version":1,"expenses":[{"id":"a","title":"Imported","amount":5,"date":"2025-01-01"}]}"#,
    );
    let path = file.path().to_str().unwrap().to_string();
    run_import(&store, &format!("  {}  ", path), false).unwrap();

    let a = store.get_by_id(RecordKind::Expense, "a").unwrap().unwrap();
    assert_eq!(a.amount, 5.0);
    assert_eq!(a.title, "Imported");
    assert_eq!(ids(&store, RecordKind::Expense), vec!["a", "b"]);
}

#[test]
fn replace_import_with_empty_lists_clears_both_kinds() {
    let store = SqliteStore::in_memory().unwrap();
    store
        .create(RecordKind::Expense, draft("a", "x", 1.0, "2025-02-01"))
        .unwrap();
    store
        .create(RecordKind::Income, draft("b", "y", 1.0, "2025-02-01"))
        .unwrap();

    let file = backup_file(r#"{"version":1}"#);
    run_import(&store, file.path().to_str().unwrap(), true).unwrap();

    assert!(store.get_all(RecordKind::Expense).unwrap().is_empty());
    assert!(store.get_all(RecordKind::Income).unwrap().is_empty());
}

#[test]
fn malformed_backup_leaves_state_untouched() {
    let store = SqliteStore::in_memory().unwrap();
    store
        .create(RecordKind::Income, draft("keep", "Salary", 100.0, "2025-02-01"))
        .unwrap();

    let file = backup_file("{\"expenses\": [");
    let err = run_import(&store, file.path().to_str().unwrap(), true).unwrap_err();
    assert!(format!("{:#}", err).contains("Malformed backup"));
    assert_eq!(ids(&store, RecordKind::Income), vec!["keep"]);
}

#[test]
fn missing_file_is_reported() {
    let store = SqliteStore::in_memory().unwrap();
    let err = run_import(&store, "/definitely/not/here.json", false).unwrap_err();
    assert!(err.to_string().contains("Open backup"));
}

fn round_trip(source: &dyn RecordStore, target: &dyn RecordStore) {
    for (id, title, amount, date) in [
        ("e1", "Rent", 900.0, "2025-03-01"),
        ("e2", "Coffee, \"large\"", 3.5, "2025-03-15"),
        ("e3", "Other month", 7.0, "2025-04-02"),
    ] {
        source
            .create(RecordKind::Expense, draft(id, title, amount, date))
            .unwrap();
    }
    let mut income = draft("i1", "Salary", 3000.0, "2025-03-28");
    income.source = Some("Employer".into());
    income.notes = Some("March".into());
    source.create(RecordKind::Income, income).unwrap();

    let ym = YearMonth::new(2025, 3).unwrap();
    let json = export_monthly(source, ym, ExportFormat::Json).unwrap();

    target
        .create(RecordKind::Expense, draft("stale", "Gone", 1.0, "2025-03-02"))
        .unwrap();
    import_backup(target, &json, MergePolicy::Replace).unwrap();

    let expected_expenses: Vec<Record> = source
        .get_all(RecordKind::Expense)
        .unwrap()
        .into_iter()
        .filter(|r| ym.contains(r))
        .collect();
    assert_eq!(target.get_all(RecordKind::Expense).unwrap(), expected_expenses);
    assert_eq!(
        target.get_all(RecordKind::Income).unwrap(),
        source.get_all(RecordKind::Income).unwrap()
    );
}

#[test]
fn json_export_then_replace_import_reproduces_month_sqlite() {
    let source = SqliteStore::in_memory().unwrap();
    let target = SqliteStore::in_memory().unwrap();
    round_trip(&source, &target);
}

#[test]
fn json_export_then_replace_import_reproduces_month_local() {
    let dir = tempdir().unwrap();
    let source = LocalStore::new(dir.path().join("source.json"));
    let target = LocalStore::new(dir.path().join("target.json"));
    round_trip(&source, &target);
}

fn replace_with_repeated_id(store: &dyn RecordStore) {
    let file = backup_file(
        r#"{"version":1,"expenses":[
            {"id":"dup","title":"First","amount":1,"date":"2025-01-01"},
            {"id":"dup","title":"Second","amount":2,"date":"2025-01-02"}
        ]}"#,
    );
    run_import(store, file.path().to_str().unwrap(), true).unwrap();
    let stored = store.get_all(RecordKind::Expense).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "First");
}

#[test]
fn replace_import_keeps_first_copy_of_repeated_id_on_both_backends() {
    replace_with_repeated_id(&SqliteStore::in_memory().unwrap());
    let dir = tempdir().unwrap();
    replace_with_repeated_id(&LocalStore::new(dir.path().join("store.json")));
}
