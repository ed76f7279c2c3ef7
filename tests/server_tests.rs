// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fintrack::error::FinError;
use fintrack::models::{NewRecord, Record, RecordKind, RecordPatch};
use fintrack::server::{AppState, router};
use fintrack::store::{ApiStore, RecordStore, SqliteStore};
use serde_json::{Value, json};
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

fn app() -> Router {
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::in_memory().unwrap());
    router(AppState::new(store))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn create_generates_id_and_fetch_returns_it() {
    let app = app();
    let (status, created) = call(
        &app,
        "POST",
        "/api/expenses",
        Some(json!({"title": "Lunch", "amount": 12.5, "date": "2025-03-01", "category": "Food"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["category"], "Food");

    let (status, fetched) = call(&app, "GET", &format!("/api/expenses/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_keeps_client_id_and_lists_newest_first() {
    let app = app();
    for id in ["first", "second"] {
        let (status, _) = call(
            &app,
            "POST",
            "/api/incomes",
            Some(json!({"id": id, "title": "Pay", "amount": 1, "date": "2025-03-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, list) = call(&app, "GET", "/api/incomes", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["second", "first"]);
}

#[tokio::test]
async fn unknown_resource_is_400() {
    let app = app();
    for (method, uri) in [
        ("GET", "/api/budgets"),
        ("GET", "/api/budgets/1"),
        ("DELETE", "/api/budgets/1"),
        ("DELETE", "/api/budgets"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["error"], "Invalid resource");
    }
    let (status, _) = call(&app, "POST", "/api/budgets", Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_payloads_are_400() {
    let app = app();
    let (status, body) = call(&app, "POST", "/api/expenses", Some(json!({"title": "No amount"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid payload");

    let (status, _) = call(&app, "POST", "/api/expenses", Some(json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/api/expenses",
        Some(json!({"title": "x", "amount": "lots", "date": "2025-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_id_is_500() {
    let app = app();
    let body = json!({"id": "dup", "title": "x", "amount": 1, "date": "2025-01-01"});
    let (status, _) = call(&app, "POST", "/api/expenses", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = call(&app, "POST", "/api/expenses", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err["error"], "Failed to create");
}

#[tokio::test]
async fn update_patches_and_missing_is_404() {
    let app = app();
    let (_, created) = call(
        &app,
        "POST",
        "/api/incomes",
        Some(json!({"id": "i1", "title": "Salary", "amount": 100, "date": "2025-01-31"})),
    )
    .await;

    let (status, updated) = call(
        &app,
        "PUT",
        "/api/incomes/i1",
        Some(json!({"amount": 150, "source": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], "i1");
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["amount"], 150.0);
    assert_eq!(updated["source"], "Acme");

    let (status, same) = call(&app, "PUT", "/api/incomes/i1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same, updated);

    let (status, cleared) = call(&app, "PUT", "/api/incomes/i1", Some(json!({"source": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.get("source").is_none());
    assert_eq!(cleared["amount"], 150.0);

    let (status, body) = call(&app, "PUT", "/api/incomes/nope", Some(json!({"amount": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn delete_and_clear() {
    let app = app();
    call(
        &app,
        "POST",
        "/api/expenses",
        Some(json!({"id": "e1", "title": "x", "amount": 1, "date": "2025-01-01"})),
    )
    .await;
    call(
        &app,
        "POST",
        "/api/expenses",
        Some(json!({"id": "e2", "title": "y", "amount": 2, "date": "2025-01-02"})),
    )
    .await;

    let (status, _) = call(&app, "DELETE", "/api/expenses/e1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "DELETE", "/api/expenses/e1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/api/expenses/e1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", "/api/expenses", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = call(&app, "GET", "/api/expenses", None).await;
    assert_eq!(list, json!([]));
}

fn spawn_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app()).await.unwrap();
        });
    });
    format!("http://{}", addr)
}

#[test]
fn api_store_speaks_the_rest_surface() {
    let api = ApiStore::new(&spawn_server()).unwrap();

    let created = api
        .create(
            RecordKind::Expense,
            NewRecord {
                title: Some("Books".into()),
                amount: Some(30.0),
                date: Some("2025-05-05".into()),
                category: Some("Study".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(
        api.get_by_id(RecordKind::Expense, &created.id).unwrap(),
        Some(created.clone())
    );
    assert!(api.get_by_id(RecordKind::Income, &created.id).unwrap().is_none());

    let patch = RecordPatch {
        title: Some("Textbooks".into()),
        ..Default::default()
    };
    let updated = api
        .update(RecordKind::Expense, &created.id, &patch)
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "Textbooks");
    assert!(api.update(RecordKind::Expense, "ghost", &patch).unwrap().is_none());

    let bad = api.create(RecordKind::Expense, NewRecord::default()).unwrap_err();
    assert!(!bad.is_persistence());

    assert!(!api.delete(RecordKind::Expense, "ghost").unwrap());
    assert!(api.delete(RecordKind::Expense, &created.id).unwrap());

    let batch: Vec<_> = ["x", "y"]
        .iter()
        .map(|id| Record {
            id: id.to_string(),
            title: id.to_string(),
            amount: 1.0,
            date: "2025-05-01".into(),
            category: None,
            source: Some("Gift".into()),
            notes: None,
        })
        .collect();
    api.replace_all(RecordKind::Income, &batch).unwrap();
    assert_eq!(api.get_all(RecordKind::Income).unwrap(), batch);

    api.clear(RecordKind::Income).unwrap();
    assert!(api.get_all(RecordKind::Income).unwrap().is_empty());
}

#[test]
fn api_store_reaches_ids_with_url_reserved_characters() {
    let api = ApiStore::new(&spawn_server()).unwrap();
    for id in ["a/b", "x?y", "h#1", "sp ace", "50%"] {
        let created = api
            .create(
                RecordKind::Expense,
                NewRecord {
                    id: Some(id.into()),
                    title: Some("Odd id".into()),
                    amount: Some(1.0),
                    date: Some("2025-06-01".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(created.id, id);
        assert_eq!(
            api.get_by_id(RecordKind::Expense, id).unwrap().map(|r| r.id),
            Some(id.to_string()),
            "{}",
            id
        );
        let patch = RecordPatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = api.update(RecordKind::Expense, id, &patch).unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(api.delete(RecordKind::Expense, id).unwrap(), "{}", id);
        assert!(api.get_by_id(RecordKind::Expense, id).unwrap().is_none());
    }
    assert!(api.get_all(RecordKind::Expense).unwrap().is_empty());
}

// Listing waits for a release signal sent from another task on the same runtime.
struct GatedStore {
    inner: SqliteStore,
    gate: Mutex<Receiver<()>>,
}

impl RecordStore for GatedStore {
    fn get_all(&self, kind: RecordKind) -> fintrack::error::Result<Vec<Record>> {
        let gate = self.gate.lock().unwrap();
        gate.recv_timeout(Duration::from_secs(5))
            .map_err(|_| FinError::Persistence("gate never opened".into()))?;
        self.inner.get_all(kind)
    }

    fn get_by_id(&self, kind: RecordKind, id: &str) -> fintrack::error::Result<Option<Record>> {
        self.inner.get_by_id(kind, id)
    }

    fn create(&self, kind: RecordKind, new: NewRecord) -> fintrack::error::Result<Record> {
        self.inner.create(kind, new)
    }

    fn update(
        &self,
        kind: RecordKind,
        id: &str,
        patch: &RecordPatch,
    ) -> fintrack::error::Result<Option<Record>> {
        self.inner.update(kind, id, patch)
    }

    fn delete(&self, kind: RecordKind, id: &str) -> fintrack::error::Result<bool> {
        self.inner.delete(kind, id)
    }

    fn clear(&self, kind: RecordKind) -> fintrack::error::Result<()> {
        self.inner.clear(kind)
    }

    fn replace_all(&self, kind: RecordKind, records: &[Record]) -> fintrack::error::Result<()> {
        self.inner.replace_all(kind, records)
    }
}

#[tokio::test]
async fn store_calls_leave_the_async_worker_free() {
    let (release, gate) = channel();
    let store: Arc<dyn RecordStore> = Arc::new(GatedStore {
        inner: SqliteStore::in_memory().unwrap(),
        gate: Mutex::new(gate),
    });
    let app = router(AppState::new(store));

    let request = tokio::spawn(async move { call(&app, "GET", "/api/expenses", None).await });
    let opener = tokio::spawn(async move { release.send(()).unwrap() });
    opener.await.unwrap();

    let (status, body) = request.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
