// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::RecordStore;
use crate::error::{FinError, Result};
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use crate::utils::http_client;
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use tracing::debug;

/// Remote backend speaking the `/api/{resource}` REST surface.
pub struct ApiStore {
    client: Client,
    base: String,
}

impl ApiStore {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(ApiStore {
            client: http_client()?,
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self, kind: RecordKind) -> String {
        format!("{}/api/{}", self.base, kind.resource())
    }

    // Ids are opaque, so they go in as one percent-encoded path segment.
    fn item_url(&self, kind: RecordKind, id: &str) -> Result<Url> {
        let bad_base = || FinError::Persistence(format!("invalid api url '{}'", self.base));
        let mut url = Url::parse(&self.collection_url(kind)).map_err(|_| bad_base())?;
        url.path_segments_mut().map_err(|_| bad_base())?.push(id);
        Ok(url)
    }
}

// Maps a non-success response onto the error taxonomy.
fn check(resp: Response, action: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    debug!(%status, action, body = %body, "api request failed");
    if status == StatusCode::BAD_REQUEST {
        return Err(FinError::InvalidPayload(format!("{}: {}", action, body)));
    }
    Err(FinError::Persistence(format!(
        "Failed to {} ({})",
        action, status
    )))
}

impl RecordStore for ApiStore {
    fn get_all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let resp = self.client.get(self.collection_url(kind)).send()?;
        Ok(check(resp, "fetch")?.json()?)
    }

    fn get_by_id(&self, kind: RecordKind, id: &str) -> Result<Option<Record>> {
        let resp = self.client.get(self.item_url(kind, id)?).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(resp, "fetch")?.json()?))
    }

    fn create(&self, kind: RecordKind, new: NewRecord) -> Result<Record> {
        let resp = self
            .client
            .post(self.collection_url(kind))
            .json(&new)
            .send()?;
        Ok(check(resp, "create")?.json()?)
    }

    fn update(&self, kind: RecordKind, id: &str, patch: &RecordPatch) -> Result<Option<Record>> {
        let resp = self.client.put(self.item_url(kind, id)?).json(patch).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(resp, "update")?.json()?))
    }

    fn delete(&self, kind: RecordKind, id: &str) -> Result<bool> {
        let resp = self.client.delete(self.item_url(kind, id)?).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(resp, "delete")?;
        Ok(true)
    }

    fn clear(&self, kind: RecordKind) -> Result<()> {
        let resp = self.client.delete(self.collection_url(kind)).send()?;
        check(resp, "clear")?;
        Ok(())
    }

    // Not atomic: a failure partway leaves the collection partially written.
    fn replace_all(&self, kind: RecordKind, records: &[Record]) -> Result<()> {
        self.clear(kind)?;
        for record in records.iter().rev() {
            self.create(kind, NewRecord::from(record.clone()))?;
        }
        Ok(())
    }
}
