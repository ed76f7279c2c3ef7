// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinError {
    #[error("Invalid resource: {0}")]
    UnknownResource(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed backup: {0}")]
    MalformedBackup(#[source] serde_json::Error),
}

impl FinError {
    /// True for failures of the underlying read/write rather than of the request itself.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            FinError::Persistence(_)
                | FinError::Db(_)
                | FinError::Io(_)
                | FinError::Csv(_)
                | FinError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FinError>;
