// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{BackendKind, Config};
use crate::server;
use crate::store::{RecordStore, open_store};
use anyhow::{Context, Result, bail};
use std::sync::Arc;

pub fn handle(cfg: &Config, sub: &clap::ArgMatches) -> Result<()> {
    // The api backend is a client of this server and blocks on HTTP calls.
    if cfg.backend == BackendKind::Api {
        bail!("serve needs the sqlite or local backend");
    }
    let port = sub.get_one::<u16>("port").copied().unwrap_or(cfg.port);
    let store: Arc<dyn RecordStore> = Arc::from(open_store(cfg)?);
    let rt = tokio::runtime::Runtime::new().context("Start async runtime")?;
    rt.block_on(server::serve(store, port))
}
