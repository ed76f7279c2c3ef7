// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Sqlite,
    Local,
    Api,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            "local" => Ok(BackendKind::Local),
            "api" | "http" => Ok(BackendKind::Api),
            other => Err(anyhow!(
                "Unknown backend '{}' (use sqlite|local|api)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: BackendKind,
    /// SQLite file; platform data dir when unset.
    pub db_path: Option<PathBuf>,
    /// Local JSON store file; platform data dir when unset.
    pub local_path: Option<PathBuf>,
    pub api_url: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendKind::default(),
            db_path: None,
            local_path: None,
            api_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();
        if let Some(b) = get("FINTRACK_BACKEND") {
            cfg.backend = b.parse()?;
        }
        cfg.db_path = get("FINTRACK_DB").map(PathBuf::from);
        cfg.local_path = get("FINTRACK_LOCAL").map(PathBuf::from);
        if let Some(url) = get("FINTRACK_API_URL") {
            cfg.api_url = url;
        }
        if let Some(port) = get("PORT") {
            cfg.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid PORT '{}'", port))?;
        }
        Ok(cfg)
    }

    /// Apply global CLI flags on top of the environment.
    pub fn apply_matches(&mut self, m: &clap::ArgMatches) -> Result<()> {
        if let Some(b) = m.get_one::<String>("backend") {
            self.backend = b.parse()?;
        }
        if let Some(p) = m.get_one::<String>("db") {
            self.db_path = Some(PathBuf::from(p));
        }
        if let Some(p) = m.get_one::<String>("local") {
            self.local_path = Some(PathBuf::from(p));
        }
        if let Some(url) = m.get_one::<String>("api-url") {
            self.api_url = url.clone();
        }
        Ok(())
    }

    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(p) => Ok(p.clone()),
            None => crate::db::db_path(),
        }
    }

    pub fn resolved_local_path(&self) -> Result<PathBuf> {
        match &self.local_path {
            Some(p) => Ok(p.clone()),
            None => crate::db::local_store_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.api_url, "http://localhost:4000");
    }

    #[test]
    fn environment_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("FINTRACK_BACKEND", "Local"),
            ("FINTRACK_LOCAL", "/tmp/store.json"),
            ("PORT", "8080"),
            ("FINTRACK_API_URL", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.backend, BackendKind::Local);
        assert_eq!(cfg.local_path, Some(PathBuf::from("/tmp/store.json")));
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("FINTRACK_BACKEND", "redis")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
    }
}
