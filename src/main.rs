// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use fintrack::config::{BackendKind, Config};
use fintrack::models::RecordKind;
use fintrack::refs::RefBook;
use fintrack::store::open_store;
use fintrack::{cli, commands, logging};

fn main() -> Result<()> {
    logging::init();
    let matches = cli::build_cli().get_matches();

    let mut cfg = Config::from_env()?;
    cfg.apply_matches(&matches)?;

    match matches.subcommand() {
        Some(("serve", sub)) => return commands::serve::handle(&cfg, sub),
        // References always live in the local file, whatever the record backend.
        Some(("refs", sub)) => {
            let book = RefBook::new(cfg.resolved_local_path()?);
            return commands::refs::handle(&book, sub);
        }
        _ => {}
    }

    let store = open_store(&cfg)?;
    match matches.subcommand() {
        Some(("init", _)) => match cfg.backend {
            BackendKind::Sqlite => {
                println!("Database initialized at {}", cfg.resolved_db_path()?.display())
            }
            BackendKind::Local => {
                println!("Local store at {}", cfg.resolved_local_path()?.display())
            }
            BackendKind::Api => println!("Using remote store at {}", cfg.api_url),
        },
        Some(("expense", sub)) => commands::records::handle(store.as_ref(), RecordKind::Expense, sub)?,
        Some(("income", sub)) => commands::records::handle(store.as_ref(), RecordKind::Income, sub)?,
        Some(("summary", sub)) => commands::reports::summary(store.as_ref(), sub)?,
        Some(("feed", sub)) => commands::reports::feed(store.as_ref(), sub)?,
        Some(("export", sub)) => {
            commands::exporter::handle(store.as_ref(), sub)?;
        }
        Some(("import", sub)) => {
            commands::importer::handle(store.as_ref(), sub)?;
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
