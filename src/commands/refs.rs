// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::refs::RefBook;
use crate::utils::{fmt_amount, maybe_print_json, pretty_table};
use anyhow::{Context, Result};

pub fn handle(book: &RefBook, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let title = sub.get_one::<String>("title").context("--title is required")?;
            let amount = *sub.get_one::<f64>("amount").context("--amount is required")?;
            let saved = book.add(title, amount)?;
            println!(
                "Saved reference '{}' {} (id: {})",
                saved.title,
                fmt_amount(saved.amount),
                saved.id
            );
        }
        Some(("list", sub)) => {
            let refs = book.list()?;
            if !maybe_print_json(sub.get_flag("json"), &refs)? {
                if refs.is_empty() {
                    println!("No references yet.");
                } else {
                    let rows = refs
                        .iter()
                        .map(|r| vec![r.id.clone(), r.title.clone(), fmt_amount(r.amount)])
                        .collect();
                    println!("{}", pretty_table(&["ID", "Title", "Amount"], rows));
                }
            }
        }
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").context("id missing")?;
            if book.delete(id)? {
                println!("Deleted reference {}", id);
            } else {
                println!("No reference with id '{}'", id);
            }
        }
        _ => {}
    }
    Ok(())
}
