// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RecordKind;
use clap::{Arg, ArgAction, Command, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn record_command(kind: RecordKind) -> Command {
    let name = match kind {
        RecordKind::Expense => "expense",
        RecordKind::Income => "income",
    };
    let classifier = kind.classifier_field();
    Command::new(name)
        .about(format!("Manage {}", kind.resource()))
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about(format!("Record a new {}", name))
                .arg(Arg::new("title").long("title").required(true))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("YYYY-MM-DD, defaults to today"),
                )
                .arg(Arg::new("classifier").long(classifier))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(
            Command::new("list")
                .about(format!("List {}, newest first", kind.resource()))
                .arg(Arg::new("month").long("month").help("YYYY-MM"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("show")
                .arg(Arg::new("id").required(true))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("update")
                .about("Change some fields of a stored entry")
                .arg(Arg::new("id").required(true))
                .arg(Arg::new("title").long("title"))
                .arg(
                    Arg::new("amount")
                        .long("amount")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64)),
                )
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("classifier").long(classifier))
                .arg(Arg::new("notes").long("notes")),
        )
        .subcommand(Command::new("delete").arg(Arg::new("id").required(true)))
        .subcommand(Command::new("clear").about(format!("Delete all {}", kind.resource())))
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .version(clap::crate_version!())
        .about("Track expenses and incomes, serve them over REST, and keep monthly backups")
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .help("sqlite | local | api"),
        )
        .arg(Arg::new("db").long("db").global(true).help("SQLite file"))
        .arg(
            Arg::new("local")
                .long("local")
                .global(true)
                .help("Local JSON store file"),
        )
        .arg(Arg::new("api-url").long("api-url").global(true))
        .subcommand(Command::new("init").about("Create storage and print its location"))
        .subcommand(record_command(RecordKind::Expense))
        .subcommand(record_command(RecordKind::Income))
        .subcommand(
            Command::new("refs")
                .about("Saved reference amounts")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_negative_numbers(true)
                                .value_parser(value_parser!(f64)),
                        ),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(Command::new("delete").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("summary")
                .about("Total income, total expense and net")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("feed")
                .about("Incomes and expenses together, latest first")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export")
                .about("Write a monthly backup")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .help("YYYY-MM, defaults to the current month"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .help("json | csv"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .help("Output path, defaults to backup-YYYY-MM.<ext>"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Load a JSON backup")
                .arg(Arg::new("path").long("path").required(true))
                .arg(
                    Arg::new("replace")
                        .long("replace")
                        .action(ArgAction::SetTrue)
                        .help("Overwrite stored data instead of merging"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the REST backend")
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16)),
                ),
        )
}
