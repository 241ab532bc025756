// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `setql` command line front end
//!
//! Compiles YAML query and write documents against a YAML model document and
//! prints the resulting SQL. Logging goes to stderr and is controlled through
//! `RUST_LOG`.

mod commands;
mod model;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "setql")]
#[command(about = "Compile query and bulk write specifications to SQL Server text")]
#[command(version)]
struct Cli {
    /// Print compiled output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a query specification
    Compile {
        /// Model document declaring options and entities
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        /// Query specification document
        #[arg(long, value_name = "PATH")]
        query: PathBuf,
    },
    /// Compile a table-valued insert
    Insert {
        /// Model document declaring options and entities
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        /// Table-valued write document
        #[arg(long, value_name = "PATH")]
        write: PathBuf,
    },
    /// Compile an insert into a dependent table from keyed rows
    InsertInto {
        /// Model document declaring options and entities
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        /// Dependent write document
        #[arg(long, value_name = "PATH")]
        write: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut out = io::stdout().lock();
    match &cli.command {
        Command::Compile { model, query } => commands::compile(model, query, cli.json, &mut out),
        Command::Insert { model, write } => commands::insert(model, write, cli.json, &mut out),
        Command::InsertInto { model, write } => {
            commands::insert_into(model, write, cli.json, &mut out)
        }
    }
}
