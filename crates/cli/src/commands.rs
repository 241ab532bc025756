// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Subcommand implementations

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use setql_compiler::{StatementCompiler, TableValuedCompiler};
use setql_ir::{DependentWrite, QuerySpec, TableValuedWrite};
use tracing::info;

use crate::model::{ModelDocument, read_yaml};

/// Compile a query document and print its SQL and parameters
pub fn compile(model: &Path, query: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let (catalog, options) = ModelDocument::load(model)?.into_catalog()?;
    let spec: QuerySpec = read_yaml(query)?;

    let compiler = StatementCompiler::new(catalog).with_options(options);
    let compiled = compiler
        .compile(&spec)
        .with_context(|| format!("Failed to compile {}", query.display()))?;
    info!(parameters = compiled.parameters.len(), "Compiled query");

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&compiled)?)?;
    } else {
        writeln!(out, "{}", compiled.sql)?;
        writeln!(out, "{}", serde_json::to_string(&compiled.parameters)?)?;
    }
    Ok(())
}

/// Compile a table-valued write document and print its script
pub fn insert(model: &Path, write: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let (catalog, options) = ModelDocument::load(model)?.into_catalog()?;
    let spec: TableValuedWrite = read_yaml(write)?;

    let compiler = TableValuedCompiler::new(catalog).with_options(options);
    let script = compiler
        .compile_insert(&spec)
        .with_context(|| format!("Failed to compile {}", write.display()))?;
    print_script(&script, json, out)
}

/// Compile a dependent write document and print its script
pub fn insert_into(model: &Path, write: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let (catalog, options) = ModelDocument::load(model)?.into_catalog()?;
    let spec: DependentWrite = read_yaml(write)?;

    let compiler = TableValuedCompiler::new(catalog).with_options(options);
    let script = compiler
        .compile_dependent(&spec)
        .with_context(|| format!("Failed to compile {}", write.display()))?;
    print_script(&script, json, out)
}

fn print_script(
    script: &setql_compiler::TableValuedScript,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    info!(
        parameter = %script.parameter.name,
        rows = script.parameter.rows.len(),
        "Compiled write"
    );
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(script)?)?;
    } else {
        writeln!(out, "{}", script.sql)?;
        writeln!(
            out,
            "-- {}: {} row(s)",
            script.parameter.name,
            script.parameter.rows.len()
        )?;
    }
    Ok(())
}
