// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Table-valued write compiler tests

use setql_catalog::MetadataError;
use setql_compiler::{
    CompileError, CompilerOptions, SpecificationError, TableValuedCompiler, correlate_results,
};
use setql_ir::{DependentWrite, Literal, Row, TableValuedWrite};
use setql_test_utils::{Person, PersonDate, Tag, fixture_catalog};

fn compiler() -> TableValuedCompiler {
    TableValuedCompiler::new(fixture_catalog())
}

fn people() -> Vec<Row> {
    vec![
        Row::new()
            .with("Name", "Ada")
            .with("Born", Literal::Date("1815-12-10".into())),
        Row::new().with("Name", "Alan"),
    ]
}

#[test]
fn test_plain_insert_has_no_output() {
    let write = TableValuedWrite::of::<Tag>()
        .with_rows([Row::new().with("Name", "red").with("Weight", 1)])
        .select_results()
        .correlate_on(["Name"]);

    let script = compiler().compile_insert(&write).unwrap();
    assert_eq!(
        script.sql,
        "INSERT INTO [meta].[Tag] ([Name], [Weight]) SELECT [tvp].[Name], [tvp].[Weight] FROM @TagTable AS [tvp];"
    );
    assert!(!script.sql.contains("OUTPUT"));
    assert_eq!(script.parameter.name, "@TagTable");
}

#[test]
fn test_generated_key_capture() {
    let write = TableValuedWrite::of::<Person>().with_rows(people());

    let script = compiler().compile_insert(&write).unwrap();
    assert_eq!(
        script.sql,
        concat!(
            "DECLARE @inserted TABLE ([Id] INT, [Name] NVARCHAR(50), [Born] DATE);\n",
            "INSERT INTO [dbo].[People] ([Name], [Born]) ",
            "OUTPUT INSERTED.[Id], INSERTED.[Name], INSERTED.[Born] ",
            "INTO @inserted ([Id], [Name], [Born]) ",
            "SELECT [tvp].[Name], [tvp].[Born] FROM @PersonTable AS [tvp];"
        )
    );
    assert_eq!(
        script.parameter.rows,
        vec![
            vec![
                Literal::Null,
                Literal::from("Ada"),
                Literal::Date("1815-12-10".into())
            ],
            vec![Literal::Null, Literal::from("Alan"), Literal::Null],
        ]
    );
}

#[test]
fn test_correlated_select_joins_on_keys() {
    let write = TableValuedWrite::of::<Person>()
        .with_rows(people())
        .output(["Id"])
        .correlate_on(["Name"])
        .select_results();

    let script = compiler().compile_insert(&write).unwrap();
    let statements: Vec<&str> = script.sql.lines().collect();
    assert_eq!(statements.len(), 3);
    assert_eq!(
        statements[0],
        "DECLARE @inserted TABLE ([Id] INT, [Name] NVARCHAR(50));"
    );
    assert!(statements[1].contains("OUTPUT INSERTED.[Id], INSERTED.[Name] INTO @inserted ([Id], [Name])"));
    assert_eq!(
        statements[2],
        concat!(
            "SELECT [inserted].[Id], [inserted].[Name] FROM @inserted AS [inserted] ",
            "INNER JOIN @PersonTable AS [tvp] ON [inserted].[Name] = [tvp].[Name];"
        )
    );
}

#[test]
fn test_select_results_requires_correlation_key() {
    let write = TableValuedWrite::of::<Person>().select_results();
    assert_eq!(
        compiler().compile_insert(&write).unwrap_err(),
        CompileError::Specification(SpecificationError::MissingCorrelationKey {
            entity: "Person".into()
        })
    );
}

#[test]
fn test_generated_correlation_key_is_rejected() {
    let write = TableValuedWrite::of::<Person>()
        .with_rows(people())
        .correlate_on(["Name", "Id"])
        .select_results();
    assert_eq!(
        compiler().compile_insert(&write).unwrap_err(),
        CompileError::Specification(SpecificationError::GeneratedCorrelationKey {
            entity: "Person".into(),
            column: "Id".into()
        })
    );
}

#[test]
fn test_capture_requires_primary_key() {
    let catalog = setql_catalog::EntityCatalog::with_definitions([
        setql_catalog::EntityDefinition::new("Log")
            .with_column(
                setql_catalog::ColumnDefinition::new("Seq", setql_catalog::DataType::BigInt)
                    .with_generated(),
            )
            .with_column(setql_catalog::ColumnDefinition::new(
                "Message",
                setql_catalog::DataType::Text,
            )),
    ])
    .unwrap();
    let compiler = TableValuedCompiler::new(std::sync::Arc::new(catalog));

    assert_eq!(
        compiler
            .compile_insert(&TableValuedWrite::new("Log"))
            .unwrap_err(),
        CompileError::Metadata(MetadataError::MissingPrimaryKey("Log".into()))
    );
}

#[test]
fn test_empty_batch_still_compiles() {
    let plain = compiler()
        .compile_insert(&TableValuedWrite::of::<Tag>())
        .unwrap();
    assert!(plain.sql.starts_with("INSERT INTO [meta].[Tag]"));
    assert!(plain.parameter.rows.is_empty());

    let capturing = compiler()
        .compile_insert(
            &TableValuedWrite::of::<Person>()
                .correlate_on(["Name"])
                .select_results(),
        )
        .unwrap();
    assert_eq!(capturing.sql.lines().count(), 3);
    assert_eq!(capturing.parameter.columns.len(), 3);
}

#[test]
fn test_dependent_write() {
    let keyed = vec![
        Row::new()
            .with("Id", 1)
            .with("Name", "Ada")
            .with("Born", Literal::Date("1815-12-10".into())),
        Row::new().with("Id", 2).with("Name", "Alan"),
    ];
    let write = DependentWrite::of::<PersonDate>()
        .with_rows(keyed)
        .from("Id", "PersonId")
        .from("Born", "Value")
        .require("Born");

    let script = compiler().compile_dependent(&write).unwrap();
    assert_eq!(
        script.sql,
        concat!(
            "INSERT INTO [dbo].[PersonDate] ([PersonId], [Value]) ",
            "SELECT [tvp].[PersonId], [tvp].[Value] FROM @PersonDateTable AS [tvp];"
        )
    );
    assert_eq!(
        script.parameter.rows,
        vec![vec![
            Literal::Integer(1),
            Literal::Date("1815-12-10".into())
        ]]
    );
    let names: Vec<_> = script
        .parameter
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["PersonId", "Value"]);
}

#[test]
fn test_dependent_write_rejects_generated_target() {
    let write = DependentWrite::of::<PersonDate>().from("Id", "Id");
    assert!(matches!(
        compiler().compile_dependent(&write),
        Err(CompileError::Specification(
            SpecificationError::GeneratedColumnTarget { .. }
        ))
    ));

    let unknown = DependentWrite::of::<PersonDate>().from("Id", "Missing");
    assert!(matches!(
        compiler().compile_dependent(&unknown),
        Err(CompileError::Specification(
            SpecificationError::UnknownColumn { .. }
        ))
    ));
}

#[test]
fn test_capture_correlate_and_chain() {
    let compiler = compiler();
    let originals = people();

    let insert = TableValuedWrite::of::<Person>()
        .with_rows(originals.clone())
        .output(["Id", "Name"])
        .correlate_on(["Name"])
        .select_results();
    compiler.compile_insert(&insert).unwrap();

    // Rows as returned by the correlated select
    let returned = vec![
        Row::new().with("Id", 11).with("Name", "Alan"),
        Row::new().with("Id", 10).with("Name", "Ada"),
    ];
    let keyed = correlate_results(&originals, &returned, &["Name".to_string()]);

    let dates = compiler
        .compile_dependent(
            &DependentWrite::of::<PersonDate>()
                .with_rows(keyed)
                .from("Id", "PersonId")
                .from("Born", "Value")
                .require("Born"),
        )
        .unwrap();
    assert_eq!(
        dates.parameter.rows,
        vec![vec![
            Literal::Integer(10),
            Literal::Date("1815-12-10".into())
        ]]
    );
}

#[test]
fn test_custom_names() {
    let options = CompilerOptions::default()
        .with_inserted_table("created")
        .with_tvp_alias("src");
    let compiler = compiler().with_options(options);

    let script = compiler
        .compile_insert(
            &TableValuedWrite::of::<Person>()
                .correlate_on(["Name"])
                .select_results(),
        )
        .unwrap();
    assert!(script.sql.starts_with("DECLARE @created TABLE"));
    assert!(script.sql.contains("FROM @PersonTable AS [src];"));
    assert!(script.sql.contains("FROM @created AS [created] INNER JOIN @PersonTable AS [src]"));
}
