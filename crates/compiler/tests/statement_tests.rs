// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Statement compiler tests: projection, joins, predicates and ordering

use setql_compiler::{CompileError, CompilerOptions, SpecificationError, StatementCompiler};
use setql_ir::{Literal, QuerySpec};
use setql_test_utils::{Root, SqlAssertions, fixture_catalog};

fn compiler() -> StatementCompiler {
    StatementCompiler::new(fixture_catalog())
}

#[test]
fn test_end_to_end_select() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .left_join("SubData")
        .where_eq("Id", 4)
        .where_eq("Related.Name", "Jo%")
        .where_eq("BackupId", None::<i64>)
        .where_between(
            "Created",
            Literal::DateTime("2024-01-01T00:00:00".into()),
            Literal::DateTime("2024-12-31T23:59:59".into()),
        )
        .order_by("Related.Name")
        .order_by_desc("Id");

    let compiled = compiler().compile(&spec).unwrap();

    let expected = concat!(
        "SELECT [dbo].[Related].[Id] AS [Related.Id], ",
        "[dbo].[Related].[Name] AS [Related.Name], ",
        "[dbo].[Related].[OwnerId] AS [Related.OwnerId], ",
        "[dbo].[SubData].[Value], ",
        "[dbo].[Root].[Id], [dbo].[Root].[Name], [dbo].[Root].[RelatedId], ",
        "[dbo].[Root].[BackupId], [dbo].[Root].[Created] ",
        "FROM [dbo].[Root] ",
        "INNER JOIN [dbo].[Related] ON [dbo].[Root].[RelatedId] = [dbo].[Related].[Id] ",
        "LEFT JOIN [dbo].[SubData] ON [dbo].[Root].[Id] = [dbo].[SubData].[RootId] ",
        "WHERE [dbo].[Root].[Id] = @0 ",
        "AND [dbo].[Related].[Name] LIKE @1 ",
        "AND [dbo].[Root].[BackupId] IS NULL ",
        "AND [dbo].[Root].[Created] BETWEEN @2 AND @3 ",
        "ORDER BY [dbo].[Related].[Name] ASC, [dbo].[Root].[Id] DESC"
    );
    assert_eq!(compiled.sql, expected);
    assert_eq!(
        compiled.parameters,
        vec![
            Literal::Integer(4),
            Literal::from("Jo%"),
            Literal::DateTime("2024-01-01T00:00:00".into()),
            Literal::DateTime("2024-12-31T23:59:59".into()),
        ]
    );
}

#[test]
fn test_parameter_count_matches_predicates() {
    let spec = QuerySpec::of::<Root>()
        .select("Id")
        .where_in("Id", [1, 2, 3])
        .where_gte("Created", Literal::DateTime("2024-01-01".into()))
        .where_null("BackupId")
        .where_lte("RelatedId", 9)
        .where_between("Id", 1, 100)
        .where_eq("Name", "x");

    let compiled = compiler().compile(&spec).unwrap();

    // In(3) + Gte(1) + IsNull(0) + Lte(1) + Between(2) + Equal(1)
    assert_eq!(compiled.parameters.len(), 8);
    SqlAssertions::assert_sequential_parameters(&compiled.sql, 8);
    assert!(
        compiled
            .sql
            .contains("[dbo].[Root].[Id] IN (@0, @1, @2) AND [dbo].[Root].[Created] >= @3")
    );
    assert!(compiled.sql.contains("[dbo].[Root].[RelatedId] <= @4"));
}

#[test]
fn test_compilation_is_idempotent() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .where_eq("Related.Name", "A%")
        .order_by("Id")
        .skip(10)
        .take(5);
    let compiler = compiler();

    let first = compiler.compile(&spec).unwrap();
    let second = compiler.compile(&spec).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_explicit_projection_order() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .select("Related.Name")
        .select("Id");

    let compiled = compiler().compile(&spec).unwrap();
    assert!(compiled.sql.starts_with(
        "SELECT [dbo].[Related].[Name] AS [Related.Name], [dbo].[Root].[Id] FROM [dbo].[Root]"
    ));
}

#[test]
fn test_repeated_target_is_aliased() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .left_join("Backup")
        .select("Related.Name")
        .select("Backup.Name");

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            "SELECT [dbo].[Related].[Name] AS [Related.Name], [Backup].[Name] AS [Backup.Name] ",
            "FROM [dbo].[Root] ",
            "INNER JOIN [dbo].[Related] ON [dbo].[Root].[RelatedId] = [dbo].[Related].[Id] ",
            "LEFT JOIN [dbo].[Related] AS [Backup] ON [dbo].[Root].[BackupId] = [Backup].[Id]"
        )
    );
}

#[test]
fn test_alias_colliding_with_table_name_is_rejected() {
    // Backup reaches Related first, leaving the Related edge aliased as [Related]
    let spec = QuerySpec::of::<Root>()
        .join("Backup")
        .join("Related")
        .select("Id");

    assert_eq!(
        compiler().compile(&spec).unwrap_err(),
        CompileError::Specification(SpecificationError::DuplicateAlias {
            alias: "Related".into()
        })
    );
}

#[test]
fn test_first_declared_path_stays_unaliased() {
    let spec = QuerySpec::of::<Root>()
        .left_join("Backup")
        .select("Backup.Name");

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            "SELECT [dbo].[Related].[Name] AS [Backup.Name] FROM [dbo].[Root] ",
            "LEFT JOIN [dbo].[Related] ON [dbo].[Root].[BackupId] = [dbo].[Related].[Id]"
        )
    );
}

#[test]
fn test_transitive_join() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .left_join("Related.Owner")
        .select("Related.Owner.Name");

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            "SELECT [dbo].[People].[Name] AS [Related.Owner.Name] FROM [dbo].[Root] ",
            "INNER JOIN [dbo].[Related] ON [dbo].[Root].[RelatedId] = [dbo].[Related].[Id] ",
            "LEFT JOIN [dbo].[People] ON [dbo].[Related].[OwnerId] = [dbo].[People].[Id]"
        )
    );
}

#[test]
fn test_count() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .where_eq("Id", 7)
        .order_by("Id")
        .count();

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            "SELECT COUNT([dbo].[Root].[Id]) FROM [dbo].[Root] ",
            "INNER JOIN [dbo].[Related] ON [dbo].[Root].[RelatedId] = [dbo].[Related].[Id] ",
            "WHERE [dbo].[Root].[Id] = @0"
        )
    );
    assert_eq!(compiled.parameters, vec![Literal::Integer(7)]);
}

#[test]
fn test_exists() {
    let spec = QuerySpec::of::<Root>().where_eq("Id", 7).exists();

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        "IF EXISTS (SELECT 1 FROM [dbo].[Root] WHERE [dbo].[Root].[Id] = @0) SELECT 1 ELSE SELECT 0"
    );
}

#[test]
fn test_delete() {
    let spec = QuerySpec::of::<Root>()
        .join("Related")
        .where_eq("Related.Name", "old%")
        .order_by("Id")
        .take(3)
        .delete();

    let compiled = compiler().compile(&spec).unwrap();
    assert_eq!(
        compiled.sql,
        concat!(
            "DELETE [dbo].[Root] FROM [dbo].[Root] ",
            "INNER JOIN [dbo].[Related] ON [dbo].[Root].[RelatedId] = [dbo].[Related].[Id] ",
            "WHERE [dbo].[Related].[Name] LIKE @0"
        )
    );
    assert_eq!(compiled.parameters, vec![Literal::from("old%")]);
}

#[test]
fn test_default_schema_option() {
    let compiler = compiler().with_options(CompilerOptions::default().with_default_schema("app"));
    // Fixtures declare their schema explicitly, so the option does not apply
    let compiled = compiler.compile(&QuerySpec::of::<Root>().select("Id")).unwrap();
    assert_eq!(compiled.sql, "SELECT [dbo].[Root].[Id] FROM [dbo].[Root]");
}

#[test]
fn test_specification_errors() {
    let compiler = compiler();

    let unjoined = QuerySpec::of::<Root>().order_by("Related.Name");
    assert!(matches!(
        compiler.compile(&unjoined),
        Err(CompileError::Specification(
            SpecificationError::UnjoinedRelation { .. }
        ))
    ));

    let unknown_column = QuerySpec::of::<Root>().select("Missing");
    assert!(matches!(
        compiler.compile(&unknown_column),
        Err(CompileError::Specification(
            SpecificationError::UnknownColumn { .. }
        ))
    ));

    let malformed = QuerySpec::of::<Root>().where_eq("Related..Name", 1);
    assert!(matches!(
        compiler.compile(&malformed),
        Err(CompileError::Specification(
            SpecificationError::MalformedPath(_)
        ))
    ));

    let unknown_entity = QuerySpec::new("Ghost");
    assert!(matches!(
        compiler.compile(&unknown_entity),
        Err(CompileError::Metadata(_))
    ));
}

#[test]
fn test_compiled_statement_serializes() {
    let compiled = compiler()
        .compile(&QuerySpec::of::<Root>().select("Id").where_eq("Id", 1))
        .unwrap();
    let json = serde_json::to_value(&compiled).unwrap();
    assert_eq!(json["parameters"], serde_json::json!([1]));
    assert!(json["sql"].as_str().unwrap().ends_with("= @0"));
}
