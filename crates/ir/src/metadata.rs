// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for entity mapping
//!
//! An [`EntityDefinition`] describes how one model type maps onto a table:
//! its schema-qualified table name, its columns in declaration order, its
//! primary key and the navigation relations it declares to other entities.
//!
//! Model types attach their definition through the [`Entity`] trait. The
//! catalog crate resolves, validates and caches those definitions.

use serde::{Deserialize, Serialize};

/// SQL data types (SQL Server flavoured)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DataType {
    // Numeric types
    Integer,
    BigInt,
    SmallInt,
    TinyInt,
    Decimal { precision: u8, scale: u8 },
    Money,
    Float,
    Double,

    // String types
    Varchar(Option<usize>),
    NVarchar(Option<usize>),
    Char(Option<usize>),
    Text,

    // Binary types
    Binary(Option<usize>),
    VarBinary(Option<usize>),

    // Date/Time types
    Date,
    Time,
    DateTime,
    DateTimeOffset,

    Boolean,
    Uuid,

    // Unknown/Other (with original type name)
    Other(String),
}

impl DataType {
    /// Whether values of this type are variable-length text
    ///
    /// Equality predicates against such columns compile to `LIKE` so callers
    /// can supply trailing wildcards.
    pub fn is_variable_text(&self) -> bool {
        matches!(
            self,
            DataType::Varchar(_) | DataType::NVarchar(_) | DataType::Text
        )
    }

    /// Type name used when declaring table variables
    pub fn sql_type(&self) -> String {
        fn sized(name: &str, len: &Option<usize>) -> String {
            match len {
                Some(len) => format!("{}({})", name, len),
                None => format!("{}(MAX)", name),
            }
        }

        match self {
            DataType::Integer => "INT".to_string(),
            DataType::BigInt => "BIGINT".to_string(),
            DataType::SmallInt => "SMALLINT".to_string(),
            DataType::TinyInt => "TINYINT".to_string(),
            DataType::Decimal { precision, scale } => {
                format!("DECIMAL({}, {})", precision, scale)
            }
            DataType::Money => "MONEY".to_string(),
            DataType::Float => "REAL".to_string(),
            DataType::Double => "FLOAT".to_string(),
            DataType::Varchar(len) => sized("VARCHAR", len),
            DataType::NVarchar(len) => sized("NVARCHAR", len),
            DataType::Char(Some(len)) => format!("CHAR({})", len),
            DataType::Char(None) => "CHAR(1)".to_string(),
            DataType::Text => "NVARCHAR(MAX)".to_string(),
            DataType::Binary(Some(len)) => format!("BINARY({})", len),
            DataType::Binary(None) => "BINARY(1)".to_string(),
            DataType::VarBinary(len) => sized("VARBINARY", len),
            DataType::Date => "DATE".to_string(),
            DataType::Time => "TIME".to_string(),
            DataType::DateTime => "DATETIME2".to_string(),
            DataType::DateTimeOffset => "DATETIMEOFFSET".to_string(),
            DataType::Boolean => "BIT".to_string(),
            DataType::Uuid => "UNIQUEIDENTIFIER".to_string(),
            DataType::Other(name) => name.clone(),
        }
    }
}

/// A physical column of an entity's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Physical column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether the column accepts NULL
    #[serde(default)]
    pub nullable: bool,
    /// Whether the server generates the value (identity / default key)
    #[serde(default)]
    pub generated: bool,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            generated: false,
        }
    }

    /// Builder method: set nullable
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: mark as server generated
    pub fn with_generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

/// A navigable path from one entity to another
///
/// `left_column` belongs to the declaring entity, `right_column` to the
/// target. The navigation name doubles as the join alias whenever the same
/// target entity is reached by more than one path in a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Navigation member name
    pub navigation: String,
    /// Target entity name
    pub target: String,
    /// Join column on the declaring entity
    pub left_column: String,
    /// Join column on the target entity
    pub right_column: String,
}

impl RelationDefinition {
    pub fn new(
        navigation: impl Into<String>,
        target: impl Into<String>,
        left_column: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self {
            navigation: navigation.into(),
            target: target.into(),
            left_column: left_column.into(),
            right_column: right_column.into(),
        }
    }

    /// Relation whose target is a model type
    pub fn to<T: Entity>(
        navigation: impl Into<String>,
        left_column: impl Into<String>,
        right_column: impl Into<String>,
    ) -> Self {
        Self::new(navigation, T::NAME, left_column, right_column)
    }
}

/// Table, column and relation definition of one model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Model type name
    pub name: String,
    /// Schema name; the compiler's default schema applies when absent
    #[serde(default)]
    pub schema: Option<String>,
    /// Table name
    pub table: String,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    /// Primary key column names
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Navigation relations in declaration order
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

impl EntityDefinition {
    /// Create a definition whose table shares the entity's name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            schema: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Builder method: set schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder method: set table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Builder method: append a column
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder method: set primary key columns
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: append a relation
    pub fn with_relation(mut self, relation: RelationDefinition) -> Self {
        self.relations.push(relation);
        self
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get relation by navigation name
    pub fn relation(&self, navigation: &str) -> Option<&RelationDefinition> {
        self.relations.iter().find(|r| r.navigation == navigation)
    }

    /// Get primary key columns
    pub fn primary_key_columns(&self) -> Vec<&ColumnDefinition> {
        self.primary_key
            .iter()
            .filter_map(|name| self.column(name))
            .collect()
    }

    /// Whether any column is server generated
    pub fn has_generated_columns(&self) -> bool {
        self.columns.iter().any(|c| c.generated)
    }

    /// Columns the client supplies on insert
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.generated)
    }
}

/// Declarative metadata attached to a model type
///
/// ```rust,ignore
/// struct Person;
///
/// impl Entity for Person {
///     const NAME: &'static str = "Person";
///
///     fn definition() -> EntityDefinition {
///         EntityDefinition::new(Self::NAME)
///             .with_schema("dbo")
///             .with_column(ColumnDefinition::new("Id", DataType::Integer).with_generated())
///             .with_primary_key(["Id"])
///     }
/// }
/// ```
pub trait Entity: 'static {
    /// Entity name, equal to the name of [`Entity::definition`]
    const NAME: &'static str;

    /// Build the entity's definition
    fn definition() -> EntityDefinition;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> EntityDefinition {
        EntityDefinition::new("Person")
            .with_schema("dbo")
            .with_table("People")
            .with_column(ColumnDefinition::new("Id", DataType::Integer).with_generated())
            .with_column(ColumnDefinition::new("Name", DataType::NVarchar(Some(100))))
            .with_column(ColumnDefinition::new("Born", DataType::Date).with_nullable(true))
            .with_primary_key(["Id"])
            .with_relation(RelationDefinition::new("Address", "Address", "AddressId", "Id"))
    }

    #[test]
    fn test_column_order_is_declaration_order() {
        let names: Vec<_> = person().columns.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Id", "Name", "Born"]);
    }

    #[test]
    fn test_lookup_helpers() {
        let person = person();
        assert_eq!(person.table, "People");
        assert!(person.column("Name").is_some());
        assert!(person.column("Missing").is_none());
        assert_eq!(person.relation("Address").unwrap().right_column, "Id");
        assert_eq!(person.primary_key_columns().len(), 1);
        assert!(person.has_generated_columns());

        let insertable: Vec<_> = person.insertable_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(insertable, vec!["Name", "Born"]);
    }

    #[test]
    fn test_variable_text_classification() {
        assert!(DataType::NVarchar(Some(20)).is_variable_text());
        assert!(DataType::Varchar(None).is_variable_text());
        assert!(DataType::Text.is_variable_text());
        assert!(!DataType::Char(Some(2)).is_variable_text());
        assert!(!DataType::Integer.is_variable_text());
        assert!(!DataType::Uuid.is_variable_text());
    }

    #[test]
    fn test_sql_type_names() {
        assert_eq!(DataType::NVarchar(None).sql_type(), "NVARCHAR(MAX)");
        assert_eq!(DataType::Varchar(Some(12)).sql_type(), "VARCHAR(12)");
        assert_eq!(
            DataType::Decimal {
                precision: 18,
                scale: 4
            }
            .sql_type(),
            "DECIMAL(18, 4)"
        );
        assert_eq!(DataType::DateTime.sql_type(), "DATETIME2");
        assert_eq!(DataType::Other("GEOGRAPHY".into()).sql_type(), "GEOGRAPHY");
    }

    #[test]
    fn test_definition_from_yaml() {
        let yaml = r#"
name: Person
schema: dbo
table: People
columns:
  - name: Id
    data_type: Integer
    generated: true
  - name: Name
    data_type: !NVarchar 100
primary_key: [Id]
"#;
        let parsed: EntityDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.columns.len(), 2);
        assert!(parsed.columns[0].generated);
        assert!(!parsed.columns[1].nullable);
        assert_eq!(parsed.columns[1].data_type, DataType::NVarchar(Some(100)));
        assert!(parsed.relations.is_empty());
    }
}
