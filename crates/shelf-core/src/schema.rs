//! Table schemas for the SQLite-backed collections
//!
//! A schema names a table and its columns. Every table also gets an implicit
//! auto-increment `Id` identity column, which the SQLite backend uses as the
//! external address of a row.

use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};
use shelf_types::{FieldValue, Record};

/// Name of the implicit identity column
pub const ID_COLUMN: &str = "Id";

/// Storage class of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Text,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Text => "TEXT",
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Text => "string",
        }
    }

    /// Null fits every column.
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (_, FieldValue::Null)
                | (ColumnKind::Integer, FieldValue::Integer(_))
                | (ColumnKind::Text, FieldValue::String(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn integer(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Integer }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ColumnKind::Text }
    }
}

/// Declarative table definition, the model class of an ORM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self { table: table.into(), columns }
    }

    /// User profiles: `UserProfiles(Id, Name, LastName, Age)`
    pub fn user_profiles() -> Self {
        Self::new(
            "UserProfiles",
            vec![ColumnSpec::text("Name"), ColumnSpec::text("LastName"), ColumnSpec::integer("Age")],
        )
    }

    /// Authors: `AuthorProfile(Id, Name, Description, Url, Slug)`
    pub fn authors() -> Self {
        Self::new(
            "AuthorProfile",
            vec![
                ColumnSpec::text("Name"),
                ColumnSpec::text("Description"),
                ColumnSpec::text("Url"),
                ColumnSpec::text("Slug"),
            ],
        )
    }

    /// Look up a built-in schema by name
    pub fn builtin(name: &str) -> ShelfResult<Self> {
        match name {
            "profiles" | "user_profiles" => Ok(Self::user_profiles()),
            "authors" => Ok(Self::authors()),
            other => Err(ShelfError::configuration(format!("Unknown table schema '{other}'"))),
        }
    }

    /// Declared column named `name`, if any
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check identifiers and column declarations.
    pub fn validate(&self) -> ShelfResult<()> {
        if !is_identifier(&self.table) {
            return Err(ShelfError::configuration(format!(
                "Invalid table name '{}'",
                self.table
            )));
        }
        if self.columns.is_empty() {
            return Err(ShelfError::configuration(format!(
                "Table {} declares no columns",
                self.table
            )));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if !is_identifier(&column.name) || column.name.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(ShelfError::configuration(format!(
                    "Invalid column name '{}' in table {}",
                    column.name, self.table
                )));
            }
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(ShelfError::configuration(format!(
                    "Duplicate column '{}' in table {}",
                    column.name, self.table
                )));
            }
        }
        Ok(())
    }

    /// Reject records naming undeclared columns or carrying mistyped values.
    pub fn check_record(&self, record: &Record) -> ShelfResult<()> {
        for (name, value) in record.iter() {
            let column = self.column(name).ok_or_else(|| ShelfError::UnknownField {
                table: self.table.clone(),
                field: name.clone(),
            })?;
            if !column.kind.accepts(value) {
                return Err(ShelfError::FieldType {
                    table: self.table.clone(),
                    field: name.clone(),
                    expected: column.kind.type_name(),
                    actual: value.type_name(),
                });
            }
        }
        Ok(())
    }

    /// `CREATE TABLE IF NOT EXISTS` with the implicit `Id` column first
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\"{ID_COLUMN}\" INTEGER PRIMARY KEY AUTOINCREMENT, {columns})",
            self.table
        )
    }

    pub fn insert_sql(&self) -> String {
        let names = self.columns.iter().map(|c| format!("\"{}\"", c.name)).collect::<Vec<_>>();
        let params = vec!["?"; self.columns.len()];
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.table,
            names.join(", "),
            params.join(", ")
        )
    }

    pub fn select_sql(&self) -> String {
        let mut names = vec![format!("\"{ID_COLUMN}\"")];
        names.extend(self.columns.iter().map(|c| format!("\"{}\"", c.name)));
        format!("SELECT {} FROM \"{}\"", names.join(", "), self.table)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
