use std::collections::HashSet;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    Integer,
    /// Fixed one-decimal measurements (height, weight, ratios)
    Real,
    Text,
    /// Stored as 0/1 integers
    Boolean,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    /// Override JSON field name (default: the column name)
    pub json_field: Option<&'static str>,
    /// Maximum text length, enforced with a CHECK constraint
    pub max_len: Option<u32>,
    /// Inclusive lower bound for numeric columns
    pub min: Option<i64>,
    /// Inclusive upper bound for numeric columns
    pub max: Option<i64>,
    /// SQL literal used as the column default
    pub default: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            json_field: None,
            max_len: None,
            min: None,
            max: None,
            default: None,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            ..Self::new(name, col_type)
        }
    }

    /// Set the JSON field name (for when it differs from the column name)
    pub const fn json(self, field: &'static str) -> Self {
        Self {
            json_field: Some(field),
            ..self
        }
    }

    pub const fn max_len(self, len: u32) -> Self {
        Self {
            max_len: Some(len),
            ..self
        }
    }

    /// Reject values below zero
    pub const fn non_negative(self) -> Self {
        Self {
            min: Some(0),
            ..self
        }
    }

    pub const fn between(self, min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..self
        }
    }

    pub const fn default_value(self, literal: &'static str) -> Self {
        Self {
            default: Some(literal),
            ..self
        }
    }

    /// JSON key this column is read from
    pub fn json_key(&self) -> &'static str {
        self.json_field.unwrap_or(self.name)
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }
}

/// Index definition
#[derive(Debug, Clone)]
pub struct Index {
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl Index {
    /// Create a non-unique index
    pub const fn on(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: false,
        }
    }

    /// Create a unique index
    pub const fn unique(columns: &'static [&'static str]) -> Self {
        Self {
            columns,
            unique: true,
        }
    }
}

/// How rows are keyed
#[derive(Debug, Clone)]
pub enum PrimaryKey {
    /// `id INTEGER PRIMARY KEY`, assigned by the database unless supplied
    Surrogate,
    /// Association tables: the pair itself is the key
    Composite(&'static [&'static str]),
}

/// Describes how association rows are extracted from a parent's JSONL file
#[derive(Debug, Clone)]
pub enum ArraySource {
    /// Array of ids in the parent row: `{"id": X, "type_ids": [1, 2]}`
    SimpleIntArray {
        /// JSON field containing the array (e.g., "type_ids")
        array_field: &'static str,
        /// Column to store the parent's id (e.g., "pokemon_id")
        parent_id_column: &'static str,
        /// Column to store each array value (e.g., "type_id")
        value_column: &'static str,
    },
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub source_file: &'static str,
    pub primary_key: PrimaryKey,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    /// Explicit index definitions
    pub indexes: &'static [Index],
    /// Table-level CHECK expressions
    pub checks: &'static [&'static str],
    /// Association tables filled from this table's source file
    pub child_tables: &'static [&'static str],
    /// For association tables: how to extract rows from the parent file
    pub array_source: Option<ArraySource>,
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .filter(|parent| *parent != self.name)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the columns written on insert
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn is_association(&self) -> bool {
        matches!(self.primary_key, PrimaryKey::Composite(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builders_compose() {
        let col = Column::required("hp", ColumnType::Integer).non_negative();
        assert!(!col.nullable);
        assert_eq!(col.min, Some(0));
        assert_eq!(col.max, None);

        let col = Column::new("male", ColumnType::Real).between(0, 100).json("male_ratio");
        assert!(col.nullable);
        assert_eq!((col.min, col.max), (Some(0), Some(100)));
        assert_eq!(col.json_key(), "male_ratio");
    }

    #[test]
    fn test_json_key_defaults_to_column_name() {
        let col = Column::required("species", ColumnType::Text).max_len(70);
        assert_eq!(col.json_key(), "species");
        assert_eq!(col.max_len, Some(70));
    }
}
