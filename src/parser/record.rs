use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{ArraySource, Column, ColumnType, TableSchema};

/// A parsed row ready for insertion
#[derive(Debug)]
pub struct ParsedRow {
    pub values: HashMap<&'static str, SqlValue>,
}

static NULL: SqlValue = SqlValue::Null;

impl ParsedRow {
    /// Value for a column, NULL when the row has none
    pub fn get(&self, column: &str) -> &SqlValue {
        self.values.get(column).unwrap_or(&NULL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }

    /// Value of a column's SQL default literal
    fn from_default(col: &Column, literal: &str) -> Result<Self> {
        let value = match col.col_type {
            ColumnType::Integer | ColumnType::Boolean => SqlValue::Integer(
                literal
                    .parse()
                    .with_context(|| format!("Bad integer default for {}", col.name))?,
            ),
            ColumnType::Real => SqlValue::Real(
                literal
                    .parse()
                    .with_context(|| format!("Bad real default for {}", col.name))?,
            ),
            ColumnType::Text => SqlValue::Text(literal.trim_matches('\'').to_string()),
        };
        Ok(value)
    }
}

/// Parse a JSON line into a row for the given table schema
pub fn parse_record(line: &str, schema: &TableSchema) -> Result<ParsedRow> {
    let json: Value = serde_json::from_str(line).context("Failed to parse JSON")?;

    let mut values = HashMap::new();

    for col in schema.columns {
        let value = match json.get(col.json_key()) {
            None | Some(Value::Null) => match col.default {
                Some(literal) => SqlValue::from_default(col, literal)?,
                None if col.nullable => SqlValue::Null,
                None => bail!("Missing required field '{}'", col.json_key()),
            },
            Some(v) => extract_value(v, col)?,
        };
        values.insert(col.name, value);
    }

    Ok(ParsedRow { values })
}

/// Expand the id array of a parent record into association rows
pub fn parse_junction_rows(line: &str, schema: &TableSchema) -> Result<Vec<ParsedRow>> {
    let Some(ArraySource::SimpleIntArray {
        array_field,
        parent_id_column,
        value_column,
    }) = &schema.array_source
    else {
        bail!("Table {} has no array source", schema.name);
    };

    let json: Value = serde_json::from_str(line).context("Failed to parse JSON")?;

    let items = match json.get(*array_field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => bail!("Field '{}' must be an array of ids", array_field),
    };

    let parent_id = json
        .get("id")
        .and_then(Value::as_i64)
        .with_context(|| format!("Record with '{}' needs an explicit integer id", array_field))?;

    items
        .iter()
        .map(|item| -> Result<ParsedRow> {
            let value = item
                .as_i64()
                .with_context(|| format!("Non-integer entry in '{}': {}", array_field, item))?;
            let mut values = HashMap::new();
            values.insert(*parent_id_column, SqlValue::Integer(parent_id));
            values.insert(*value_column, SqlValue::Integer(value));
            Ok(ParsedRow { values })
        })
        .collect()
}

fn extract_value(v: &Value, col: &Column) -> Result<SqlValue> {
    let value = match col.col_type {
        ColumnType::Integer => v.as_i64().map(SqlValue::Integer),
        ColumnType::Real => v.as_f64().map(SqlValue::Real),
        ColumnType::Text => v.as_str().map(|s| SqlValue::Text(s.to_string())),
        ColumnType::Boolean => v.as_bool().map(|b| SqlValue::Integer(i64::from(b))),
    };

    value.with_context(|| {
        format!(
            "Field '{}' expected {:?}, got {}",
            col.json_key(),
            col.col_type,
            v
        )
    })
}
