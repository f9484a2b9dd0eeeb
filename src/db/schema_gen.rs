use crate::schema::{Column, PrimaryKey, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut lines = Vec::new();

    let surrogate = matches!(schema.primary_key, PrimaryKey::Surrogate);

    for col in schema.columns {
        lines.push(format!("    {}", column_definition(col, surrogate)));
    }

    if let PrimaryKey::Composite(columns) = schema.primary_key {
        lines.push(format!("    PRIMARY KEY ({})", columns.join(", ")));
    }

    for check in schema.checks {
        lines.push(format!("    CHECK ({})", check));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        lines.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&lines.join(",\n"));
    sql.push_str("\n)");

    sql
}

fn column_definition(col: &Column, surrogate: bool) -> String {
    let mut def = format!("{} {}", col.name, col.col_type.sql_type());

    if surrogate && col.name == "id" {
        // Alias for the rowid: NULL on insert assigns the next id
        def.push_str(" PRIMARY KEY");
        return def;
    }

    if !col.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(literal) = col.default {
        def.push_str(&format!(" DEFAULT {}", literal));
    }
    if let Some(len) = col.max_len {
        def.push_str(&format!(" CHECK (length({}) <= {})", col.name, len));
    }
    match (col.min, col.max) {
        (Some(min), Some(max)) => {
            def.push_str(&format!(" CHECK ({} BETWEEN {} AND {})", col.name, min, max))
        }
        (Some(min), None) => def.push_str(&format!(" CHECK ({} >= {})", col.name, min)),
        (None, Some(max)) => def.push_str(&format!(" CHECK ({} <= {})", col.name, max)),
        (None, None) => {}
    }

    def
}

/// Generate CREATE INDEX statements for declared indexes and foreign key columns.
///
/// A foreign key column gets its own index unless it already leads the
/// composite primary key or a declared index.
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    let mut statements: Vec<String> = schema
        .indexes
        .iter()
        .map(|index| {
            let (kind, prefix) = if index.unique {
                ("UNIQUE INDEX", "uq")
            } else {
                ("INDEX", "idx")
            };
            format!(
                "CREATE {} IF NOT EXISTS {}_{}_{} ON {}({})",
                kind,
                prefix,
                schema.name,
                index.columns.join("_"),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect();

    let leading_pk = match schema.primary_key {
        PrimaryKey::Composite(columns) => columns.first().copied(),
        PrimaryKey::Surrogate => None,
    };

    for fk in schema.foreign_keys {
        let covered = leading_pk == Some(fk.column)
            || schema
                .indexes
                .iter()
                .any(|index| index.columns.first() == Some(&fk.column));
        if covered {
            continue;
        }

        statements.push(format!(
            "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
            schema.name, fk.column, schema.name, fk.column
        ));
    }

    statements
}
