use thiserror::Error;

use crate::column::ColumnSpec;
use crate::dialect::Dialect;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("table must declare at least one column")]
    NoColumns,
    #[error("table {table} has no column named {column} to index")]
    UnknownIndexColumn { table: String, column: String },
}

/// A table to emit DDL for. Columns and indexes are data, not behavior —
/// the interesting logic is entirely in [`TableSpec::create_table_sql`] and
/// [`TableSpec::create_index_sql`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub indexes: Vec<Vec<String>>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns);
        }
        Ok(Self {
            name: name.into(),
            columns,
            indexes: Vec::new(),
        })
    }

    /// Registers a multi-column index, validating that every named column
    /// exists on this table.
    pub fn with_index(mut self, columns: Vec<impl Into<String>>) -> Result<Self, SchemaError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for column in &columns {
            if !self.columns.iter().any(|c| &c.name == column) {
                return Err(SchemaError::UnknownIndexColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }
        self.indexes.push(columns);
        Ok(self)
    }

    /// Renders `CREATE TABLE IF NOT EXISTS ... (...)` for `dialect`.
    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let body = self
            .columns
            .iter()
            .map(|c| c.render(dialect))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE TABLE {} {} ({})",
            dialect.if_not_exists(),
            dialect.quote_ident(&self.name),
            body
        )
    }

    /// Renders one `CREATE INDEX` statement per registered index.
    pub fn create_index_sql(&self, dialect: Dialect) -> Vec<String> {
        self.indexes
            .iter()
            .map(|columns| {
                let index_name = format!("idx_{}_{}", self.name, columns.join("_"));
                let column_list = columns
                    .iter()
                    .map(|c| dialect.quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "CREATE INDEX {} {} ON {} ({})",
                    dialect.if_not_exists(),
                    dialect.quote_ident(&index_name),
                    dialect.quote_ident(&self.name),
                    column_list
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;

    fn entities_table() -> TableSpec {
        TableSpec::new(
            "entities",
            vec![
                ColumnSpec::new("entity_key", ColumnType::ResourceKey).primary_key(),
                ColumnSpec::new("updated_at", ColumnType::Timestamp).not_null(),
                ColumnSpec::new("payload", ColumnType::Json),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_column_list() {
        assert_eq!(TableSpec::new("empty", vec![]).unwrap_err(), SchemaError::NoColumns);
    }

    #[test]
    fn create_table_sql_includes_every_column() {
        let table = entities_table();
        let sql = table.create_table_sql(Dialect::Postgres);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"entities\""));
        assert!(sql.contains("\"entity_key\" TEXT PRIMARY KEY"));
        assert!(sql.contains("\"updated_at\" TIMESTAMPTZ NOT NULL"));
        assert!(sql.contains("\"payload\" JSONB"));
    }

    #[test]
    fn create_table_sql_varies_by_dialect() {
        let table = entities_table();
        let sqlite_sql = table.create_table_sql(Dialect::Sqlite);
        assert!(sqlite_sql.contains("\"updated_at\" TEXT NOT NULL"));
    }

    #[test]
    fn with_index_rejects_unknown_column() {
        let err = entities_table().with_index(vec!["nonexistent"]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownIndexColumn {
                table: "entities".to_string(),
                column: "nonexistent".to_string(),
            }
        );
    }

    #[test]
    fn create_index_sql_renders_one_statement_per_index() {
        let table = entities_table().with_index(vec!["updated_at"]).unwrap();
        let statements = table.create_index_sql(Dialect::Postgres);
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            "CREATE INDEX IF NOT EXISTS \"idx_entities_updated_at\" ON \"entities\" (\"updated_at\")"
        );
    }
}
