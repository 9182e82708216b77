use std::collections::HashMap;

use martlock_consumer::ChangeEvent;
use martlock_schema::{ColumnType, TableSpec};
use serde_json::Value;
use thiserror::Error;

/// A projected row: column name to JSON value, ready for the caller to hand
/// to whatever insertion path the dialect-specific DDL from
/// `martlock-schema` targets.
pub type Row = HashMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("change event payload must be a JSON object, found {found}")]
    PayloadNotAnObject { found: &'static str },
    #[error("column {column} is not nullable and has no corresponding payload key")]
    MissingRequiredColumn { column: String },
}

/// Projects `event` into a [`Row`] shaped for `table`.
///
/// `ColumnType::ResourceKey` columns are populated from
/// `event.resource_key.canonical_string()` rather than from the payload —
/// that is the one derived column this projection knows how to fill in.
/// Every other non-nullable column must have a matching key in
/// `event.payload`, which must itself be a JSON object; missing or absent
/// payload keys for nullable columns are simply omitted from the row.
pub fn project(event: &ChangeEvent, table: &TableSpec) -> Result<Row, ProjectionError> {
    let payload = event.payload.as_object().ok_or_else(|| ProjectionError::PayloadNotAnObject {
        found: json_type_name(&event.payload),
    })?;

    let mut row = Row::new();
    for column in &table.columns {
        if column.column_type == ColumnType::ResourceKey {
            row.insert(column.name.clone(), Value::String(event.resource_key.canonical_string()));
            continue;
        }
        match payload.get(&column.name) {
            Some(value) => {
                row.insert(column.name.clone(), value.clone());
            }
            None if !column.nullable => {
                return Err(ProjectionError::MissingRequiredColumn {
                    column: column.name.clone(),
                });
            }
            None => {}
        }
    }
    Ok(row)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
