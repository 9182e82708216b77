use crate::dialect::Dialect;

/// The column types the data-mart schema needs. Deliberately small: this
/// crate emits DDL for the replicator's own tables, not a general-purpose
/// SQL type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Auto-incrementing primary key (`BIGSERIAL` / SQLite `INTEGER`
    /// rowid-aliased primary key).
    Identity,
    BigInt,
    Text,
    /// `resource_type:component` canonical [`martlock_core::ResourceKey`]
    /// strings are stored as this — see `martlock-projection`.
    ResourceKey,
    Timestamp,
    Json,
    Boolean,
}

impl ColumnType {
    fn render(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (ColumnType::Identity, _) => dialect.identity_type(),
            (ColumnType::BigInt, _) => "BIGINT",
            (ColumnType::Text, _) => "TEXT",
            (ColumnType::ResourceKey, _) => "TEXT",
            (ColumnType::Timestamp, Dialect::Postgres) => "TIMESTAMPTZ",
            (ColumnType::Timestamp, Dialect::Sqlite) => "TEXT",
            (ColumnType::Json, Dialect::Postgres) => "JSONB",
            (ColumnType::Json, Dialect::Sqlite) => "TEXT",
            (ColumnType::Boolean, Dialect::Postgres) => "BOOLEAN",
            (ColumnType::Boolean, Dialect::Sqlite) => "INTEGER",
        }
    }
}

/// One column of a [`crate::TableSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub(crate) fn render(&self, dialect: Dialect) -> String {
        let mut out = format!(
            "{} {}",
            dialect.quote_ident(&self.name),
            self.column_type.render(dialect)
        );
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            out.push_str(" NOT NULL");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_column_renders_per_dialect() {
        let col = ColumnSpec::new("id", ColumnType::Identity).primary_key();
        assert_eq!(col.render(Dialect::Postgres), "\"id\" BIGSERIAL PRIMARY KEY");
        assert_eq!(col.render(Dialect::Sqlite), "\"id\" INTEGER PRIMARY KEY");
    }

    #[test]
    fn not_null_without_primary_key_renders_constraint() {
        let col = ColumnSpec::new("payload", ColumnType::Json).not_null();
        assert_eq!(col.render(Dialect::Postgres), "\"payload\" JSONB NOT NULL");
    }

    #[test]
    fn nullable_column_has_no_trailing_constraint() {
        let col = ColumnSpec::new("note", ColumnType::Text);
        assert_eq!(col.render(Dialect::Postgres), "\"note\" TEXT");
    }
}
