use std::fmt;

/// The two SQL dialects the data-mart replicator's schema targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Renders a quoted identifier for this dialect. Both dialects accept
    /// double-quoted identifiers; this only escapes an embedded `"` by
    /// doubling it, which is all either dialect requires.
    pub fn quote_ident(self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// The dialect's keyword for an auto-incrementing primary key column,
    /// used when a [`crate::ColumnType::Identity`] column is rendered.
    pub fn identity_type(self) -> &'static str {
        match self {
            Dialect::Postgres => "BIGSERIAL",
            Dialect::Sqlite => "INTEGER",
        }
    }

    pub fn if_not_exists(self) -> &'static str {
        "IF NOT EXISTS"
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        };
        write!(f, "{name}")
    }
}
