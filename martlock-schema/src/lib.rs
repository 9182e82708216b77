//! DDL emission for the data-mart replicator's relational schema.
//!
//! Named in spec.md 6 as "the SQL schema builders (DDL emission for two
//! database dialects)" — a collaborator of the locking core, not on the
//! lock path. This crate is pure string emission: given a small in-crate
//! table model, it renders `CREATE TABLE`/`CREATE INDEX` DDL for
//! PostgreSQL and SQLite. It has no connection handling and no runtime
//! behavior beyond formatting.

mod column;
mod dialect;
mod table;

pub use column::{ColumnSpec, ColumnType};
pub use dialect::Dialect;
pub use table::{SchemaError, TableSpec};
