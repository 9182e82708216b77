//! Data-mart JSON projection.
//!
//! Named in spec.md 6 as "the data-mart JSON projection" — turns a
//! [`martlock_consumer::ChangeEvent`] plus the [`martlock_schema::TableSpec`]
//! it targets into a row ready for insertion. Deliberately thin: it is the
//! "JSON projection" the spec names, not a full ETL engine — no type
//! coercion, no joins, no derived columns beyond the resource key itself.

mod project;

pub use project::{project, ProjectionError, Row};
