//! Resource-scoped locking service.
//!
//! The locking service grants named, composite-key locks to callers so
//! concurrent task handlers never mutate the same logical entity at once.
//! Deadlock avoidance across overlapping lock sets comes from a single
//! global acquisition order (sorting each request's keys before taking
//! them), not from a wait-for graph — see `process::ProcessScopeLockingService`
//! for the algorithm and DESIGN.md for why that's sufficient.

mod error;
mod interrupt;
mod process;
mod service;

pub use error::LockError;
pub use interrupt::Interrupt;
pub use process::ProcessScopeLockingService;
pub use service::{LockingService, WaitPolicy};
