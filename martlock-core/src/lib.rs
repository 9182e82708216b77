//! Martlock Core - Shared Data Types
//!
//! Pure data structures and the service lifecycle state machine shared by
//! every service in the replicator (locking, scheduling, consumption).
//! This crate contains no acquisition or dispatch logic — that lives in
//! `martlock-locking` and `martlock-scheduler`.

mod resource_key;
mod scope;
mod token;
mod state;
mod error;
mod config;

pub use resource_key::{ResourceKey, ResourceKeyParseError};
pub use scope::LockScope;
pub use token::LockToken;
pub use state::{DestroyResponsibility, IllegalStateError, ServiceLifecycle, ServiceState};
pub use error::{ServiceExecutionError, ServiceSetupError};
pub use config::MartlockConfig;
