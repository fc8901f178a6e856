//! # Syncbase Executor
//!
//! Synchronous operations over an asynchronous cluster engine.
//!
//! This is the crate callers import. It provides:
//! - [`Cluster`] - typed operations over one connection
//! - [`create_connection`] - validate options and open a bare [`Connection`]
//! - [`Command`]/[`Output`] - serializable command interface
//! - [`OptionBag`]/[`ApplyOptions`] - the option decoder
//! - [`ConnectionProfile`] - connection settings stored as TOML
//!
//! ## Option bags
//!
//! Per-call configuration is a [`Value`] mapping (or `Value::Null` for
//! none). Recognized keys are decoded into the request; unknown keys are
//! ignored; a recognized key of the wrong type fails the call with
//! `invalid_argument` naming the key before anything reaches the engine.
//!
//! ```text
//! let options = Value::object([
//!     ("timeoutMilliseconds", Value::from(2500)),
//!     ("durabilityLevel", Value::from("majority")),
//! ]);
//! cluster.upsert(&id, b"{}".to_vec(), 0, &options)?;
//! ```
//!
//! ## Errors
//!
//! Validation failures carry the offending key ([`Error::key`]). Engine
//! failures carry an [`ErrorContext`] captured from the failed response.

#![warn(clippy::all)]

mod api;
mod command;
pub mod convert;
mod executor;
pub mod options;
mod output;
mod types;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything callers need is re-exported here
// =============================================================================

pub use api::{create_connection, Cluster};
pub use command::Command;
pub use executor::Executor;
pub use options::{ApplyOptions, ConnectionProfile, OptionBag};
pub use output::Output;
pub use types::*;

// Re-export core types so callers don't need syncbase-core directly
pub use syncbase_core::{
    ClusterOptions, Credentials, DocumentId, DurabilityLevel, Error, ErrorCode, ErrorContext,
    MutationToken, Origin, Result, Value,
};

// Re-export engine types so callers don't need syncbase-engine directly
pub use syncbase_engine::{ClusterEngine, Connection, ConnectionState, MemoryCluster, MemoryClusterBuilder};
