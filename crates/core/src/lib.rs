//! Core types for syncbase
//!
//! This crate defines the types shared by the engine boundary and the
//! option decoder:
//! - Value: dynamic value model for option bags and output values
//! - Error / ErrorCode: validation and operation error families
//! - ErrorContext: per-subsystem diagnostics captured at the failure site
//! - RetryReason: stable names for engine retry causes
//! - DocumentId, MutationToken, DurabilityLevel: request identity types
//! - Origin: immutable connection configuration (credentials, seed nodes, options)

#![warn(clippy::all)]

pub mod connstr;
pub mod error;
pub mod error_context;
pub mod origin;
pub mod retry;
pub mod types;
pub mod value;

pub use connstr::{ConnectionString, Scheme, SeedNode};
pub use error::{Error, ErrorCode, Result};
pub use error_context::{
    Diagnosed, DispatchEndpoints, ErrorContext, HttpErrorContext, KeyValueErrorContext,
    QueryErrorContext, RetryDiagnostics, SearchErrorContext, ViewErrorContext,
};
pub use origin::{
    ClusterOptions, Credentials, MetricsOptions, Origin, TlsVerifyMode, TracingOptions,
    DEFAULT_SASL_MECHANISMS,
};
pub use retry::{RetryReason, UNEXPECTED_RETRY_REASON};
pub use types::{hex_u64, DocumentId, DurabilityLevel, MutationToken};
pub use value::Value;
