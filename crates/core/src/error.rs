//! Error types for syncbase
//!
//! Two families of errors exist:
//! - **Validation** errors are raised before any engine call: a malformed
//!   option, authenticator or connection string. They carry a message and the
//!   offending key.
//! - **Operation** errors are raised by the cluster engine and carry the
//!   engine status code plus, for data operations, the structured
//!   [`ErrorContext`] captured at the failure site.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::error_context::ErrorContext;

/// Result type alias for syncbase operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine status codes with stable names.
///
/// Numeric values are grouped by subsystem: common (1..), key-value (101..),
/// query (201..), analytics (301..), search (401..), view (501..),
/// management (601..).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // common
    RequestCanceled,
    InvalidArgument,
    ServiceNotAvailable,
    InternalServerFailure,
    AuthenticationFailure,
    TemporaryFailure,
    ParsingFailure,
    CasMismatch,
    BucketNotFound,
    CollectionNotFound,
    UnsupportedOperation,
    AmbiguousTimeout,
    UnambiguousTimeout,
    FeatureNotAvailable,
    ScopeNotFound,
    IndexNotFound,
    IndexExists,
    ClusterClosed,
    // key-value
    DocumentNotFound,
    DocumentIrretrievable,
    DocumentLocked,
    ValueTooLarge,
    DocumentExists,
    DurabilityLevelNotAvailable,
    DurabilityImpossible,
    DurabilityAmbiguous,
    PathNotFound,
    // query
    PlanningFailure,
    IndexFailure,
    PreparedStatementFailure,
    // analytics
    CompilationFailure,
    DatasetNotFound,
    // view
    ViewNotFound,
    DesignDocumentNotFound,
}

impl ErrorCode {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequestCanceled => "request_canceled",
            ErrorCode::InvalidArgument => "invalid_argument",
            ErrorCode::ServiceNotAvailable => "service_not_available",
            ErrorCode::InternalServerFailure => "internal_server_failure",
            ErrorCode::AuthenticationFailure => "authentication_failure",
            ErrorCode::TemporaryFailure => "temporary_failure",
            ErrorCode::ParsingFailure => "parsing_failure",
            ErrorCode::CasMismatch => "cas_mismatch",
            ErrorCode::BucketNotFound => "bucket_not_found",
            ErrorCode::CollectionNotFound => "collection_not_found",
            ErrorCode::UnsupportedOperation => "unsupported_operation",
            ErrorCode::AmbiguousTimeout => "ambiguous_timeout",
            ErrorCode::UnambiguousTimeout => "unambiguous_timeout",
            ErrorCode::FeatureNotAvailable => "feature_not_available",
            ErrorCode::ScopeNotFound => "scope_not_found",
            ErrorCode::IndexNotFound => "index_not_found",
            ErrorCode::IndexExists => "index_exists",
            ErrorCode::ClusterClosed => "cluster_closed",
            ErrorCode::DocumentNotFound => "document_not_found",
            ErrorCode::DocumentIrretrievable => "document_irretrievable",
            ErrorCode::DocumentLocked => "document_locked",
            ErrorCode::ValueTooLarge => "value_too_large",
            ErrorCode::DocumentExists => "document_exists",
            ErrorCode::DurabilityLevelNotAvailable => "durability_level_not_available",
            ErrorCode::DurabilityImpossible => "durability_impossible",
            ErrorCode::DurabilityAmbiguous => "durability_ambiguous",
            ErrorCode::PathNotFound => "path_not_found",
            ErrorCode::PlanningFailure => "planning_failure",
            ErrorCode::IndexFailure => "index_failure",
            ErrorCode::PreparedStatementFailure => "prepared_statement_failure",
            ErrorCode::CompilationFailure => "compilation_failure",
            ErrorCode::DatasetNotFound => "dataset_not_found",
            ErrorCode::ViewNotFound => "view_not_found",
            ErrorCode::DesignDocumentNotFound => "design_document_not_found",
        }
    }

    /// Numeric code, stable across releases.
    pub fn value(&self) -> u32 {
        match self {
            ErrorCode::RequestCanceled => 2,
            ErrorCode::InvalidArgument => 3,
            ErrorCode::ServiceNotAvailable => 4,
            ErrorCode::InternalServerFailure => 5,
            ErrorCode::AuthenticationFailure => 6,
            ErrorCode::TemporaryFailure => 7,
            ErrorCode::ParsingFailure => 8,
            ErrorCode::CasMismatch => 9,
            ErrorCode::BucketNotFound => 10,
            ErrorCode::CollectionNotFound => 11,
            ErrorCode::UnsupportedOperation => 12,
            ErrorCode::AmbiguousTimeout => 13,
            ErrorCode::UnambiguousTimeout => 14,
            ErrorCode::FeatureNotAvailable => 15,
            ErrorCode::ScopeNotFound => 16,
            ErrorCode::IndexNotFound => 17,
            ErrorCode::IndexExists => 18,
            ErrorCode::ClusterClosed => 19,
            ErrorCode::DocumentNotFound => 101,
            ErrorCode::DocumentIrretrievable => 102,
            ErrorCode::DocumentLocked => 103,
            ErrorCode::ValueTooLarge => 104,
            ErrorCode::DocumentExists => 105,
            ErrorCode::DurabilityLevelNotAvailable => 107,
            ErrorCode::DurabilityImpossible => 108,
            ErrorCode::DurabilityAmbiguous => 109,
            ErrorCode::PathNotFound => 113,
            ErrorCode::PlanningFailure => 201,
            ErrorCode::IndexFailure => 202,
            ErrorCode::PreparedStatementFailure => 203,
            ErrorCode::CompilationFailure => 301,
            ErrorCode::DatasetNotFound => 303,
            ErrorCode::ViewNotFound => 501,
            ErrorCode::DesignDocumentNotFound => 502,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced to callers of the binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An option, authenticator or argument failed validation.
    ///
    /// `key` names the offending option; it is `None` only when the option
    /// container itself has the wrong shape.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        key: Option<String>,
        message: String,
    },

    /// The connection string could not be parsed.
    #[error("parsing failure: {message}")]
    ParsingFailure { message: String },

    /// The cluster engine reported a failure.
    #[error("{message}")]
    Operation {
        code: ErrorCode,
        message: String,
        context: Option<Box<ErrorContext>>,
    },
}

impl Error {
    /// Validation error for a specific option key.
    pub fn invalid_argument(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            key: Some(key.into()),
            message: message.into(),
        }
    }

    /// Validation error for an option container of the wrong shape.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            key: None,
            message: message.into(),
        }
    }

    pub fn parsing_failure(message: impl Into<String>) -> Self {
        Error::ParsingFailure {
            message: message.into(),
        }
    }

    /// Engine failure without a structured context (open, bucket open/close).
    pub fn operation(code: ErrorCode, message: impl Into<String>) -> Self {
        Error::Operation {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Engine failure with the context captured at the failure site.
    pub fn with_context(code: ErrorCode, message: impl Into<String>, context: ErrorContext) -> Self {
        Error::Operation {
            code,
            message: message.into(),
            context: Some(Box::new(context)),
        }
    }

    /// Status code of this error, for either family.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Error::ParsingFailure { .. } => ErrorCode::ParsingFailure,
            Error::Operation { code, .. } => *code,
        }
    }

    /// Offending option key of a validation error.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::InvalidArgument { key, .. } => key.as_deref(),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Operation { context, .. } => context.as_deref(),
            _ => None,
        }
    }

    /// True for errors raised before any engine call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Operation { .. })
    }
}
