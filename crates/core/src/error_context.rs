//! Structured error contexts
//!
//! A failed operation carries one [`ErrorContext`] variant describing what the
//! engine saw at the moment of failure. Every variant embeds the same
//! [`RetryDiagnostics`] composite; key-value and management contexts also embed
//! [`DispatchEndpoints`].
//!
//! | Variant | Subsystem |
//! |---------|-----------|
//! | `KeyValue` | document operations |
//! | `Query` | N1QL query service |
//! | `Analytics` | analytics service |
//! | `View` | map/reduce views |
//! | `Search` | full-text search |
//! | `Http` | HTTP management endpoints |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::retry::RetryReason;
use crate::value::Value;

/// Retry attempt count plus the distinct reasons behind those attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryDiagnostics {
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<String>,
}

impl RetryDiagnostics {
    /// Render engine retry reasons to their stable names.
    pub fn new<'a, I>(retry_attempts: usize, reasons: I) -> Self
    where
        I: IntoIterator<Item = &'a RetryReason>,
    {
        Self {
            retry_attempts,
            retry_reasons: reasons.into_iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

/// Endpoints of the last dispatch attempt, when the engine knows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dispatched_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_dispatched_from: Option<String>,
}

/// Shared accessors across all error context shapes.
pub trait Diagnosed {
    /// Retry diagnostics recorded for the failed call.
    fn retry(&self) -> &RetryDiagnostics;

    /// Dispatch endpoints, for subsystems that record them.
    fn endpoints(&self) -> Option<&DispatchEndpoints> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueErrorContext {
    pub bucket: String,
    pub scope: String,
    pub collection: String,
    pub id: String,
    pub opaque: u32,
    pub cas: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_map_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_map_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_error_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_error_context: Option<String>,
    #[serde(flatten)]
    pub endpoints: DispatchEndpoints,
    #[serde(flatten)]
    pub retry: RetryDiagnostics,
}

/// Context shared by the query and analytics services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryErrorContext {
    pub client_context_id: String,
    pub statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    pub first_error_message: String,
    pub first_error_code: u64,
    pub http_status: u32,
    pub http_body: String,
    #[serde(flatten)]
    pub retry: RetryDiagnostics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchErrorContext {
    pub client_context_id: String,
    pub index_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    pub http_status: u32,
    pub http_body: String,
    #[serde(flatten)]
    pub retry: RetryDiagnostics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewErrorContext {
    pub client_context_id: String,
    pub design_document_name: String,
    pub view_name: String,
    pub query_string: Vec<String>,
    pub http_status: u32,
    pub http_body: String,
    #[serde(flatten)]
    pub retry: RetryDiagnostics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorContext {
    pub client_context_id: String,
    pub method: String,
    pub path: String,
    pub http_status: u32,
    pub http_body: String,
    #[serde(flatten)]
    pub endpoints: DispatchEndpoints,
    #[serde(flatten)]
    pub retry: RetryDiagnostics,
}

/// Subsystem-specific diagnostic record attached to a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorContext {
    KeyValue(KeyValueErrorContext),
    Query(QueryErrorContext),
    Analytics(QueryErrorContext),
    View(ViewErrorContext),
    Search(SearchErrorContext),
    Http(HttpErrorContext),
}

impl ErrorContext {
    /// Name of the subsystem this context belongs to.
    pub fn subsystem(&self) -> &'static str {
        match self {
            ErrorContext::KeyValue(_) => "key_value",
            ErrorContext::Query(_) => "query",
            ErrorContext::Analytics(_) => "analytics",
            ErrorContext::View(_) => "view",
            ErrorContext::Search(_) => "search",
            ErrorContext::Http(_) => "http",
        }
    }

    pub fn as_key_value(&self) -> Option<&KeyValueErrorContext> {
        match self {
            ErrorContext::KeyValue(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Render as a dynamic value for the caller (camelCase keys, `type` tag).
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self)
            .map(Value::from)
            .unwrap_or(Value::Null)
    }
}

impl Diagnosed for ErrorContext {
    fn retry(&self) -> &RetryDiagnostics {
        match self {
            ErrorContext::KeyValue(ctx) => &ctx.retry,
            ErrorContext::Query(ctx) | ErrorContext::Analytics(ctx) => &ctx.retry,
            ErrorContext::View(ctx) => &ctx.retry,
            ErrorContext::Search(ctx) => &ctx.retry,
            ErrorContext::Http(ctx) => &ctx.retry,
        }
    }

    fn endpoints(&self) -> Option<&DispatchEndpoints> {
        match self {
            ErrorContext::KeyValue(ctx) => Some(&ctx.endpoints),
            ErrorContext::Http(ctx) => Some(&ctx.endpoints),
            _ => None,
        }
    }
}
