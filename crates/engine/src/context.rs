//! Raw failure contexts produced by the cluster engine
//!
//! Every response carries one of these, populated whether or not the call
//! failed. `ec` is `None` on success. The binding-facing
//! [`ErrorContext`](syncbase_core::ErrorContext) is built from these by
//! [`crate::diagnostics`] at the failure site.

use std::collections::BTreeSet;

use syncbase_core::{DocumentId, ErrorCode, RetryReason};

use crate::request::{AnalyticsRequest, QueryRequest, SearchRequest, ViewRequest};

/// Error-map entry the server attached to a key-value failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMapInfo {
    pub name: String,
    pub description: String,
}

/// Extended error body the server attached to a key-value failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhancedErrorInfo {
    pub reference: String,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueContext {
    pub id: DocumentId,
    pub ec: Option<ErrorCode>,
    pub opaque: u32,
    pub cas: u64,
    pub status_code: Option<u16>,
    pub error_map_info: Option<ErrorMapInfo>,
    pub enhanced_error_info: Option<EnhancedErrorInfo>,
    pub last_dispatched_to: Option<String>,
    pub last_dispatched_from: Option<String>,
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<RetryReason>,
}

impl KeyValueContext {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Query and analytics services share one context shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    pub ec: Option<ErrorCode>,
    pub client_context_id: String,
    pub statement: String,
    pub parameters: Option<String>,
    pub first_error_code: u64,
    pub first_error_message: String,
    pub http_status: u32,
    pub http_body: String,
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<RetryReason>,
}

impl QueryContext {
    pub fn from_query(request: &QueryRequest) -> Self {
        Self {
            client_context_id: request.client_context_id.clone().unwrap_or_default(),
            statement: request.statement.clone(),
            parameters: encoded_parameters(&request.positional_parameters, &request.named_parameters),
            ..Default::default()
        }
    }

    pub fn from_analytics(request: &AnalyticsRequest) -> Self {
        Self {
            client_context_id: request.client_context_id.clone().unwrap_or_default(),
            statement: request.statement.clone(),
            parameters: encoded_parameters(&request.positional_parameters, &request.named_parameters),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    pub ec: Option<ErrorCode>,
    pub client_context_id: String,
    pub index_name: String,
    pub query: Option<String>,
    pub parameters: Option<String>,
    pub http_status: u32,
    pub http_body: String,
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<RetryReason>,
}

impl SearchContext {
    pub fn from_request(request: &SearchRequest) -> Self {
        Self {
            client_context_id: request.client_context_id.clone().unwrap_or_default(),
            index_name: request.index_name.clone(),
            query: Some(request.query.clone()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewContext {
    pub ec: Option<ErrorCode>,
    pub client_context_id: String,
    pub design_document_name: String,
    pub view_name: String,
    pub query_string: Vec<String>,
    pub http_status: u32,
    pub http_body: String,
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<RetryReason>,
}

impl ViewContext {
    pub fn from_request(request: &ViewRequest) -> Self {
        Self {
            client_context_id: request.client_context_id.clone().unwrap_or_default(),
            design_document_name: request.document_name.clone(),
            view_name: request.view_name.clone(),
            query_string: request.query_string(),
            ..Default::default()
        }
    }
}

/// Context of a management (HTTP) call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpContext {
    pub ec: Option<ErrorCode>,
    pub client_context_id: String,
    pub method: String,
    pub path: String,
    pub http_status: u32,
    pub http_body: String,
    pub last_dispatched_to: Option<String>,
    pub last_dispatched_from: Option<String>,
    pub retry_attempts: usize,
    pub retry_reasons: BTreeSet<RetryReason>,
}

impl HttpContext {
    pub fn new(method: &str, path: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            path: path.into(),
            ..Default::default()
        }
    }
}

fn encoded_parameters(
    positional: &[String],
    named: &std::collections::BTreeMap<String, String>,
) -> Option<String> {
    if positional.is_empty() && named.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    if !positional.is_empty() {
        parts.push(format!("\"args\":[{}]", positional.join(",")));
    }
    for (name, value) in named {
        let name = name.strip_prefix('$').unwrap_or(name);
        parts.push(format!("\"${}\":{}", name, value));
    }
    Some(format!("{{{}}}", parts.join(",")))
}
