//! Error context builder
//!
//! Pure field copies from the engine's raw contexts into the structured
//! [`ErrorContext`] variants. Absent optional fields stay absent. Retry
//! diagnostics and dispatch endpoints go through the shared helpers so every
//! subsystem renders them identically.

use std::collections::BTreeSet;

use syncbase_core::{
    DispatchEndpoints, ErrorContext, HttpErrorContext, KeyValueErrorContext, QueryErrorContext,
    RetryDiagnostics, RetryReason, SearchErrorContext, ViewErrorContext,
};

use crate::context::{HttpContext, KeyValueContext, QueryContext, SearchContext, ViewContext};

fn retry(attempts: usize, reasons: &BTreeSet<RetryReason>) -> RetryDiagnostics {
    RetryDiagnostics::new(attempts, reasons)
}

fn endpoints(to: &Option<String>, from: &Option<String>) -> DispatchEndpoints {
    DispatchEndpoints {
        last_dispatched_to: to.clone(),
        last_dispatched_from: from.clone(),
    }
}

pub fn key_value(ctx: &KeyValueContext) -> ErrorContext {
    ErrorContext::KeyValue(KeyValueErrorContext {
        bucket: ctx.id.bucket.clone(),
        scope: ctx.id.scope.clone(),
        collection: ctx.id.collection.clone(),
        id: ctx.id.key.clone(),
        opaque: ctx.opaque,
        cas: ctx.cas,
        status_code: ctx.status_code,
        error_map_name: ctx.error_map_info.as_ref().map(|info| info.name.clone()),
        error_map_description: ctx
            .error_map_info
            .as_ref()
            .map(|info| info.description.clone()),
        enhanced_error_reference: ctx
            .enhanced_error_info
            .as_ref()
            .map(|info| info.reference.clone()),
        enhanced_error_context: ctx
            .enhanced_error_info
            .as_ref()
            .map(|info| info.context.clone()),
        endpoints: endpoints(&ctx.last_dispatched_to, &ctx.last_dispatched_from),
        retry: retry(ctx.retry_attempts, &ctx.retry_reasons),
    })
}

fn query_fields(ctx: &QueryContext) -> QueryErrorContext {
    QueryErrorContext {
        client_context_id: ctx.client_context_id.clone(),
        statement: ctx.statement.clone(),
        parameters: ctx.parameters.clone(),
        first_error_message: ctx.first_error_message.clone(),
        first_error_code: ctx.first_error_code,
        http_status: ctx.http_status,
        http_body: ctx.http_body.clone(),
        retry: retry(ctx.retry_attempts, &ctx.retry_reasons),
    }
}

pub fn query(ctx: &QueryContext) -> ErrorContext {
    ErrorContext::Query(query_fields(ctx))
}

pub fn analytics(ctx: &QueryContext) -> ErrorContext {
    ErrorContext::Analytics(query_fields(ctx))
}

pub fn search(ctx: &SearchContext) -> ErrorContext {
    ErrorContext::Search(SearchErrorContext {
        client_context_id: ctx.client_context_id.clone(),
        index_name: ctx.index_name.clone(),
        query: ctx.query.clone(),
        parameters: ctx.parameters.clone(),
        http_status: ctx.http_status,
        http_body: ctx.http_body.clone(),
        retry: retry(ctx.retry_attempts, &ctx.retry_reasons),
    })
}

pub fn view(ctx: &ViewContext) -> ErrorContext {
    ErrorContext::View(ViewErrorContext {
        client_context_id: ctx.client_context_id.clone(),
        design_document_name: ctx.design_document_name.clone(),
        view_name: ctx.view_name.clone(),
        query_string: ctx.query_string.clone(),
        http_status: ctx.http_status,
        http_body: ctx.http_body.clone(),
        retry: retry(ctx.retry_attempts, &ctx.retry_reasons),
    })
}

pub fn http(ctx: &HttpContext) -> ErrorContext {
    ErrorContext::Http(HttpErrorContext {
        client_context_id: ctx.client_context_id.clone(),
        method: ctx.method.clone(),
        path: ctx.path.clone(),
        http_status: ctx.http_status,
        http_body: ctx.http_body.clone(),
        endpoints: endpoints(&ctx.last_dispatched_to, &ctx.last_dispatched_from),
        retry: retry(ctx.retry_attempts, &ctx.retry_reasons),
    })
}
