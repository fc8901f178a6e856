//! Key-value operation handlers.

use syncbase_core::{DocumentId, ErrorCode, Value};
use syncbase_engine::request::{ExistsRequest, GetProjectedRequest, GetRequest, UpsertRequest};
use syncbase_engine::Connection;
use tracing::debug;

use crate::options::{ApplyOptions, OptionBag};
use crate::types::{DocumentResult, ExistsResult, MutationResult};
use crate::{Output, Result};

/// Handle DocumentUpsert command.
pub fn document_upsert(
    conn: &Connection,
    id: DocumentId,
    value: Vec<u8>,
    flags: u32,
    options: &Value,
) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut request = UpsertRequest::new(id, value);
    request.flags = flags;
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::Mutation(MutationResult::from(response)))
}

/// Handle DocumentGet command.
///
/// Asking for the expiry or for projections turns the call into a projected
/// get; otherwise the document is fetched whole.
pub fn document_get(conn: &Connection, id: DocumentId, options: &Value) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut projected = GetProjectedRequest {
        id,
        ..Default::default()
    };
    projected.apply_options(&options)?;

    let result = if projected.with_expiry || !projected.projections.is_empty() {
        DocumentResult::from(conn.execute(projected)?.into_result()?)
    } else {
        let request = GetRequest {
            id: projected.id,
            timeout: projected.timeout,
        };
        DocumentResult::from(conn.execute(request)?.into_result()?)
    };
    Ok(Output::Document(result))
}

/// Handle DocumentExists command.
///
/// `document_not_found` is a successful answer with `exists == false`.
pub fn document_exists(conn: &Connection, id: DocumentId, options: &Value) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut request = ExistsRequest {
        id,
        ..Default::default()
    };
    request.apply_options(&options)?;
    let outcome = conn.execute(request)?;
    match outcome.error {
        Some(err) if err.code() == ErrorCode::DocumentNotFound => {
            debug!(target: "syncbase::executor", "Document not found, reporting exists=false");
            Ok(Output::Exists(ExistsResult::from(outcome.response)))
        }
        Some(err) => Err(err),
        None => Ok(Output::Exists(ExistsResult::from(outcome.response))),
    }
}
