//! View query handler.

use syncbase_core::Value;
use syncbase_engine::request::ViewRequest;
use syncbase_engine::Connection;

use crate::convert;
use crate::options::{design_document_namespace, ApplyOptions, OptionBag};
use crate::{Output, Result};

/// Handle ViewQuery command.
pub fn view_query(
    conn: &Connection,
    bucket: String,
    design_document: String,
    view: String,
    name_space: i64,
    options: &Value,
) -> Result<Output> {
    let name_space = design_document_namespace(name_space)?;
    let options = OptionBag::new(options)?;
    let mut request = ViewRequest::new(bucket, design_document, view, name_space);
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::View(convert::view_value(&response)))
}
