//! Query and analytics handlers.

use syncbase_core::Value;
use syncbase_engine::request::{AnalyticsRequest, QueryRequest};
use syncbase_engine::Connection;

use crate::convert;
use crate::options::{ApplyOptions, OptionBag};
use crate::{Output, Result};

/// Handle Query command.
pub fn query(conn: &Connection, statement: String, options: &Value) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut request = QueryRequest::new(statement);
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::Query(convert::query_value(&response)))
}

/// Handle AnalyticsQuery command.
pub fn analytics_query(conn: &Connection, statement: String, options: &Value) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut request = AnalyticsRequest::new(statement);
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::Analytics(convert::analytics_value(&response)))
}
