//! Full-text search handlers.

use syncbase_core::{Error, Value};
use syncbase_engine::request::{SearchIndex, SearchIndexUpsertRequest, SearchRequest};
use syncbase_engine::Connection;

use crate::convert;
use crate::options::{ApplyOptions, OptionBag};
use crate::{Output, Result};

/// Handle SearchQuery command.
pub fn search_query(
    conn: &Connection,
    index_name: String,
    query: String,
    options: &Value,
) -> Result<Output> {
    let options = OptionBag::new(options)?;
    let mut request = SearchRequest::new(index_name, query);
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::Search(convert::search_value(&response)))
}

/// Handle SearchIndexUpsert command.
pub fn search_index_upsert(conn: &Connection, index: &Value, options: &Value) -> Result<Output> {
    if !index.is_object() {
        return Err(Error::invalid_argument(
            "index",
            "expected index to be an object",
        ));
    }
    let mut definition = SearchIndex::default();
    definition.apply_options(&OptionBag::new(index)?)?;

    let options = OptionBag::new(options)?;
    let mut request = SearchIndexUpsertRequest {
        index: definition,
        ..Default::default()
    };
    request.apply_options(&options)?;
    let response = conn.execute(request)?.into_result()?;
    Ok(Output::SearchIndex(convert::search_index_value(&response)))
}
