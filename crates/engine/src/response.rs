//! Typed responses delivered by the cluster engine
//!
//! Each response embeds the raw context of its subsystem. A response whose
//! context carries an error code is a failure; its other fields hold whatever
//! the engine managed to fill in.

use std::collections::BTreeMap;
use std::time::Duration;

use syncbase_core::{Error, ErrorCode, MutationToken};

use crate::context::{HttpContext, KeyValueContext, QueryContext, SearchContext, ViewContext};
use crate::diagnostics;

/// Status shared by every engine response.
pub trait EngineResponse: Send + 'static {
    /// Engine status code, `None` on success.
    fn ec(&self) -> Option<ErrorCode>;

    /// Operation error with the structured context built from this response.
    ///
    /// Returns `None` for a successful response. `operation` names the
    /// public operation in the message.
    fn failure(&self, operation: &str) -> Option<Error>;
}

macro_rules! key_value_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl EngineResponse for $ty {
                fn ec(&self) -> Option<ErrorCode> {
                    self.ctx.ec
                }

                fn failure(&self, operation: &str) -> Option<Error> {
                    let ec = self.ctx.ec?;
                    Some(Error::with_context(
                        ec,
                        format!(
                            "unable to execute KV operation \"{}\": {}, {}",
                            operation,
                            ec.value(),
                            ec
                        ),
                        diagnostics::key_value(&self.ctx),
                    ))
                }
            }
        )+
    };
}

macro_rules! http_response {
    ($ty:ty, $builder:path, $what:literal) => {
        impl EngineResponse for $ty {
            fn ec(&self) -> Option<ErrorCode> {
                self.ctx.ec
            }

            fn failure(&self, _operation: &str) -> Option<Error> {
                let ec = self.ctx.ec?;
                Some(Error::with_context(
                    ec,
                    format!(concat!("unable to ", $what, ": {}, {}"), ec.value(), ec),
                    $builder(&self.ctx),
                ))
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertResponse {
    pub ctx: KeyValueContext,
    pub cas: u64,
    pub token: MutationToken,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetResponse {
    pub ctx: KeyValueContext,
    pub value: Vec<u8>,
    pub cas: u64,
    pub flags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetProjectedResponse {
    pub ctx: KeyValueContext,
    pub value: Vec<u8>,
    pub cas: u64,
    pub flags: u32,
    pub expiry: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistsResponse {
    pub ctx: KeyValueContext,
    pub found: bool,
    pub deleted: bool,
    pub cas: u64,
    pub flags: u32,
    pub datatype: u8,
    pub expiry: u32,
    pub sequence_number: u64,
}

impl ExistsResponse {
    /// A live (found, not deleted) document.
    pub fn exists(&self) -> bool {
        self.found && !self.deleted
    }
}

key_value_response!(UpsertResponse, GetResponse, GetProjectedResponse, ExistsResponse);

/// Error or warning reported by the query or analytics service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryProblem {
    pub code: u64,
    pub message: String,
    pub reason: Option<u64>,
    pub retry: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    pub elapsed_time: Duration,
    pub execution_time: Duration,
    pub result_count: u64,
    pub result_size: u64,
    pub sort_count: u64,
    pub mutation_count: u64,
    pub error_count: u64,
    pub warning_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetaData {
    pub request_id: String,
    pub client_context_id: String,
    pub status: String,
    pub signature: Option<String>,
    pub profile: Option<String>,
    pub metrics: Option<QueryMetrics>,
    pub errors: Option<Vec<QueryProblem>>,
    pub warnings: Option<Vec<QueryProblem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    pub ctx: QueryContext,
    pub served_by_node: String,
    /// JSON-encoded rows.
    pub rows: Vec<String>,
    pub meta: QueryMetaData,
}

http_response!(QueryResponse, diagnostics::query, "query");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsMetrics {
    pub elapsed_time: Duration,
    pub execution_time: Duration,
    pub result_count: u64,
    pub result_size: u64,
    pub error_count: u64,
    pub processed_objects: u64,
    pub warning_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsMetaData {
    pub request_id: String,
    pub client_context_id: String,
    pub status: String,
    pub signature: Option<String>,
    pub metrics: AnalyticsMetrics,
    pub warnings: Vec<QueryProblem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsResponse {
    pub ctx: QueryContext,
    pub rows: Vec<String>,
    pub meta: AnalyticsMetaData,
}

http_response!(AnalyticsResponse, diagnostics::analytics, "query");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchLocation {
    pub field: String,
    pub term: String,
    pub position: u64,
    pub start_offset: u64,
    pub end_offset: u64,
    pub array_positions: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRow {
    pub index: String,
    pub id: String,
    pub score: f64,
    /// JSON encoded.
    pub fields: String,
    /// JSON encoded.
    pub explanation: String,
    pub locations: Vec<SearchLocation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMetrics {
    pub took: Duration,
    pub total_rows: u64,
    pub max_score: f64,
    pub success_partition_count: u64,
    pub error_partition_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchMetaData {
    pub client_context_id: String,
    pub metrics: SearchMetrics,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFacet {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeFacet {
    pub name: String,
    pub count: u64,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericRangeFacet {
    pub name: String,
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFacet {
    pub name: String,
    pub field: String,
    pub total: u64,
    pub missing: u64,
    pub other: u64,
    pub terms: Vec<TermFacet>,
    pub date_ranges: Vec<DateRangeFacet>,
    pub numeric_ranges: Vec<NumericRangeFacet>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub ctx: SearchContext,
    pub status: String,
    pub error: String,
    pub rows: Vec<SearchRow>,
    pub meta: SearchMetaData,
    pub facets: Vec<SearchFacet>,
}

http_response!(SearchResponse, diagnostics::search, "search query");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRow {
    pub id: Option<String>,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewMetaData {
    pub total_rows: Option<u64>,
    pub debug_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewResponse {
    pub ctx: ViewContext,
    pub rows: Vec<ViewRow>,
    pub meta: ViewMetaData,
}

http_response!(ViewResponse, diagnostics::view, "view query");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndexUpsertResponse {
    pub ctx: HttpContext,
    pub status: String,
    pub error: String,
}

http_response!(SearchIndexUpsertResponse, diagnostics::http, "upsert search index");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNode {
    pub hostname: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDescribeResponse {
    pub ctx: HttpContext,
    pub nodes: Vec<ClusterNode>,
}

http_response!(ClusterDescribeResponse, diagnostics::http, "describe cluster");

/// Any response the engine delivers.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Upsert(UpsertResponse),
    Get(GetResponse),
    GetProjected(GetProjectedResponse),
    Exists(ExistsResponse),
    Query(QueryResponse),
    Analytics(AnalyticsResponse),
    Search(SearchResponse),
    View(ViewResponse),
    SearchIndexUpsert(SearchIndexUpsertResponse),
    ClusterDescribe(ClusterDescribeResponse),
}
