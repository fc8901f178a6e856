//! Cluster engine boundary
//!
//! The engine is an asynchronous service: every call takes a completion
//! handler and returns immediately. Handlers are `FnOnce`, so an engine can
//! complete a call at most once; completing it exactly once is a
//! precondition the engine must honor (a dropped handler leaves the caller
//! blocked).

use syncbase_core::{ErrorCode, Origin};

use crate::request::*;
use crate::response::*;

/// Completion handler for one engine call.
pub type Handler<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Asynchronous cluster client driven by a dedicated worker thread.
pub trait ClusterEngine: Send + Sync + 'static {
    /// Run the event loop on the calling thread.
    ///
    /// Returns only after `close` has completed and queued work is drained.
    fn run(&self);

    /// Bootstrap and authenticate against the cluster.
    fn open(&self, origin: Origin, handler: Handler<Option<ErrorCode>>);

    fn open_bucket(&self, name: &str, handler: Handler<Option<ErrorCode>>);

    fn close_bucket(&self, name: &str, handler: Handler<Option<ErrorCode>>);

    /// Shut down all sessions. The event loop exits once this completes.
    fn close(&self, handler: Handler<()>);

    fn execute(&self, request: Request, handler: Handler<Response>);
}

/// A request type paired with the response type the engine answers it with.
pub trait EngineRequest: Sized + Send + 'static {
    type Response: EngineResponse;

    /// Public operation name used in logs and error messages.
    const OPERATION: &'static str;

    fn into_request(self) -> Request;

    /// Pick this request's response out of the engine reply.
    fn from_response(response: Response) -> Option<Self::Response>;
}

macro_rules! engine_request {
    ($req:ty => $resp:ty, $variant:ident, $operation:literal) => {
        impl EngineRequest for $req {
            type Response = $resp;

            const OPERATION: &'static str = $operation;

            fn into_request(self) -> Request {
                Request::$variant(self)
            }

            fn from_response(response: Response) -> Option<Self::Response> {
                match response {
                    Response::$variant(resp) => Some(resp),
                    _ => None,
                }
            }
        }
    };
}

engine_request!(UpsertRequest => UpsertResponse, Upsert, "document_upsert");
engine_request!(GetRequest => GetResponse, Get, "document_get");
engine_request!(GetProjectedRequest => GetProjectedResponse, GetProjected, "document_get");
engine_request!(ExistsRequest => ExistsResponse, Exists, "document_exists");
engine_request!(QueryRequest => QueryResponse, Query, "query");
engine_request!(AnalyticsRequest => AnalyticsResponse, Analytics, "analytics_query");
engine_request!(SearchRequest => SearchResponse, Search, "search_query");
engine_request!(ViewRequest => ViewResponse, View, "view_query");
engine_request!(
    SearchIndexUpsertRequest => SearchIndexUpsertResponse,
    SearchIndexUpsert,
    "search_index_upsert"
);
engine_request!(
    ClusterDescribeRequest => ClusterDescribeResponse,
    ClusterDescribe,
    "cluster_version"
);
