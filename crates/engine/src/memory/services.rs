//! Scripted HTTP services of the in-memory cluster.
//!
//! Query, analytics, search, view and index management have no built-in
//! behavior. Tests install a handler per service; without one the service
//! answers `service_not_available`.

use std::collections::BTreeSet;
use std::sync::Arc;

use syncbase_core::{ErrorCode, RetryReason};

use crate::context::{HttpContext, KeyValueContext, QueryContext, SearchContext, ViewContext};
use crate::request::{
    AnalyticsRequest, QueryRequest, Request, SearchIndexUpsertRequest, SearchRequest, ViewRequest,
};
use crate::response::*;

/// Scripted answer of one service.
pub type ServiceHandler<Req, Resp> = Arc<dyn Fn(&Req) -> Resp + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct ServiceHandlers {
    pub(crate) query: Option<ServiceHandler<QueryRequest, QueryResponse>>,
    pub(crate) analytics: Option<ServiceHandler<AnalyticsRequest, AnalyticsResponse>>,
    pub(crate) search: Option<ServiceHandler<SearchRequest, SearchResponse>>,
    pub(crate) view: Option<ServiceHandler<ViewRequest, ViewResponse>>,
    pub(crate) search_index: Option<ServiceHandler<SearchIndexUpsertRequest, SearchIndexUpsertResponse>>,
}

pub(crate) fn search_index_path(request: &SearchIndexUpsertRequest) -> String {
    format!("/api/index/{}", request.index.name)
}

impl ServiceHandlers {
    pub(crate) fn query(&self, request: &QueryRequest) -> QueryResponse {
        match &self.query {
            Some(handler) => handler(request),
            None => QueryResponse {
                ctx: unavailable_query(QueryContext::from_query(request)),
                ..Default::default()
            },
        }
    }

    pub(crate) fn analytics(&self, request: &AnalyticsRequest) -> AnalyticsResponse {
        match &self.analytics {
            Some(handler) => handler(request),
            None => AnalyticsResponse {
                ctx: unavailable_query(QueryContext::from_analytics(request)),
                ..Default::default()
            },
        }
    }

    pub(crate) fn search(&self, request: &SearchRequest) -> SearchResponse {
        match &self.search {
            Some(handler) => handler(request),
            None => {
                let mut ctx = SearchContext::from_request(request);
                ctx.ec = Some(ErrorCode::ServiceNotAvailable);
                SearchResponse {
                    ctx,
                    ..Default::default()
                }
            }
        }
    }

    pub(crate) fn view(&self, request: &ViewRequest) -> ViewResponse {
        match &self.view {
            Some(handler) => handler(request),
            None => {
                let mut ctx = ViewContext::from_request(request);
                ctx.ec = Some(ErrorCode::ServiceNotAvailable);
                ViewResponse {
                    ctx,
                    ..Default::default()
                }
            }
        }
    }

    pub(crate) fn search_index_upsert(&self, request: &SearchIndexUpsertRequest) -> SearchIndexUpsertResponse {
        match &self.search_index {
            Some(handler) => handler(request),
            None => {
                let mut ctx = HttpContext::new("PUT", search_index_path(request));
                ctx.client_context_id = request.client_context_id.clone().unwrap_or_default();
                ctx.ec = Some(ErrorCode::ServiceNotAvailable);
                SearchIndexUpsertResponse {
                    ctx,
                    ..Default::default()
                }
            }
        }
    }
}

fn unavailable_query(mut ctx: QueryContext) -> QueryContext {
    ctx.ec = Some(ErrorCode::ServiceNotAvailable);
    ctx
}

/// Response to `request` that failed with `ec` before reaching a service.
///
/// Used for requests that timed out in the engine or were canceled by close.
pub(crate) fn failed_response(
    request: &Request,
    ec: ErrorCode,
    retry_attempts: usize,
    retry_reasons: BTreeSet<RetryReason>,
) -> Response {
    macro_rules! fail {
        ($ctx:expr) => {{
            let mut ctx = $ctx;
            ctx.ec = Some(ec);
            ctx.retry_attempts = retry_attempts;
            ctx.retry_reasons = retry_reasons;
            ctx
        }};
    }
    match request {
        Request::Upsert(req) => Response::Upsert(UpsertResponse {
            ctx: fail!(KeyValueContext::new(req.id.clone())),
            ..Default::default()
        }),
        Request::Get(req) => Response::Get(GetResponse {
            ctx: fail!(KeyValueContext::new(req.id.clone())),
            ..Default::default()
        }),
        Request::GetProjected(req) => Response::GetProjected(GetProjectedResponse {
            ctx: fail!(KeyValueContext::new(req.id.clone())),
            ..Default::default()
        }),
        Request::Exists(req) => Response::Exists(ExistsResponse {
            ctx: fail!(KeyValueContext::new(req.id.clone())),
            ..Default::default()
        }),
        Request::Query(req) => Response::Query(QueryResponse {
            ctx: fail!(QueryContext::from_query(req)),
            ..Default::default()
        }),
        Request::Analytics(req) => Response::Analytics(AnalyticsResponse {
            ctx: fail!(QueryContext::from_analytics(req)),
            ..Default::default()
        }),
        Request::Search(req) => Response::Search(SearchResponse {
            ctx: fail!(SearchContext::from_request(req)),
            ..Default::default()
        }),
        Request::View(req) => Response::View(ViewResponse {
            ctx: fail!(ViewContext::from_request(req)),
            ..Default::default()
        }),
        Request::SearchIndexUpsert(req) => Response::SearchIndexUpsert(SearchIndexUpsertResponse {
            ctx: fail!(HttpContext::new("PUT", search_index_path(req))),
            ..Default::default()
        }),
        Request::ClusterDescribe(_) => Response::ClusterDescribe(ClusterDescribeResponse {
            ctx: fail!(HttpContext::new("GET", "/pools/default/terseClusterInfo")),
            ..Default::default()
        }),
    }
}
