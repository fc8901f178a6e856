//! Service Operation Tests
//!
//! Query, analytics, search and view calls against scripted service
//! handlers: decoded options must reach the engine request and responses
//! must come back in the documented shapes.

use crate::common::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use syncbase::{ErrorCode, ErrorContext, MemoryCluster, Value};
use syncbase_engine::request::{
    AnalyticsRequest, QueryRequest, ScanConsistency, SearchRequest, ViewRequest,
    ViewScanConsistency, ViewSortOrder,
};
use syncbase_engine::response::*;

/// Keeps the last request a handler saw.
fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Option<T>>>, Arc<Mutex<Option<T>>>) {
    let slot = Arc::new(Mutex::new(None));
    (Arc::clone(&slot), slot)
}

fn last<T: Clone>(slot: &Arc<Mutex<Option<T>>>) -> T {
    slot.lock().clone().expect("handler was not called")
}

// ============================================================================
// Query
// ============================================================================

#[test]
fn query_options_reach_the_engine() {
    let (seen, slot) = recorder::<QueryRequest>();
    let engine = create_engine(MemoryCluster::builder().query_handler(move |req| {
        *slot.lock() = Some(req.clone());
        QueryResponse {
            rows: vec![r#"{"greeting":"hello"}"#.to_string()],
            ..Default::default()
        }
    }));
    let cluster = connect(&engine);
    let stored = cluster
        .upsert(&doc("airline_10"), br#"{"name":"40-Mile Air"}"#.to_vec(), 0, &Value::Null)
        .unwrap();
    let token = stored.mutation_token.clone().unwrap();

    let options = Value::object([
        ("timeoutMilliseconds", Value::Int(1500)),
        ("scanConsistency", Value::Int(2)),
        ("readonly", Value::Bool(true)),
        ("clientContextId", Value::from("report-42")),
        (
            "positionalParameters",
            Value::Array(vec![Value::from("\"Air\"")]),
        ),
        ("consistentWith", Value::Array(vec![token.to_value()])),
        ("bucketName", Value::from(BUCKET)),
        ("scopeName", Value::from("inventory")),
    ]);
    let result = cluster
        .query("SELECT name FROM travel WHERE name LIKE $1", &options)
        .unwrap();

    let req = last(&seen);
    assert_eq!(req.statement, "SELECT name FROM travel WHERE name LIKE $1");
    assert_eq!(req.timeout, Some(Duration::from_millis(1500)));
    assert_eq!(req.scan_consistency, Some(ScanConsistency::RequestPlus));
    assert!(req.readonly);
    assert_eq!(req.client_context_id.as_deref(), Some("report-42"));
    assert_eq!(req.positional_parameters, vec!["\"Air\"".to_string()]);
    assert_eq!(req.mutation_state, vec![token]);
    assert_eq!(req.bucket_name.as_deref(), Some(BUCKET));
    assert_eq!(req.scope_name.as_deref(), Some("inventory"));

    let rows = field(&result, &["rows"]).as_array().unwrap();
    assert_eq!(rows, &vec![Value::from(r#"{"greeting":"hello"}"#)]);
}

#[test]
fn query_without_client_context_id_gets_one() {
    let (seen, slot) = recorder::<QueryRequest>();
    let engine = create_engine(MemoryCluster::builder().query_handler(move |req| {
        *slot.lock() = Some(req.clone());
        QueryResponse::default()
    }));
    let cluster = connect(&engine);
    cluster.query("SELECT 1", &Value::Null).unwrap();
    let id = last(&seen).client_context_id.unwrap();
    assert!(!id.is_empty());
}

#[test]
fn query_meta_shape() {
    let engine = create_engine(MemoryCluster::builder().query_handler(|req| QueryResponse {
        served_by_node: "127.0.0.1:8093".into(),
        rows: vec!["1".into(), "2".into()],
        meta: QueryMetaData {
            request_id: "r-1".into(),
            client_context_id: req.client_context_id.clone().unwrap_or_default(),
            status: "success".into(),
            signature: Some(r#"{"$1":"number"}"#.into()),
            profile: None,
            metrics: Some(QueryMetrics {
                elapsed_time: Duration::from_millis(12),
                execution_time: Duration::from_millis(10),
                result_count: 2,
                result_size: 4,
                ..Default::default()
            }),
            errors: None,
            warnings: Some(vec![QueryProblem {
                code: 4000,
                message: "index scan".into(),
                reason: None,
                retry: Some(false),
            }]),
        },
        ..Default::default()
    }));
    let cluster = connect(&engine);
    let result = cluster
        .query("SELECT 1", &Value::object([("clientContextId", "meta")]))
        .unwrap();

    assert_eq!(field(&result, &["servedByNode"]), &Value::from("127.0.0.1:8093"));
    assert_eq!(field(&result, &["meta", "clientContextId"]), &Value::from("meta"));
    assert_eq!(field(&result, &["meta", "status"]), &Value::from("success"));
    assert_eq!(field(&result, &["meta", "signature"]), &Value::from(r#"{"$1":"number"}"#));
    assert!(result.get("meta").unwrap().get("profile").is_none());
    assert!(result.get("meta").unwrap().get("errors").is_none());
    assert_eq!(field(&result, &["meta", "metrics", "resultCount"]), &Value::Int(2));
    assert_eq!(
        field(&result, &["meta", "metrics", "elapsedTimeMilliseconds"]),
        &Value::Int(12)
    );
    let warning = &field(&result, &["meta", "warnings"]).as_array().unwrap()[0];
    assert_eq!(warning.get("code"), Some(&Value::Int(4000)));
    assert_eq!(warning.get("message"), Some(&Value::from("index scan")));
    assert_eq!(warning.get("retry"), Some(&Value::Bool(false)));
    assert!(warning.get("reason").is_none());
}

#[test]
fn query_failure_carries_query_context() {
    let engine = create_engine(MemoryCluster::builder().query_handler(|req| {
        let mut resp = QueryResponse::default();
        resp.ctx.ec = Some(ErrorCode::ParsingFailure);
        resp.ctx.statement = req.statement.clone();
        resp.ctx.http_status = 400;
        resp
    }));
    let cluster = connect(&engine);
    let err = cluster.query("SELEKT 1", &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParsingFailure);
    assert!(!err.is_validation());
    match err.context() {
        Some(ErrorContext::Query(ctx)) => {
            assert_eq!(ctx.statement, "SELEKT 1");
            assert_eq!(ctx.http_status, 400);
        }
        other => panic!("Expected query context, got {:?}", other),
    }
}

// ============================================================================
// Analytics
// ============================================================================

#[test]
fn analytics_query_round_trip() {
    let (seen, slot) = recorder::<AnalyticsRequest>();
    let engine = create_engine(MemoryCluster::builder().analytics_handler(move |req| {
        *slot.lock() = Some(req.clone());
        AnalyticsResponse {
            rows: vec![r#"{"count":3}"#.into()],
            meta: AnalyticsMetaData {
                status: "success".into(),
                metrics: AnalyticsMetrics {
                    processed_objects: 3,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }));
    let cluster = connect(&engine);
    let options = Value::object([
        ("priority", Value::Bool(true)),
        ("scanConsistency", Value::Int(1)),
        ("namedParameters", Value::object([("$country", "\"France\"")])),
    ]);
    let result = cluster
        .analytics_query("SELECT COUNT(*) AS count FROM airports", &options)
        .unwrap();

    let req = last(&seen);
    assert!(req.priority);
    assert_eq!(req.scan_consistency, Some(ScanConsistency::NotBounded));
    assert_eq!(
        req.named_parameters.get("$country").map(String::as_str),
        Some("\"France\"")
    );
    assert_eq!(
        field(&result, &["meta", "metrics", "processedObjects"]),
        &Value::Int(3)
    );
    assert_eq!(field(&result, &["meta", "warnings"]), &Value::Array(vec![]));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn search_query_round_trip() {
    let (seen, slot) = recorder::<SearchRequest>();
    let engine = create_engine(MemoryCluster::builder().search_handler(move |req| {
        *slot.lock() = Some(req.clone());
        SearchResponse {
            status: "success".into(),
            rows: vec![SearchRow {
                index: req.index_name.clone(),
                id: "hotel_1".into(),
                score: 0.5,
                fields: "{}".into(),
                explanation: "{}".into(),
                locations: vec![SearchLocation {
                    field: "name".into(),
                    term: "inn".into(),
                    position: 1,
                    start_offset: 0,
                    end_offset: 3,
                    array_positions: None,
                }],
            }],
            meta: SearchMetaData {
                metrics: SearchMetrics {
                    total_rows: 1,
                    took: Duration::from_millis(3),
                    ..Default::default()
                },
                ..Default::default()
            },
            facets: vec![SearchFacet {
                name: "types".into(),
                field: "type".into(),
                total: 1,
                terms: vec![TermFacet {
                    term: "hotel".into(),
                    count: 1,
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }));
    let cluster = connect(&engine);
    let options = Value::object([
        ("limit", Value::Int(10)),
        ("skip", Value::Int(5)),
        ("explain", Value::Bool(true)),
        ("fields", Value::Array(vec![Value::from("name")])),
    ]);
    let result = cluster
        .search_query("hotels", r#"{"match":"inn"}"#, &options)
        .unwrap();

    let req = last(&seen);
    assert_eq!(req.index_name, "hotels");
    assert_eq!(req.query, r#"{"match":"inn"}"#);
    assert_eq!(req.limit, Some(10));
    assert_eq!(req.skip, Some(5));
    assert!(req.explain);
    assert_eq!(req.fields, vec!["name".to_string()]);

    let row = &field(&result, &["rows"]).as_array().unwrap()[0];
    assert_eq!(row.get("index"), Some(&Value::from("hotels")));
    assert_eq!(row.get("id"), Some(&Value::from("hotel_1")));
    let location = &row.get("locations").unwrap().as_array().unwrap()[0];
    assert_eq!(location.get("endOffset"), Some(&Value::Int(3)));
    assert!(location.get("arrayPositions").is_none());
    assert_eq!(field(&result, &["meta", "metrics", "totalRows"]), &Value::Int(1));
    assert_eq!(field(&result, &["meta", "metrics", "tookMilliseconds"]), &Value::Int(3));
    let facet = &field(&result, &["facets"]).as_array().unwrap()[0];
    assert_eq!(facet.get("field"), Some(&Value::from("type")));
}

#[test]
fn search_negative_skip_is_rejected() {
    let cluster = create_cluster();
    let err = cluster
        .search_query("hotels", "{}", &Value::object([("skip", -1)]))
        .unwrap_err();
    assert_eq!(err.key(), Some("skip"));
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn view_query_round_trip() {
    let (seen, slot) = recorder::<ViewRequest>();
    let engine = create_engine(MemoryCluster::builder().view_handler(move |req| {
        *slot.lock() = Some(req.clone());
        ViewResponse {
            rows: vec![
                ViewRow {
                    id: Some("airline_10".into()),
                    key: "\"40-Mile Air\"".into(),
                    value: "null".into(),
                },
                ViewRow {
                    id: None,
                    key: "null".into(),
                    value: "2".into(),
                },
            ],
            meta: ViewMetaData {
                total_rows: Some(2),
                debug_info: None,
            },
            ..Default::default()
        }
    }));
    let cluster = connect(&engine);
    let options = Value::object([
        ("scanConsistency", Value::Int(2)),
        ("order", Value::Int(1)),
        ("limit", Value::Int(2)),
        ("keys", Value::Array(vec![Value::from("\"40-Mile Air\"")])),
    ]);
    let result = cluster
        .view_query(BUCKET, "airlines", "by_name", 1, &options)
        .unwrap();

    let req = last(&seen);
    assert_eq!(req.bucket_name, BUCKET);
    assert_eq!(req.document_name, "airlines");
    assert_eq!(req.view_name, "by_name");
    assert_eq!(
        req.name_space,
        syncbase_engine::request::DesignDocumentNamespace::Development
    );
    assert_eq!(req.consistency, Some(ViewScanConsistency::RequestPlus));
    assert_eq!(req.order, Some(ViewSortOrder::Descending));
    assert_eq!(req.limit, Some(2));

    let rows = field(&result, &["rows"]).as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&Value::from("airline_10")));
    assert!(rows[1].get("id").is_none());
    assert_eq!(field(&result, &["meta", "totalRows"]), &Value::Int(2));
    assert!(result.get("meta").unwrap().get("debugInfo").is_none());
}

#[test]
fn view_without_handler_is_unavailable_with_view_context() {
    let cluster = create_cluster();
    let err = cluster
        .view_query(BUCKET, "airlines", "by_name", 2, &Value::Null)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ServiceNotAvailable);
    match err.context() {
        Some(ErrorContext::View(ctx)) => {
            assert_eq!(ctx.design_document_name, "airlines");
            assert_eq!(ctx.view_name, "by_name");
        }
        other => panic!("Expected view context, got {:?}", other),
    }
}

// ============================================================================
// Search index management
// ============================================================================

#[test]
fn search_index_definition_reaches_the_engine() {
    let engine = create_engine(MemoryCluster::builder().search_index_handler(|req| {
        SearchIndexUpsertResponse {
            status: format!("{}:{}:{}", req.index.name, req.index.source_name, req.index.type_name),
            ..Default::default()
        }
    }));
    let cluster = connect(&engine);
    let index = Value::object([
        ("name", "hotels"),
        ("type", "fulltext-index"),
        ("sourceName", BUCKET),
        ("sourceType", "couchbase"),
    ]);
    let result = cluster.search_index_upsert(&index, &Value::Null).unwrap();
    assert_eq!(
        result.get("status"),
        Some(&Value::from("hotels:travel:fulltext-index"))
    );
    assert_eq!(result.get("error"), Some(&Value::from("")));
}
