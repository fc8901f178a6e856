//! Conversion of engine responses into caller-facing results.
//!
//! Rows are passed through as the encoded JSON strings the service sent.
//! Durations are rendered in milliseconds, counters as integers.

use std::time::Duration;

use syncbase_core::Value;
use syncbase_engine::response::*;

use crate::types::{DocumentResult, ExistsResult, MutationResult};

fn count(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn millis(d: Duration) -> Value {
    count(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

fn rows(rows: &[String]) -> Value {
    Value::Array(rows.iter().map(|row| Value::from(row.as_str())).collect())
}

fn problems(problems: &[QueryProblem]) -> Value {
    Value::Array(
        problems
            .iter()
            .map(|problem| {
                let mut entries = vec![
                    ("code", count(problem.code)),
                    ("message", Value::from(problem.message.as_str())),
                ];
                if let Some(reason) = problem.reason {
                    entries.push(("reason", count(reason)));
                }
                if let Some(retry) = problem.retry {
                    entries.push(("retry", Value::from(retry)));
                }
                Value::object(entries)
            })
            .collect(),
    )
}

impl From<UpsertResponse> for MutationResult {
    fn from(resp: UpsertResponse) -> Self {
        MutationResult::new(resp.cas, resp.token)
    }
}

impl From<GetResponse> for DocumentResult {
    fn from(resp: GetResponse) -> Self {
        DocumentResult {
            cas: resp.cas,
            flags: resp.flags,
            value: resp.value,
            expiry: None,
        }
    }
}

impl From<GetProjectedResponse> for DocumentResult {
    fn from(resp: GetProjectedResponse) -> Self {
        DocumentResult {
            cas: resp.cas,
            flags: resp.flags,
            value: resp.value,
            expiry: resp.expiry,
        }
    }
}

impl From<ExistsResponse> for ExistsResult {
    fn from(resp: ExistsResponse) -> Self {
        ExistsResult {
            exists: resp.exists(),
            deleted: resp.deleted,
            cas: resp.cas,
            flags: resp.flags,
            datatype: resp.datatype,
            expiry: resp.expiry,
            sequence_number: resp.sequence_number,
        }
    }
}

/// `{servedByNode, rows[], meta{...}}`
pub fn query_value(resp: &QueryResponse) -> Value {
    let meta = &resp.meta;
    let mut entries = vec![
        ("clientContextId", Value::from(meta.client_context_id.as_str())),
        ("requestId", Value::from(meta.request_id.as_str())),
        ("status", Value::from(meta.status.as_str())),
    ];
    if let Some(profile) = &meta.profile {
        entries.push(("profile", Value::from(profile.as_str())));
    }
    if let Some(signature) = &meta.signature {
        entries.push(("signature", Value::from(signature.as_str())));
    }
    if let Some(metrics) = &meta.metrics {
        entries.push((
            "metrics",
            Value::object([
                ("errorCount", count(metrics.error_count)),
                ("mutationCount", count(metrics.mutation_count)),
                ("resultCount", count(metrics.result_count)),
                ("resultSize", count(metrics.result_size)),
                ("sortCount", count(metrics.sort_count)),
                ("warningCount", count(metrics.warning_count)),
                ("elapsedTimeMilliseconds", millis(metrics.elapsed_time)),
                ("executionTimeMilliseconds", millis(metrics.execution_time)),
            ]),
        ));
    }
    if let Some(errors) = &meta.errors {
        entries.push(("errors", problems(errors)));
    }
    if let Some(warnings) = &meta.warnings {
        entries.push(("warnings", problems(warnings)));
    }
    Value::object([
        ("servedByNode", Value::from(resp.served_by_node.as_str())),
        ("rows", rows(&resp.rows)),
        ("meta", Value::object(entries)),
    ])
}

/// `{rows[], meta{clientContextId, requestId, status, signature?, metrics, warnings[]}}`
pub fn analytics_value(resp: &AnalyticsResponse) -> Value {
    let meta = &resp.meta;
    let metrics = &meta.metrics;
    let mut entries = vec![
        ("clientContextId", Value::from(meta.client_context_id.as_str())),
        ("requestId", Value::from(meta.request_id.as_str())),
        ("status", Value::from(meta.status.as_str())),
        (
            "metrics",
            Value::object([
                ("errorCount", count(metrics.error_count)),
                ("processedObjects", count(metrics.processed_objects)),
                ("resultCount", count(metrics.result_count)),
                ("resultSize", count(metrics.result_size)),
                ("warningCount", count(metrics.warning_count)),
                ("elapsedTimeMilliseconds", millis(metrics.elapsed_time)),
                ("executionTimeMilliseconds", millis(metrics.execution_time)),
            ]),
        ),
        ("warnings", problems(&meta.warnings)),
    ];
    if let Some(signature) = &meta.signature {
        entries.push(("signature", Value::from(signature.as_str())));
    }
    Value::object([("rows", rows(&resp.rows)), ("meta", Value::object(entries))])
}

fn search_location(location: &SearchLocation) -> Value {
    let mut entries = vec![
        ("field", Value::from(location.field.as_str())),
        ("term", Value::from(location.term.as_str())),
        ("position", count(location.position)),
        ("startOffset", count(location.start_offset)),
        ("endOffset", count(location.end_offset)),
    ];
    if let Some(positions) = &location.array_positions {
        entries.push((
            "arrayPositions",
            Value::Array(positions.iter().copied().map(count).collect()),
        ));
    }
    Value::object(entries)
}

fn search_row(row: &SearchRow) -> Value {
    Value::object([
        ("index", Value::from(row.index.as_str())),
        ("id", Value::from(row.id.as_str())),
        ("score", Value::from(row.score)),
        ("fields", Value::from(row.fields.as_str())),
        ("explanation", Value::from(row.explanation.as_str())),
        (
            "locations",
            Value::Array(row.locations.iter().map(search_location).collect()),
        ),
    ])
}

fn search_facet(facet: &SearchFacet) -> Value {
    let optional = |v: &Option<String>| v.as_deref().map(Value::from).unwrap_or(Value::Null);
    let bound = |v: Option<f64>| v.map(Value::from).unwrap_or(Value::Null);
    Value::object([
        ("name", Value::from(facet.name.as_str())),
        ("field", Value::from(facet.field.as_str())),
        ("total", count(facet.total)),
        ("missing", count(facet.missing)),
        ("other", count(facet.other)),
        (
            "terms",
            Value::Array(
                facet
                    .terms
                    .iter()
                    .map(|t| {
                        Value::object([
                            ("term", Value::from(t.term.as_str())),
                            ("count", count(t.count)),
                        ])
                    })
                    .collect(),
            ),
        ),
        (
            "dateRanges",
            Value::Array(
                facet
                    .date_ranges
                    .iter()
                    .map(|r| {
                        Value::object([
                            ("name", Value::from(r.name.as_str())),
                            ("count", count(r.count)),
                            ("start", optional(&r.start)),
                            ("end", optional(&r.end)),
                        ])
                    })
                    .collect(),
            ),
        ),
        (
            "numericRanges",
            Value::Array(
                facet
                    .numeric_ranges
                    .iter()
                    .map(|r| {
                        Value::object([
                            ("name", Value::from(r.name.as_str())),
                            ("count", count(r.count)),
                            ("min", bound(r.min)),
                            ("max", bound(r.max)),
                        ])
                    })
                    .collect(),
            ),
        ),
    ])
}

/// `{status, error, rows[], meta{...}, facets[]}`
pub fn search_value(resp: &SearchResponse) -> Value {
    let metrics = &resp.meta.metrics;
    let meta = Value::object([
        (
            "clientContextId",
            Value::from(resp.meta.client_context_id.as_str()),
        ),
        (
            "metrics",
            Value::object([
                ("tookMilliseconds", millis(metrics.took)),
                ("totalRows", count(metrics.total_rows)),
                ("maxScore", Value::from(metrics.max_score)),
                ("successPartitionCount", count(metrics.success_partition_count)),
                ("errorPartitionCount", count(metrics.error_partition_count)),
            ]),
        ),
        (
            "errors",
            Value::object(
                resp.meta
                    .errors
                    .iter()
                    .map(|(partition, message)| (partition.clone(), Value::from(message.as_str()))),
            ),
        ),
    ]);
    Value::object([
        ("status", Value::from(resp.status.as_str())),
        ("error", Value::from(resp.error.as_str())),
        ("rows", Value::Array(resp.rows.iter().map(search_row).collect())),
        ("meta", meta),
        (
            "facets",
            Value::Array(resp.facets.iter().map(search_facet).collect()),
        ),
    ])
}

/// `{rows[{id?, key, value}], meta{debugInfo?, totalRows?}}`
pub fn view_value(resp: &ViewResponse) -> Value {
    let rows = resp
        .rows
        .iter()
        .map(|row| {
            let mut entries = vec![
                ("key", Value::from(row.key.as_str())),
                ("value", Value::from(row.value.as_str())),
            ];
            if let Some(id) = &row.id {
                entries.push(("id", Value::from(id.as_str())));
            }
            Value::object(entries)
        })
        .collect();
    let mut meta = Vec::new();
    if let Some(debug_info) = &resp.meta.debug_info {
        meta.push(("debugInfo", Value::from(debug_info.as_str())));
    }
    if let Some(total_rows) = resp.meta.total_rows {
        meta.push(("totalRows", count(total_rows)));
    }
    Value::object([("rows", Value::Array(rows)), ("meta", Value::object(meta))])
}

/// `{status, error}`
pub fn search_index_value(resp: &SearchIndexUpsertResponse) -> Value {
    Value::object([
        ("status", Value::from(resp.status.as_str())),
        ("error", Value::from(resp.error.as_str())),
    ])
}
