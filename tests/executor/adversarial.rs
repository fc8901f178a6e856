//! Adversarial Tests
//!
//! Concurrent callers on one connection, slow engines and requests caught
//! by teardown.

use crate::common::*;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use syncbase::{ErrorCode, ErrorContext, MemoryCluster, Value};
use syncbase_engine::response::QueryResponse;

#[test]
fn concurrent_upserts_and_gets() {
    init_tracing();
    let engine = create_engine(MemoryCluster::builder());
    let cluster = connect(&engine);
    let threads = 8;
    let per_thread = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cluster = cluster.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..per_thread {
                    let key = format!("doc_{}_{}", t, i);
                    let body = format!(r#"{{"thread":{},"seq":{}}}"#, t, i);
                    let stored = cluster
                        .upsert(&doc(&key), body.clone().into_bytes(), 0, &Value::Null)
                        .unwrap();
                    let fetched = cluster.get(&doc(&key), &Value::Null).unwrap();
                    assert_eq!(fetched.cas, stored.cas);
                    assert_eq!(fetched.value, body.into_bytes());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(engine.document_count(), threads * per_thread);
}

#[test]
fn concurrent_writers_on_one_key_leave_one_winner() {
    let cluster = create_cluster();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cluster = cluster.clone();
            thread::spawn(move || {
                (0..20)
                    .map(|_| {
                        cluster
                            .upsert(&doc("contended"), vec![b'0' + t as u8], 0, &Value::Null)
                            .unwrap()
                            .cas
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let mut cas_values: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = cas_values.len();
    cas_values.sort_unstable();
    cas_values.dedup();
    assert_eq!(cas_values.len(), total, "every mutation gets a distinct cas");

    let last = cluster.get(&doc("contended"), &Value::Null).unwrap();
    assert_eq!(last.cas, *cas_values.last().unwrap());
}

#[test]
fn slow_key_value_call_times_out() {
    init_tracing();
    let engine = create_engine(MemoryCluster::builder().latency(Duration::from_millis(400)));
    let cluster = connect(&engine);
    let err = cluster
        .get(&doc("k"), &Value::object([("timeoutMilliseconds", 250)]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnambiguousTimeout);
    let ctx = err.context().and_then(ErrorContext::as_key_value).unwrap();
    assert_eq!(ctx.id, "k");
    assert_eq!(ctx.retry.retry_attempts, 2);
    assert!(ctx.retry.retry_reasons.contains("kv_temporary_failure"));
}

#[test]
fn latency_within_timeout_succeeds() {
    let engine = create_engine(MemoryCluster::builder().latency(Duration::from_millis(20)));
    let cluster = connect(&engine);
    cluster
        .upsert(
            &doc("k"),
            b"{}".to_vec(),
            0,
            &Value::object([("timeoutMilliseconds", 1000)]),
        )
        .unwrap();
}

#[test]
fn slow_query_times_out_with_query_context() {
    let engine = create_engine(
        MemoryCluster::builder()
            .latency(Duration::from_millis(300))
            .query_handler(|_| QueryResponse::default()),
    );
    let cluster = connect(&engine);
    let err = cluster
        .query(
            "SELECT 1",
            &Value::object([
                ("timeoutMilliseconds", Value::Int(100)),
                ("clientContextId", Value::from("slow")),
            ]),
        )
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnambiguousTimeout);
    match err.context() {
        Some(ErrorContext::Query(ctx)) => {
            assert_eq!(ctx.client_context_id, "slow");
            assert_eq!(ctx.statement, "SELECT 1");
            assert_eq!(ctx.retry.retry_attempts, 1);
            assert!(ctx
                .retry
                .retry_reasons
                .contains("service_response_code_indicated"));
        }
        other => panic!("Expected query context, got {:?}", other),
    }
}

#[test]
fn cluster_timeout_applies_without_request_timeout() {
    let engine = create_engine(MemoryCluster::builder().latency(Duration::from_millis(300)));
    let mut options = credentials("Administrator", "password");
    if let Value::Object(entries) = &mut options {
        entries.insert("keyValueTimeout".to_string(), Value::Int(100));
    }
    let cluster = syncbase::Cluster::connect(CONNECTION_STRING, &options, engine).unwrap();
    cluster.bucket_open(BUCKET).unwrap();
    let err = cluster.exists(&doc("k"), &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnambiguousTimeout);
}

#[test]
fn requests_queued_behind_close_are_canceled() {
    init_tracing();
    let engine = create_engine(
        MemoryCluster::builder()
            .latency(Duration::from_millis(50))
            .close_delay(Duration::from_millis(200)),
    );
    let cluster = connect(&engine);
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &Value::Null).unwrap();

    let closer = {
        let cluster = cluster.clone();
        thread::spawn(move || cluster.shutdown())
    };
    // Let the close job reach the engine before queueing behind it.
    thread::sleep(Duration::from_millis(50));
    let result = cluster.get(&doc("k"), &Value::Null);
    closer.join().unwrap();

    match result {
        Ok(_) => panic!("request after close should not succeed"),
        Err(err) => assert!(
            matches!(err.code(), ErrorCode::RequestCanceled | ErrorCode::ClusterClosed),
            "unexpected error: {}",
            err
        ),
    }
    assert!(engine.is_closed());
}
