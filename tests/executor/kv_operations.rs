//! Key-value Operation Tests
//!
//! Upsert, get and exists through the typed API, including the result
//! value shapes callers receive.

use crate::common::*;
use syncbase::{
    ClusterOptions, DocumentId, ErrorCode, ErrorContext, MemoryCluster, Output, Value,
};

#[test]
fn upsert_returns_cas_and_mutation_token() {
    let cluster = create_cluster();
    let result = cluster
        .upsert(&doc("airline_10"), br#"{"name":"40-Mile Air"}"#.to_vec(), 0, &Value::Null)
        .unwrap();
    assert!(result.cas > 0);
    let token = result.mutation_token.as_ref().expect("valid token");
    assert_eq!(token.bucket_name, BUCKET);
    assert!(token.partition_uuid > 0);

    let value = result.to_value();
    let cas = field(&value, &["cas"]).as_str().unwrap();
    assert_eq!(u64::from_str_radix(cas, 16).unwrap(), result.cas);
    let uuid = field(&value, &["mutationToken", "partitionUuid"]).as_str().unwrap();
    assert_eq!(u64::from_str_radix(uuid, 16).unwrap(), token.partition_uuid);
}

#[test]
fn upsert_without_mutation_tokens_omits_token() {
    let engine = create_engine(MemoryCluster::builder());
    let mut options = credentials("Administrator", "password");
    if let Value::Object(entries) = &mut options {
        entries.insert("enableMutationTokens".into(), Value::Bool(false));
    }
    let cluster = syncbase::Cluster::connect(CONNECTION_STRING, &options, engine).unwrap();
    assert!(!cluster.connection().origin().options().enable_mutation_tokens);
    assert_ne!(
        ClusterOptions::default().enable_mutation_tokens,
        cluster.connection().origin().options().enable_mutation_tokens
    );
    cluster.bucket_open(BUCKET).unwrap();

    let result = cluster.upsert(&doc("k"), b"1".to_vec(), 0, &Value::Null).unwrap();
    assert!(result.mutation_token.is_none());
    assert!(result.to_value().get("mutationToken").is_none());
}

#[test]
fn get_returns_what_was_stored() {
    let cluster = create_cluster();
    let id = DocumentId::new(BUCKET, "inventory", "hotel", "hotel_1");
    let stored = cluster
        .upsert(&id, br#"{"city":"Oslo"}"#.to_vec(), 0x02000006, &Value::Null)
        .unwrap();

    let result = cluster.get(&id, &Value::Null).unwrap();
    assert_eq!(result.cas, stored.cas);
    assert_eq!(result.flags, 0x02000006);
    assert_eq!(result.value, br#"{"city":"Oslo"}"#.to_vec());
    assert_eq!(result.expiry, None);
}

#[test]
fn second_upsert_changes_cas() {
    let cluster = create_cluster();
    let first = cluster.upsert(&doc("k"), b"1".to_vec(), 0, &Value::Null).unwrap();
    let second = cluster.upsert(&doc("k"), b"2".to_vec(), 0, &Value::Null).unwrap();
    assert_ne!(first.cas, second.cas);
    assert_eq!(cluster.get(&doc("k"), &Value::Null).unwrap().value, b"2".to_vec());
}

#[test]
fn get_with_expiry_and_projections() {
    let cluster = create_cluster();
    cluster
        .upsert(
            &doc("hotel_2"),
            br#"{"name":"Inn","geo":{"lat":1.5,"lon":2.5},"city":"Bergen"}"#.to_vec(),
            0,
            &Value::object([("expiry", 120)]),
        )
        .unwrap();

    let options = Value::object([
        ("withExpiry", Value::Bool(true)),
        (
            "projections",
            Value::Array(vec![Value::from("geo.lat"), Value::from("city")]),
        ),
    ]);
    let result = cluster.get(&doc("hotel_2"), &options).unwrap();
    assert_eq!(result.expiry, Some(120));
    let body: serde_json::Value = serde_json::from_slice(&result.value).unwrap();
    assert_eq!(body, serde_json::json!({"geo": {"lat": 1.5}, "city": "Bergen"}));
    assert_eq!(field(&result.to_value(), &["expiry"]), &Value::Int(120));
}

#[test]
fn preserve_expiry_keeps_previous_expiry() {
    let cluster = create_cluster();
    cluster
        .upsert(&doc("k"), b"1".to_vec(), 0, &Value::object([("expiry", 60)]))
        .unwrap();
    cluster
        .upsert(&doc("k"), b"2".to_vec(), 0, &Value::object([("preserveExpiry", true)]))
        .unwrap();
    let result = cluster
        .get(&doc("k"), &Value::object([("withExpiry", true)]))
        .unwrap();
    assert_eq!(result.expiry, Some(60));
}

#[test]
fn exists_reports_present_and_missing_documents() {
    let cluster = create_cluster();
    let stored = cluster.upsert(&doc("present"), b"{}".to_vec(), 7, &Value::Null).unwrap();

    let present = cluster.exists(&doc("present"), &Value::Null).unwrap();
    assert!(present.exists);
    assert!(!present.deleted);
    assert_eq!(present.cas, stored.cas);
    assert_eq!(present.flags, 7);

    let missing = cluster.exists(&doc("absent"), &Value::Null).unwrap();
    assert!(!missing.exists);
    let value = missing.to_value();
    assert_eq!(field(&value, &["exists"]), &Value::Bool(false));
    assert_eq!(value.as_object().unwrap().len(), 7);
}

#[test]
fn get_missing_document_is_document_not_found() {
    let cluster = create_cluster();
    let id = DocumentId::new(BUCKET, "inventory", "airline", "airline_404");
    let err = cluster.get(&id, &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DocumentNotFound);
    assert!(!err.is_validation());

    let ctx = match err.context() {
        Some(ErrorContext::KeyValue(ctx)) => ctx,
        other => panic!("Expected key-value context, got {:?}", other),
    };
    assert_eq!(ctx.id, "airline_404");
    assert_eq!(ctx.bucket, BUCKET);
    assert_eq!(ctx.scope, "inventory");
    assert_eq!(ctx.collection, "airline");
    assert!(ctx.endpoints.last_dispatched_to.is_some());
}

#[test]
fn operations_on_unopened_bucket_fail() {
    let cluster = create_cluster();
    let id = DocumentId::in_default_collection("other", "k");
    let err = cluster.upsert(&id, b"{}".to_vec(), 0, &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BucketNotFound);
    assert_eq!(err.context().map(ErrorContext::subsystem), Some("key_value"));
}

#[test]
fn outputs_render_to_values() {
    let cluster = create_cluster();
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &Value::Null).unwrap();
    let output = cluster
        .executor()
        .execute(syncbase::Command::DocumentGet {
            id: doc("k"),
            options: Value::Null,
        })
        .unwrap();
    assert!(matches!(output, Output::Document(_)));
    let value = output.into_value();
    assert_eq!(field(&value, &["value"]), &Value::Bytes(b"{}".to_vec()));
    assert_eq!(field(&value, &["flags"]), &Value::Int(0));
}
