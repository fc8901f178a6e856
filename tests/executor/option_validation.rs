//! Option Validation Tests
//!
//! Invalid option bags fail with `invalid_argument` naming the offending key
//! before any request reaches the engine.

use crate::common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use syncbase::{create_connection, ErrorCode, MemoryCluster, Value};
use syncbase_engine::response::QueryResponse;

/// Cluster whose query service counts the requests it receives.
fn counting_cluster() -> (syncbase::Cluster, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let engine = create_engine(MemoryCluster::builder().query_handler(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        QueryResponse::default()
    }));
    (connect(&engine), calls)
}

fn with_auth(extra: &[(&str, Value)]) -> Value {
    let mut options = credentials("Administrator", "password");
    if let Value::Object(entries) = &mut options {
        for (key, value) in extra {
            entries.insert(key.to_string(), value.clone());
        }
    }
    options
}

fn connect_error(connection_string: &str, options: &Value) -> syncbase::Error {
    let engine = create_engine(MemoryCluster::builder());
    create_connection(connection_string, options, engine).unwrap_err()
}

// ============================================================================
// Per-operation options
// ============================================================================

#[test]
fn unknown_scan_consistency_code_is_rejected() {
    let (cluster, calls) = counting_cluster();
    let err = cluster
        .query("SELECT 1", &Value::object([("scanConsistency", 5)]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.key(), Some("scanConsistency"));
    assert!(err.to_string().contains('5'), "message should quote the code: {}", err);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    cluster
        .query("SELECT 1", &Value::object([("scanConsistency", 2)]))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn wrong_types_name_the_key() {
    let (cluster, calls) = counting_cluster();
    let cases: Vec<(&str, Value)> = vec![
        ("readonly", Value::from("yes")),
        ("scanCap", Value::Bool(true)),
        ("clientContextId", Value::Int(1)),
        ("positionalParameters", Value::from("1")),
        ("namedParameters", Value::Array(vec![])),
        ("raw", Value::Int(3)),
        ("timeoutMilliseconds", Value::from("soon")),
        ("consistentWith", Value::object([("bucketName", "travel")])),
    ];
    for (key, value) in cases {
        let err = cluster
            .query("SELECT 1", &Value::object([(key, value)]))
            .unwrap_err();
        assert_eq!(err.key(), Some(key), "unexpected error for {}: {}", key, err);
        assert!(err.is_validation());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_mapping_options_are_rejected() {
    let cluster = create_cluster();
    let err = cluster.get(&doc("k"), &Value::Int(1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.key(), None);
}

#[test]
fn negative_timeout_is_rejected() {
    let cluster = create_cluster();
    let err = cluster
        .exists(&doc("k"), &Value::object([("timeoutMilliseconds", -1)]))
        .unwrap_err();
    assert_eq!(err.key(), Some("timeoutMilliseconds"));
}

#[test]
fn unknown_durability_level_is_rejected() {
    let cluster = create_cluster();
    let err = cluster
        .upsert(
            &doc("k"),
            b"{}".to_vec(),
            0,
            &Value::object([("durabilityLevel", "eventually")]),
        )
        .unwrap_err();
    assert_eq!(err.key(), Some("durabilityLevel"));
    assert!(err.to_string().contains("eventually"));
    assert!(!cluster.exists(&doc("k"), &Value::Null).unwrap().exists);
}

#[test]
fn durability_timeout_is_ignored_when_level_is_none() {
    let cluster = create_cluster();
    let options = Value::object([
        ("durabilityLevel", Value::from("none")),
        ("durabilityTimeoutSeconds", Value::from("ignored")),
    ]);
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &options).unwrap();

    let options = Value::object([
        ("durabilityLevel", Value::from("majority")),
        ("durabilityTimeoutSeconds", Value::from("checked")),
    ]);
    let err = cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &options).unwrap_err();
    assert_eq!(err.key(), Some("durabilityTimeoutSeconds"));
}

#[test]
fn unknown_keys_are_ignored() {
    let cluster = create_cluster();
    let options = Value::object([
        ("timeoutMilliseconds", Value::Int(2500)),
        ("someFutureOption", Value::object([("nested", true)])),
    ]);
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &options).unwrap();
}

#[test]
fn null_values_count_as_absent() {
    let cluster = create_cluster();
    let options = Value::object([
        ("timeoutMilliseconds", Value::Null),
        ("withExpiry", Value::Null),
    ]);
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &Value::Null).unwrap();
    assert_eq!(cluster.get(&doc("k"), &options).unwrap().expiry, None);
}

// ============================================================================
// Connection options
// ============================================================================

#[test]
fn malformed_connection_string_is_parsing_failure() {
    let err = connect_error("ftp://db1", &credentials("u", "p"));
    assert_eq!(err.code(), ErrorCode::ParsingFailure);
    assert!(err.is_validation());
}

#[test]
fn tls_scheme_enables_tls() {
    let engine = create_engine(MemoryCluster::builder());
    let conn = create_connection("couchbases://db1,db2:11207", &credentials("u", "p"), engine).unwrap();
    assert!(conn.origin().options().enable_tls);
    assert_eq!(conn.origin().nodes().len(), 2);
}

#[test]
fn connection_string_params_are_overridden_by_options() {
    let engine = create_engine(MemoryCluster::builder());
    let connection_string =
        format!("{}?kv_timeout=2500&enable_tls=true&network=external", CONNECTION_STRING);
    let options = with_auth(&[("network", Value::from("default"))]);
    let conn = create_connection(&connection_string, &options, engine).unwrap();
    let applied = conn.origin().options();
    assert_eq!(applied.key_value_timeout, std::time::Duration::from_millis(2500));
    assert!(applied.enable_tls);
    assert_eq!(applied.network, "default");
}

#[test]
fn invalid_connection_string_param_names_the_param() {
    let connection_string = format!("{}?kv_timeout=later", CONNECTION_STRING);
    let err = connect_error(&connection_string, &credentials("Administrator", "password"));
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.key(), Some("kv_timeout"));
}

#[test]
fn cluster_option_errors_name_the_key() {
    let cases: Vec<(&str, Value)> = vec![
        ("keyValueTimeout", Value::from("fast")),
        ("queryTimeout", Value::Int(-5)),
        ("maxHttpConnections", Value::Bool(true)),
        ("enableTls", Value::Int(1)),
        ("network", Value::from("")),
        ("tlsVerify", Value::from("sometimes")),
        ("thresholdLoggingTracerOptions", Value::Int(1)),
        ("loggingMeterOptions", Value::from("daily")),
    ];
    for (key, value) in cases {
        let err = connect_error(CONNECTION_STRING, &with_auth(&[(key, value)]));
        assert_eq!(err.key(), Some(key), "unexpected error for {}: {}", key, err);
    }

    let nested = Value::object([("keyValueThreshold", "slow")]);
    let err = connect_error(
        CONNECTION_STRING,
        &with_auth(&[("thresholdLoggingTracerOptions", nested)]),
    );
    assert_eq!(err.key(), Some("keyValueThreshold"));
}

#[test]
fn cluster_options_reach_the_origin() {
    let engine = create_engine(MemoryCluster::builder());
    let options = with_auth(&[
        ("keyValueTimeout", Value::Int(750)),
        ("maxHttpConnections", Value::Int(8)),
        ("tlsVerify", Value::from("none")),
        ("userAgentExtra", Value::from("tests")),
        (
            "loggingMeterOptions",
            Value::object([("emitInterval", 1000)]),
        ),
    ]);
    let conn = create_connection(CONNECTION_STRING, &options, engine).unwrap();
    let applied = conn.origin().options();
    assert_eq!(applied.key_value_timeout, std::time::Duration::from_millis(750));
    assert_eq!(applied.max_http_connections, 8);
    assert_eq!(applied.tls_verify, syncbase_core::TlsVerifyMode::None);
    assert_eq!(applied.user_agent_extra.as_deref(), Some("tests"));
    assert_eq!(applied.metrics.emit_interval, std::time::Duration::from_secs(1));
}

#[test]
fn authenticator_shape_is_validated() {
    let err = connect_error(CONNECTION_STRING, &Value::empty_object());
    assert_eq!(err.key(), Some("authenticator"));

    let scalar = Value::object([("authenticator", "password")]);
    let err = connect_error(CONNECTION_STRING, &scalar);
    assert_eq!(err.key(), Some("authenticator"));
    assert!(err.to_string().contains("expected authenticator to be an object"));

    let unknown = Value::object([("authenticator", Value::object([("type", "kerberos")]))]);
    let err = connect_error(CONNECTION_STRING, &unknown);
    assert!(err.to_string().contains("kerberos"));

    let incomplete = Value::object([(
        "authenticator",
        Value::object([("type", "certificate"), ("certificatePath", "/c.pem")]),
    )]);
    let err = connect_error(CONNECTION_STRING, &incomplete);
    assert_eq!(err.key(), Some("keyPath"));

    let password_missing = Value::object([(
        "authenticator",
        Value::object([("type", "password"), ("username", "u")]),
    )]);
    let err = connect_error(CONNECTION_STRING, &password_missing);
    assert_eq!(err.key(), Some("password"));
}

#[test]
fn sasl_mechanisms_skip_non_strings() {
    let engine = create_engine(MemoryCluster::builder());
    let options = Value::object([(
        "authenticator",
        Value::object([
            ("type", Value::from("password")),
            ("username", Value::from("u")),
            ("password", Value::from("p")),
            (
                "allowedSaslMechanisms",
                Value::Array(vec![Value::from("PLAIN"), Value::Int(3)]),
            ),
        ]),
    )]);
    let conn = create_connection(CONNECTION_STRING, &options, engine).unwrap();
    match conn.origin().credentials() {
        syncbase::Credentials::Password {
            allowed_sasl_mechanisms,
            ..
        } => assert_eq!(allowed_sasl_mechanisms, &vec!["PLAIN".to_string()]),
        other => panic!("Expected password credentials, got {:?}", other),
    }
}
