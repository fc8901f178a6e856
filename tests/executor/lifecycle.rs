//! Connection Lifecycle Tests
//!
//! Bootstrap, teardown, cluster version probing and profile-based connects.

use crate::common::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use syncbase::{
    create_connection, Cluster, ConnectionProfile, ConnectionState, ErrorCode, MemoryCluster,
    Value,
};

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn shutdown_is_idempotent() {
    let engine = create_engine(MemoryCluster::builder());
    let cluster = connect(&engine);
    cluster.shutdown();
    cluster.shutdown();
    assert_eq!(cluster.connection().state(), ConnectionState::Closed);
    assert!(engine.is_closed());
}

#[test]
fn shutdown_waits_for_engine_close() {
    let delay = Duration::from_millis(150);
    let engine = create_engine(MemoryCluster::builder().close_delay(delay));
    let cluster = connect(&engine);
    assert!(engine.is_bucket_open(BUCKET));

    let started = Instant::now();
    cluster.shutdown();
    assert!(started.elapsed() >= delay);
    assert!(engine.is_closed());
    assert!(!engine.is_bucket_open(BUCKET));
}

#[test]
fn engine_handle_is_released() {
    let engine = create_engine(MemoryCluster::builder());
    let cluster = connect(&engine);
    assert!(Arc::strong_count(&engine) > 1);
    cluster.shutdown();
    assert_eq!(Arc::strong_count(&engine), 1);
}

#[test]
fn dropping_the_last_handle_closes_the_engine() {
    let engine = create_engine(MemoryCluster::builder());
    let cluster = connect(&engine);
    let clone = cluster.clone();
    drop(cluster);
    assert!(!engine.is_closed());
    drop(clone);
    assert!(engine.is_closed());
    assert_eq!(Arc::strong_count(&engine), 1);
}

#[test]
fn calls_after_shutdown_fail_with_cluster_closed() {
    let cluster = create_cluster();
    cluster.shutdown();

    let err = cluster.get(&doc("k"), &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ClusterClosed);
    assert!(err.context().is_none());

    let err = cluster.bucket_open(BUCKET).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ClusterClosed);

    assert_eq!(cluster.cluster_version(None).unwrap(), "");
}

#[test]
fn validation_still_runs_after_shutdown() {
    let cluster = create_cluster();
    cluster.shutdown();
    let err = cluster
        .query("SELECT 1", &Value::object([("scanConsistency", 9)]))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

// ============================================================================
// Bootstrap
// ============================================================================

#[test]
fn wrong_password_fails_to_connect() {
    let engine = create_engine(MemoryCluster::builder().user("Administrator", "password"));
    let err = create_connection(CONNECTION_STRING, &credentials("Administrator", "nope"), engine)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::AuthenticationFailure);
    assert!(err.context().is_none());
    assert!(!err.is_validation());
}

#[test]
fn configured_user_connects() {
    let engine = create_engine(MemoryCluster::builder().user("Administrator", "password"));
    let cluster = connect(&engine);
    assert_eq!(cluster.connection().state(), ConnectionState::Open);
    assert!(engine.is_bucket_open(BUCKET));
}

#[test]
fn unknown_bucket_cannot_be_opened() {
    let cluster = create_cluster();
    let err = cluster.bucket_open("beer-sample").unwrap_err();
    assert_eq!(err.code(), ErrorCode::BucketNotFound);

    cluster.bucket_close(BUCKET).unwrap();
    let err = cluster.get(&doc("k"), &Value::Null).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BucketNotFound);
}

// ============================================================================
// Cluster version
// ============================================================================

#[test]
fn cluster_version_reports_first_node() {
    let engine = create_engine(MemoryCluster::builder().version("7.2.4"));
    let cluster = connect(&engine);
    assert_eq!(cluster.cluster_version(None).unwrap(), "7.2.4");
}

#[test]
fn cluster_version_opens_bucket_when_required() {
    let engine = create_engine(MemoryCluster::builder().version_requires_bucket(true));
    let cluster = Cluster::connect(
        CONNECTION_STRING,
        &credentials("Administrator", "password"),
        Arc::<MemoryCluster>::clone(&engine),
    )
    .unwrap();

    assert_eq!(cluster.cluster_version(None).unwrap(), "");
    assert!(!engine.is_bucket_open(BUCKET));

    assert_eq!(cluster.cluster_version(Some(BUCKET)).unwrap(), "7.1.0");
    assert!(engine.is_bucket_open(BUCKET));
}

#[test]
fn cluster_version_fallback_with_missing_bucket_is_empty() {
    let engine = create_engine(MemoryCluster::builder().version_requires_bucket(true));
    let cluster = Cluster::connect(
        CONNECTION_STRING,
        &credentials("Administrator", "password"),
        Arc::<MemoryCluster>::clone(&engine),
    )
    .unwrap();
    assert_eq!(cluster.cluster_version(Some("beer-sample")).unwrap(), "");
    assert_eq!(cluster.cluster_version(Some("")).unwrap(), "");
}

#[test]
fn cluster_version_uses_connection_string_bucket() {
    let engine = create_engine(MemoryCluster::builder().version("7.6.0").version_requires_bucket(true));
    let cluster = Cluster::connect(
        &format!("{}/{}", CONNECTION_STRING, BUCKET),
        &credentials("Administrator", "password"),
        Arc::<MemoryCluster>::clone(&engine),
    )
    .unwrap();
    assert_eq!(
        cluster.connection().origin().connection_string().default_bucket.as_deref(),
        Some(BUCKET)
    );
    assert_eq!(cluster.cluster_version(None).unwrap(), "7.6.0");
    assert!(engine.is_bucket_open(BUCKET));
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn connect_with_template_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("syncbase.toml");
    ConnectionProfile::write_default_if_missing(&path).unwrap();
    assert!(path.exists());

    let engine = create_engine(MemoryCluster::builder().user("Administrator", "password"));
    let cluster = Cluster::open_profile(&path, Arc::<MemoryCluster>::clone(&engine)).unwrap();
    cluster.bucket_open(BUCKET).unwrap();
    cluster.upsert(&doc("k"), b"{}".to_vec(), 0, &Value::Null).unwrap();
    assert_eq!(engine.document_count(), 1);
}

#[test]
fn profile_options_are_applied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    std::fs::write(
        &path,
        r#"
connection_string = "couchbases://db1,db2"

[authenticator]
type = "password"
username = "Administrator"
password = "password"

[options]
keyValueTimeout = 900
enableMutationTokens = false
"#,
    )
    .unwrap();

    let cluster = Cluster::open_profile(&path, create_engine(MemoryCluster::builder())).unwrap();
    let options = cluster.connection().origin().options();
    assert_eq!(options.key_value_timeout, Duration::from_millis(900));
    assert!(!options.enable_mutation_tokens);
    assert!(options.enable_tls);
}

#[test]
fn existing_profile_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    std::fs::write(&path, "connection_string = \"couchbase://db9\"\n").unwrap();
    ConnectionProfile::write_default_if_missing(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("db9"));
}

#[test]
fn invalid_profile_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.toml");
    std::fs::write(
        &path,
        r#"
connection_string = "couchbase://db1"

[authenticator]
type = "password"
username = "Administrator"
password = "password"

[options]
keyValueTimeout = "fast"
"#,
    )
    .unwrap();
    let err = Cluster::open_profile(&path, create_engine(MemoryCluster::builder())).unwrap_err();
    assert_eq!(err.key(), Some("keyValueTimeout"));

    let missing = dir.path().join("absent.toml");
    let err = Cluster::open_profile(&missing, create_engine(MemoryCluster::builder())).unwrap_err();
    assert_eq!(err.key(), Some("profile"));
}
