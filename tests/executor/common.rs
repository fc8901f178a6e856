//! Common test utilities for executor tests

use std::sync::Arc;
use syncbase::{Cluster, DocumentId, MemoryCluster, MemoryClusterBuilder, Output, Value};

pub const CONNECTION_STRING: &str = "couchbase://127.0.0.1";
pub const BUCKET: &str = "travel";

/// Option bag holding only a password authenticator.
pub fn credentials(username: &str, password: &str) -> Value {
    Value::object([(
        "authenticator",
        Value::object([
            ("type", "password"),
            ("username", username),
            ("password", password),
        ]),
    )])
}

/// Route engine and connection logs to the test harness.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

/// In-memory engine with the test bucket registered.
pub fn create_engine(builder: MemoryClusterBuilder) -> Arc<MemoryCluster> {
    Arc::new(builder.bucket(BUCKET).build())
}

/// Connect to `engine` and open the test bucket.
pub fn connect(engine: &Arc<MemoryCluster>) -> Cluster {
    let cluster = Cluster::connect(
        CONNECTION_STRING,
        &credentials("Administrator", "password"),
        Arc::<MemoryCluster>::clone(engine),
    )
    .unwrap();
    cluster.bucket_open(BUCKET).unwrap();
    cluster
}

/// Connected cluster over a default in-memory engine.
pub fn create_cluster() -> Cluster {
    connect(&create_engine(MemoryCluster::builder()))
}

pub fn doc(key: &str) -> DocumentId {
    DocumentId::in_default_collection(BUCKET, key)
}

/// Extract the value of a service output
#[allow(dead_code)]
pub fn extract_value(output: Output) -> Value {
    match output {
        Output::Query(v)
        | Output::Analytics(v)
        | Output::Search(v)
        | Output::View(v)
        | Output::SearchIndex(v) => v,
        other => panic!("Expected a service output, got {:?}", other),
    }
}

/// Look up a nested field by path.
#[allow(dead_code)]
pub fn field<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
    path.iter().fold(value, |node, key| {
        node.get(key)
            .unwrap_or_else(|| panic!("missing field {:?} in {:?}", key, node))
    })
}
