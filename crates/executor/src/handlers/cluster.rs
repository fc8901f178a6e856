//! Bucket and cluster-level handlers.

use syncbase_engine::Connection;

use crate::{Output, Result};

/// Handle BucketOpen command.
pub fn bucket_open(conn: &Connection, name: &str) -> Result<Output> {
    conn.bucket_open(name)?;
    Ok(Output::Unit)
}

/// Handle BucketClose command.
pub fn bucket_close(conn: &Connection, name: &str) -> Result<Output> {
    conn.bucket_close(name)?;
    Ok(Output::Unit)
}

/// Handle ClusterVersion command. Never fails; an unavailable version is
/// the empty string.
pub fn cluster_version(conn: &Connection, bucket: Option<&str>) -> Result<Output> {
    Ok(Output::Version(conn.cluster_version(bucket)))
}
