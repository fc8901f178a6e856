//! Bucket and cluster-level operations.

use super::{unexpected, Cluster};
use crate::{Command, Output, Result};

impl Cluster {
    pub fn bucket_open(&self, name: &str) -> Result<()> {
        match self.execute(Command::BucketOpen {
            name: name.to_string(),
        })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("bucket_open")),
        }
    }

    pub fn bucket_close(&self, name: &str) -> Result<()> {
        match self.execute(Command::BucketClose {
            name: name.to_string(),
        })? {
            Output::Unit => Ok(()),
            _ => Err(unexpected("bucket_close")),
        }
    }

    /// Version of the first cluster node, or an empty string.
    ///
    /// With `bucket` given, a cluster that cannot answer before a bucket is
    /// open gets that bucket opened and is asked once more.
    pub fn cluster_version(&self, bucket: Option<&str>) -> Result<String> {
        match self.execute(Command::ClusterVersion {
            bucket: bucket.map(str::to_string),
        })? {
            Output::Version(version) => Ok(version),
            _ => Err(unexpected("cluster_version")),
        }
    }
}
