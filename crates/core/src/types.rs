//! Identity and durability types shared by requests and responses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// Fully qualified document identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId {
    pub bucket: String,
    pub scope: String,
    pub collection: String,
    pub key: String,
}

impl DocumentId {
    pub fn new(
        bucket: impl Into<String>,
        scope: impl Into<String>,
        collection: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            scope: scope.into(),
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Document in the default scope and collection of `bucket`.
    pub fn in_default_collection(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(bucket, "_default", "_default", key)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.bucket, self.scope, self.collection, self.key
        )
    }
}

/// Position of a mutation in a partition's history.
///
/// On the wire `partitionUuid` and `sequenceNumber` are lowercase hex strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationToken {
    pub bucket_name: String,
    pub partition_id: u16,
    pub partition_uuid: u64,
    pub sequence_number: u64,
}

impl MutationToken {
    /// A token is usable only when it names a bucket and a partition uuid.
    pub fn is_valid(&self) -> bool {
        !self.bucket_name.is_empty() && self.partition_uuid > 0
    }

    /// Wire form of the token.
    pub fn to_value(&self) -> Value {
        Value::object([
            ("bucketName", Value::from(self.bucket_name.clone())),
            ("partitionId", Value::from(self.partition_id)),
            ("partitionUuid", Value::from(format!("{:x}", self.partition_uuid))),
            ("sequenceNumber", Value::from(format!("{:x}", self.sequence_number))),
        ])
    }
}

/// Replication/persistence acknowledgment strength requested for a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityLevel {
    #[default]
    None,
    Majority,
    MajorityAndPersistToActive,
    PersistToMajority,
}

impl DurabilityLevel {
    /// Parse the literal used in option bags.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(DurabilityLevel::None),
            "majority" => Some(DurabilityLevel::Majority),
            "majorityAndPersistToActive" => Some(DurabilityLevel::MajorityAndPersistToActive),
            "persistToMajority" => Some(DurabilityLevel::PersistToMajority),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurabilityLevel::None => "none",
            DurabilityLevel::Majority => "majority",
            DurabilityLevel::MajorityAndPersistToActive => "majorityAndPersistToActive",
            DurabilityLevel::PersistToMajority => "persistToMajority",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DurabilityLevel::None)
    }
}

impl fmt::Display for DurabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a 64-bit engine counter (CAS, sequence number) in wire form.
pub fn hex_u64(value: u64) -> String {
    format!("{:x}", value)
}
