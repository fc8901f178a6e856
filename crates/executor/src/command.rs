//! Command enum defining every public operation.
//!
//! Commands are self-contained and serializable. Per-call configuration
//! travels as an option bag ([`Value`] mapping, `Null` for none) and is
//! validated by the executor before anything reaches the engine.

use serde::{Deserialize, Serialize};
use syncbase_core::{DocumentId, Value};

/// One public operation with all of its arguments.
///
/// | Command | Output |
/// |---------|--------|
/// | `DocumentUpsert` | `Output::Mutation` |
/// | `DocumentGet` | `Output::Document` |
/// | `DocumentExists` | `Output::Exists` |
/// | `Query` | `Output::Query` |
/// | `AnalyticsQuery` | `Output::Analytics` |
/// | `SearchQuery` | `Output::Search` |
/// | `ViewQuery` | `Output::View` |
/// | `SearchIndexUpsert` | `Output::SearchIndex` |
/// | `BucketOpen`, `BucketClose` | `Output::Unit` |
/// | `ClusterVersion` | `Output::Version` |
///
/// # Example
///
/// ```ignore
/// use syncbase_executor::{Command, DocumentId, Value};
///
/// let cmd = Command::DocumentGet {
///     id: DocumentId::in_default_collection("travel", "airline_10"),
///     options: Value::object([("withExpiry", true)]),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Key-value ====================
    /// Store a document, replacing any previous version.
    DocumentUpsert {
        id: DocumentId,
        value: Vec<u8>,
        #[serde(default)]
        flags: u32,
        #[serde(default)]
        options: Value,
    },

    /// Fetch a document. `withExpiry` or `projections` select a projected get.
    DocumentGet {
        id: DocumentId,
        #[serde(default)]
        options: Value,
    },

    /// Check whether a document exists. A missing document is not an error.
    DocumentExists {
        id: DocumentId,
        #[serde(default)]
        options: Value,
    },

    // ==================== Services ====================
    Query {
        statement: String,
        #[serde(default)]
        options: Value,
    },

    AnalyticsQuery {
        statement: String,
        #[serde(default)]
        options: Value,
    },

    /// `query` is the encoded search query JSON.
    SearchQuery {
        index_name: String,
        query: String,
        #[serde(default)]
        options: Value,
    },

    /// `name_space` is 1 for development, 2 for production.
    ViewQuery {
        bucket: String,
        design_document: String,
        view: String,
        name_space: i64,
        #[serde(default)]
        options: Value,
    },

    /// `index` is the index definition mapping.
    SearchIndexUpsert {
        index: Value,
        #[serde(default)]
        options: Value,
    },

    // ==================== Cluster ====================
    BucketOpen { name: String },

    BucketClose { name: String },

    /// Version of the first cluster node; empty when unavailable.
    ClusterVersion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bucket: Option<String>,
    },
}

impl Command {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::DocumentUpsert { .. } => "document_upsert",
            Command::DocumentGet { .. } => "document_get",
            Command::DocumentExists { .. } => "document_exists",
            Command::Query { .. } => "query",
            Command::AnalyticsQuery { .. } => "analytics_query",
            Command::SearchQuery { .. } => "search_query",
            Command::ViewQuery { .. } => "view_query",
            Command::SearchIndexUpsert { .. } => "search_index_upsert",
            Command::BucketOpen { .. } => "bucket_open",
            Command::BucketClose { .. } => "bucket_close",
            Command::ClusterVersion { .. } => "cluster_version",
        }
    }
}

