//! Typed requests submitted to the cluster engine
//!
//! One record per operation kind. Identity fields are set by the caller;
//! everything else starts at its default and is filled by the option decoder.
//! A `None` timeout means "use the service default from the cluster options".

use std::collections::BTreeMap;
use std::time::Duration;

use syncbase_core::{DocumentId, DurabilityLevel, MutationToken};

/// Durability requirement of a mutation.
///
/// `timeout` is only meaningful when `level` is not [`DurabilityLevel::None`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durability {
    pub level: DurabilityLevel,
    pub timeout: Option<Duration>,
}

impl Durability {
    pub fn new(level: DurabilityLevel, timeout: Option<Duration>) -> Self {
        let timeout = if level.is_none() { None } else { timeout };
        Self { level, timeout }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertRequest {
    pub id: DocumentId,
    pub value: Vec<u8>,
    pub flags: u32,
    pub expiry: u32,
    pub preserve_expiry: bool,
    pub durability: Durability,
    pub timeout: Option<Duration>,
}

impl UpsertRequest {
    pub fn new(id: DocumentId, value: Vec<u8>) -> Self {
        Self {
            id,
            value,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRequest {
    pub id: DocumentId,
    pub timeout: Option<Duration>,
}

/// Get that returns a subset of fields and/or the expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetProjectedRequest {
    pub id: DocumentId,
    pub projections: Vec<String>,
    pub with_expiry: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistsRequest {
    pub id: DocumentId,
    pub timeout: Option<Duration>,
}

/// Scan consistency of query and analytics requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanConsistency {
    NotBounded,
    RequestPlus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryProfile {
    Off,
    Phases,
    Timings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub statement: String,
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
    pub durability: Durability,
    pub scan_consistency: Option<ScanConsistency>,
    pub scan_cap: Option<u64>,
    pub pipeline_cap: Option<u64>,
    pub pipeline_batch: Option<u64>,
    pub max_parallelism: Option<u64>,
    pub profile: Option<QueryProfile>,
    pub readonly: bool,
    pub flex_index: bool,
    pub adhoc: bool,
    pub metrics: bool,
    pub preserve_expiry: bool,
    pub positional_parameters: Vec<String>,
    pub named_parameters: BTreeMap<String, String>,
    pub raw: BTreeMap<String, String>,
    pub mutation_state: Vec<MutationToken>,
    pub scope_name: Option<String>,
    pub bucket_name: Option<String>,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            statement: String::new(),
            client_context_id: None,
            timeout: None,
            durability: Durability::default(),
            scan_consistency: None,
            scan_cap: None,
            pipeline_cap: None,
            pipeline_batch: None,
            max_parallelism: None,
            profile: None,
            readonly: false,
            flex_index: false,
            adhoc: true,
            metrics: false,
            preserve_expiry: false,
            positional_parameters: Vec::new(),
            named_parameters: BTreeMap::new(),
            raw: BTreeMap::new(),
            mutation_state: Vec::new(),
            scope_name: None,
            bucket_name: None,
        }
    }
}

impl QueryRequest {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsRequest {
    pub statement: String,
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
    pub scan_consistency: Option<ScanConsistency>,
    pub readonly: bool,
    pub priority: bool,
    pub positional_parameters: Vec<String>,
    pub named_parameters: BTreeMap<String, String>,
    pub raw: BTreeMap<String, String>,
    pub scope_name: Option<String>,
    pub bucket_name: Option<String>,
}

impl AnalyticsRequest {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    Ansi,
    Html,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub index_name: String,
    /// Query body, JSON encoded.
    pub query: String,
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub explain: bool,
    pub disable_scoring: bool,
    pub include_locations: bool,
    pub highlight_style: Option<HighlightStyle>,
    pub highlight_fields: Vec<String>,
    pub fields: Vec<String>,
    pub collections: Vec<String>,
    pub sort_specs: Vec<String>,
    pub mutation_state: Vec<MutationToken>,
    pub raw: BTreeMap<String, String>,
    pub facets: BTreeMap<String, String>,
}

impl SearchRequest {
    pub fn new(index_name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            query: query.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DesignDocumentNamespace {
    Development,
    #[default]
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScanConsistency {
    NotBounded,
    RequestPlus,
    UpdateAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRequest {
    pub bucket_name: String,
    pub document_name: String,
    pub view_name: String,
    pub name_space: DesignDocumentNamespace,
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
    pub consistency: Option<ViewScanConsistency>,
    /// JSON-encoded keys.
    pub keys: Vec<String>,
    pub order: Option<ViewSortOrder>,
    pub reduce: Option<bool>,
    pub group: Option<bool>,
    pub group_level: Option<u32>,
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub key: Option<String>,
    pub start_key: Option<String>,
    pub end_key: Option<String>,
    pub start_key_doc_id: Option<String>,
    pub end_key_doc_id: Option<String>,
    pub inclusive_end: Option<bool>,
    pub debug: bool,
}

impl ViewRequest {
    pub fn new(
        bucket_name: impl Into<String>,
        document_name: impl Into<String>,
        view_name: impl Into<String>,
        name_space: DesignDocumentNamespace,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            document_name: document_name.into(),
            view_name: view_name.into(),
            name_space,
            ..Default::default()
        }
    }

    /// Query-string parameters the view service receives for this request.
    pub fn query_string(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.debug {
            out.push("debug=true".to_string());
        }
        if let Some(consistency) = self.consistency {
            let stale = match consistency {
                ViewScanConsistency::NotBounded => "ok",
                ViewScanConsistency::RequestPlus => "false",
                ViewScanConsistency::UpdateAfter => "update_after",
            };
            out.push(format!("stale={}", stale));
        }
        if let Some(order) = self.order {
            out.push(format!(
                "descending={}",
                matches!(order, ViewSortOrder::Descending)
            ));
        }
        let flags = [
            ("reduce", self.reduce),
            ("group", self.group),
            ("inclusive_end", self.inclusive_end),
        ];
        for (name, flag) in flags {
            if let Some(flag) = flag {
                out.push(format!("{}={}", name, flag));
            }
        }
        let numbers = [
            ("group_level", self.group_level),
            ("limit", self.limit),
            ("skip", self.skip),
        ];
        for (name, number) in numbers {
            if let Some(number) = number {
                out.push(format!("{}={}", name, number));
            }
        }
        let strings = [
            ("key", &self.key),
            ("start_key", &self.start_key),
            ("end_key", &self.end_key),
            ("start_key_doc_id", &self.start_key_doc_id),
            ("end_key_doc_id", &self.end_key_doc_id),
        ];
        for (name, text) in strings {
            if let Some(text) = text {
                out.push(format!("{}={}", name, text));
            }
        }
        out
    }
}

/// Full-text index definition. `params` and `source_params` are JSON encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndex {
    pub name: String,
    pub type_name: String,
    pub uuid: String,
    pub params: String,
    pub source_uuid: String,
    pub source_name: String,
    pub source_type: String,
    pub source_params: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIndexUpsertRequest {
    pub index: SearchIndex,
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
}

/// Asks the cluster for its node list, used to probe the server version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterDescribeRequest {
    pub client_context_id: Option<String>,
    pub timeout: Option<Duration>,
}

/// Any request the engine executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Upsert(UpsertRequest),
    Get(GetRequest),
    GetProjected(GetProjectedRequest),
    Exists(ExistsRequest),
    Query(QueryRequest),
    Analytics(AnalyticsRequest),
    Search(SearchRequest),
    View(ViewRequest),
    SearchIndexUpsert(SearchIndexUpsertRequest),
    ClusterDescribe(ClusterDescribeRequest),
}

impl Request {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Upsert(_) => "upsert",
            Request::Get(_) => "get",
            Request::GetProjected(_) => "get_projected",
            Request::Exists(_) => "exists",
            Request::Query(_) => "query",
            Request::Analytics(_) => "analytics",
            Request::Search(_) => "search",
            Request::View(_) => "view",
            Request::SearchIndexUpsert(_) => "search_index_upsert",
            Request::ClusterDescribe(_) => "cluster_describe",
        }
    }
}
