//! Retry reasons recorded by the cluster engine.
//!
//! Every time the engine retries an operation internally it records why.
//! The reasons travel back on the failing response and are rendered to
//! their stable textual names when the error context is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback literal for reason codes this binding does not know about.
pub const UNEXPECTED_RETRY_REASON: &str = "unexpected";

/// Cause of an internal engine retry.
///
/// `Other` carries engine codes added after this enumeration was written; it
/// renders as [`UNEXPECTED_RETRY_REASON`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    DoNotRetry,
    SocketNotAvailable,
    ServiceNotAvailable,
    NodeNotAvailable,
    KvNotMyVbucket,
    KvCollectionOutdated,
    KvErrorMapRetryIndicated,
    KvLocked,
    KvTemporaryFailure,
    KvSyncWriteInProgress,
    KvSyncWriteReCommitInProgress,
    ServiceResponseCodeIndicated,
    SocketClosedWhileInFlight,
    CircuitBreakerOpen,
    QueryPreparedStatementFailure,
    QueryIndexNotFound,
    AnalyticsTemporaryFailure,
    SearchTooManyRequests,
    ViewsTemporaryFailure,
    ViewsNoActivePartition,
    Unknown,
    Other(u16),
}

impl RetryReason {
    /// Stable textual name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::DoNotRetry => "do_not_retry",
            RetryReason::SocketNotAvailable => "socket_not_available",
            RetryReason::ServiceNotAvailable => "service_not_available",
            RetryReason::NodeNotAvailable => "node_not_available",
            RetryReason::KvNotMyVbucket => "kv_not_my_vbucket",
            RetryReason::KvCollectionOutdated => "kv_collection_outdated",
            RetryReason::KvErrorMapRetryIndicated => "kv_error_map_retry_indicated",
            RetryReason::KvLocked => "kv_locked",
            RetryReason::KvTemporaryFailure => "kv_temporary_failure",
            RetryReason::KvSyncWriteInProgress => "kv_sync_write_in_progress",
            RetryReason::KvSyncWriteReCommitInProgress => "kv_sync_write_re_commit_in_progress",
            RetryReason::ServiceResponseCodeIndicated => "service_response_code_indicated",
            RetryReason::SocketClosedWhileInFlight => "socket_closed_while_in_flight",
            RetryReason::CircuitBreakerOpen => "circuit_breaker_open",
            RetryReason::QueryPreparedStatementFailure => "query_prepared_statement_failure",
            RetryReason::QueryIndexNotFound => "query_index_not_found",
            RetryReason::AnalyticsTemporaryFailure => "analytics_temporary_failure",
            RetryReason::SearchTooManyRequests => "search_too_many_requests",
            RetryReason::ViewsTemporaryFailure => "views_temporary_failure",
            RetryReason::ViewsNoActivePartition => "views_no_active_partition",
            RetryReason::Unknown => "unknown",
            RetryReason::Other(_) => UNEXPECTED_RETRY_REASON,
        }
    }
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
