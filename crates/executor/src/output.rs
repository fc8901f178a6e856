//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant; see the table on
//! [`Command`](crate::Command).

use serde::{Deserialize, Serialize};
use syncbase_core::Value;

use crate::types::*;

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// No return value (bucket open/close)
    Unit,

    /// Cluster version string, empty when unavailable
    Version(String),

    Mutation(MutationResult),

    Document(DocumentResult),

    Exists(ExistsResult),

    // ==================== Service results ====================
    Query(Value),

    Analytics(Value),

    Search(Value),

    View(Value),

    SearchIndex(Value),
}

impl Output {
    /// Render as the caller-facing value.
    pub fn into_value(self) -> Value {
        match self {
            Output::Unit => Value::Null,
            Output::Version(version) => Value::String(version),
            Output::Mutation(result) => result.to_value(),
            Output::Document(result) => result.to_value(),
            Output::Exists(result) => result.to_value(),
            Output::Query(value)
            | Output::Analytics(value)
            | Output::Search(value)
            | Output::View(value)
            | Output::SearchIndex(value) => value,
        }
    }
}
