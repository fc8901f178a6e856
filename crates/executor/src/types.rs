//! Typed results of the key-value operations.
//!
//! Query, analytics, search, view and index results are returned as
//! [`Value`] trees (see [`crate::convert`]); their shape is owned by the
//! service that produced them.

use serde::{Deserialize, Serialize};
use syncbase_core::{hex_u64, MutationToken, Value};

/// Result of `document_upsert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub cas: u64,
    /// `None` when the engine returned no usable token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_token: Option<MutationToken>,
}

impl MutationResult {
    pub fn new(cas: u64, token: MutationToken) -> Self {
        Self {
            cas,
            mutation_token: Some(token).filter(MutationToken::is_valid),
        }
    }

    /// `{cas, mutationToken?}`
    pub fn to_value(&self) -> Value {
        let mut entries = vec![("cas", Value::from(hex_u64(self.cas)))];
        if let Some(token) = &self.mutation_token {
            entries.push(("mutationToken", token.to_value()));
        }
        Value::object(entries)
    }
}

/// Result of `document_get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub cas: u64,
    pub flags: u32,
    pub value: Vec<u8>,
    /// Only set when the expiry was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u32>,
}

impl DocumentResult {
    /// `{cas, flags, value, expiry?}`
    pub fn to_value(&self) -> Value {
        let mut entries = vec![
            ("cas", Value::from(hex_u64(self.cas))),
            ("flags", Value::from(self.flags)),
            ("value", Value::Bytes(self.value.clone())),
        ];
        if let Some(expiry) = self.expiry {
            entries.push(("expiry", Value::from(expiry)));
        }
        Value::object(entries)
    }
}

/// Result of `document_exists`. A missing document is `exists == false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistsResult {
    pub exists: bool,
    pub deleted: bool,
    pub cas: u64,
    pub flags: u32,
    pub datatype: u8,
    pub expiry: u32,
    pub sequence_number: u64,
}

impl ExistsResult {
    /// `{exists, deleted, cas, flags, datatype, expiry, sequenceNumber}`
    pub fn to_value(&self) -> Value {
        Value::object([
            ("exists", Value::from(self.exists)),
            ("deleted", Value::from(self.deleted)),
            ("cas", Value::from(hex_u64(self.cas))),
            ("flags", Value::from(self.flags)),
            ("datatype", Value::from(u32::from(self.datatype))),
            ("expiry", Value::from(self.expiry)),
            ("sequenceNumber", Value::from(hex_u64(self.sequence_number))),
        ])
    }
}
