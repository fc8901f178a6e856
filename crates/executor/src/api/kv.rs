//! Key-value operations.

use syncbase_core::{DocumentId, Value};

use super::{unexpected, Cluster};
use crate::types::{DocumentResult, ExistsResult, MutationResult};
use crate::{Command, Output, Result};

impl Cluster {
    /// Store `value` under `id`, replacing any previous version.
    ///
    /// Recognized options: `timeoutMilliseconds`, `durabilityLevel`,
    /// `durabilityTimeoutSeconds`, `preserveExpiry`, `expiry`.
    pub fn upsert(
        &self,
        id: &DocumentId,
        value: impl Into<Vec<u8>>,
        flags: u32,
        options: &Value,
    ) -> Result<MutationResult> {
        match self.execute(Command::DocumentUpsert {
            id: id.clone(),
            value: value.into(),
            flags,
            options: options.clone(),
        })? {
            Output::Mutation(result) => Ok(result),
            _ => Err(unexpected("document_upsert")),
        }
    }

    /// Fetch the document under `id`.
    ///
    /// Recognized options: `timeoutMilliseconds`, `withExpiry`, `projections`.
    pub fn get(&self, id: &DocumentId, options: &Value) -> Result<DocumentResult> {
        match self.execute(Command::DocumentGet {
            id: id.clone(),
            options: options.clone(),
        })? {
            Output::Document(result) => Ok(result),
            _ => Err(unexpected("document_get")),
        }
    }

    /// Check whether `id` exists. A missing document is `exists == false`,
    /// not an error.
    pub fn exists(&self, id: &DocumentId, options: &Value) -> Result<ExistsResult> {
        match self.execute(Command::DocumentExists {
            id: id.clone(),
            options: options.clone(),
        })? {
            Output::Exists(result) => Ok(result),
            _ => Err(unexpected("document_exists")),
        }
    }
}
