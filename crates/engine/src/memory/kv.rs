//! Document store of the in-memory cluster.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use syncbase_core::{DocumentId, ErrorCode, MutationToken};

use crate::context::KeyValueContext;
use crate::request::{ExistsRequest, GetProjectedRequest, GetRequest, UpsertRequest};
use crate::response::{ExistsResponse, GetProjectedResponse, GetResponse, UpsertResponse};

/// Partitions per bucket.
pub const PARTITION_COUNT: u16 = 1024;

/// Status the data service answers for a missing key.
const STATUS_KEY_NOT_FOUND: u16 = 0x01;

/// Datatype bit for JSON values.
const DATATYPE_JSON: u8 = 0x01;

#[derive(Debug, Clone)]
struct StoredDocument {
    value: Vec<u8>,
    flags: u32,
    cas: u64,
    expiry: u32,
    sequence_number: u64,
}

pub(crate) struct DocumentStore {
    documents: DashMap<DocumentId, StoredDocument>,
    sequences: DashMap<(String, u16), u64>,
    partition_uuids: DashMap<String, u64>,
    cas_clock: AtomicU64,
    opaque: AtomicU32,
    node: String,
}

impl DocumentStore {
    pub(crate) fn new(node: impl Into<String>) -> Self {
        Self {
            documents: DashMap::new(),
            sequences: DashMap::new(),
            partition_uuids: DashMap::new(),
            cas_clock: AtomicU64::new(0x1600_0000_0000_0000),
            opaque: AtomicU32::new(0),
            node: node.into(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    /// Context of a request that reached the data service.
    fn dispatched(&self, id: &DocumentId) -> KeyValueContext {
        let mut ctx = KeyValueContext::new(id.clone());
        ctx.opaque = self.opaque.fetch_add(1, Ordering::Relaxed) + 1;
        ctx.last_dispatched_to = Some(self.node.clone());
        ctx
    }

    fn not_found(&self, ctx: &mut KeyValueContext) {
        ctx.ec = Some(ErrorCode::DocumentNotFound);
        ctx.status_code = Some(STATUS_KEY_NOT_FOUND);
    }

    fn next_cas(&self) -> u64 {
        self.cas_clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn partition_uuid(&self, bucket: &str) -> u64 {
        *self
            .partition_uuids
            .entry(bucket.to_string())
            .or_insert_with(|| uuid::Uuid::new_v4().as_u64_pair().0 | 1)
    }

    fn next_sequence(&self, bucket: &str, partition: u16) -> u64 {
        let mut seq = self
            .sequences
            .entry((bucket.to_string(), partition))
            .or_insert(0);
        *seq += 1;
        *seq
    }

    pub(crate) fn upsert(&self, request: &UpsertRequest, mutation_tokens: bool) -> UpsertResponse {
        let mut ctx = self.dispatched(&request.id);
        let partition = partition_for(&request.id.key);
        let cas = self.next_cas();
        let sequence_number = self.next_sequence(&request.id.bucket, partition);

        let mut expiry = request.expiry;
        if request.preserve_expiry {
            if let Some(existing) = self.documents.get(&request.id) {
                expiry = existing.expiry;
            }
        }
        self.documents.insert(
            request.id.clone(),
            StoredDocument {
                value: request.value.clone(),
                flags: request.flags,
                cas,
                expiry,
                sequence_number,
            },
        );
        ctx.cas = cas;

        let token = if mutation_tokens {
            MutationToken {
                bucket_name: request.id.bucket.clone(),
                partition_id: partition,
                partition_uuid: self.partition_uuid(&request.id.bucket),
                sequence_number,
            }
        } else {
            MutationToken::default()
        };
        UpsertResponse { ctx, cas, token }
    }

    pub(crate) fn get(&self, request: &GetRequest) -> GetResponse {
        let mut ctx = self.dispatched(&request.id);
        match self.documents.get(&request.id) {
            Some(doc) => {
                ctx.cas = doc.cas;
                GetResponse {
                    ctx,
                    value: doc.value.clone(),
                    cas: doc.cas,
                    flags: doc.flags,
                }
            }
            None => {
                self.not_found(&mut ctx);
                GetResponse {
                    ctx,
                    ..Default::default()
                }
            }
        }
    }

    pub(crate) fn get_projected(&self, request: &GetProjectedRequest) -> GetProjectedResponse {
        let mut ctx = self.dispatched(&request.id);
        let Some(doc) = self.documents.get(&request.id) else {
            self.not_found(&mut ctx);
            return GetProjectedResponse {
                ctx,
                ..Default::default()
            };
        };
        ctx.cas = doc.cas;
        let value = if request.projections.is_empty() {
            doc.value.clone()
        } else {
            match project(&doc.value, &request.projections) {
                Some(value) => value,
                None => {
                    ctx.ec = Some(ErrorCode::ParsingFailure);
                    return GetProjectedResponse {
                        ctx,
                        ..Default::default()
                    };
                }
            }
        };
        GetProjectedResponse {
            ctx,
            value,
            cas: doc.cas,
            flags: doc.flags,
            expiry: request.with_expiry.then_some(doc.expiry),
        }
    }

    pub(crate) fn exists(&self, request: &ExistsRequest) -> ExistsResponse {
        let mut ctx = self.dispatched(&request.id);
        match self.documents.get(&request.id) {
            Some(doc) => {
                ctx.cas = doc.cas;
                let datatype = if serde_json::from_slice::<serde_json::Value>(&doc.value).is_ok() {
                    DATATYPE_JSON
                } else {
                    0
                };
                ExistsResponse {
                    ctx,
                    found: true,
                    deleted: false,
                    cas: doc.cas,
                    flags: doc.flags,
                    datatype,
                    expiry: doc.expiry,
                    sequence_number: doc.sequence_number,
                }
            }
            None => {
                self.not_found(&mut ctx);
                ExistsResponse {
                    ctx,
                    ..Default::default()
                }
            }
        }
    }
}

/// FNV-1a over the key, folded onto the partition range.
pub(crate) fn partition_for(key: &str) -> u16 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in key.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    (hash % u32::from(PARTITION_COUNT)) as u16
}

/// Copy the requested dotted paths of a JSON object into a new object.
///
/// Paths missing from the document are skipped. Returns `None` when the
/// document is not a JSON object.
fn project(value: &[u8], projections: &[String]) -> Option<Vec<u8>> {
    let source: serde_json::Value = serde_json::from_slice(value).ok()?;
    if !source.is_object() {
        return None;
    }
    let mut target = serde_json::Value::Object(serde_json::Map::new());
    for path in projections {
        let mut found = Some(&source);
        for segment in path.split('.') {
            found = found.and_then(|node| node.get(segment));
        }
        if let Some(found) = found {
            insert_path(&mut target, path, found.clone());
        }
    }
    serde_json::to_vec(&target).ok()
}

fn insert_path(target: &mut serde_json::Value, path: &str, value: serde_json::Value) {
    let segments: Vec<&str> = path.split('.').collect();
    let mut node = target;
    for (i, segment) in segments.iter().enumerate() {
        let Some(map) = node.as_object_mut() else {
            return;
        };
        if i + 1 == segments.len() {
            map.insert(segment.to_string(), value);
            return;
        }
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    }
}
