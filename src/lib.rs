//! Syncbase - blocking access to an asynchronous database cluster
//!
//! Syncbase turns a callback-driven cluster engine into plain blocking
//! calls: every public operation validates its option bag, builds a typed
//! request, waits for the engine's answer and returns either a result or an
//! error carrying the structured context of the subsystem that failed.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use syncbase::{Cluster, DocumentId, MemoryCluster, Value};
//!
//! let engine = Arc::new(MemoryCluster::builder().bucket("travel").build());
//! let options = Value::object([(
//!     "authenticator",
//!     Value::object([("type", "password"), ("username", "u"), ("password", "p")]),
//! )]);
//! let cluster = Cluster::connect("couchbase://127.0.0.1", &options, engine)?;
//! cluster.bucket_open("travel")?;
//!
//! let id = DocumentId::in_default_collection("travel", "airline_10");
//! cluster.upsert(&id, br#"{"name":"40-Mile Air"}"#.to_vec(), 0, &Value::Null)?;
//! let doc = cluster.get(&id, &Value::object([("withExpiry", true)]))?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which dispatches [`Command`]s.
//! [`Cluster`] wraps it with one typed method per operation. The engine
//! boundary ([`ClusterEngine`]) and the connection lifecycle live in
//! `syncbase-engine`; values, errors and configuration in `syncbase-core`.

pub use syncbase_executor::*;
