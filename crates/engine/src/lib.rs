//! Cluster engine boundary and the blocking bridge over it
//!
//! This crate holds everything between the option decoder and the cluster:
//! - Engine: the asynchronous [`ClusterEngine`] trait and typed requests
//! - Bridge: one blocking call per engine call ([`bridge::call`])
//! - Connection: worker thread, open/close lifecycle and ordered teardown
//! - Diagnostics: raw engine contexts turned into [`syncbase_core::ErrorContext`]
//! - Memory: [`MemoryCluster`], a network-free engine

#![warn(clippy::all)]

pub mod bridge;
pub mod connection;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod memory;
pub mod request;
pub mod response;

pub use bridge::Outcome;
pub use connection::{Connection, ConnectionState, WORKER_THREAD_NAME};
pub use engine::{ClusterEngine, EngineRequest, Handler};
pub use memory::{MemoryCluster, MemoryClusterBuilder, ServiceHandler};
pub use response::EngineResponse;
