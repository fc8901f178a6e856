//! Executor Layer Tests
//!
//! Tests for the syncbase executor against the in-memory cluster:
//! - key-value operations and their result shapes
//! - option validation before anything reaches the engine
//! - query, analytics, search and view services
//! - connection lifecycle, profiles and the cluster-version probe
//! - concurrent callers and engine-side timeouts

mod common;

mod adversarial;
mod kv_operations;
mod lifecycle;
mod option_validation;
mod services;
