//! Operation handlers.
//!
//! Each handler decodes the option bag into a fresh request, bridges it
//! through the connection and maps the response:
//!
//! | Module | Operations |
//! |--------|------------|
//! | `kv` | document upsert, get, exists |
//! | `query` | query, analytics query |
//! | `search` | search query, search index upsert |
//! | `view` | view query |
//! | `cluster` | bucket open/close, cluster version |

pub mod cluster;
pub mod kv;
pub mod query;
pub mod search;
pub mod view;
