//! High-level typed wrapper for the Executor.
//!
//! [`Cluster`] wraps the [`Executor`] and the [`Command`]/[`Output`] enums
//! with one typed method per operation. [`create_connection`] is the
//! lower-level entry point returning a bare [`Connection`].
//!
//! # Example
//!
//! ```text
//! use syncbase_executor::{Cluster, DocumentId, MemoryCluster, Value};
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
//! cluster.upsert(&id, br#"{"name":"40-Mile Air"}"#, 0, &Value::Null)?;
//! assert!(cluster.exists(&id, &Value::Null)?.exists);
//! ```

mod cluster;
mod kv;
mod query;

use std::path::Path;
use std::sync::Arc;

use syncbase_core::{Error, ErrorCode, Value};
use syncbase_engine::{ClusterEngine, Connection};
use tracing::info;

use crate::options::{build_origin, ConnectionProfile};
use crate::{Command, Executor, Output, Result};

/// Validate the options, build the origin and open a connection.
///
/// The connection string is parsed, cluster options and credentials are
/// decoded from `options`, then the connection is started and opened.
///
/// # Errors
///
/// `parsing_failure` for a malformed connection string, `invalid_argument`
/// for invalid options, and the engine's code when opening fails.
pub fn create_connection(
    connection_string: &str,
    options: &Value,
    engine: Arc<dyn ClusterEngine>,
) -> Result<Connection> {
    let origin = build_origin(connection_string, options)?;
    let connection = Connection::new(origin, engine);
    connection.start()?;
    connection.open()?;
    info!(target: "syncbase::executor", connection = %connection.id(), "Connection ready");
    Ok(connection)
}

/// Typed operations over one connection.
#[derive(Debug, Clone)]
pub struct Cluster {
    executor: Executor,
}

impl Cluster {
    /// Connect with a programmatic option bag. See [`create_connection`].
    pub fn connect(
        connection_string: &str,
        options: &Value,
        engine: Arc<dyn ClusterEngine>,
    ) -> Result<Self> {
        let connection = create_connection(connection_string, options, engine)?;
        Ok(Self::from_connection(Arc::new(connection)))
    }

    /// Connect with the settings of a loaded profile.
    pub fn connect_profile(profile: &ConnectionProfile, engine: Arc<dyn ClusterEngine>) -> Result<Self> {
        Self::connect(&profile.connection_string, &profile.to_options(), engine)
    }

    /// Load the profile at `path` and connect with it.
    pub fn open_profile<P: AsRef<Path>>(path: P, engine: Arc<dyn ClusterEngine>) -> Result<Self> {
        let profile = ConnectionProfile::from_file(path.as_ref())?;
        Self::connect_profile(&profile, engine)
    }

    pub fn from_connection(connection: Arc<Connection>) -> Self {
        Self {
            executor: Executor::new(connection),
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn connection(&self) -> &Arc<Connection> {
        self.executor.connection()
    }

    /// Close the connection now instead of when the last handle drops.
    pub fn shutdown(&self) {
        self.connection().shutdown();
    }

    fn execute(&self, cmd: Command) -> Result<Output> {
        self.executor.execute(cmd)
    }
}

fn unexpected(operation: &str) -> Error {
    Error::operation(
        ErrorCode::InternalServerFailure,
        format!("unexpected output for {}", operation),
    )
}
