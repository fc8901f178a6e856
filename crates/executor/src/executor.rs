//! The Executor - single entry point to a connection.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! operation handlers and returns their outputs.

use std::sync::Arc;

use syncbase_engine::Connection;
use tracing::debug;

use crate::handlers::{cluster, kv, query, search, view};
use crate::{Command, Output, Result};

/// The command executor.
///
/// Holds a shared [`Connection`] and nothing else; every command builds its
/// own request, so concurrent `execute` calls do not share state.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use syncbase_executor::{Command, Executor, Value};
///
/// let executor = Executor::new(connection);
/// let output = executor.execute(Command::Query {
///     statement: "SELECT 1".into(),
///     options: Value::Null,
/// })?;
/// ```
#[derive(Debug, Clone)]
pub struct Executor {
    connection: Arc<Connection>,
}

impl Executor {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let operation = cmd.name();
        let result = self.dispatch(cmd);
        if let Err(err) = &result {
            debug!(
                target: "syncbase::executor",
                operation,
                code = %err.code(),
                validation = err.is_validation(),
                "Command failed"
            );
        }
        result
    }

    /// Execute commands in order, collecting every result.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    fn dispatch(&self, cmd: Command) -> Result<Output> {
        let conn = self.connection.as_ref();
        match cmd {
            Command::DocumentUpsert {
                id,
                value,
                flags,
                options,
            } => kv::document_upsert(conn, id, value, flags, &options),
            Command::DocumentGet { id, options } => kv::document_get(conn, id, &options),
            Command::DocumentExists { id, options } => kv::document_exists(conn, id, &options),
            Command::Query { statement, options } => query::query(conn, statement, &options),
            Command::AnalyticsQuery { statement, options } => {
                query::analytics_query(conn, statement, &options)
            }
            Command::SearchQuery {
                index_name,
                query,
                options,
            } => search::search_query(conn, index_name, query, &options),
            Command::ViewQuery {
                bucket,
                design_document,
                view,
                name_space,
                options,
            } => view::view_query(conn, bucket, design_document, view, name_space, &options),
            Command::SearchIndexUpsert { index, options } => {
                search::search_index_upsert(conn, &index, &options)
            }
            Command::BucketOpen { name } => cluster::bucket_open(conn, &name),
            Command::BucketClose { name } => cluster::bucket_close(conn, &name),
            Command::ClusterVersion { bucket } => cluster::cluster_version(conn, bucket.as_deref()),
        }
    }
}
