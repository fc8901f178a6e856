//! Connection lifecycle
//!
//! A [`Connection`] owns one engine handle and the worker thread running the
//! engine's event loop.
//!
//! ```text
//! Created --start--> Running --open--> Open --shutdown--> Closing --> Closed
//! ```
//!
//! Bucket open/close calls are independent of these states; the caller
//! tracks which buckets it opened.
//!
//! Teardown runs in a fixed order: request engine close, wait for the close
//! completion, join the worker, release the engine handle. The worker is
//! never joined while the close is still pending, and the handle is never
//! released while the worker can still touch it.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use syncbase_core::{Error, ErrorCode, Origin, Result};

use crate::bridge::{self, Outcome};
use crate::engine::{ClusterEngine, EngineRequest};
use crate::request::ClusterDescribeRequest;
use crate::response::EngineResponse;

/// Name of the thread that drives the engine's event loop.
pub const WORKER_THREAD_NAME: &str = "syncbase-io";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Engine handle exists, event loop not running.
    Created,
    /// Worker thread is running the event loop.
    Running,
    /// Authenticated against the cluster.
    Open,
    /// Shutdown in progress.
    Closing,
    /// Worker joined and engine handle released. Terminal.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Created => "created",
            ConnectionState::Running => "running",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One engine handle, one worker thread and the immutable [`Origin`].
pub struct Connection {
    id: Uuid,
    origin: Origin,
    engine: RwLock<Option<Arc<dyn ClusterEngine>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    state: Mutex<ConnectionState>,
    // Serializes shutdown so a second caller waits for the first to finish.
    shutdown_lock: Mutex<()>,
}

impl Connection {
    pub fn new(origin: Origin, engine: Arc<dyn ClusterEngine>) -> Self {
        let id = Uuid::new_v4();
        debug!(target: "syncbase::connection", connection = %id, "Connection created");
        Self {
            id,
            origin,
            engine: RwLock::new(Some(engine)),
            worker: Mutex::new(None),
            state: Mutex::new(ConnectionState::Created),
            shutdown_lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Spawn the worker running the engine's event loop.
    ///
    /// Must be called once, before `open`.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != ConnectionState::Created {
            return Err(Error::operation(
                ErrorCode::UnsupportedOperation,
                format!("cannot start a connection in state {}", *state),
            ));
        }
        let engine = self.engine()?;
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || engine.run())
            .map_err(|e| {
                Error::operation(
                    ErrorCode::InternalServerFailure,
                    format!("failed to spawn engine worker: {}", e),
                )
            })?;
        *self.worker.lock() = Some(handle);
        *state = ConnectionState::Running;
        info!(target: "syncbase::connection", connection = %self.id, "Engine event loop started");
        Ok(())
    }

    /// Authenticate against the cluster. A failure leaves the connection
    /// usable for another attempt.
    pub fn open(&self) -> Result<()> {
        let engine = self.running_engine()?;
        let origin = self.origin.clone();
        debug!(target: "syncbase::bridge", operation = "open", "Submitting engine call");
        if let Some(ec) = bridge::call(|handler| engine.open(origin, handler)) {
            debug!(target: "syncbase::bridge", operation = "open", code = %ec, "Engine call failed");
            return Err(Error::operation(
                ec,
                format!("unable to open cluster: {}, {}", ec.value(), ec),
            ));
        }
        let mut state = self.state.lock();
        if *state == ConnectionState::Running {
            *state = ConnectionState::Open;
        }
        info!(target: "syncbase::connection", connection = %self.id, nodes = self.origin.nodes().len(), "Cluster opened");
        Ok(())
    }

    pub fn bucket_open(&self, name: &str) -> Result<()> {
        let engine = self.running_engine()?;
        debug!(target: "syncbase::bridge", operation = "bucket_open", bucket = name, "Submitting engine call");
        match bridge::call(|handler| engine.open_bucket(name, handler)) {
            None => {
                info!(target: "syncbase::connection", connection = %self.id, bucket = name, "Bucket opened");
                Ok(())
            }
            Some(ec) => Err(Error::operation(
                ec,
                format!("unable to open bucket \"{}\": {}, {}", name, ec.value(), ec),
            )),
        }
    }

    pub fn bucket_close(&self, name: &str) -> Result<()> {
        let engine = self.running_engine()?;
        debug!(target: "syncbase::bridge", operation = "bucket_close", bucket = name, "Submitting engine call");
        match bridge::call(|handler| engine.close_bucket(name, handler)) {
            None => {
                info!(target: "syncbase::connection", connection = %self.id, bucket = name, "Bucket closed");
                Ok(())
            }
            Some(ec) => Err(Error::operation(
                ec,
                format!("unable to close bucket \"{}\": {}, {}", name, ec.value(), ec),
            )),
        }
    }

    /// Bridge one request through the engine.
    ///
    /// The outer error covers calls that never reached a typed response
    /// (closed connection, mismatched reply). Engine failures come back in
    /// [`Outcome::error`] next to the response they were built from.
    pub fn execute<R: EngineRequest>(&self, request: R) -> Result<Outcome<R::Response>> {
        let engine = self.running_engine()?;
        debug!(target: "syncbase::bridge", operation = R::OPERATION, "Submitting engine call");
        let reply = bridge::call(|handler| engine.execute(request.into_request(), handler));
        let response = R::from_response(reply).ok_or_else(|| {
            Error::operation(
                ErrorCode::InternalServerFailure,
                format!("engine answered {} with a mismatched response", R::OPERATION),
            )
        })?;
        let error = response.failure(R::OPERATION);
        match &error {
            Some(err) => {
                debug!(target: "syncbase::bridge", operation = R::OPERATION, code = %err.code(), "Engine call failed")
            }
            None => debug!(target: "syncbase::bridge", operation = R::OPERATION, "Engine call completed"),
        }
        Ok(Outcome { response, error })
    }

    /// Version of the first cluster node, or an empty string.
    ///
    /// When the cluster reports `service_not_available` and a bucket name is
    /// given, the bucket is opened and the probe retried once. Without a
    /// `bucket` argument the bucket of the connection string is used. Every
    /// failure degrades to an empty string.
    pub fn cluster_version(&self, bucket: Option<&str>) -> String {
        let bucket = bucket.or(self.origin.connection_string().default_bucket.as_deref());
        self.probe_version(bucket)
    }

    fn probe_version(&self, bucket: Option<&str>) -> String {
        let outcome = match self.execute(ClusterDescribeRequest::default()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(target: "syncbase::connection", error = %err, "Cluster version probe failed");
                return String::new();
            }
        };
        match (&outcome.error, bucket) {
            (None, _) => outcome
                .response
                .nodes
                .first()
                .map(|node| node.version.clone())
                .unwrap_or_default(),
            (Some(err), Some(bucket))
                if err.code() == ErrorCode::ServiceNotAvailable && !bucket.is_empty() =>
            {
                if let Err(err) = self.bucket_open(bucket) {
                    warn!(target: "syncbase::connection", bucket, error = %err, "Cluster version fallback failed to open bucket");
                    return String::new();
                }
                self.probe_version(None)
            }
            (Some(err), _) => {
                warn!(target: "syncbase::connection", error = %err, "Cluster version unavailable");
                String::new()
            }
        }
    }

    /// Close the engine, join the worker and release the engine handle.
    ///
    /// Idempotent. Concurrent callers block until the first one finishes.
    pub fn shutdown(&self) {
        let _serial = self.shutdown_lock.lock();
        let started = {
            let mut state = self.state.lock();
            let started = match *state {
                ConnectionState::Closed => return,
                ConnectionState::Created => false,
                _ => true,
            };
            *state = ConnectionState::Closing;
            started
        };

        let engine = self.engine.read().clone();
        if let (true, Some(engine)) = (started, engine) {
            info!(target: "syncbase::connection", connection = %self.id, "Closing cluster");
            bridge::call(|handler| engine.close(handler));
            debug!(target: "syncbase::connection", connection = %self.id, "Engine close completed");
            if let Some(handle) = self.worker.lock().take() {
                if handle.join().is_err() {
                    warn!(target: "syncbase::connection", connection = %self.id, "Engine worker panicked");
                }
            }
        }

        self.engine.write().take();
        *self.state.lock() = ConnectionState::Closed;
        info!(target: "syncbase::connection", connection = %self.id, "Connection closed");
    }

    fn running_engine(&self) -> Result<Arc<dyn ClusterEngine>> {
        if self.state() == ConnectionState::Created {
            return Err(Error::operation(
                ErrorCode::UnsupportedOperation,
                "connection has not been started",
            ));
        }
        self.engine()
    }

    fn engine(&self) -> Result<Arc<dyn ClusterEngine>> {
        self.engine.read().clone().ok_or_else(|| {
            Error::operation(ErrorCode::ClusterClosed, "connection has been closed")
        })
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("nodes", &self.origin.nodes())
            .finish()
    }
}
