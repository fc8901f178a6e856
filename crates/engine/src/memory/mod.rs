//! In-memory cluster engine
//!
//! [`MemoryCluster`] implements [`ClusterEngine`] without a network. Calls
//! are queued as jobs and processed in submission order by whichever thread
//! runs [`ClusterEngine::run`]. Documents live in a concurrent map per
//! collection; query, analytics, search, view and index management answer
//! through scripted handlers.
//!
//! Request timeouts come from the request or from the cluster options given
//! to `open`. A configured latency longer than the timeout makes the request
//! fail with a timeout after the timeout elapses.
//!
//! `close` completes after the configured close delay. Jobs still queued
//! behind it, and jobs submitted afterwards, complete with
//! `request_canceled`.

mod kv;
mod services;

pub use kv::PARTITION_COUNT;
pub use services::ServiceHandler;

use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use syncbase_core::{ClusterOptions, Credentials, DocumentId, ErrorCode, Origin, RetryReason};

use crate::context::{HttpContext, KeyValueContext};
use crate::engine::{ClusterEngine, Handler};
use crate::request::*;
use crate::response::*;

use kv::DocumentStore;
use services::{failed_response, ServiceHandlers};

/// Back-off between retries of a request that keeps failing.
const RETRY_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_VERSION: &str = "7.1.0";
const DEFAULT_NODE: &str = "127.0.0.1";

enum Job {
    Open {
        origin: Origin,
        handler: Handler<Option<ErrorCode>>,
    },
    OpenBucket {
        name: String,
        handler: Handler<Option<ErrorCode>>,
    },
    CloseBucket {
        name: String,
        handler: Handler<Option<ErrorCode>>,
    },
    Close {
        handler: Handler<()>,
    },
    Execute {
        request: Request,
        handler: Handler<Response>,
    },
}

#[derive(Default)]
struct JobQueue {
    jobs: VecDeque<Job>,
    stopping: bool,
}

/// Network-free cluster engine.
pub struct MemoryCluster {
    queue: Mutex<JobQueue>,
    work_ready: Condvar,
    users: BTreeMap<String, String>,
    buckets: BTreeSet<String>,
    open_buckets: Mutex<BTreeSet<String>>,
    options: RwLock<Option<ClusterOptions>>,
    store: DocumentStore,
    services: ServiceHandlers,
    version: String,
    version_requires_bucket: bool,
    latency: Duration,
    close_delay: Duration,
    node: String,
}

impl MemoryCluster {
    /// Cluster that accepts any credentials and has no buckets.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> MemoryClusterBuilder {
        MemoryClusterBuilder::default()
    }

    pub fn is_bucket_open(&self, name: &str) -> bool {
        self.open_buckets.lock().contains(name)
    }

    /// Documents stored across all buckets.
    pub fn document_count(&self) -> usize {
        self.store.len()
    }

    /// Whether `close` has been processed.
    pub fn is_closed(&self) -> bool {
        self.queue.lock().stopping
    }

    fn submit(&self, job: Job) {
        let mut queue = self.queue.lock();
        if queue.stopping {
            drop(queue);
            self.cancel(job);
            return;
        }
        queue.jobs.push_back(job);
        self.work_ready.notify_one();
    }

    fn cancel(&self, job: Job) {
        match job {
            Job::Open { handler, .. }
            | Job::OpenBucket { handler, .. }
            | Job::CloseBucket { handler, .. } => handler(Some(ErrorCode::RequestCanceled)),
            Job::Close { handler } => handler(()),
            Job::Execute { request, handler } => {
                debug!(target: "syncbase::memory", operation = request.name(), "Request canceled");
                handler(failed_response(
                    &request,
                    ErrorCode::RequestCanceled,
                    0,
                    BTreeSet::new(),
                ))
            }
        }
    }

    fn process(&self, job: Job) {
        match job {
            Job::Open { origin, handler } => handler(self.authenticate(origin)),
            Job::OpenBucket { name, handler } => {
                if !self.buckets.contains(&name) {
                    warn!(target: "syncbase::memory", bucket = %name, "Bucket does not exist");
                    handler(Some(ErrorCode::BucketNotFound));
                    return;
                }
                self.open_buckets.lock().insert(name);
                handler(None);
            }
            Job::CloseBucket { name, handler } => {
                self.open_buckets.lock().remove(&name);
                handler(None);
            }
            Job::Close { handler } => {
                if !self.close_delay.is_zero() {
                    thread::sleep(self.close_delay);
                }
                self.open_buckets.lock().clear();
                let orphans: Vec<Job> = {
                    let mut queue = self.queue.lock();
                    queue.stopping = true;
                    queue.jobs.drain(..).collect()
                };
                info!(target: "syncbase::memory", canceled = orphans.len(), "Cluster closed");
                handler(());
                for job in orphans {
                    self.cancel(job);
                }
            }
            Job::Execute { request, handler } => self.process_request(request, handler),
        }
    }

    fn authenticate(&self, origin: Origin) -> Option<ErrorCode> {
        if let Credentials::Password {
            username, password, ..
        } = origin.credentials()
        {
            if !self.users.is_empty() && self.users.get(username) != Some(password) {
                warn!(target: "syncbase::memory", username = %username, "Authentication failed");
                return Some(ErrorCode::AuthenticationFailure);
            }
        }
        info!(target: "syncbase::memory", nodes = origin.nodes().len(), "Cluster bootstrapped");
        *self.options.write() = Some(origin.options().clone());
        None
    }

    fn process_request(&self, mut request: Request, handler: Handler<Response>) {
        assign_client_context_id(&mut request);
        let options = self.options.read().clone().unwrap_or_default();
        let (timeout, reason) = request_timeout(&request, &options);
        if self.latency > timeout {
            thread::sleep(timeout);
            let attempts = (timeout.as_millis() / RETRY_INTERVAL.as_millis()).max(1) as usize;
            debug!(
                target: "syncbase::memory",
                operation = request.name(),
                timeout_ms = timeout.as_millis() as u64,
                attempts,
                "Request timed out"
            );
            handler(failed_response(
                &request,
                ErrorCode::UnambiguousTimeout,
                attempts,
                [reason].into_iter().collect(),
            ));
            return;
        }
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        handler(self.dispatch(request, &options));
    }

    fn dispatch(&self, request: Request, options: &ClusterOptions) -> Response {
        match request {
            Request::Upsert(req) => Response::Upsert(match self.unopened_bucket(&req.id) {
                Some(ctx) => UpsertResponse {
                    ctx,
                    ..Default::default()
                },
                None => self.store.upsert(&req, options.enable_mutation_tokens),
            }),
            Request::Get(req) => Response::Get(match self.unopened_bucket(&req.id) {
                Some(ctx) => GetResponse {
                    ctx,
                    ..Default::default()
                },
                None => self.store.get(&req),
            }),
            Request::GetProjected(req) => Response::GetProjected(match self.unopened_bucket(&req.id) {
                Some(ctx) => GetProjectedResponse {
                    ctx,
                    ..Default::default()
                },
                None => self.store.get_projected(&req),
            }),
            Request::Exists(req) => Response::Exists(match self.unopened_bucket(&req.id) {
                Some(ctx) => ExistsResponse {
                    ctx,
                    ..Default::default()
                },
                None => self.store.exists(&req),
            }),
            Request::Query(req) => Response::Query(self.services.query(&req)),
            Request::Analytics(req) => Response::Analytics(self.services.analytics(&req)),
            Request::Search(req) => Response::Search(self.services.search(&req)),
            Request::View(req) => Response::View(self.services.view(&req)),
            Request::SearchIndexUpsert(req) => {
                Response::SearchIndexUpsert(self.services.search_index_upsert(&req))
            }
            Request::ClusterDescribe(req) => Response::ClusterDescribe(self.describe(&req)),
        }
    }

    fn unopened_bucket(&self, id: &DocumentId) -> Option<KeyValueContext> {
        if self.is_bucket_open(&id.bucket) {
            return None;
        }
        let mut ctx = KeyValueContext::new(id.clone());
        ctx.ec = Some(ErrorCode::BucketNotFound);
        Some(ctx)
    }

    fn describe(&self, request: &ClusterDescribeRequest) -> ClusterDescribeResponse {
        let mut ctx = HttpContext::new("GET", "/pools/default/terseClusterInfo");
        ctx.client_context_id = request.client_context_id.clone().unwrap_or_default();
        if self.version_requires_bucket && self.open_buckets.lock().is_empty() {
            ctx.ec = Some(ErrorCode::ServiceNotAvailable);
            return ClusterDescribeResponse {
                ctx,
                ..Default::default()
            };
        }
        ctx.http_status = 200;
        ctx.last_dispatched_to = Some(format!("{}:8091", self.node));
        ClusterDescribeResponse {
            ctx,
            nodes: vec![ClusterNode {
                hostname: self.node.clone(),
                version: self.version.clone(),
            }],
        }
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterEngine for MemoryCluster {
    fn run(&self) {
        debug!(target: "syncbase::memory", "Event loop running");
        loop {
            let job = {
                let mut queue = self.queue.lock();
                loop {
                    if let Some(job) = queue.jobs.pop_front() {
                        break job;
                    }
                    if queue.stopping {
                        debug!(target: "syncbase::memory", "Event loop exited");
                        return;
                    }
                    self.work_ready.wait(&mut queue);
                }
            };
            self.process(job);
        }
    }

    fn open(&self, origin: Origin, handler: Handler<Option<ErrorCode>>) {
        self.submit(Job::Open { origin, handler });
    }

    fn open_bucket(&self, name: &str, handler: Handler<Option<ErrorCode>>) {
        self.submit(Job::OpenBucket {
            name: name.to_string(),
            handler,
        });
    }

    fn close_bucket(&self, name: &str, handler: Handler<Option<ErrorCode>>) {
        self.submit(Job::CloseBucket {
            name: name.to_string(),
            handler,
        });
    }

    fn close(&self, handler: Handler<()>) {
        self.submit(Job::Close { handler });
    }

    fn execute(&self, request: Request, handler: Handler<Response>) {
        self.submit(Job::Execute { request, handler });
    }
}

fn assign_client_context_id(request: &mut Request) {
    let slot = match request {
        Request::Query(req) => &mut req.client_context_id,
        Request::Analytics(req) => &mut req.client_context_id,
        Request::Search(req) => &mut req.client_context_id,
        Request::View(req) => &mut req.client_context_id,
        Request::SearchIndexUpsert(req) => &mut req.client_context_id,
        Request::ClusterDescribe(req) => &mut req.client_context_id,
        Request::Upsert(_) | Request::Get(_) | Request::GetProjected(_) | Request::Exists(_) => {
            return
        }
    };
    if slot.is_none() {
        *slot = Some(Uuid::new_v4().to_string());
    }
}

/// Effective timeout of `request` and the reason it would be retried for.
fn request_timeout(request: &Request, options: &ClusterOptions) -> (Duration, RetryReason) {
    let http = RetryReason::ServiceResponseCodeIndicated;
    let kv = RetryReason::KvTemporaryFailure;
    match request {
        Request::Upsert(req) => {
            let default = if req.durability.level.is_none() {
                options.key_value_timeout
            } else {
                options.key_value_durable_timeout
            };
            (req.timeout.or(req.durability.timeout).unwrap_or(default), kv)
        }
        Request::Get(req) => (req.timeout.unwrap_or(options.key_value_timeout), kv),
        Request::GetProjected(req) => (req.timeout.unwrap_or(options.key_value_timeout), kv),
        Request::Exists(req) => (req.timeout.unwrap_or(options.key_value_timeout), kv),
        Request::Query(req) => (req.timeout.unwrap_or(options.query_timeout), http),
        Request::Analytics(req) => (req.timeout.unwrap_or(options.analytics_timeout), http),
        Request::Search(req) => (req.timeout.unwrap_or(options.search_timeout), http),
        Request::View(req) => (req.timeout.unwrap_or(options.view_timeout), http),
        Request::SearchIndexUpsert(req) => (req.timeout.unwrap_or(options.management_timeout), http),
        Request::ClusterDescribe(req) => (req.timeout.unwrap_or(options.management_timeout), http),
    }
}

/// Builder for [`MemoryCluster`].
#[derive(Default)]
pub struct MemoryClusterBuilder {
    users: BTreeMap<String, String>,
    buckets: BTreeSet<String>,
    version: Option<String>,
    version_requires_bucket: bool,
    latency: Duration,
    close_delay: Duration,
    node: Option<String>,
    services: ServiceHandlers,
}

impl MemoryClusterBuilder {
    /// Accept `username` with `password`. With no users configured any
    /// password credentials are accepted.
    pub fn user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    pub fn bucket(mut self, name: impl Into<String>) -> Self {
        self.buckets.insert(name.into());
        self
    }

    /// Server version reported by every node.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Answer cluster describe with `service_not_available` until a bucket
    /// is open, like servers that only serve it through a bucket session.
    pub fn version_requires_bucket(mut self, requires: bool) -> Self {
        self.version_requires_bucket = requires;
        self
    }

    /// Time every request spends in flight.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Time `close` takes before completing.
    pub fn close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn node(mut self, hostname: impl Into<String>) -> Self {
        self.node = Some(hostname.into());
        self
    }

    pub fn query_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&QueryRequest) -> QueryResponse + Send + Sync + 'static,
    {
        self.services.query = Some(std::sync::Arc::new(handler));
        self
    }

    pub fn analytics_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&AnalyticsRequest) -> AnalyticsResponse + Send + Sync + 'static,
    {
        self.services.analytics = Some(std::sync::Arc::new(handler));
        self
    }

    pub fn search_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SearchRequest) -> SearchResponse + Send + Sync + 'static,
    {
        self.services.search = Some(std::sync::Arc::new(handler));
        self
    }

    pub fn view_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ViewRequest) -> ViewResponse + Send + Sync + 'static,
    {
        self.services.view = Some(std::sync::Arc::new(handler));
        self
    }

    pub fn search_index_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SearchIndexUpsertRequest) -> SearchIndexUpsertResponse + Send + Sync + 'static,
    {
        self.services.search_index = Some(std::sync::Arc::new(handler));
        self
    }

    pub fn build(self) -> MemoryCluster {
        let node = self.node.unwrap_or_else(|| DEFAULT_NODE.to_string());
        MemoryCluster {
            queue: Mutex::new(JobQueue::default()),
            work_ready: Condvar::new(),
            users: self.users,
            buckets: self.buckets,
            open_buckets: Mutex::new(BTreeSet::new()),
            options: RwLock::new(None),
            store: DocumentStore::new(format!("{}:11210", node)),
            services: self.services,
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            version_requires_bucket: self.version_requires_bucket,
            latency: self.latency,
            close_delay: self.close_delay,
            node,
        }
    }
}
