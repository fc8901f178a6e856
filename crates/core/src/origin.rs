//! Connection configuration
//!
//! An [`Origin`] is built once per connection from a connection string, a set
//! of [`Credentials`] and the tuning knobs in [`ClusterOptions`]. It is
//! immutable afterward and owned by the connection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::connstr::{ConnectionString, SeedNode};

/// SASL mechanisms offered when the caller does not restrict them.
pub const DEFAULT_SASL_MECHANISMS: &[&str] = &["SCRAM-SHA512", "SCRAM-SHA256", "SCRAM-SHA1"];

/// Exactly one authenticator shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    Password {
        username: String,
        password: String,
        allowed_sasl_mechanisms: Vec<String>,
    },
    Certificate {
        certificate_path: String,
        key_path: String,
    },
}

impl Credentials {
    /// Password credentials with the default mechanism list.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            username: username.into(),
            password: password.into(),
            allowed_sasl_mechanisms: DEFAULT_SASL_MECHANISMS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn certificate(certificate_path: impl Into<String>, key_path: impl Into<String>) -> Self {
        Credentials::Certificate {
            certificate_path: certificate_path.into(),
            key_path: key_path.into(),
        }
    }

    /// User name for password credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Password { username, .. } => Some(username),
            Credentials::Certificate { .. } => None,
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password {
                username,
                allowed_sasl_mechanisms,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("allowed_sasl_mechanisms", allowed_sasl_mechanisms)
                .finish(),
            Credentials::Certificate {
                certificate_path,
                key_path,
            } => f
                .debug_struct("Certificate")
                .field("certificate_path", certificate_path)
                .field("key_path", key_path)
                .finish(),
        }
    }
}

/// Server certificate verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerifyMode {
    #[default]
    Peer,
    None,
}

impl TlsVerifyMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "peer" => Some(TlsVerifyMode::Peer),
            "none" => Some(TlsVerifyMode::None),
            _ => None,
        }
    }
}

/// Threshold logging tracer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingOptions {
    pub orphaned_emit_interval: Duration,
    pub orphaned_sample_size: usize,
    pub threshold_emit_interval: Duration,
    pub threshold_sample_size: usize,
    pub key_value_threshold: Duration,
    pub query_threshold: Duration,
    pub view_threshold: Duration,
    pub search_threshold: Duration,
    pub analytics_threshold: Duration,
    pub management_threshold: Duration,
    pub eventing_threshold: Duration,
}

impl Default for TracingOptions {
    fn default() -> Self {
        Self {
            orphaned_emit_interval: Duration::from_secs(10),
            orphaned_sample_size: 64,
            threshold_emit_interval: Duration::from_secs(10),
            threshold_sample_size: 64,
            key_value_threshold: Duration::from_millis(500),
            query_threshold: Duration::from_secs(1),
            view_threshold: Duration::from_secs(1),
            search_threshold: Duration::from_secs(1),
            analytics_threshold: Duration::from_secs(1),
            management_threshold: Duration::from_secs(1),
            eventing_threshold: Duration::from_secs(1),
        }
    }
}

/// Logging meter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsOptions {
    pub emit_interval: Duration,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            emit_interval: Duration::from_secs(600),
        }
    }
}

/// Tuning knobs handed to the cluster engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    pub bootstrap_timeout: Duration,
    pub connect_timeout: Duration,
    pub resolve_timeout: Duration,
    pub dns_srv_timeout: Duration,
    pub key_value_timeout: Duration,
    pub key_value_durable_timeout: Duration,
    pub view_timeout: Duration,
    pub query_timeout: Duration,
    pub analytics_timeout: Duration,
    pub search_timeout: Duration,
    pub management_timeout: Duration,
    pub config_poll_interval: Duration,
    pub config_poll_floor: Duration,
    pub config_idle_redial_timeout: Duration,
    pub idle_http_connection_timeout: Duration,
    pub tcp_keep_alive_interval: Duration,
    pub max_http_connections: usize,
    pub enable_tls: bool,
    pub enable_mutation_tokens: bool,
    pub enable_tcp_keep_alive: bool,
    pub enable_dns_srv: bool,
    pub enable_compression: bool,
    pub enable_tracing: bool,
    pub enable_metrics: bool,
    pub enable_unordered_execution: bool,
    pub enable_clustermap_notification: bool,
    pub force_ipv4: bool,
    pub show_queries: bool,
    pub network: String,
    pub trust_certificate: Option<String>,
    pub user_agent_extra: Option<String>,
    pub tls_verify: TlsVerifyMode,
    pub tracing: TracingOptions,
    pub metrics: MetricsOptions,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            bootstrap_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
            resolve_timeout: Duration::from_secs(2),
            dns_srv_timeout: Duration::from_millis(500),
            key_value_timeout: Duration::from_millis(2500),
            key_value_durable_timeout: Duration::from_secs(10),
            view_timeout: Duration::from_secs(75),
            query_timeout: Duration::from_secs(75),
            analytics_timeout: Duration::from_secs(75),
            search_timeout: Duration::from_secs(75),
            management_timeout: Duration::from_secs(75),
            config_poll_interval: Duration::from_millis(2500),
            config_poll_floor: Duration::from_millis(50),
            config_idle_redial_timeout: Duration::from_secs(300),
            idle_http_connection_timeout: Duration::from_millis(4500),
            tcp_keep_alive_interval: Duration::from_secs(60),
            max_http_connections: 0,
            enable_tls: false,
            enable_mutation_tokens: true,
            enable_tcp_keep_alive: true,
            enable_dns_srv: true,
            enable_compression: true,
            enable_tracing: true,
            enable_metrics: true,
            enable_unordered_execution: true,
            enable_clustermap_notification: false,
            force_ipv4: false,
            show_queries: false,
            network: "auto".to_string(),
            trust_certificate: None,
            user_agent_extra: None,
            tls_verify: TlsVerifyMode::Peer,
            tracing: TracingOptions::default(),
            metrics: MetricsOptions::default(),
        }
    }
}

/// Immutable configuration of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    credentials: Credentials,
    connection_string: ConnectionString,
    options: ClusterOptions,
}

impl Origin {
    /// A `couchbases://` connection string forces TLS on.
    pub fn new(
        credentials: Credentials,
        connection_string: ConnectionString,
        mut options: ClusterOptions,
    ) -> Self {
        if connection_string.scheme.uses_tls() {
            options.enable_tls = true;
        }
        Self {
            credentials,
            connection_string,
            options,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn connection_string(&self) -> &ConnectionString {
        &self.connection_string
    }

    pub fn nodes(&self) -> &[SeedNode] {
        &self.connection_string.nodes
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }
}
