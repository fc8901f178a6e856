//! Connection profiles stored as TOML.
//!
//! A profile holds the connection string, the authenticator and the cluster
//! options of one connection. Its tables are converted to an option bag and
//! validated by the same decoder as a programmatic bag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use syncbase_core::{Error, Origin, Result, Value};

use super::cluster::build_origin;

/// Saved connection configuration.
///
/// ```toml
/// connection_string = "couchbase://127.0.0.1"
///
/// [authenticator]
/// type = "password"
/// username = "Administrator"
/// password = "password"
///
/// [options]
/// keyValueTimeout = 2500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub connection_string: String,
    #[serde(default)]
    pub authenticator: toml::Table,
    #[serde(default)]
    pub options: toml::Table,
}

impl ConnectionProfile {
    /// Returns a commented template profile.
    pub fn default_toml() -> &'static str {
        r#"# Syncbase connection profile
#
# Seed nodes. "couchbases://" turns TLS on.
connection_string = "couchbase://127.0.0.1"

# Exactly one authenticator.
#   type = "password"    needs username and password
#   type = "certificate" needs certificatePath and keyPath
[authenticator]
type = "password"
username = "Administrator"
password = "password"
# allowedSaslMechanisms = ["SCRAM-SHA512", "SCRAM-SHA256"]

# Cluster options. Durations are in milliseconds.
[options]
# keyValueTimeout = 2500
# queryTimeout = 75000
# enableMutationTokens = true
# tlsVerify = "peer"
#
# [options.thresholdLoggingTracerOptions]
# keyValueThreshold = 500
"#
    }

    /// Parse and validate a profile.
    ///
    /// # Errors
    ///
    /// `parsing_failure` for malformed TOML or connection strings,
    /// `invalid_argument` for options that fail validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let profile: ConnectionProfile = toml::from_str(content)
            .map_err(|e| Error::parsing_failure(format!("failed to parse profile: {}", e)))?;
        profile.origin()?;
        Ok(profile)
    }

    /// Read, parse and validate a profile file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_argument(
                "profile",
                format!("failed to read profile '{}': {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the template profile unless `path` already exists.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::invalid_argument(
                    "profile",
                    format!("failed to write profile '{}': {}", path.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// The cluster option bag, with the authenticator under `authenticator`.
    pub fn to_options(&self) -> Value {
        let mut entries: HashMap<String, Value> = self
            .options
            .iter()
            .map(|(key, value)| (key.clone(), from_toml(value)))
            .collect();
        if !self.authenticator.is_empty() {
            entries.insert("authenticator".to_string(), table_to_value(&self.authenticator));
        }
        Value::Object(entries)
    }

    pub fn origin(&self) -> Result<Origin> {
        build_origin(&self.connection_string, &self.to_options())
    }
}

fn table_to_value(table: &toml::Table) -> Value {
    Value::Object(
        table
            .iter()
            .map(|(key, value)| (key.clone(), from_toml(value)))
            .collect(),
    )
}

fn from_toml(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(from_toml).collect()),
        toml::Value::Table(table) => table_to_value(table),
    }
}
