//! Connection string parsing
//!
//! Accepted form:
//!
//! ```text
//! [couchbase://|couchbases://]host[:port][,host[:port]...][/bucket][?key=value&...]
//! ```
//!
//! IPv6 literals are written in brackets (`[::1]:11210`). Hosts may be
//! separated by `,` or `;`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Transport selected by the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    Couchbase,
    Couchbases,
}

impl Scheme {
    pub fn uses_tls(&self) -> bool {
        matches!(self, Scheme::Couchbases)
    }
}

/// One bootstrap node from the connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedNode {
    pub host: String,
    pub port: Option<u16>,
}

/// Parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionString {
    pub input: String,
    pub scheme: Scheme,
    pub nodes: Vec<SeedNode>,
    pub default_bucket: Option<String>,
    pub params: BTreeMap<String, String>,
}

impl ConnectionString {
    /// Parse a connection string, failing with `ParsingFailure`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (scheme, rest) = match trimmed.split_once("://") {
            Some(("couchbase", rest)) => (Scheme::Couchbase, rest),
            Some(("couchbases", rest)) => (Scheme::Couchbases, rest),
            Some((other, _)) => {
                return Err(Error::parsing_failure(format!(
                    "unsupported connection string scheme \"{}\"",
                    other
                )))
            }
            None => (Scheme::Couchbase, trimmed),
        };

        let (rest, query) = match rest.split_once('?') {
            Some((head, query)) => (head, Some(query)),
            None => (rest, None),
        };
        let (hosts, bucket) = match rest.split_once('/') {
            Some((hosts, bucket)) if !bucket.is_empty() => (hosts, Some(bucket.to_string())),
            Some((hosts, _)) => (hosts, None),
            None => (rest, None),
        };

        let nodes = hosts
            .split([',', ';'])
            .filter(|h| !h.trim().is_empty())
            .map(|h| parse_node(h.trim()))
            .collect::<Result<Vec<_>>>()?;
        if nodes.is_empty() {
            return Err(Error::parsing_failure(format!(
                "connection string \"{}\" does not contain any hosts",
                input
            )));
        }

        let mut params = BTreeMap::new();
        if let Some(query) = query {
            for pair in query.split('&').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                if key.is_empty() {
                    return Err(Error::parsing_failure(format!(
                        "empty parameter name in connection string \"{}\"",
                        input
                    )));
                }
                params.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Self {
            input: input.to_string(),
            scheme,
            nodes,
            default_bucket: bucket,
            params,
        })
    }
}

fn parse_node(entry: &str) -> Result<SeedNode> {
    let (host, port) = if let Some(stripped) = entry.strip_prefix('[') {
        let (host, tail) = stripped.split_once(']').ok_or_else(|| {
            Error::parsing_failure(format!("unterminated IPv6 address \"{}\"", entry))
        })?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(port),
            None if tail.is_empty() => None,
            None => {
                return Err(Error::parsing_failure(format!(
                    "unexpected characters after IPv6 address \"{}\"",
                    entry
                )))
            }
        };
        (host, port)
    } else {
        match entry.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (entry, None),
        }
    };
    if host.is_empty() {
        return Err(Error::parsing_failure(format!("empty host in \"{}\"", entry)));
    }
    let port = port
        .map(|p| {
            p.parse::<u16>()
                .map_err(|_| Error::parsing_failure(format!("invalid port \"{}\" for host {}", p, host)))
        })
        .transpose()?;
    Ok(SeedNode {
        host: host.to_string(),
        port,
    })
}
