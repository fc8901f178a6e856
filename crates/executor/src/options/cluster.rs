//! Cluster options and credentials.
//!
//! Same rules as request options, with the messages of the connection
//! layer: durations are non-negative integer milliseconds, strings must be
//! non-empty, nested tracer and meter options are mappings.
//!
//! Parameters of the connection string (`?kv_timeout=2500&enable_tls=true`)
//! are applied first; keys of the option bag override them.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use syncbase_core::{
    ClusterOptions, ConnectionString, Credentials, Error, MetricsOptions, Origin, Result,
    TlsVerifyMode, TracingOptions, Value,
};

use tracing::warn;

use super::OptionBag;

type DurationField<T> = (&'static str, fn(&mut T) -> &mut Duration);
type FlagField = (&'static str, fn(&mut ClusterOptions) -> &mut bool);

const DURATIONS: &[DurationField<ClusterOptions>] = &[
    ("analyticsTimeout", |o| &mut o.analytics_timeout),
    ("bootstrapTimeout", |o| &mut o.bootstrap_timeout),
    ("connectTimeout", |o| &mut o.connect_timeout),
    ("dnsSrvTimeout", |o| &mut o.dns_srv_timeout),
    ("keyValueDurableTimeout", |o| &mut o.key_value_durable_timeout),
    ("keyValueTimeout", |o| &mut o.key_value_timeout),
    ("managementTimeout", |o| &mut o.management_timeout),
    ("queryTimeout", |o| &mut o.query_timeout),
    ("resolveTimeout", |o| &mut o.resolve_timeout),
    ("searchTimeout", |o| &mut o.search_timeout),
    ("viewTimeout", |o| &mut o.view_timeout),
    ("configIdleRedialTimeout", |o| &mut o.config_idle_redial_timeout),
    ("configPollFloor", |o| &mut o.config_poll_floor),
    ("configPollInterval", |o| &mut o.config_poll_interval),
    ("idleHttpConnectionTimeout", |o| &mut o.idle_http_connection_timeout),
    ("tcpKeepAliveInterval", |o| &mut o.tcp_keep_alive_interval),
];

const FLAGS: &[FlagField] = &[
    ("enableClustermapNotification", |o| &mut o.enable_clustermap_notification),
    ("enableCompression", |o| &mut o.enable_compression),
    ("enableDnsSrv", |o| &mut o.enable_dns_srv),
    ("enableMetrics", |o| &mut o.enable_metrics),
    ("enableMutationTokens", |o| &mut o.enable_mutation_tokens),
    ("enableTcpKeepAlive", |o| &mut o.enable_tcp_keep_alive),
    ("enableTls", |o| &mut o.enable_tls),
    ("enableTracing", |o| &mut o.enable_tracing),
    ("enableUnorderedExecution", |o| &mut o.enable_unordered_execution),
    ("forceIpv4", |o| &mut o.force_ipv4),
    ("showQueries", |o| &mut o.show_queries),
];

const TRACER_DURATIONS: &[DurationField<TracingOptions>] = &[
    ("orphanedEmitInterval", |t| &mut t.orphaned_emit_interval),
    ("thresholdEmitInterval", |t| &mut t.threshold_emit_interval),
    ("analyticsThreshold", |t| &mut t.analytics_threshold),
    ("eventingThreshold", |t| &mut t.eventing_threshold),
    ("keyValueThreshold", |t| &mut t.key_value_threshold),
    ("managementThreshold", |t| &mut t.management_threshold),
    ("queryThreshold", |t| &mut t.query_threshold),
    ("searchThreshold", |t| &mut t.search_threshold),
    ("viewThreshold", |t| &mut t.view_threshold),
];

const TRACER_OPTIONS: &str = "thresholdLoggingTracerOptions";
const METER_OPTIONS: &str = "loggingMeterOptions";

fn duration(bag: &OptionBag<'_>, key: &str) -> Result<Option<Duration>> {
    match bag.raw(key) {
        None => Ok(None),
        Some(Value::Int(ms)) if *ms >= 0 => Ok(Some(Duration::from_millis(*ms as u64))),
        Some(Value::Int(_)) => Err(Error::invalid_argument(
            key,
            format!("expected duration as a positive number for {}", key),
        )),
        Some(_) => Err(Error::invalid_argument(
            key,
            format!("expected duration as a number for {}", key),
        )),
    }
}

fn number(bag: &OptionBag<'_>, key: &str) -> Result<Option<usize>> {
    match bag.raw(key) {
        None => Ok(None),
        Some(Value::Int(n)) => usize::try_from(*n)
            .map(Some)
            .map_err(|_| Error::invalid_argument(key, format!("expected number for {}", key))),
        Some(_) => Err(Error::invalid_argument(key, format!("expected number for {}", key))),
    }
}

fn flag(bag: &OptionBag<'_>, key: &str) -> Result<Option<bool>> {
    match bag.raw(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(Error::invalid_argument(key, format!("expected boolean for {}", key))),
    }
}

fn text(bag: &OptionBag<'_>, key: &str) -> Result<Option<String>> {
    match bag.raw(key) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Err(Error::invalid_argument(
            key,
            format!("expected non-empty string for {}", key),
        )),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::invalid_argument(key, format!("expected string for {}", key))),
    }
}

fn nested<'a>(bag: &OptionBag<'a>, key: &str, what: &str) -> Result<Option<OptionBag<'a>>> {
    bag.nested(key)
        .map_err(|_| Error::invalid_argument(key, format!("expected object for {} as {} options", key, what)))
}

#[derive(Debug, Clone, Copy)]
enum ParamKind {
    Duration,
    Number,
    Flag,
    Text,
}

/// Connection string parameter, the option key it sets, and its value type.
const CONNECTION_STRING_PARAMS: &[(&str, &str, ParamKind)] = &[
    ("analytics_timeout", "analyticsTimeout", ParamKind::Duration),
    ("bootstrap_timeout", "bootstrapTimeout", ParamKind::Duration),
    ("connect_timeout", "connectTimeout", ParamKind::Duration),
    ("dns_srv_timeout", "dnsSrvTimeout", ParamKind::Duration),
    ("kv_durable_timeout", "keyValueDurableTimeout", ParamKind::Duration),
    ("kv_timeout", "keyValueTimeout", ParamKind::Duration),
    ("management_timeout", "managementTimeout", ParamKind::Duration),
    ("query_timeout", "queryTimeout", ParamKind::Duration),
    ("resolve_timeout", "resolveTimeout", ParamKind::Duration),
    ("search_timeout", "searchTimeout", ParamKind::Duration),
    ("view_timeout", "viewTimeout", ParamKind::Duration),
    ("config_idle_redial_timeout", "configIdleRedialTimeout", ParamKind::Duration),
    ("config_poll_floor", "configPollFloor", ParamKind::Duration),
    ("config_poll_interval", "configPollInterval", ParamKind::Duration),
    ("idle_http_connection_timeout", "idleHttpConnectionTimeout", ParamKind::Duration),
    ("tcp_keep_alive_interval", "tcpKeepAliveInterval", ParamKind::Duration),
    ("max_http_connections", "maxHttpConnections", ParamKind::Number),
    ("enable_clustermap_notification", "enableClustermapNotification", ParamKind::Flag),
    ("enable_compression", "enableCompression", ParamKind::Flag),
    ("enable_dns_srv", "enableDnsSrv", ParamKind::Flag),
    ("enable_metrics", "enableMetrics", ParamKind::Flag),
    ("enable_mutation_tokens", "enableMutationTokens", ParamKind::Flag),
    ("enable_tcp_keep_alive", "enableTcpKeepAlive", ParamKind::Flag),
    ("enable_tls", "enableTls", ParamKind::Flag),
    ("enable_tracing", "enableTracing", ParamKind::Flag),
    ("enable_unordered_execution", "enableUnorderedExecution", ParamKind::Flag),
    ("force_ipv4", "forceIpv4", ParamKind::Flag),
    ("show_queries", "showQueries", ParamKind::Flag),
    ("network", "network", ParamKind::Text),
    ("trust_certificate", "trustCertificate", ParamKind::Text),
    ("user_agent_extra", "userAgentExtra", ParamKind::Text),
    ("tls_verify", "tlsVerify", ParamKind::Text),
];

/// Milliseconds, optionally suffixed with `ms` or `s`.
fn param_millis(raw: &str) -> Option<i64> {
    let (digits, scale) = if let Some(ms) = raw.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = raw.strip_suffix('s') {
        (secs, 1000)
    } else {
        (raw, 1)
    };
    digits.parse::<u32>().ok().map(|n| i64::from(n) * scale)
}

fn param_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Translate connection string parameters into a cluster option bag.
///
/// Unknown parameters are logged and skipped. A known parameter whose value
/// does not parse is `invalid_argument` naming the parameter.
pub fn connection_string_options(params: &BTreeMap<String, String>) -> Result<Value> {
    let mut entries = HashMap::new();
    for (name, raw) in params {
        let Some((_, key, kind)) = CONNECTION_STRING_PARAMS
            .iter()
            .find(|(param, _, _)| *param == name.as_str())
        else {
            warn!(target: "syncbase::executor", param = %name, "Ignoring unknown connection string parameter");
            continue;
        };
        let value = match kind {
            ParamKind::Duration => param_millis(raw).map(Value::Int),
            ParamKind::Number => raw.parse::<u32>().ok().map(|n| Value::Int(i64::from(n))),
            ParamKind::Flag => param_flag(raw).map(Value::Bool),
            ParamKind::Text => Some(Value::from(raw.as_str())),
        }
        .ok_or_else(|| {
            Error::invalid_argument(
                name.as_str(),
                format!("invalid value for connection string parameter {}: \"{}\"", name, raw),
            )
        })?;
        entries.insert(key.to_string(), value);
    }
    Ok(Value::Object(entries))
}

/// Apply every recognized cluster option in `bag` to `options`.
///
/// Keys are visited in a fixed order, so the first reported error does not
/// depend on the bag's iteration order.
pub fn apply_cluster_options(options: &mut ClusterOptions, bag: &OptionBag<'_>) -> Result<()> {
    for (key, field) in DURATIONS {
        if let Some(value) = duration(bag, key)? {
            *field(options) = value;
        }
    }
    if let Some(value) = number(bag, "maxHttpConnections")? {
        options.max_http_connections = value;
    }
    for (key, field) in FLAGS {
        if let Some(value) = flag(bag, key)? {
            *field(options) = value;
        }
    }
    if let Some(value) = text(bag, "network")? {
        options.network = value;
    }
    if let Some(value) = text(bag, "trustCertificate")? {
        options.trust_certificate = Some(value);
    }
    if let Some(value) = text(bag, "userAgentExtra")? {
        options.user_agent_extra = Some(value);
    }
    if let Some(mode) = bag.raw("tlsVerify") {
        let name = mode
            .as_str()
            .ok_or_else(|| Error::invalid_argument("tlsVerify", "expected string for tlsVerify"))?;
        options.tls_verify = TlsVerifyMode::from_name(name).ok_or_else(|| {
            Error::invalid_argument(
                "tlsVerify",
                format!(
                    "expected mode for TLS verification ({}), supported modes are \"peer\" and \"none\"",
                    name
                ),
            )
        })?;
    }
    if let Some(tracer) = nested(bag, TRACER_OPTIONS, "tracer")? {
        apply_tracer_options(&mut options.tracing, &tracer)?;
    }
    if let Some(meter) = nested(bag, METER_OPTIONS, "meter")? {
        apply_meter_options(&mut options.metrics, &meter)?;
    }
    Ok(())
}

fn apply_tracer_options(tracing: &mut TracingOptions, bag: &OptionBag<'_>) -> Result<()> {
    if let Some(value) = number(bag, "orphanedSampleSize")? {
        tracing.orphaned_sample_size = value;
    }
    if let Some(value) = number(bag, "thresholdSampleSize")? {
        tracing.threshold_sample_size = value;
    }
    for (key, field) in TRACER_DURATIONS {
        if let Some(value) = duration(bag, key)? {
            *field(tracing) = value;
        }
    }
    Ok(())
}

fn apply_meter_options(metrics: &mut MetricsOptions, bag: &OptionBag<'_>) -> Result<()> {
    if let Some(value) = duration(bag, "emitInterval")? {
        metrics.emit_interval = value;
    }
    Ok(())
}

fn required_string(bag: &OptionBag<'_>, key: &str, what: &str) -> Result<String> {
    bag.raw(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            Error::invalid_argument(key, format!("expected {} to be a string in the authenticator", what))
        })
}

/// Read the `authenticator` mapping of `bag`.
pub fn extract_credentials(bag: &OptionBag<'_>) -> Result<Credentials> {
    let auth = bag
        .nested("authenticator")
        .map_err(|_| Error::invalid_argument("authenticator", "expected authenticator to be an object"))?
        .ok_or_else(|| Error::invalid_argument("authenticator", "missing authenticator"))?;
    let kind = auth
        .raw("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument("type", "unexpected type of the authenticator"))?;
    match kind {
        "password" => {
            let username = required_string(&auth, "username", "username")?;
            let password = required_string(&auth, "password", "password")?;
            let mut credentials = Credentials::password(username, password);
            if let Some(mechanisms) = auth.raw("allowedSaslMechanisms") {
                let mechanisms = mechanisms.as_array().ok_or_else(|| {
                    Error::invalid_argument(
                        "allowedSaslMechanisms",
                        "expected allowedSaslMechanisms to be an array in the authenticator",
                    )
                })?;
                if let Credentials::Password {
                    allowed_sasl_mechanisms,
                    ..
                } = &mut credentials
                {
                    *allowed_sasl_mechanisms = mechanisms
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                }
            }
            Ok(credentials)
        }
        "certificate" => {
            let certificate_path = required_string(&auth, "certificatePath", "certificate path")?;
            let key_path = required_string(&auth, "keyPath", "key path")?;
            Ok(Credentials::certificate(certificate_path, key_path))
        }
        other => Err(Error::invalid_argument(
            "type",
            format!("unknown type of the authenticator: {}", other),
        )),
    }
}

/// Parse, decode and assemble the immutable connection configuration.
pub fn build_origin(connection_string: &str, options: &Value) -> Result<Origin> {
    let connstr = ConnectionString::parse(connection_string)?;
    let bag = OptionBag::new(options)
        .map_err(|_| Error::invalid_options("expected object for cluster options"))?;
    let mut cluster_options = ClusterOptions::default();
    let params = connection_string_options(&connstr.params)?;
    apply_cluster_options(&mut cluster_options, &OptionBag::new(&params)?)?;
    apply_cluster_options(&mut cluster_options, &bag)?;
    let credentials = extract_credentials(&bag)?;
    Ok(Origin::new(credentials, connstr, cluster_options))
}
