//! Operator overrides.
//!
//! # Responsibilities
//! - Map free-form `key = "value"` settings onto typed fields
//! - Reject bad values per field without touching the others
//!
//! # Design Decisions
//! - Only keys listed in [`FIELDS`] are understood; others are ignored
//! - Each field has its own parser, so a failure names the key and value
//! - Defaults match what the bundled template expects

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error for a single override that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for '{key}': {reason}")]
pub struct OverrideError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// HAProxy load balancing algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceAlgorithm {
    #[default]
    RoundRobin,
    LeastConn,
    Source,
}

impl FromStr for BalanceAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roundrobin" => Ok(BalanceAlgorithm::RoundRobin),
            "leastconn" => Ok(BalanceAlgorithm::LeastConn),
            "source" => Ok(BalanceAlgorithm::Source),
            other => Err(format!("unknown balance algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for BalanceAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BalanceAlgorithm::RoundRobin => "roundrobin",
            BalanceAlgorithm::LeastConn => "leastconn",
            BalanceAlgorithm::Source => "source",
        };
        f.write_str(name)
    }
}

/// Typed operator settings available to the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overrides {
    /// `host:port` of a syslog server; logging is off when unset.
    pub syslog_endpoint: Option<String>,
    pub max_connections: u32,
    pub balance_algorithm: BalanceAlgorithm,
    pub timeout_connect: String,
    pub timeout_client: String,
    pub timeout_server: String,
    pub timeout_http_request: String,
    pub timeout_keep_alive: String,
    /// Add `X-Forwarded-For` to proxied requests.
    pub forwardfor: bool,
    /// Redirect policy for the default server when it has no locations.
    pub ssl_redirect_default: bool,
}

impl Default for Overrides {
    fn default() -> Self {
        Self {
            syslog_endpoint: None,
            max_connections: 2000,
            balance_algorithm: BalanceAlgorithm::RoundRobin,
            timeout_connect: "5s".to_string(),
            timeout_client: "50s".to_string(),
            timeout_server: "50s".to_string(),
            timeout_http_request: "5s".to_string(),
            timeout_keep_alive: "1m".to_string(),
            forwardfor: true,
            ssl_redirect_default: true,
        }
    }
}

type Setter = fn(&mut Overrides, &str) -> Result<(), String>;

/// A recognised override key and how to apply it.
pub struct OverrideField {
    pub key: &'static str,
    apply: Setter,
}

/// Every key an operator may set.
pub const FIELDS: &[OverrideField] = &[
    OverrideField {
        key: "syslog-endpoint",
        apply: |o, v| {
            o.syslog_endpoint = Some(parse_endpoint(v)?);
            Ok(())
        },
    },
    OverrideField {
        key: "max-connections",
        apply: |o, v| {
            o.max_connections = parse_positive(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "balance-algorithm",
        apply: |o, v| {
            o.balance_algorithm = v.parse()?;
            Ok(())
        },
    },
    OverrideField {
        key: "timeout-connect",
        apply: |o, v| {
            o.timeout_connect = parse_time(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "timeout-client",
        apply: |o, v| {
            o.timeout_client = parse_time(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "timeout-server",
        apply: |o, v| {
            o.timeout_server = parse_time(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "timeout-http-request",
        apply: |o, v| {
            o.timeout_http_request = parse_time(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "timeout-keep-alive",
        apply: |o, v| {
            o.timeout_keep_alive = parse_time(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "forwardfor",
        apply: |o, v| {
            o.forwardfor = parse_bool(v)?;
            Ok(())
        },
    },
    OverrideField {
        key: "ssl-redirect-default",
        apply: |o, v| {
            o.ssl_redirect_default = parse_bool(v)?;
            Ok(())
        },
    },
];

impl Overrides {
    /// Apply every recognised key in `data`.
    ///
    /// Fields whose value fails to parse keep their previous value; the
    /// returned errors describe each rejected key.
    pub fn merge(&mut self, data: &BTreeMap<String, String>) -> Vec<OverrideError> {
        let mut errors = Vec::new();

        for (key, value) in data {
            let Some(field) = FIELDS.iter().find(|f| f.key == key.as_str()) else {
                tracing::debug!(key = %key, "Ignoring unknown override");
                continue;
            };
            if let Err(reason) = (field.apply)(self, value) {
                let err = OverrideError {
                    key: key.clone(),
                    value: value.clone(),
                    reason,
                };
                tracing::warn!("error decoding config: {}", err);
                errors.push(err);
            }
        }

        errors
    }
}

/// Parse a boolean the way operators tend to write one.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" | "on" => Ok(true),
        "" | "0" | "f" | "false" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("'{}' is not a boolean", other)),
    }
}

/// Parse a strictly positive count.
pub fn parse_positive(value: &str) -> Result<u32, String> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Validate an HAProxy time value: digits with an optional unit.
pub fn parse_time(value: &str) -> Result<String, String> {
    let value = value.trim();
    let digits = value.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(format!("'{}' does not start with a number", value));
    }
    match &value[digits..] {
        "" | "us" | "ms" | "s" | "m" | "h" | "d" => Ok(value.to_string()),
        unit => Err(format!("unknown time unit '{}'", unit)),
    }
}

fn parse_endpoint(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("endpoint is empty".to_string());
    }
    if value.chars().any(char::is_whitespace) {
        return Err("endpoint contains whitespace".to_string());
    }
    Ok(value.to_string())
}
