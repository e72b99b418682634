//! Configuration schema definitions.
//!
//! This module defines the settings file of the controller. All types derive
//! Serde traits for deserialization from TOML, and every section defaults so
//! an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration for the controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Template used to render the HAProxy configuration.
    pub template: TemplateConfig,

    /// Where the rendered configuration is written.
    pub output: OutputConfig,

    /// Ingress snapshot source.
    pub snapshot: SnapshotConfig,

    /// Credential file handling.
    pub credentials: CredentialsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Free-form operator overrides (`syslog-endpoint`, `timeout-client`, ...).
    #[serde(deserialize_with = "string_map")]
    pub overrides: BTreeMap<String, String>,
}

/// Template location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TemplateConfig {
    /// Path to the template file.
    pub path: PathBuf,

    /// Name the template is registered under.
    pub name: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/haproxy/template/haproxy.tmpl"),
            name: "haproxy.tmpl".to_string(),
        }
    }
}

/// Rendered output location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// HAProxy configuration file.
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/haproxy/haproxy.cfg"),
        }
    }
}

/// Ingress snapshot source.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SnapshotConfig {
    /// JSON snapshot written by the ingress host.
    pub path: PathBuf,

    /// Re-render whenever the snapshot changes.
    pub watch: bool,

    /// Quiet period before re-rendering after a change, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/haproxy/ingress.json"),
            watch: false,
            debounce_ms: 500,
        }
    }
}

/// Credential file handling.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Abort the render pass when a credential file cannot be read.
    pub strict: bool,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9101".to_string(),
        }
    }
}

// Operators write `max-connections = 4096` as readily as `"4096"`; keep
// scalars as their textual form and let the override parsers judge them.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, toml::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(<D::Error as serde::de::Error>::custom(format!(
                        "override '{}' must be a scalar, got {}",
                        key,
                        other.type_str()
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}
