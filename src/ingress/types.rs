//! Ingress snapshot definitions.
//!
//! These mirror the load-balancer-agnostic model handed over by the ingress
//! host. Backends, L4 services and passthrough backends are carried through
//! to the template untouched; servers and locations feed the HAProxy
//! builders.

use serde::{Deserialize, Serialize};

/// Hostname the ingress host uses for the catch-all server.
pub const DEFAULT_SERVER_HOSTNAME: &str = "_";

/// Auth scheme name that the userlist builder skips.
pub const DIGEST_AUTH: &str = "digest";

/// Desired routing state for one render pass.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    /// Upstream pools.
    pub backends: Vec<Backend>,

    /// Virtual servers, in host order.
    pub servers: Vec<Server>,

    pub tcp_endpoints: Vec<L4Service>,

    pub udp_endpoints: Vec<L4Service>,

    /// Backends that receive unterminated TLS.
    pub passthrough_backends: Vec<SslPassthroughBackend>,
}

/// A pool of upstream endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Backend {
    pub name: String,
    pub service_name: String,
    pub port: u16,
    /// Upstream speaks TLS.
    pub secure: bool,
    pub ssl_passthrough: bool,
    pub endpoints: Vec<Endpoint>,
}

/// A single upstream address.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoint {
    pub address: String,
    pub port: String,
    pub max_fails: u32,
    pub fail_timeout: u32,
}

/// A TCP or UDP exposure rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct L4Service {
    /// Port exposed by the proxy.
    pub port: u16,
    pub backend: L4Backend,
    pub endpoints: Vec<Endpoint>,
}

/// Service an L4 rule points at.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct L4Backend {
    pub port: String,
    pub name: String,
    pub namespace: String,
}

/// Backend routed by SNI without terminating TLS.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SslPassthroughBackend {
    pub backend: String,
    pub hostname: String,
}

/// A virtual server.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub hostname: String,

    /// Path to the PEM bundle; empty means plain HTTP.
    pub ssl_certificate: String,

    pub ssl_pem_checksum: String,

    pub locations: Vec<Location>,
}

impl Server {
    /// Whether this is the catch-all server.
    pub fn is_default(&self) -> bool {
        self.hostname == DEFAULT_SERVER_HOSTNAME
    }
}

/// A path within a virtual server.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub path: String,
    pub backend: String,
    pub redirect: Redirect,
    pub basic_digest_auth: BasicDigestAuth,
    pub whitelist: SourceRange,
}

/// Redirect policy of a location.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Redirect {
    pub target: String,
    pub add_base_url: bool,
    pub ssl_redirect: bool,
}

/// Basic or digest auth requirement.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BasicDigestAuth {
    #[serde(rename = "type")]
    pub auth_type: String,
    pub realm: String,
    /// htpasswd-style credential file.
    pub file: String,
    pub secured: bool,
}

impl BasicDigestAuth {
    /// Credential file this requirement resolves against, if the scheme is
    /// one HAProxy userlists can express.
    pub fn userlist_file(&self) -> Option<&str> {
        if self.file.is_empty() || self.auth_type == DIGEST_AUTH {
            None
        } else {
            Some(&self.file)
        }
    }
}

/// Source IP allowlist.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SourceRange {
    pub cidr: Vec<String>,
}
