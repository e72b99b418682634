//! HAProxy-specific model derived from the ingress snapshot.
//!
//! Everything here is rebuilt on every render pass and handed to the
//! template as an immutable value. Shared pieces (userlists referenced by
//! several locations, HTTPS servers that also serve plain HTTP) are behind
//! `Arc` so each appears once in memory.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::haproxy::overrides::Overrides;
use crate::ingress::{Backend, L4Service, Redirect, SslPassthroughBackend};

/// Userlists keyed by the credential file they were read from.
pub type Userlists = BTreeMap<String, Arc<Userlist>>;

/// A named set of basic-auth credentials.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Userlist {
    /// Credential file base name without extension.
    pub list_name: String,
    pub realm: String,
    pub users: Vec<AuthUser>,
}

impl Userlist {
    /// A list without a name stands for "no auth required".
    pub fn is_empty(&self) -> bool {
        self.list_name.is_empty()
    }
}

/// One credential line.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub password: String,
    /// `user:hash` lines are encrypted, `user::secret` lines are not.
    pub encrypted: bool,
}

/// A virtual server as HAProxy sees it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HaproxyServer {
    pub is_default_server: bool,
    pub hostname: String,
    pub ssl_certificate: String,
    pub ssl_pem_checksum: String,
    /// The `/` location, matched last.
    pub root_location: Option<HaproxyLocation>,
    /// Every other location, in snapshot order.
    pub locations: Vec<HaproxyLocation>,
    /// All locations require HTTPS.
    pub ssl_redirect: bool,
}

impl HaproxyServer {
    pub fn is_https(&self) -> bool {
        !self.ssl_certificate.is_empty()
    }
}

/// A location with its HAProxy ACL fragments precomputed.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HaproxyLocation {
    pub is_root_location: bool,
    pub path: String,
    pub backend: String,
    pub redirect: Redirect,
    pub userlist: Arc<Userlist>,
    /// ACL condition selecting this location, e.g. ` { path_beg /api }`.
    pub ha_match_path: String,
    /// Space-prefixed CIDR list, empty when unrestricted.
    pub ha_whitelist: String,
}

/// Everything the template receives.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Configuration {
    pub userlists: Userlists,
    pub backends: Vec<Backend>,
    pub default_server: Option<Arc<HaproxyServer>>,
    pub http_servers: Vec<Arc<HaproxyServer>>,
    pub https_servers: Vec<Arc<HaproxyServer>>,
    pub tcp_endpoints: Vec<L4Service>,
    pub udp_endpoints: Vec<L4Service>,
    pub passthrough_backends: Vec<SslPassthroughBackend>,
    /// ACL condition for port 80 requests no named server claims, e.g.
    /// ` !{ hdr(host) -i a.example.com b.example.com }`.
    pub ha_http_default_match: String,
    /// Same for requests reaching the TLS terminating frontend.
    pub ha_https_default_match: String,
    #[serde(flatten)]
    pub overrides: Overrides,
}
