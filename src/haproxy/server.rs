//! Virtual server translation and frontend membership.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::haproxy::location::build_locations;
use crate::haproxy::types::{HaproxyServer, Userlists};
use crate::ingress::Server;

/// Servers grouped by the frontend that serves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerGroups {
    pub default_server: Option<Arc<HaproxyServer>>,
    /// Plain HTTP servers plus HTTPS servers that do not force a redirect.
    pub http_servers: Vec<Arc<HaproxyServer>>,
    pub https_servers: Vec<Arc<HaproxyServer>>,
    /// Condition for port 80 requests that fall through to the default server.
    pub ha_http_default_match: String,
    /// Condition for TLS requests that fall through to the default server.
    pub ha_https_default_match: String,
}

/// Translate `servers` and sort them into frontends, keeping input order.
pub fn build_servers(userlists: &Userlists, servers: &[Server]) -> ServerGroups {
    let mut groups = ServerGroups {
        default_server: None,
        http_servers: Vec::with_capacity(servers.len()),
        https_servers: Vec::with_capacity(servers.len()),
        ha_http_default_match: String::new(),
        ha_https_default_match: String::new(),
    };

    for server in servers {
        let (locations, root_location) = build_locations(userlists, server);
        let ha_server = Arc::new(HaproxyServer {
            is_default_server: server.is_default(),
            hostname: server.hostname.clone(),
            ssl_certificate: server.ssl_certificate.clone(),
            ssl_pem_checksum: server.ssl_pem_checksum.clone(),
            root_location,
            locations,
            ssl_redirect: server_ssl_redirect(server),
        });

        if ha_server.is_default_server {
            groups.default_server = Some(ha_server);
        } else if !ha_server.is_https() {
            groups.http_servers.push(ha_server);
        } else {
            // Without a forced redirect, port 80 must still proxy this host.
            if !ha_server.ssl_redirect {
                groups.http_servers.push(ha_server.clone());
            }
            groups.https_servers.push(ha_server);
        }
    }

    // Redirecting HTTPS servers answer port 80 with their own redirect.
    groups.ha_http_default_match =
        unclaimed_host_match(groups.http_servers.iter().chain(&groups.https_servers));
    groups.ha_https_default_match = unclaimed_host_match(&groups.https_servers);

    tracing::debug!(
        default_server = groups.default_server.is_some(),
        http = groups.http_servers.len(),
        https = groups.https_servers.len(),
        "Servers built"
    );
    groups
}

/// True when every location of `server` requires HTTPS.
pub fn server_ssl_redirect(server: &Server) -> bool {
    server.locations.iter().all(|l| l.redirect.ssl_redirect)
}

/// ACL condition matching requests for none of the hostnames in `servers`.
///
/// Empty when there is no named server, so the default server takes every
/// request.
pub fn unclaimed_host_match<'a>(servers: impl IntoIterator<Item = &'a Arc<HaproxyServer>>) -> String {
    let hosts: BTreeSet<&str> = servers
        .into_iter()
        .map(|s| s.hostname.as_str())
        .filter(|h| !h.is_empty())
        .collect();
    if hosts.is_empty() {
        return String::new();
    }

    let mut acl = String::from(" !{ hdr(host) -i");
    for host in hosts {
        acl.push(' ');
        acl.push_str(host);
    }
    acl.push_str(" }");
    acl
}
