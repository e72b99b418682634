//! Render configuration assembly.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::haproxy::overrides::Overrides;
use crate::haproxy::server::build_servers;
use crate::haproxy::types::Configuration;
use crate::haproxy::userlist::{build_userlists, CredentialError};
use crate::ingress::Snapshot;

/// Error that aborts building a configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("credential file unreadable: {0}")]
    Credentials(#[from] CredentialError),
}

/// Knobs for [`build_configuration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Fail the pass when a credential file cannot be read instead of
    /// rendering without it.
    pub strict_credentials: bool,
}

/// Build the template input for `snapshot` and apply operator `overrides`.
pub fn build_configuration(
    snapshot: &Snapshot,
    overrides: &BTreeMap<String, String>,
    options: BuildOptions,
) -> Result<Configuration, BuildError> {
    let scan = build_userlists(&snapshot.servers);
    if options.strict_credentials {
        if let Some(err) = scan.failures.into_iter().next() {
            return Err(err.into());
        }
    }

    let groups = build_servers(&scan.userlists, &snapshot.servers);

    let mut conf = Configuration {
        userlists: scan.userlists,
        backends: snapshot.backends.clone(),
        default_server: groups.default_server,
        http_servers: groups.http_servers,
        https_servers: groups.https_servers,
        tcp_endpoints: snapshot.tcp_endpoints.clone(),
        udp_endpoints: snapshot.udp_endpoints.clone(),
        passthrough_backends: snapshot.passthrough_backends.clone(),
        ha_http_default_match: groups.ha_http_default_match,
        ha_https_default_match: groups.ha_https_default_match,
        overrides: Overrides::default(),
    };
    conf.overrides.merge(overrides);

    tracing::debug!(
        userlists = conf.userlists.len(),
        backends = conf.backends.len(),
        balance = %conf.overrides.balance_algorithm,
        "Configuration assembled"
    );
    Ok(conf)
}
