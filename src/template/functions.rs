//! Functions exposed to templates.

use minijinja::value::{Value, ViaDeserialize};
use minijinja::Environment;

use crate::ingress::SslPassthroughBackend;

/// True for a zero-length string.
pub fn is_empty(value: &str) -> bool {
    value.is_empty()
}

/// True when `backend` is routed by SNI without TLS termination.
pub fn is_passthrough(backend: &str, passthrough: &[SslPassthroughBackend]) -> bool {
    match passthrough.iter().find(|p| p.backend == backend) {
        Some(found) => {
            tracing::debug!(backend = %backend, hostname = %found.hostname, "Found ssl passthrough backend");
            true
        }
        None => false,
    }
}

// Anything that is not a string counts as empty, including none/undefined.
fn empty(value: Value) -> bool {
    value.as_str().map_or(true, is_empty)
}

fn ssl_passthrough(backend: &str, passthrough: ViaDeserialize<Vec<SslPassthroughBackend>>) -> bool {
    is_passthrough(backend, &passthrough.0)
}

/// Register the helper functions on `env`.
pub fn register(env: &mut Environment<'_>) {
    env.add_function("empty", empty);
    env.add_function("is_ssl_passthrough", ssl_passthrough);
    env.add_function("isSSLPassthrough", ssl_passthrough);
}
