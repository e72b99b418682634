//! Shared fixtures for integration tests.

use std::path::{Path, PathBuf};

use haproxy_ingress::config::ControllerConfig;
use haproxy_ingress::ingress::{
    Backend, BasicDigestAuth, Endpoint, L4Backend, L4Service, Location, Redirect, Server,
    Snapshot, SourceRange, SslPassthroughBackend,
};

/// The template shipped with the crate.
pub fn bundled_template() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/haproxy.tmpl")
}

/// Controller settings that render the bundled template into `dir`.
#[allow(dead_code)]
pub fn controller_config(dir: &Path) -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.template.path = bundled_template();
    config.output.path = dir.join("haproxy.cfg");
    config.snapshot.path = dir.join("ingress.json");
    config
}

/// Write an htpasswd-style file into `dir` and return its path.
#[allow(dead_code)]
pub fn credential_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn backend(name: &str, address: &str, port: &str, max_fails: u32) -> Backend {
    Backend {
        name: name.into(),
        endpoints: vec![Endpoint {
            address: address.into(),
            port: port.into(),
            max_fails,
            fail_timeout: 0,
        }],
        ..Default::default()
    }
}

fn location(path: &str, backend: &str) -> Location {
    Location {
        path: path.into(),
        backend: backend.into(),
        ..Default::default()
    }
}

/// A snapshot exercising every frontend the bundled template produces.
///
/// `auth_file` protects the root of `example.com`; pass an empty string to
/// leave it open.
pub fn full_snapshot(auth_file: &str) -> Snapshot {
    let mut root = location("/", "default-web-80");
    root.basic_digest_auth = BasicDigestAuth {
        auth_type: "basic".into(),
        realm: "Protected".into(),
        file: auth_file.into(),
        secured: !auth_file.is_empty(),
    };
    let mut api = location("/api", "default-api-80");
    api.whitelist = SourceRange {
        cidr: vec!["10.0.0.0/8".into(), "192.168.0.0/16".into()],
    };
    let mut secure_root = location("/", "default-web-80");
    secure_root.redirect = Redirect {
        ssl_redirect: true,
        ..Default::default()
    };

    Snapshot {
        backends: vec![
            backend("default-web-80", "10.0.0.1", "8080", 0),
            backend("default-api-80", "10.0.0.2", "9090", 3),
            backend("default-tls-443", "10.0.0.3", "8443", 0),
            backend("upstream-default-backend", "10.0.0.9", "8080", 0),
        ],
        servers: vec![
            Server {
                hostname: "_".into(),
                locations: vec![location("/", "upstream-default-backend")],
                ..Default::default()
            },
            Server {
                hostname: "example.com".into(),
                locations: vec![root, api],
                ..Default::default()
            },
            Server {
                hostname: "secure.example.com".into(),
                ssl_certificate: "/ssl/secure.pem".into(),
                ssl_pem_checksum: "abc123".into(),
                locations: vec![secure_root],
            },
        ],
        tcp_endpoints: vec![L4Service {
            port: 5432,
            backend: L4Backend {
                port: "5432".into(),
                name: "db".into(),
                namespace: "default".into(),
            },
            endpoints: vec![Endpoint {
                address: "10.0.0.4".into(),
                port: "5432".into(),
                ..Default::default()
            }],
        }],
        udp_endpoints: Vec::new(),
        passthrough_backends: vec![SslPassthroughBackend {
            backend: "default-tls-443".into(),
            hostname: "tls.example.com".into(),
        }],
    }
}
