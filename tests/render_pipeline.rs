//! End-to-end rendering of the bundled template.

use std::collections::BTreeMap;

use haproxy_ingress::haproxy::{build_configuration, BuildOptions};
use haproxy_ingress::ingress::{BasicDigestAuth, Location, Redirect, Server, SourceRange};
use haproxy_ingress::{Snapshot, TemplateRenderer};

mod common;

fn render(snapshot: &Snapshot, overrides: &BTreeMap<String, String>) -> String {
    let conf = build_configuration(snapshot, overrides, BuildOptions::default()).unwrap();
    let mut renderer =
        TemplateRenderer::from_file("haproxy.tmpl", &common::bundled_template()).unwrap();
    String::from_utf8(renderer.render(&conf).unwrap().to_vec()).unwrap()
}

fn has_line(out: &str, line: &str) -> bool {
    out.lines().any(|l| l == line)
}

#[test]
fn test_full_render() {
    let dir = tempfile::tempdir().unwrap();
    let file = common::credential_file(
        dir.path(),
        "users.passwd",
        "alice:$apr1$x9s8d7f6$abcdefghijklmnop\nbob::secret\n",
    );
    let out = render(&common::full_snapshot(&file), &BTreeMap::new());

    assert!(out.starts_with("global\n"));
    assert!(!out.lines().any(|l| l.trim().is_empty()), "blank line in:\n{}", out);

    // userlists
    assert!(has_line(&out, "userlist users"));
    assert!(has_line(&out, "    user alice password $apr1$x9s8d7f6$abcdefghijklmnop"));
    assert!(has_line(&out, "    user bob insecure-password secret"));

    // backends
    assert!(has_line(&out, "    server 10.0.0.2:9090 10.0.0.2:9090 check port 9090 inter 2s fall 3"));
    let tls = out.find("backend default-tls-443\n").unwrap();
    assert!(out[tls..].starts_with("backend default-tls-443\n    mode tcp\n"));
    let web = out.find("backend default-web-80\n").unwrap();
    assert!(out[web..].starts_with("backend default-web-80\n    mode http\n"));

    // L4
    assert!(has_line(&out, "frontend tcp-default-db-5432"));
    assert!(has_line(&out, "    bind *:5432"));

    // plain HTTP host with auth on the root and a whitelisted sub-path
    assert!(has_line(
        &out,
        "    http-request deny if { hdr(host) -i example.com } { path_beg /api } !{ src 10.0.0.0/8 192.168.0.0/16 }"
    ));
    assert!(has_line(&out, "    use_backend default-api-80 if { hdr(host) -i example.com } { path_beg /api }"));
    assert!(has_line(
        &out,
        "    http-request auth realm \"Protected\" if { hdr(host) -i example.com } !{ path_beg /api } !{ http_auth(users) }"
    ));
    assert!(has_line(&out, "    use_backend default-web-80 if { hdr(host) -i example.com } !{ path_beg /api }"));

    // HTTPS host forcing a redirect is served on 443 only
    assert!(has_line(&out, "    redirect scheme https if { hdr(host) -i secure.example.com } !{ ssl_fc }"));
    let secure_rule = "    use_backend default-web-80 if { hdr(host) -i secure.example.com }";
    assert_eq!(out.lines().filter(|l| *l == secure_rule).count(), 1);
    assert!(out.find(secure_rule).unwrap() > out.find("frontend httpsfront-terminate").unwrap());

    // passthrough
    assert!(has_line(&out, "    use_backend default-tls-443 if { req.ssl_sni -i tls.example.com }"));
    assert!(has_line(
        &out,
        "    bind unix@/var/run/haproxy-https.sock accept-proxy ssl crt /ssl/secure.pem"
    ));

    // catch-all
    assert_eq!(
        out.lines().filter(|l| *l == "    default_backend upstream-default-backend").count(),
        2
    );
    assert!(out.ends_with("monitor-uri /healthz\n"));
}

#[test]
fn test_render_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let a = common::credential_file(dir.path(), "a.passwd", "alice:x\n");
    let mut snapshot = common::full_snapshot(&a);
    let b = common::credential_file(dir.path(), "b.passwd", "bob:y\n");
    snapshot.servers[2].locations[0].basic_digest_auth.file = b;
    snapshot.servers[2].locations[0].basic_digest_auth.auth_type = "basic".into();

    let first = render(&snapshot, &BTreeMap::new());
    let second = render(&snapshot, &BTreeMap::new());
    assert_eq!(first, second);
    assert!(first.find("userlist a").unwrap() < first.find("userlist b").unwrap());
}

#[test]
fn test_overrides_reach_template() {
    let mut overrides = BTreeMap::new();
    overrides.insert("syslog-endpoint".to_string(), "10.0.0.5:514".to_string());
    overrides.insert("max-connections".to_string(), "4096".to_string());
    overrides.insert("balance-algorithm".to_string(), "leastconn".to_string());
    overrides.insert("timeout-client".to_string(), "2m".to_string());
    overrides.insert("forwardfor".to_string(), "false".to_string());
    overrides.insert("timeout-server".to_string(), "soon".to_string());

    let out = render(&common::full_snapshot(""), &overrides);

    assert!(has_line(&out, "    log 10.0.0.5:514 format rfc5424 local0"));
    assert_eq!(out.lines().filter(|l| *l == "    maxconn 4096").count(), 2);
    assert!(has_line(&out, "    balance leastconn"));
    assert!(has_line(&out, "    timeout client 2m"));
    assert!(has_line(&out, "    timeout server 50s"));
    assert!(!has_line(&out, "    option forwardfor"));
    assert!(!out.contains("userlist"));
    assert!(!out.contains("http_auth"));
}

#[test]
fn test_defaults_without_servers() {
    let out = render(&Snapshot::default(), &BTreeMap::new());

    assert!(has_line(&out, "    maxconn 2000"));
    assert!(has_line(&out, "    balance roundrobin"));
    assert!(has_line(&out, "    option forwardfor"));
    assert!(!out.contains("    log "));
    assert!(has_line(&out, "frontend httpfront"));
    assert!(!out.contains("httpsfront"));
    assert!(!out.contains("default_backend"));
}

#[test]
fn test_https_without_passthrough_binds_directly() {
    let mut snapshot = common::full_snapshot("");
    snapshot.passthrough_backends.clear();
    let out = render(&snapshot, &BTreeMap::new());

    assert!(!has_line(&out, "frontend httpsfront"));
    assert!(has_line(&out, "frontend httpsfront-terminate"));
    assert!(has_line(&out, "    bind *:443 ssl crt /ssl/secure.pem"));
    let tls = out.find("backend default-tls-443\n").unwrap();
    assert!(out[tls..].starts_with("backend default-tls-443\n    mode http\n"));
}

#[test]
fn test_https_without_redirect_served_on_both_frontends() {
    let mut snapshot = common::full_snapshot("");
    snapshot.servers[2].locations[0].redirect.ssl_redirect = false;
    let out = render(&snapshot, &BTreeMap::new());

    let rule = "    use_backend default-web-80 if { hdr(host) -i secure.example.com }";
    assert_eq!(out.lines().filter(|l| *l == rule).count(), 2);
    assert!(!out.contains("if { hdr(host) -i secure.example.com } !{ ssl_fc }"));
}

fn basic_auth(realm: &str, file: &str) -> BasicDigestAuth {
    BasicDigestAuth {
        auth_type: "basic".into(),
        realm: realm.into(),
        file: file.into(),
        secured: true,
    }
}

#[test]
fn test_default_server_access_rules() {
    let dir = tempfile::tempdir().unwrap();
    let file = common::credential_file(dir.path(), "admins.passwd", "root:$apr1$abc\n");
    let mut snapshot = common::full_snapshot("");
    let catch_all = &mut snapshot.servers[0];
    catch_all.locations[0].basic_digest_auth = basic_auth("Admins", &file);
    catch_all.locations[0].whitelist = SourceRange {
        cidr: vec!["10.0.0.0/8".into()],
    };
    catch_all.locations.push(Location {
        path: "/status".into(),
        backend: "default-web-80".into(),
        ..Default::default()
    });

    let out = render(&snapshot, &BTreeMap::new());

    // port 80: every named host is excluded from the catch-all rules
    assert!(has_line(
        &out,
        "    use_backend default-web-80 if !{ hdr(host) -i example.com secure.example.com } { path_beg /status }"
    ));
    assert!(has_line(
        &out,
        "    http-request deny if !{ hdr(host) -i example.com secure.example.com } !{ path_beg /status } !{ src 10.0.0.0/8 }"
    ));
    assert!(has_line(
        &out,
        "    http-request auth realm \"Admins\" if !{ hdr(host) -i example.com secure.example.com } !{ path_beg /status } !{ http_auth(admins) }"
    ));

    // 443: only the TLS hosts are claimed
    assert!(has_line(
        &out,
        "    http-request deny if !{ hdr(host) -i secure.example.com } !{ path_beg /status } !{ src 10.0.0.0/8 }"
    ));
    assert!(has_line(
        &out,
        "    http-request auth realm \"Admins\" if !{ hdr(host) -i secure.example.com } !{ path_beg /status } !{ http_auth(admins) }"
    ));

    assert!(!out.lines().any(|l| l.starts_with("    http-request deny if !{ src")));
    assert_eq!(
        out.lines().filter(|l| *l == "    default_backend upstream-default-backend").count(),
        2
    );
}

#[test]
fn test_lone_default_server_rules_cover_everything() {
    let dir = tempfile::tempdir().unwrap();
    let file = common::credential_file(dir.path(), "admins.passwd", "root:$apr1$abc\n");
    let snapshot = Snapshot {
        servers: vec![Server {
            hostname: "_".into(),
            locations: vec![Location {
                path: "/".into(),
                backend: "web".into(),
                basic_digest_auth: basic_auth("Admins", &file),
                whitelist: SourceRange {
                    cidr: vec!["10.0.0.0/8".into()],
                },
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };

    let out = render(&snapshot, &BTreeMap::new());

    assert!(has_line(&out, "    http-request deny if !{ src 10.0.0.0/8 }"));
    assert!(has_line(&out, "    http-request auth realm \"Admins\" if !{ http_auth(admins) }"));
    assert!(has_line(&out, "    default_backend web"));
}

#[test]
fn test_default_redirect_spares_plain_hosts() {
    let snapshot = Snapshot {
        servers: vec![
            Server {
                hostname: "_".into(),
                ssl_certificate: "/ssl/default.pem".into(),
                locations: vec![Location {
                    path: "/".into(),
                    backend: "web".into(),
                    redirect: Redirect {
                        ssl_redirect: true,
                        ..Default::default()
                    },
                    ..Default::default()
                }],
                ..Default::default()
            },
            Server {
                hostname: "plain.example.com".into(),
                locations: vec![Location {
                    path: "/".into(),
                    backend: "plain".into(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let out = render(&snapshot, &BTreeMap::new());

    assert!(has_line(&out, "    redirect scheme https if !{ hdr(host) -i plain.example.com } !{ ssl_fc }"));
    assert!(!has_line(&out, "    redirect scheme https if !{ ssl_fc }"));
    assert!(has_line(&out, "    use_backend plain if { hdr(host) -i plain.example.com }"));
    assert!(has_line(&out, "    bind *:443 ssl crt /ssl/default.pem"));
}

#[test]
fn test_dot_file_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let file = common::credential_file(dir.path(), ".htpasswd", "alice:$apr1$abc\n");
    let out = render(&common::full_snapshot(&file), &BTreeMap::new());

    assert!(has_line(&out, "userlist .htpasswd"));
    assert!(!has_line(&out, "userlist "));
    assert!(has_line(
        &out,
        "    http-request auth realm \"Protected\" if { hdr(host) -i example.com } !{ path_beg /api } !{ http_auth(.htpasswd) }"
    ));
}

#[test]
fn test_same_base_name_renders_distinct_userlists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("a")).unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    let first = common::credential_file(dir.path(), "a/users.passwd", "alice:x\n");
    let second = common::credential_file(dir.path(), "b/users.passwd", "bob:y\n");

    let mut snapshot = common::full_snapshot(&first);
    snapshot.servers[2].locations[0].basic_digest_auth = basic_auth("Protected", &second);

    let out = render(&snapshot, &BTreeMap::new());

    assert_eq!(out.lines().filter(|l| *l == "userlist users").count(), 1);
    assert!(has_line(&out, "userlist users-2"));
    assert!(has_line(
        &out,
        "    http-request auth realm \"Protected\" if { hdr(host) -i secure.example.com } !{ http_auth(users-2) }"
    ));
}
