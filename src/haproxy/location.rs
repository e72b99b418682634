//! Location translation.
//!
//! On the ingress side `/` means "anything no other path claims". HAProxy
//! evaluates `use_backend` rules in order, so the root location is matched
//! with a negated `path_beg` over every sibling path instead.

use std::sync::Arc;

use crate::haproxy::types::{HaproxyLocation, Userlist, Userlists};
use crate::ingress::{Location, Server};

/// Path that marks the catch-all location.
pub const ROOT_PATH: &str = "/";

/// Translate the locations of `server`.
///
/// Returns the non-root locations in snapshot order and the root location,
/// if the server has one.
pub fn build_locations(
    userlists: &Userlists,
    server: &Server,
) -> (Vec<HaproxyLocation>, Option<HaproxyLocation>) {
    let no_auth = Arc::new(Userlist::default());
    let mut locations = Vec::with_capacity(server.locations.len());
    let mut root = None;
    let mut other_paths = String::new();

    for location in &server.locations {
        let userlist = userlists
            .get(&location.basic_digest_auth.file)
            .cloned()
            .unwrap_or_else(|| no_auth.clone());

        let mut ha_location = HaproxyLocation {
            is_root_location: location.path == ROOT_PATH,
            path: location.path.clone(),
            backend: location.backend.clone(),
            redirect: location.redirect.clone(),
            userlist,
            ha_match_path: String::new(),
            ha_whitelist: whitelist(location),
        };

        if ha_location.is_root_location {
            if root.is_some() {
                tracing::warn!(hostname = %server.hostname, "Duplicate root location, keeping the last one");
            }
            root = Some(ha_location);
        } else {
            other_paths.push(' ');
            other_paths.push_str(&location.path);
            ha_location.ha_match_path = format!(" {{ path_beg {} }}", location.path);
            locations.push(ha_location);
        }
    }

    if let Some(root) = root.as_mut() {
        if !other_paths.is_empty() {
            root.ha_match_path = format!(" !{{ path_beg{} }}", other_paths);
        }
    }

    (locations, root)
}

/// Space-prefixed CIDR list for an HAProxy `src` ACL.
fn whitelist(location: &Location) -> String {
    location
        .whitelist
        .cidr
        .iter()
        .fold(String::new(), |mut acc, cidr| {
            acc.push(' ');
            acc.push_str(cidr);
            acc
        })
}
