//! Userlist discovery and htpasswd-style credential parsing.
//!
//! # Responsibilities
//! - Find every distinct basic-auth credential file referenced by a location
//! - Read each file once per pass and name the list after the file
//! - Parse `user:hash` (encrypted) and `user::secret` (plain) lines
//!
//! # Design Decisions
//! - Digest auth is skipped; HAProxy userlists cannot express it
//! - A malformed line stops the file but keeps the users read so far
//! - An unreadable file stops discovery for the rest of that server only

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::haproxy::types::{AuthUser, Userlist, Userlists};
use crate::ingress::Server;

/// Error reading a credential file.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot read userlist '{list_name}' from {file}: {source}")]
    Read {
        file: String,
        list_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl CredentialError {
    /// Credential file that failed.
    pub fn file(&self) -> &str {
        match self {
            CredentialError::Read { file, .. } => file,
        }
    }
}

/// Why a credential line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLine {
    #[error("missing ':'")]
    MissingSeparator,

    #[error("missing username")]
    MissingUsername,

    #[error("missing '{0}' password")]
    MissingPassword(String),
}

/// Result of scanning all servers for credential files.
#[derive(Debug, Default)]
pub struct UserlistScan {
    pub userlists: Userlists,
    /// Files that could not be read, in discovery order.
    pub failures: Vec<CredentialError>,
}

/// Build one userlist per distinct credential file referenced by `servers`.
pub fn build_userlists(servers: &[Server]) -> UserlistScan {
    let mut scan = UserlistScan::default();

    for server in servers {
        for location in &server.locations {
            let Some(file) = location.basic_digest_auth.userlist_file() else {
                continue;
            };
            // First reference wins, including its realm.
            if scan.userlists.contains_key(file) {
                continue;
            }

            let list_name = unique_list_name(&scan.userlists, file);
            match read_users(Path::new(file), &list_name) {
                Ok(users) => {
                    scan.userlists.insert(
                        file.to_string(),
                        Arc::new(Userlist {
                            list_name,
                            realm: location.basic_digest_auth.realm.clone(),
                            users,
                        }),
                    );
                }
                Err(e) => {
                    tracing::error!(
                        userlist = %list_name,
                        hostname = %server.hostname,
                        error = %e,
                        "Unexpected error reading userlist, skipping remaining locations of server"
                    );
                    scan.failures.push(e);
                    break;
                }
            }
        }
    }

    tracing::debug!(userlists = scan.userlists.len(), "Userlists built");
    scan
}

/// Name of the list stored in `file`: the base name without its extension.
///
/// Dot files such as `.htpasswd` keep their whole base name.
pub fn list_name(file: &str) -> &str {
    let base = file.rsplit_once('/').map_or(file, |(_, base)| base);
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    }
}

// HAProxy rejects two userlists with the same name, so files sharing a base
// name in different directories get a numeric suffix.
fn unique_list_name(userlists: &Userlists, file: &str) -> String {
    let base = list_name(file);
    let taken = |name: &str| userlists.values().any(|l| l.list_name == name);
    if !taken(base) {
        return base.to_string();
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            tracing::warn!(file = %file, userlist = %candidate, "Userlist name already in use, renamed");
            return candidate;
        }
        n += 1;
    }
}

/// Read all users from a credential file.
///
/// Only failing to open the file is an error. Parsing stops at the first
/// malformed line and returns what was read up to that point.
pub fn read_users(file: &Path, list_name: &str) -> Result<Vec<AuthUser>, CredentialError> {
    let handle = File::open(file).map_err(|source| CredentialError::Read {
        file: file.display().to_string(),
        list_name: list_name.to_string(),
        source,
    })?;

    let mut users = Vec::new();
    for line in BufReader::new(handle).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(userlist = %list_name, error = %e, "Stopped reading userlist");
                break;
            }
        };
        match parse_user(&line) {
            Ok(user) => users.push(user),
            Err(reason) => {
                tracing::warn!(userlist = %list_name, "{} on userlist '{}'", reason, list_name);
                break;
            }
        }
    }
    Ok(users)
}

/// Parse a single `user:hash` or `user::secret` line.
pub fn parse_user(line: &str) -> Result<AuthUser, MalformedLine> {
    let (username, rest) = line.split_once(':').ok_or(MalformedLine::MissingSeparator)?;
    if username.is_empty() {
        return Err(MalformedLine::MissingUsername);
    }

    let (password, encrypted) = match rest.strip_prefix(':') {
        Some(plain) => (plain, false),
        None => (rest, true),
    };
    if password.is_empty() {
        return Err(MalformedLine::MissingPassword(username.to_string()));
    }

    Ok(AuthUser {
        username: username.to_string(),
        password: password.to_string(),
        encrypted,
    })
}
