//! HAProxy model subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot.servers
//!     → userlist.rs (credential files → Userlists, read once per pass)
//!     → server.rs + location.rs (HaproxyServer / HaproxyLocation)
//!     → configuration.rs (assemble, merge overrides.rs)
//!     → Configuration (immutable input for the template)
//! ```
//!
//! # Design Decisions
//! - Rebuilt from scratch on every pass; nothing is cached between passes
//! - Data anomalies degrade (empty userlist, skipped override) instead of
//!   failing the pass
//! - Only I/O on credential files can fail, and only in strict mode

pub mod configuration;
pub mod location;
pub mod overrides;
pub mod server;
pub mod types;
pub mod userlist;

pub use configuration::{build_configuration, BuildError, BuildOptions};
pub use overrides::{BalanceAlgorithm, OverrideError, Overrides};
pub use server::ServerGroups;
pub use types::{AuthUser, Configuration, HaproxyLocation, HaproxyServer, Userlist, Userlists};
pub use userlist::CredentialError;
