//! Ingress snapshot subsystem.
//!
//! # Data Flow
//! ```text
//! ingress host (resource discovery)
//!     → snapshot file (JSON)
//!     → loader.rs (read & deserialize)
//!     → Snapshot (read-only for the whole render pass)
//!     → haproxy builders
//! ```
//!
//! # Design Decisions
//! - Every field defaults, so partial snapshots deserialize
//! - Backends and L4 services are opaque here; only servers are inspected
//! - No semantic validation of paths or hostnames

pub mod loader;
pub mod types;

pub use loader::{load_snapshot, SnapshotError};
pub use types::{
    Backend, BasicDigestAuth, Endpoint, L4Backend, L4Service, Location, Redirect, Server,
    Snapshot, SourceRange, SslPassthroughBackend,
};
