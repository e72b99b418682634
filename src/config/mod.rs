//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! controller.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ControllerConfig (validated, immutable)
//!
//! In watch mode:
//!     watcher.rs detects a snapshot change
//!     → ingress loader reads the new snapshot
//!     → update sent over a channel
//!     → caller debounces and re-renders
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Overrides stay untyped here and are parsed per render

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::ControllerConfig;
pub use schema::{LogFormat, ObservabilityConfig};
pub use watcher::SnapshotWatcher;
