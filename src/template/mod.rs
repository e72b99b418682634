//! Template rendering subsystem.
//!
//! # Data Flow
//! ```text
//! template file (loaded once at startup)
//!     → renderer.rs (minijinja environment + functions.rs helpers)
//!     → render(Configuration) into a reused raw buffer
//!     → filter.rs (drop whitespace-only lines) into a reused output buffer
//!     → bytes for the HAProxy config file
//! ```
//!
//! # Design Decisions
//! - A template that cannot be loaded is a startup error, never a render error
//! - Blank line removal runs in-process and cannot fail
//! - No HTML auto-escaping; output is HAProxy config, not markup

pub mod filter;
pub mod functions;
pub mod renderer;

pub use renderer::{RenderError, TemplateRenderer, BUFFER_CAPACITY};
