//! HAProxy backend for a generic ingress controller.
//!
//! Turns an ingress snapshot (backends, virtual servers, TLS bindings,
//! L4 endpoints, basic auth) into an HAProxy configuration file.

pub mod config;
pub mod controller;
pub mod haproxy;
pub mod ingress;
pub mod observability;
pub mod template;

pub use config::ControllerConfig;
pub use controller::{ConfigBackend, ControllerError, HaproxyController};
pub use haproxy::Configuration;
pub use ingress::Snapshot;
pub use template::TemplateRenderer;
