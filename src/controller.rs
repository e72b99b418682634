//! Controller facade.
//!
//! # Responsibilities
//! - Expose the build/render pair the ingress host calls on every change
//! - Run a full pass (build, render, write) for the standalone binary
//!
//! # Design Decisions
//! - The host only sees [`ConfigBackend`]; it never touches builders
//! - A failed pass leaves the previously written file untouched; output is
//!   written to a sibling temp file and renamed into place
//! - The output file is rewritten only when the rendered bytes change

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::{ConfigError, ControllerConfig};
use crate::haproxy::{build_configuration, BuildError, BuildOptions, Configuration};
use crate::ingress::{Snapshot, SnapshotError};
use crate::observability::metrics;
use crate::template::{RenderError, TemplateRenderer};

/// Top-level error for controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What an ingress host needs from a load balancer backend.
pub trait ConfigBackend {
    /// Derive the render configuration for `snapshot` with operator
    /// `overrides` applied.
    fn build_configuration(
        &self,
        snapshot: &Snapshot,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Configuration, BuildError>;

    /// Render `conf` into the proxy configuration text.
    fn render(&mut self, conf: &Configuration) -> Result<&[u8], RenderError>;
}

/// HAProxy implementation of [`ConfigBackend`].
#[derive(Debug)]
pub struct HaproxyController {
    renderer: TemplateRenderer,
    options: BuildOptions,
    overrides: BTreeMap<String, String>,
    output: PathBuf,
    /// Bytes of the last successful write.
    last_written: Option<Vec<u8>>,
}

impl HaproxyController {
    /// Create a controller from validated configuration.
    ///
    /// Loading the template happens here; callers should treat failure as
    /// fatal.
    pub fn new(config: &ControllerConfig) -> Result<Self, ControllerError> {
        let renderer = TemplateRenderer::from_file(&config.template.name, &config.template.path)?;
        Ok(Self::with_renderer(renderer, config))
    }

    /// Create a controller around an already loaded template.
    pub fn with_renderer(renderer: TemplateRenderer, config: &ControllerConfig) -> Self {
        Self {
            renderer,
            options: BuildOptions {
                strict_credentials: config.credentials.strict,
            },
            overrides: config.overrides.clone(),
            output: config.output.path.clone(),
            last_written: None,
        }
    }

    /// Path the configuration is written to.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build, render and write one pass for `snapshot`.
    ///
    /// Returns `true` when the output file was rewritten.
    pub fn sync(&mut self, snapshot: &Snapshot) -> Result<bool, ControllerError> {
        let start = Instant::now();
        let result = self.sync_inner(snapshot);
        match &result {
            Ok(true) => metrics::record_render("written", start),
            Ok(false) => metrics::record_render("unchanged", start),
            Err(e) => {
                tracing::error!(error = %e, "Render pass failed, keeping previous configuration");
                metrics::record_render("failed", start);
            }
        }
        result
    }

    fn sync_inner(&mut self, snapshot: &Snapshot) -> Result<bool, ControllerError> {
        let conf = self.build_configuration(snapshot, &self.overrides)?;
        metrics::record_configuration(&conf);

        let rendered = self.renderer.render(&conf)?;
        if self.last_written.as_deref() == Some(rendered) {
            tracing::debug!(path = ?self.output, "Configuration unchanged");
            return Ok(false);
        }

        write_atomically(&self.output, rendered).map_err(|source| ControllerError::Write {
            path: self.output.clone(),
            source,
        })?;
        tracing::info!(path = ?self.output, bytes = rendered.len(), "Configuration written");
        self.last_written = Some(rendered.to_vec());
        Ok(true)
    }
}

/// Replace `path` with `contents` in one rename.
///
/// An existing file keeps its permissions. On failure the temp file is
/// removed and `path` is left as it was.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    if let Ok(metadata) = fs::metadata(path) {
        file.as_file().set_permissions(metadata.permissions())?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl ConfigBackend for HaproxyController {
    fn build_configuration(
        &self,
        snapshot: &Snapshot,
        overrides: &BTreeMap<String, String>,
    ) -> Result<Configuration, BuildError> {
        build_configuration(snapshot, overrides, self.options)
    }

    fn render(&mut self, conf: &Configuration) -> Result<&[u8], RenderError> {
        self.renderer.render(conf)
    }
}
