//! Template loading and rendering.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment};
use thiserror::Error;

use crate::haproxy::Configuration;
use crate::template::{filter, functions};

/// Initial capacity of both render buffers; fits a typical config.
pub const BUFFER_CAPACITY: usize = 16 * 1024;

/// Errors that can occur while loading or rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template file could not be read.
    #[error("cannot read template file {path:?}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template source does not parse.
    #[error("cannot parse template: {0}")]
    TemplateLoad(#[source] minijinja::Error),

    /// Template failed while rendering a configuration.
    #[error("template execution failed: {0}")]
    Template(#[source] minijinja::Error),
}

/// A parsed template plus the buffers it renders into.
///
/// Buffers are reused across calls, so one renderer serves a whole process
/// but only one render at a time.
pub struct TemplateRenderer {
    env: Environment<'static>,
    name: String,
    raw: Vec<u8>,
    formatted: Vec<u8>,
}

impl TemplateRenderer {
    /// Load the template stored at `path` under `name`.
    pub fn from_file(name: &str, path: &Path) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let renderer = Self::from_source(name, source)?;
        tracing::info!(template = %name, path = ?path, "Template loaded");
        Ok(renderer)
    }

    /// Parse `source` as a template called `name`.
    pub fn from_source(name: &str, source: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        functions::register(&mut env);
        env.add_template_owned(name.to_string(), source.into())
            .map_err(RenderError::TemplateLoad)?;

        Ok(Self {
            env,
            name: name.to_string(),
            raw: Vec::with_capacity(BUFFER_CAPACITY),
            formatted: Vec::with_capacity(BUFFER_CAPACITY),
        })
    }

    /// Template name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render `conf` and strip blank lines from the result.
    ///
    /// The returned bytes stay valid until the next call.
    pub fn render(&mut self, conf: &Configuration) -> Result<&[u8], RenderError> {
        self.raw.clear();
        self.formatted.clear();

        let template = self.env.get_template(&self.name).map_err(RenderError::Template)?;
        template
            .render_to_write(conf, &mut self.raw)
            .map_err(RenderError::Template)?;

        filter::strip_blank_lines(&self.raw, &mut self.formatted);
        tracing::trace!(raw = self.raw.len(), formatted = self.formatted.len(), "Template rendered");
        Ok(&self.formatted)
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("name", &self.name)
            .field("raw_capacity", &self.raw.capacity())
            .field("formatted_capacity", &self.formatted.capacity())
            .finish()
    }
}
