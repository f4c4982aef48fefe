//! HTML page rendering using Jinja2 syntax.
//!
//! Page templates are read from disk once at startup and kept in an
//! environment owned by the renderer, so a missing template fails the
//! process before it starts serving.

use minijinja::{Environment, Value};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during page template operations
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to load page template '{name}': {reason}")]
    Load { name: String, reason: String },

    #[error("Page template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render page: {0}")]
    Render(String),
}

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Load the named templates from `dir`.
    pub fn from_dir(dir: &Path, names: &[&str]) -> Result<Self, PageError> {
        let mut env = Environment::new();

        for name in names {
            let path = dir.join(name);
            let source = std::fs::read_to_string(&path).map_err(|e| PageError::Load {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

            env.add_template_owned(name.to_string(), source)
                .map_err(|e| PageError::Load {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;

            tracing::debug!("Loaded page template: {}", name);
        }

        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String, PageError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| PageError::NotFound(name.to_string()))?;

        template
            .render(ctx)
            .map_err(|e| PageError::Render(e.to_string()))
    }
}
