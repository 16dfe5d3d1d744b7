//! HTML page rendering

use minijinja::{context, Environment};
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const INDEX_TEMPLATE: &str = "index.html";

const EMBEDDED_INDEX: &str = include_str!("../../templates/index.html");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// Page templates; `index.html` is embedded unless a template directory overrides it
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn embedded() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, EMBEDDED_INDEX)?;
        Ok(Self { env })
    }

    /// Loads `index.html` from `dir`, falling back to the embedded page when absent.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let path = dir.join(INDEX_TEMPLATE);
        if !path.is_file() {
            return Self::embedded();
        }

        let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Read {
            path: path.clone(),
            source,
        })?;

        let mut env = Environment::new();
        env.add_template_owned(INDEX_TEMPLATE, source)?;
        info!(path = %path.display(), "Loaded index template override");
        Ok(Self { env })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self, TemplateError> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    pub fn render_index(&self, results: Option<&Value>) -> Result<String, TemplateError> {
        let template = self.env.get_template(INDEX_TEMPLATE)?;
        Ok(template.render(context! { results => results })?)
    }
}
