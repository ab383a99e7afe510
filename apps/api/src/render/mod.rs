//! Template renderer: résumé data → LaTeX source.
//!
//! The template is read and compiled once at startup into an immutable
//! `TemplateRenderer` that handlers share through `AppState`.

pub mod escape;
pub mod syntax;
pub mod view;

use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use thiserror::Error;
use tracing::info;

use crate::models::resume::ResumeSubmission;
use syntax::SyntaxError;
use view::ResumeView;

/// Registered name of the résumé template. The `.tex` suffix turns on
/// LaTeX autoescaping.
const TEMPLATE_NAME: &str = "resume.tex";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("template error: {0}")]
    Template(String),
}

impl From<tera::Error> for RenderError {
    fn from(e: tera::Error) -> Self {
        RenderError::Template(describe(&e))
    }
}

/// Tera keeps the useful part of a message in the source chain.
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[derive(Debug)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Reads and compiles the template at `path`.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let renderer = Self::from_source(&source)?;
        info!("Loaded resume template from {}", path.display());
        Ok(renderer)
    }

    pub fn from_source(source: &str) -> Result<Self, RenderError> {
        let translated = syntax::translate(source)?;

        let mut tera = Tera::default();
        tera.autoescape_on(vec![".tex"]);
        tera.set_escape_fn(escape::escape_latex);
        tera.register_filter("latex_url", escape::latex_url);
        tera.add_raw_template(TEMPLATE_NAME, &translated)?;

        Ok(Self { tera })
    }

    /// Renders the submission. Pure: the same input always yields the same bytes.
    pub fn render(&self, submission: &ResumeSubmission) -> Result<String, RenderError> {
        let view = ResumeView::from_submission(submission);
        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
