use std::sync::Arc;

use crate::compiler::LatexCompiler;
use crate::config::Config;
use crate::render::TemplateRenderer;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main`; nothing in it is mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Pluggable record store. Default: PgResumeStore.
    pub store: Arc<dyn ResumeStore>,
    pub renderer: Arc<TemplateRenderer>,
    pub compiler: LatexCompiler,
}
