use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Origins allowed to call the API from a browser.
    pub cors_allowed_origins: Vec<String>,
    /// Directory holding per-request workspaces.
    pub scratch_dir: PathBuf,
    pub template_path: PathBuf,
    pub latex: LatexConfig,
}

/// Settings for the external LaTeX compiler.
#[derive(Debug, Clone)]
pub struct LatexConfig {
    pub program: PathBuf,
    pub timeout: Duration,
    pub shell_escape: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            cors_allowed_origins: split_origins(
                &std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .unwrap_or_else(|_| "./temp".to_string())
                .into(),
            template_path: std::env::var("TEMPLATE_PATH")
                .unwrap_or_else(|_| "templates/resume_template.tex".to_string())
                .into(),
            latex: LatexConfig {
                program: std::env::var("LATEX_COMPILER")
                    .unwrap_or_else(|_| "pdflatex".to_string())
                    .into(),
                timeout: Duration::from_secs(parse_env("LATEX_TIMEOUT_SECS", 60)?),
                shell_escape: parse_env("LATEX_SHELL_ESCAPE", false)?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
