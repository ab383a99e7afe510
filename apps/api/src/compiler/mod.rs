//! Document compiler: runs pdflatex against a workspace's source file.
//!
//! Two passes resolve cross-references. Success means the PDF exists after
//! the last pass; the exit code alone is not trusted because pdflatex in
//! nonstop mode can exit non-zero and still produce a usable document.

pub mod diagnostics;
#[cfg(all(test, unix))]
pub mod fake;

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::LatexConfig;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(
        "PDF generation failed: '{program}' command not found. \
         Ensure a LaTeX distribution is installed and LATEX_COMPILER points to it."
    )]
    MissingExecutable { program: String },

    #[error("PDF generation failed: could not run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("PDF generation timed out after {}s", .timeout.as_secs_f32())]
    Timeout { timeout: Duration },

    #[error("PDF generation failed. LaTeX Error:\n\n{diagnostics}")]
    Failed { diagnostics: String },
}

/// Exit status and captured streams of one compiler run.
#[derive(Debug, Clone)]
pub struct PassOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl PassOutput {
    fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn exit_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "no exit code (terminated by signal)".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LatexCompiler {
    program: PathBuf,
    timeout: Duration,
    shell_escape: bool,
}

impl LatexCompiler {
    pub fn new(config: &LatexConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout,
            shell_escape: config.shell_escape,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Compiles the workspace's source file into its output path.
    pub async fn compile(&self, workspace: &Workspace) -> Result<PathBuf, CompileError> {
        let output_path = workspace.output_path();
        let log_path = workspace.log_path();

        let mut last = self.run_pass(workspace).await?;
        if !last.success() && !exists(&output_path).await && !exists(&log_path).await {
            debug!(
                "First {} pass for {} left no output ({}); skipping second pass",
                self.program_name(),
                workspace.id(),
                last.exit_description()
            );
        } else {
            last = self.run_pass(workspace).await?;
        }

        if exists(&output_path).await {
            if !last.success() {
                debug!(
                    "{} returned {} but produced {}",
                    self.program_name(),
                    last.exit_description(),
                    output_path.display()
                );
            }
            return Ok(output_path);
        }

        let diagnostics = diagnostics::collect(&self.program_name(), &log_path, &last).await;
        warn!(
            "Compilation of {} failed ({})",
            workspace.id(),
            last.exit_description()
        );
        Err(CompileError::Failed { diagnostics })
    }

    async fn run_pass(&self, workspace: &Workspace) -> Result<PassOutput, CompileError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(if self.shell_escape {
            "-shell-escape"
        } else {
            "-no-shell-escape"
        })
        .arg("-interaction=nonstopmode")
        .arg("-output-directory")
        .arg(workspace.dir())
        .arg(workspace.source_path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        debug!("Running {:?}", cmd.as_std());

        let child = cmd.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CompileError::MissingExecutable {
                program: self.program_name(),
            },
            _ => CompileError::Spawn {
                program: self.program_name(),
                source,
            },
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CompileError::Spawn {
                program: self.program_name(),
                source,
            })?,
            Err(_) => {
                warn!(
                    "{} exceeded {:?} for {}; killed",
                    self.program_name(),
                    self.timeout,
                    workspace.id()
                );
                return Err(CompileError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        Ok(PassOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

async fn exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
