//! `POST /api/generate`: persist the submission, render it, compile it, and
//! return the PDF as an attachment.
//!
//! Order is fixed: parse → persist → render → compile. Persistence happens
//! before any workspace file is written, and the workspace is released on
//! every path once it has been allocated.

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::info;

use crate::compiler::LatexCompiler;
use crate::errors::AppError;
use crate::models::resume::ResumeSubmission;
use crate::state::AppState;
use crate::workspace::Workspace;

const NO_JSON: &str = "No JSON data received";
const DEFAULT_FILENAME: &str = "resume";

/// Bytes outside RFC 5987 `attr-char` are percent-encoded in `filename*`.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let submission = parse_submission(&body)?;

    let resume_id = state.store.save(&submission).await?;
    info!("Saved resume {resume_id}");

    let source = state.renderer.render(&submission)?;

    let mut workspace = Workspace::allocate(&state.config.scratch_dir);
    let pdf = build_pdf(&state.compiler, &workspace, &source).await;
    workspace.release().await;
    let pdf = pdf?;

    info!("Generated {} byte PDF for resume {resume_id}", pdf.len());

    let filename = attachment_filename(submission.name.as_deref());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        pdf,
    )
        .into_response())
}

/// Writes the source, compiles it, and reads the PDF back into memory so the
/// workspace can be released before the response is sent.
async fn build_pdf(
    compiler: &LatexCompiler,
    workspace: &Workspace,
    source: &str,
) -> Result<Bytes, AppError> {
    let source_path = workspace.source_path();
    tokio::fs::write(&source_path, source)
        .await
        .with_context(|| format!("failed to write {}", source_path.display()))?;

    let pdf_path = compiler.compile(workspace).await?;

    let pdf = tokio::fs::read(&pdf_path)
        .await
        .with_context(|| format!("failed to read {}", pdf_path.display()))?;
    Ok(Bytes::from(pdf))
}

fn parse_submission(body: &[u8]) -> Result<ResumeSubmission, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Input(NO_JSON.to_string()));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Input(format!("Invalid JSON: {e}")))?;

    match &value {
        Value::Null => return Err(AppError::Input(NO_JSON.to_string())),
        Value::Object(map) if map.is_empty() => return Err(AppError::Input(NO_JSON.to_string())),
        Value::Array(items) if items.is_empty() => {
            return Err(AppError::Input(NO_JSON.to_string()))
        }
        Value::Object(_) => {}
        _ => return Err(AppError::Input("Expected a JSON object".to_string())),
    }

    serde_json::from_value(value).map_err(|e| AppError::Input(format!("Invalid resume data: {e}")))
}

/// `"Jane  Doe"` → `Jane_Doe.pdf`. Characters that are unsafe in a header or
/// a file name are dropped.
fn attachment_filename(name: Option<&str>) -> String {
    let stem: String = name
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| {
            !c.is_control()
                && !matches!(c, '"' | '\\' | '/' | ':' | '*' | '?' | '<' | '>' | '|' | ';')
        })
        .collect();

    if stem.is_empty() {
        format!("{DEFAULT_FILENAME}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}

/// Non-ASCII names get an RFC 5987 `filename*` next to an ASCII fallback.
fn content_disposition(filename: &str) -> HeaderValue {
    let value = if filename.is_ascii() {
        format!("attachment; filename=\"{filename}\"")
    } else {
        let fallback: String = filename
            .chars()
            .map(|c| if c.is_ascii() { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            utf8_percent_encode(filename, ATTR_CHAR)
        )
    };
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"resume.pdf\""))
}
