//! Failure text for a compile that produced no PDF.
//!
//! Sources in priority order: the compiler's log file, captured
//! stdout/stderr, a fixed message. The result is capped to the tail, where
//! pdflatex reports the fatal error.

use std::path::Path;

use super::PassOutput;

pub const MAX_DIAGNOSTIC_BYTES: usize = 16 * 1024;
pub const NO_DIAGNOSTICS: &str = "No log file found, and stdout/stderr were empty.";

pub async fn collect(program: &str, log_path: &Path, last: &PassOutput) -> String {
    let log = tokio::fs::read(log_path)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    from_sources(program, log.as_deref(), last)
}

pub fn from_sources(program: &str, log: Option<&str>, last: &PassOutput) -> String {
    let text = match log {
        Some(log) if !log.trim().is_empty() => log.to_string(),
        _ if !last.stdout.trim().is_empty() || !last.stderr.trim().is_empty() => format!(
            "Log file was missing. Using stdout/stderr:\n\n{program} failed with {}\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
            last.exit_description(),
            last.stdout,
            last.stderr
        ),
        _ => NO_DIAGNOSTICS.to_string(),
    };
    tail(&text, MAX_DIAGNOSTIC_BYTES)
}

fn tail(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("[... {start} bytes truncated ...]\n{}", &text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(stdout: &str, stderr: &str) -> PassOutput {
        PassOutput {
            exit_code: Some(1),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_log_wins_over_streams() {
        let text = from_sources("pdflatex", Some("! Undefined control sequence."), &pass("out", "err"));
        assert_eq!(text, "! Undefined control sequence.");
    }

    #[test]
    fn test_streams_used_when_log_missing() {
        let text = from_sources("pdflatex", None, &pass("", "fatal: no fonts"));
        assert!(text.starts_with("Log file was missing."));
        assert!(text.contains("pdflatex failed with exit code 1"));
        assert!(text.contains("STDERR:\nfatal: no fonts"));
    }

    #[test]
    fn test_blank_log_counts_as_missing() {
        let text = from_sources("pdflatex", Some("  \n"), &pass("This is pdfTeX", ""));
        assert!(text.contains("STDOUT:\nThis is pdfTeX"));
    }

    #[test]
    fn test_fixed_message_when_nothing_available() {
        assert_eq!(from_sources("pdflatex", None, &pass("", " ")), NO_DIAGNOSTICS);
    }

    #[test]
    fn test_long_log_keeps_tail() {
        let log = format!("{}\n! Emergency stop.", "x".repeat(MAX_DIAGNOSTIC_BYTES * 2));
        let text = from_sources("pdflatex", Some(&log), &pass("", ""));
        assert!(text.starts_with("[... "));
        assert!(text.ends_with("! Emergency stop."));
        assert!(text.len() < MAX_DIAGNOSTIC_BYTES + 64);
    }

    #[test]
    fn test_tail_respects_char_boundaries() {
        let text = tail("ééééé", 3);
        assert!(text.ends_with("é"));
    }

    #[tokio::test]
    async fn test_collect_reads_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("job.log");
        std::fs::write(&log_path, b"! LaTeX Error: File `missing.sty' not found.\xff").unwrap();
        let text = collect("pdflatex", &log_path, &pass("", "")).await;
        assert!(text.starts_with("! LaTeX Error: File `missing.sty' not found."));
    }
}
