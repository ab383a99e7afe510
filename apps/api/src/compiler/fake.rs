//! Shell-script stand-ins for pdflatex, shared by compiler and endpoint tests.
//! Tests that spawn them are `#[serial]` so no other test forks while a
//! script is still open for writing.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable script into `dir`. The body sees `$base`, the source
/// path without `.tex`; every invocation appends a line to `dir/calls`.
pub fn fake_compiler(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-pdflatex");
    let script = format!(
        "#!/bin/sh\nfor last; do :; done\nbase=\"${{last%.tex}}\"\necho run >> \"{}\"\n{body}\n",
        dir.join("calls").display()
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A compiler that always succeeds, writing the base name into the PDF.
pub fn succeeding_compiler(dir: &Path) -> PathBuf {
    fake_compiler(
        dir,
        "printf '%%PDF-1.4 %s' \"$base\" > \"$base.pdf\"\necho done > \"$base.log\"\necho aux > \"$base.aux\"",
    )
}

pub fn calls(dir: &Path) -> usize {
    std::fs::read_to_string(dir.join("calls"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}
