//! LaTeX-friendly template delimiters, translated to Tera syntax at load time.
//!
//! LaTeX uses `{`, `}`, `%` and `#` heavily, so templates are written with:
//!
//! | form            | meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `\VAR{expr}`    | interpolate `expr`                        |
//! | `\BLOCK{stmt}`  | statement (`for`, `if`, `set`, ...)       |
//! | `\#{text}`      | comment, dropped                          |
//! | `%% stmt`       | whole-line statement                      |
//! | `%# text`       | whole-line comment, dropped with the line |
//!
//! The first newline after a `\BLOCK{}` or `\#{}` tag is removed. Literal text
//! that contains `{` is wrapped in `{% raw %}` so Tera never sees LaTeX braces
//! as its own delimiters.

use thiserror::Error;

const VAR_START: &str = r"\VAR{";
const BLOCK_START: &str = r"\BLOCK{";
const COMMENT_START: &str = r"\#{";
const LINE_STATEMENT: &str = "%%";
const LINE_COMMENT: &str = "%#";

#[derive(Debug, Error, PartialEq)]
pub enum SyntaxError {
    #[error("unterminated {kind} tag starting on line {line}")]
    Unterminated { kind: &'static str, line: usize },

    #[error("empty {kind} tag on line {line}")]
    Empty { kind: &'static str, line: usize },

    #[error("literal text near line {line} contains a Tera raw-block terminator")]
    RawTerminator { line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TagKind {
    Var,
    Block,
    Comment,
}

impl TagKind {
    fn at(rest: &str) -> Option<(Self, usize)> {
        [
            (TagKind::Var, VAR_START),
            (TagKind::Block, BLOCK_START),
            (TagKind::Comment, COMMENT_START),
        ]
        .into_iter()
        .find(|(_, start)| rest.starts_with(start))
        .map(|(kind, start)| (kind, start.len()))
    }

    fn name(self) -> &'static str {
        match self {
            TagKind::Var => "variable",
            TagKind::Block => "block",
            TagKind::Comment => "comment",
        }
    }
}

/// Converts a template written with LaTeX-friendly delimiters to Tera source.
pub fn translate(source: &str) -> Result<String, SyntaxError> {
    let mut out = Output::default();
    let mut pos = 0;
    let mut line = 1;
    let mut line_start = true;

    while pos < source.len() {
        let rest = &source[pos..];

        if line_start {
            line_start = false;
            let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
            let body = rest[..line_len].trim_start_matches([' ', '\t']);

            if body.starts_with(LINE_COMMENT) {
                pos += line_len;
                line += 1;
                line_start = true;
                continue;
            }
            if let Some(stmt) = body.strip_prefix(LINE_STATEMENT) {
                let stmt = stmt.trim();
                if stmt.is_empty() {
                    return Err(SyntaxError::Empty { kind: "line statement", line });
                }
                out.tag("{%", stmt, "%}", line)?;
                pos += line_len;
                line += 1;
                line_start = true;
                continue;
            }
        }

        if let Some((kind, start_len)) = TagKind::at(rest) {
            let inner_start = pos + start_len;
            let inner_source = &source[inner_start..];
            let closing = match kind {
                TagKind::Comment => inner_source.find('}'),
                TagKind::Var | TagKind::Block => closing_brace(inner_source),
            };
            let inner_len = closing.ok_or(SyntaxError::Unterminated {
                kind: kind.name(),
                line,
            })?;
            let inner = &source[inner_start..inner_start + inner_len];
            let tag_line = line;
            line += inner.matches('\n').count();
            pos = inner_start + inner_len + 1;

            match kind {
                TagKind::Var => {
                    if inner.trim().is_empty() {
                        return Err(SyntaxError::Empty { kind: kind.name(), line: tag_line });
                    }
                    out.tag("{{", inner.trim(), "}}", tag_line)?;
                }
                TagKind::Block => {
                    if inner.trim().is_empty() {
                        return Err(SyntaxError::Empty { kind: kind.name(), line: tag_line });
                    }
                    out.tag("{%", inner.trim(), "%}", tag_line)?;
                }
                TagKind::Comment => {}
            }

            if kind != TagKind::Var {
                let after = &source[pos..];
                let newline = if after.starts_with("\r\n") {
                    2
                } else if after.starts_with('\n') {
                    1
                } else {
                    0
                };
                if newline > 0 {
                    pos += newline;
                    line += 1;
                    line_start = true;
                }
            }
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.literal.push(ch);
        pos += ch.len_utf8();
        if ch == '\n' {
            line += 1;
            line_start = true;
        }
    }

    out.finish(line)
}

/// Byte offset of the `}` closing a `\VAR` or `\BLOCK` tag whose opening
/// brace was just consumed. Nested braces and quoted strings are skipped.
/// Comments are free text and end at the first `}` instead.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' | '`' => quote = Some(ch),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

#[derive(Default)]
struct Output {
    tera: String,
    literal: String,
}

impl Output {
    fn tag(&mut self, open: &str, body: &str, close: &str, line: usize) -> Result<(), SyntaxError> {
        self.flush(line)?;
        self.tera.push_str(open);
        self.tera.push(' ');
        self.tera.push_str(body);
        self.tera.push(' ');
        self.tera.push_str(close);
        Ok(())
    }

    fn flush(&mut self, line: usize) -> Result<(), SyntaxError> {
        if self.literal.is_empty() {
            return Ok(());
        }
        if self.literal.contains('{') {
            if self.literal.contains("endraw") {
                return Err(SyntaxError::RawTerminator { line });
            }
            self.tera.push_str("{% raw %}");
            self.tera.push_str(&self.literal);
            self.tera.push_str("{% endraw %}");
        } else {
            self.tera.push_str(&self.literal);
        }
        self.literal.clear();
        Ok(())
    }

    fn finish(mut self, line: usize) -> Result<String, SyntaxError> {
        self.flush(line)?;
        Ok(self.tera)
    }
}
