//! LaTeX escaping for interpolated values.
//!
//! `escape_latex` is installed as the Tera autoescape function, so every
//! `\VAR{...}` is escaped unless it ends in `| safe`. URLs are passed through
//! `latex_url` (and then marked safe) because `\href` needs them mostly verbatim.

use std::collections::HashMap;

use tera::{Result, Value};

/// Escapes every character LaTeX treats as syntax. Line breaks become spaces
/// so a value can never end a paragraph inside a macro argument.
pub fn escape_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '<' => out.push_str(r"\textless{}"),
            '>' => out.push_str(r"\textgreater{}"),
            '\n' | '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Escapes a URL for use as the first argument of `\href`.
pub fn escape_url(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            '%' | '#' | '&' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            '\\' | '{' | '}' | '^' | '"' | '<' | '>' | '|' | '$' | '`' | ' ' => {
                out.push_str(&format!("\\%{:02X}", ch as u32));
            }
            c if c.is_control() || c.is_whitespace() => {}
            c => out.push(c),
        }
    }
    out
}

/// Tera filter wrapping [`escape_url`].
pub fn latex_url(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("latex_url filter expects a string"))?;
    Ok(Value::String(escape_url(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_latex_special_characters() {
        assert_eq!(escape_latex("R&D 100% #1"), r"R\&D 100\% \#1");
        assert_eq!(escape_latex("snake_case {x}"), r"snake\_case \{x\}");
        assert_eq!(escape_latex("$5 ~ 2^3"), r"\$5 \textasciitilde{} 2\textasciicircum{}3");
        assert_eq!(escape_latex("a<b>c"), r"a\textless{}b\textgreater{}c");
    }

    #[test]
    fn test_escape_latex_neutralises_commands() {
        let escaped = escape_latex(r"\immediate\write18{rm -rf ~}");
        assert!(!escaped.contains(r"\immediate"));
        assert!(!escaped.contains(r"\write18"));
        assert!(escaped.starts_with(r"\textbackslash{}immediate"));
    }

    #[test]
    fn test_escape_latex_flattens_line_breaks() {
        assert_eq!(escape_latex("line one\nline two\r\n"), "line one line two ");
    }

    #[test]
    fn test_escape_latex_keeps_unicode() {
        assert_eq!(escape_latex("Zoë Müller"), "Zoë Müller");
    }

    #[test]
    fn test_escape_url_keeps_ordinary_urls() {
        assert_eq!(
            escape_url("https://github.com/jane_doe/repo-name"),
            "https://github.com/jane_doe/repo-name"
        );
    }

    #[test]
    fn test_escape_url_escapes_tex_specials() {
        assert_eq!(
            escape_url("https://x.io/a?b=1&c=50%#top"),
            r"https://x.io/a?b=1\&c=50\%\#top"
        );
        assert_eq!(escape_url("https://x.io/}\\write18{"), r"https://x.io/\%7D\%5Cwrite18\%7B");
    }

    #[test]
    fn test_latex_url_filter_rejects_non_strings() {
        assert!(latex_url(&Value::from(3), &HashMap::new()).is_err());
        assert_eq!(
            latex_url(&Value::from("https://a.b/#x"), &HashMap::new()).unwrap(),
            Value::from(r"https://a.b/\#x")
        );
    }
}
