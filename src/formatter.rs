//! Normalizes a compile unit into the canonical line layout the lexer expects.

use crate::error::MonoError;
use crate::notion::notion_spans;
use crate::printer::{self, PrintError};
use crate::source::SourceFile;
use regex::Regex;
use std::sync::OnceLock;

fn space_before_brace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+\{$").expect("static pattern"))
}

/// Formats `file` into canonical form.
///
/// Notion blocks are tightened first so the printer sees them as single words, then the
/// CSS is printed one statement per line and tidied.
///
/// # Errors
/// Returns `MonoError::Css` when the file is not valid CSS once notions are set aside.
pub fn format(file: &SourceFile) -> Result<String, MonoError> {
    format_source(&file.source).map_err(|err| {
        log::debug!("{} failed to format: {err}", file.name);
        err
    })
}

/// [`format`] over bare text.
///
/// # Errors
/// See [`format`].
pub fn format_source(source: &str) -> Result<String, MonoError> {
    let tightened = tighten_notions(source);
    let printed = printer::print(&tightened).map_err(css_error)?;
    Ok(tidy(&printed))
}

fn css_error(err: PrintError) -> MonoError {
    MonoError::Css {
        message: err.reason,
        offender: err.excerpt.clone(),
        code: err.excerpt,
        line: err.line,
        column: err.column,
    }
}

/// Removes whitespace inside `<...>` blocks, leaving quoted reasons untouched.
pub fn tighten_notions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in notion_spans(text) {
        out.push_str(&text[last..start]);
        let mut quote: Option<char> = None;
        for c in text[start..end].chars() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                    out.push(c);
                }
                None if c == '"' || c == '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                None if c.is_whitespace() => {}
                None => out.push(c),
            }
        }
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

/// Drops blank lines, pulls `{` onto the preceding text and terminates the last line.
fn tidy(printed: &str) -> String {
    let mut out = String::with_capacity(printed.len());
    for line in printed.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(&space_before_brace().replace(line.trim_end(), "{"));
        out.push('\n');
    }
    out
}
