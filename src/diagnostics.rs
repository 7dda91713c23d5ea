//! Maps errors found in canonical text back to the lines the author wrote.
//!
//! The formatter collapses whitespace, merges and splits lines, so an error's `code` rarely
//! appears verbatim in the original file. Both sides are normalized (lower case, no
//! whitespace, one quote style) before comparing. The first line that matches wins, even
//! when several lines normalize identically.

use crate::error::MonoError;
use crate::source::SourceFile;
use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, Report, SourceSpan,
};
use thiserror::Error;

/// A resolved original line and its rendered snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeError {
    /// 1-based line in the original source.
    pub line_number: usize,
    /// `"<n> | <line>"` followed by a caret line under the fragment.
    pub snippet: String,
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

/// 0-based index of the first original line matching `code` and containing `fragment`.
fn matching_line(source: &str, code: &str, fragment: &str) -> Option<usize> {
    let needle = normalize(code);
    let fragment = normalize(fragment);
    let candidates: Vec<(usize, String)> = source
        .lines()
        .map(normalize)
        .enumerate()
        .filter(|(_, line)| !line.is_empty() && line.contains(&fragment))
        .collect();

    candidates
        .iter()
        .find(|(_, line)| *line == needle)
        .or_else(|| {
            candidates
                .iter()
                .find(|(_, line)| needle.contains(line.as_str()) || line.contains(&needle))
        })
        .map(|(index, _)| *index)
}

/// Resolves the original line behind a normalized `code` line and renders it with carets
/// under `fragment`. Returns `None` when no line matches.
pub fn code_error(file: &SourceFile, code: &str, fragment: &str) -> Option<CodeError> {
    let index = matching_line(&file.source, code, fragment)?;
    let line = file.source.lines().nth(index)?;
    let line_number = index + 1;

    let block = format!("{line_number} | {line}");
    let (start, width) = match find_ignore_case(&block, fragment) {
        Some(start) => (start, fragment.chars().count()),
        None => {
            let prefix = block.chars().count() - line.chars().count();
            let indent = line.chars().take_while(|c| c.is_whitespace()).count();
            (prefix + indent, line.trim().chars().count())
        }
    };
    let carets = format!("{}{}", " ".repeat(start), "^".repeat(width.max(1)));

    Some(CodeError {
        line_number,
        snippet: format!("{block}\n{carets}"),
    })
}

/// Char offset of `needle` in `haystack`, ignoring case.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let haystack = haystack.to_lowercase();
    let byte = haystack.find(&needle.to_lowercase())?;
    Some(haystack[..byte].chars().count())
}

/// Plain text rendering used by the log channel: heading, file name, snippet and tip.
pub fn render(file: &SourceFile, err: &MonoError) -> String {
    let mut out = format!("{} {}\n - {}\n", err.title(), err, file.name);
    if let Some(code) = err.code() {
        if let Some(found) = code_error(file, code, err.offender()) {
            out.push('\n');
            out.push_str(&found.snippet);
            out.push('\n');
        }
    }
    if let Some(help) = Diagnostic::help(err) {
        out.push_str(&format!("\nTip: {help}\n"));
    }
    out
}

#[derive(Error, Debug, Diagnostic)]
#[error("{title} {message}")]
pub struct SourceDiagnostic {
    title: &'static str,
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{offender}")]
    span: Option<SourceSpan>,
    offender: String,
    #[help]
    help: Option<String>,
}

/// Byte span of the offender inside the resolved original line.
fn offender_span(file: &SourceFile, err: &MonoError) -> Option<SourceSpan> {
    let code = err.code()?;
    let index = matching_line(&file.source, code, err.offender())?;

    let mut start = 0;
    for line in file.source.split_inclusive('\n').take(index) {
        start += line.len();
    }
    let line = file.source.lines().nth(index)?;

    let lowered = line.to_lowercase();
    let (offset, len) = match lowered.find(&err.offender().to_lowercase()) {
        Some(offset) if lowered.len() == line.len() && !err.offender().is_empty() => {
            (offset, err.offender().len())
        }
        _ => {
            let indent = line.len() - line.trim_start().len();
            (indent, line.trim().len())
        }
    };
    Some(SourceSpan::new((start + offset).into(), len))
}

/// A miette report carrying the original source, labelled at the offending fragment.
pub fn report(file: &SourceFile, err: &MonoError) -> Report {
    Report::new(SourceDiagnostic {
        title: err.title(),
        message: err.to_string(),
        src: NamedSource::new(file.name.clone(), file.source.clone()),
        span: offender_span(file, err),
        offender: err.offender().to_string(),
        help: Diagnostic::help(err).map(|h| h.to_string()),
    })
}

/// [`report`] rendered through miette's graphical handler.
pub fn render_fancy(file: &SourceFile, err: &MonoError) -> String {
    let report = report(file, err);
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut buffer = String::new();
    match handler.render_report(&mut buffer, &*report) {
        Ok(()) => buffer,
        Err(_) => render(file, err),
    }
}
