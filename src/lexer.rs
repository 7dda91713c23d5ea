use crate::error::MonoError;
use crate::formatter;
use crate::html::is_html_element;
use crate::notion::{notion_spans, parse_notion, strip_notions, NotionData, NotionMode};
use crate::source::SourceFile;
use regex::Regex;
use std::sync::OnceLock;

/// The closed set of token kinds produced from canonical mono text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{` following an at-rule on the same line.
    BraceOpen,
    /// A line holding only `}`.
    BraceClose,
    /// `@media <prelude>`, brace excluded.
    MediaQuery,
    /// `@keyframes <name>`, vendor prefixes included, brace excluded.
    Keyframe,
    /// `from{`, `to{`, `40%{` or a comma-joined list of them.
    KeyframeSelector,
    /// `@font-face`, brace excluded.
    FontFace,
    /// `@charset "...";`
    Charset,
    /// `property: value;`, possibly carrying a notion.
    Declaration,
    /// One selector of a rule-set, trailing `{` or `,` removed.
    Selector,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::BraceOpen => "BRACE_OPEN",
            TokenKind::BraceClose => "BRACE_CLOSE",
            TokenKind::MediaQuery => "MEDIA_QUERY",
            TokenKind::Keyframe => "KEYFRAME",
            TokenKind::KeyframeSelector => "KEYFRAME_SELECTOR",
            TokenKind::FontFace => "FONT_FACE",
            TokenKind::Charset => "CHARSET",
            TokenKind::Declaration => "DECLARATION",
            TokenKind::Selector => "SELECTOR",
        }
    }

    /// Declarations and selectors always carry a notion slot, even when it is empty.
    pub fn carries_notion(&self) -> bool {
        matches!(self, TokenKind::Declaration | TokenKind::Selector)
    }
}

/// 1-based position of a token in the canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Line(usize),
    /// Only synthetic braces know their column.
    LineColumn(usize, usize),
}

impl Location {
    pub fn line(&self) -> usize {
        match self {
            Location::Line(line) | Location::LineColumn(line, _) => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: Location,
    pub notion: Option<NotionData>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: Location) -> Token {
        Token {
            kind,
            text: text.into(),
            location,
            notion: None,
        }
    }

    pub fn with_notion(mut self, notion: Option<NotionData>) -> Token {
        self.notion = notion;
        self
    }
}

fn at_rule_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(@media|@(?:-[a-z]+-)?keyframes|@font-face)(?:\s.*)?\{$")
            .expect("static pattern")
    })
}

fn charset_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@charset\s.*;$").expect("static pattern"))
}

fn keyframe_selector_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:from|to|\d+(?:\.\d+)?%)(?:,(?:from|to|\d+(?:\.\d+)?%))*\{$")
            .expect("static pattern")
    })
}

/// Formats `file` and tokenizes the canonical text.
///
/// # Errors
/// The first formatting or lexing violation aborts the whole file; no partial token
/// stream is returned.
pub fn tokenize(file: &SourceFile) -> Result<Vec<Token>, MonoError> {
    let canonical = formatter::format(file)?;
    Lexer::new(&canonical).tokenize()
}

/// Classifies canonical mono text line by line.
///
/// The input must already be formatted: one statement per line, `{` glued to the text
/// before it. Each line yields one token, or two for block at-rules.
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, MonoError> {
        let mut tokens = Vec::new();
        for (index, raw) in self.input.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let line = index + 1;
            self.classify(raw, trimmed, line, &mut tokens)
                .map_err(|err| err.with_code(trimmed))?;
        }
        log::debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Tries each line shape in a fixed priority order; some shapes overlap (a selector
    /// and an at-rule both end in `{`) and are told apart only by that order.
    fn classify(
        &self,
        raw: &str,
        trimmed: &str,
        line: usize,
        tokens: &mut Vec<Token>,
    ) -> Result<(), MonoError> {
        if trimmed == "}" {
            log::trace!("{line}: brace close");
            tokens.push(Token::new(TokenKind::BraceClose, "}", Location::Line(line)));
            return Ok(());
        }

        if let Some(captures) = at_rule_pattern().captures(trimmed) {
            let name = captures.get(1).map_or("", |m| m.as_str());
            let kind = if name == "@media" {
                TokenKind::MediaQuery
            } else if name == "@font-face" {
                TokenKind::FontFace
            } else {
                TokenKind::Keyframe
            };
            let text = trimmed[..trimmed.len() - 1].trim_end();
            let column = raw.rfind('{').map_or(1, |i| raw[..i].chars().count() + 1);
            log::trace!("{line}: {} {text}", kind.as_str());
            tokens.push(Token::new(kind, text, Location::Line(line)));
            tokens.push(Token::new(
                TokenKind::BraceOpen,
                "{",
                Location::LineColumn(line, column),
            ));
            return Ok(());
        }

        if charset_pattern().is_match(trimmed) {
            log::trace!("{line}: charset");
            tokens.push(Token::new(TokenKind::Charset, trimmed, Location::Line(line)));
            return Ok(());
        }

        if trimmed.starts_with('@') {
            let name = trimmed
                .split(|c: char| c.is_whitespace() || c == '{' || c == ';')
                .next()
                .unwrap_or(trimmed);
            return Err(css_error(format!("{name} is not a supported at-rule"), trimmed, line));
        }

        if trimmed.contains(':') && trimmed.ends_with(';') {
            tokens.push(self.declaration(trimmed, line)?);
            return Ok(());
        }

        if keyframe_selector_pattern().is_match(trimmed) {
            log::trace!("{line}: keyframe selector {trimmed}");
            tokens.push(Token::new(
                TokenKind::KeyframeSelector,
                trimmed,
                Location::Line(line),
            ));
            return Ok(());
        }

        if trimmed.ends_with('{') || trimmed.ends_with(',') {
            tokens.push(self.selector(trimmed, line)?);
            return Ok(());
        }

        Err(css_error("Unrecognised statement", trimmed, line))
    }

    fn declaration(&self, text: &str, line: usize) -> Result<Token, MonoError> {
        let colon = property_end(text).unwrap_or(text.len());
        let property = &text[..colon];
        let notion = parse_notion(property, NotionMode::Declaration)?;

        let value: String = text[colon..]
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if value.contains("!important") {
            return Err(MonoError::declaration(
                format!("{text} uses !important, declare a notion such as <immutable> instead"),
                "!important",
            ));
        }

        log::trace!("{line}: declaration {text}");
        Ok(Token::new(TokenKind::Declaration, text, Location::Line(line)).with_notion(notion))
    }

    fn selector(&self, text: &str, line: usize) -> Result<Token, MonoError> {
        let selector = text[..text.len() - 1].trim_end();
        let notion = parse_notion(selector, NotionMode::Selector)?;

        for fragment in selector_fragments(&strip_notions(selector)) {
            let element_end = fragment
                .find(|c: char| matches!(c, '.' | '#' | '[' | ':'))
                .unwrap_or(fragment.len());
            let element = &fragment[..element_end];
            if element.is_empty() {
                return Err(MonoError::selector(
                    format!("{fragment} is missing an element type"),
                    fragment,
                ));
            }
            if !is_html_element(element) {
                return Err(MonoError::selector(
                    format!("{element} is not a valid element type"),
                    element,
                ));
            }
        }

        log::trace!("{line}: selector {selector}");
        Ok(Token::new(TokenKind::Selector, selector, Location::Line(line)).with_notion(notion))
    }
}

fn css_error(message: impl Into<String>, line_text: &str, line: usize) -> MonoError {
    MonoError::Css {
        message: message.into(),
        offender: line_text.to_string(),
        code: line_text.to_string(),
        line,
        column: 1,
    }
}

/// Offset of the first `:` outside any notion block.
fn property_end(text: &str) -> Option<usize> {
    let spans = notion_spans(text);
    text.char_indices()
        .filter(|&(_, c)| c == ':')
        .map(|(i, _)| i)
        .find(|&i| !spans.iter().any(|&(start, end)| start <= i && i < end))
}

/// Compound selectors separated by whitespace or the `>`, `+`, `~` combinators.
fn selector_fragments(selector: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (i, c) in selector.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        let separator = depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~'));
        if separator {
            if let Some(s) = start.take() {
                fragments.push(&selector[s..i]);
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        fragments.push(&selector[s..]);
    }
    fragments
}
