//! CSS-aware pretty-printer the formatter delegates to.
//!
//! The input is tokenized with `cssparser`, which takes care of strings, comments, escapes
//! and bracket nesting. Each statement is read into a flat list of [`Piece`]s, checked for
//! the mistakes a CSS parser would reject, and printed back in one canonical layout: one
//! statement per line, two spaces of indentation per nesting level and no whitespace
//! before `{`. Notion blocks are folded into a single piece glued to the property or
//! selector they annotate.

use crate::utils::{get_line_and_column, line_at};
use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};
use thiserror::Error;

const INDENT: &str = "  ";

/// A located reason why the input is not CSS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} ({line}:{column})")]
pub struct PrintError {
    pub reason: String,
    pub line: usize,
    pub column: usize,
    /// The trimmed input line the error points at.
    pub excerpt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// Rules and block at-rules, e.g. the stylesheet itself or `@media`.
    Rules,
    /// Keyframe rules inside `@keyframes`.
    Keyframes,
    /// Declarations inside a rule, a keyframe or `@font-face`.
    Declarations,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Rule {
        selectors: Vec<String>,
        body: Vec<Node>,
    },
    AtRule {
        name: String,
        prelude: String,
        body: Option<(BlockKind, Vec<Node>)>,
    },
    Declaration {
        property: String,
        value: String,
    },
}

/// One token of a statement, reduced to what the layout cares about.
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    /// Whitespace or a comment.
    Space { line_break: bool },
    /// Any other token, spelled as it appears in the input.
    Word(String),
    Comma,
    Colon,
    /// `<`, `>`, `+` or `~`: notion brackets and selector combinators.
    Delim { c: char, at: SourcePosition },
    Block {
        open: String,
        close: char,
        inner: Vec<Piece>,
    },
    /// A folded `<...>` block without insignificant whitespace.
    Notion(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Terminator {
    Semicolon,
    /// A `{` opened at the given position.
    Block(SourcePosition),
    End,
}

/// The pieces of a statement read up to its terminator.
struct Chunk {
    pieces: Vec<Piece>,
    start: SourcePosition,
    end: Terminator,
}

pub struct Printer<'a> {
    input: &'a str,
}

/// Validates `input` as CSS and prints it in canonical form.
///
/// # Errors
/// Returns a `PrintError` locating the first construct that is not valid CSS.
pub fn print(input: &str) -> Result<String, PrintError> {
    Printer::new(input).print()
}

impl<'a> Printer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    pub fn print(&self) -> Result<String, PrintError> {
        let mut input = ParserInput::new(self.input);
        let mut parser = Parser::new(&mut input);
        let nodes = self.parse_block(&mut parser, BlockKind::Rules)?;
        let mut out = String::with_capacity(self.input.len());
        emit(&nodes, BlockKind::Rules, 0, &mut out);
        Ok(out)
    }

    // === Statements ===

    fn parse_block(
        &self,
        parser: &mut Parser<'_, '_>,
        kind: BlockKind,
    ) -> Result<Vec<Node>, PrintError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia(parser)?;
            let start = parser.position();
            let state = parser.state();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return Ok(nodes),
            };
            match token {
                Token::Semicolon => {}
                Token::CloseCurlyBracket => return Err(self.error_at(start, "Unexpected }")),
                Token::Delim('@') => return Err(self.error_at(start, "At-rule without a name")),
                Token::AtKeyword(name) => {
                    let name = name.to_ascii_lowercase();
                    nodes.push(self.parse_at_rule(parser, kind, name, start)?);
                }
                _ => {
                    parser.reset(&state);
                    nodes.push(self.parse_statement(parser, kind)?);
                }
            }
        }
    }

    /// A rule (`prelude { ... }`) or a declaration, depending on how the chunk ends.
    fn parse_statement(
        &self,
        parser: &mut Parser<'_, '_>,
        kind: BlockKind,
    ) -> Result<Node, PrintError> {
        let chunk = self.read_chunk(parser)?;
        match chunk.end {
            Terminator::Block(open) => {
                if kind == BlockKind::Declarations {
                    return Err(self.error_at(chunk.start, "Nested rules are not supported"));
                }
                let folded = self.fold_notions(&chunk.pieces)?;
                let selectors: Vec<String> = split_commas(&folded)
                    .into_iter()
                    .map(render_selector)
                    .collect();
                if selectors.iter().any(String::is_empty) {
                    return Err(self.error_at(open, "Missing selector"));
                }
                let body = self.block(parser, open, BlockKind::Declarations)?;
                Ok(Node::Rule { selectors, body })
            }
            _ if kind != BlockKind::Declarations => {
                Err(self.error_at(chunk.start, "Unknown word"))
            }
            _ => self.parse_declaration(&chunk),
        }
    }

    fn parse_declaration(&self, chunk: &Chunk) -> Result<Node, PrintError> {
        let Some(colon) = top_level_colon(&chunk.pieces) else {
            return Err(self.error_at(chunk.start, "Unknown word"));
        };
        let property = self.property(&chunk.pieces[..colon], chunk.start)?;

        let rest = trim_spaces(&chunk.pieces[colon + 1..]);
        if rest.first() == Some(&Piece::Colon) {
            return Err(self.error_at(chunk.start, "Double colon"));
        }
        self.reject_stray_brackets(rest)?;
        let value = render_value(rest);
        if value.is_empty() {
            return Err(self.error_at(chunk.start, "Missing value"));
        }

        Ok(Node::Declaration { property, value })
    }

    /// A property name followed by the notion blocks annotating it. Counting the blocks is
    /// left to the lexer.
    fn property(&self, pieces: &[Piece], start: SourcePosition) -> Result<String, PrintError> {
        let folded = self.fold_notions(pieces)?;
        let pieces = trim_spaces(&folded);
        let split = pieces
            .iter()
            .position(|piece| matches!(piece, Piece::Notion(_)))
            .unwrap_or(pieces.len());
        let (name, notions) = pieces.split_at(split);
        let name = trim_spaces(name);
        if name.is_empty() {
            return Err(self.error_at(start, "Missing property"));
        }

        let mut property = String::new();
        for piece in name {
            match piece {
                Piece::Word(word) => property.push_str(word),
                _ => return Err(self.error_at(start, "Unknown word")),
            }
        }
        for piece in notions {
            match piece {
                Piece::Notion(notion) => property.push_str(notion),
                Piece::Space { .. } => {}
                _ => return Err(self.error_at(start, "Unknown word")),
            }
        }
        Ok(property)
    }

    fn parse_at_rule(
        &self,
        parser: &mut Parser<'_, '_>,
        kind: BlockKind,
        name: String,
        start: SourcePosition,
    ) -> Result<Node, PrintError> {
        let chunk = self.read_chunk(parser)?;
        self.reject_stray_brackets(&chunk.pieces)?;
        let prelude = render_prelude(&chunk.pieces);
        match chunk.end {
            Terminator::Semicolon => Ok(Node::AtRule {
                name,
                prelude,
                body: None,
            }),
            Terminator::Block(open) => {
                if kind != BlockKind::Rules {
                    return Err(self.error_at(start, "Nested rules are not supported"));
                }
                let body_kind = block_kind_for(&name);
                let body = self.block(parser, open, body_kind)?;
                Ok(Node::AtRule {
                    name,
                    prelude,
                    body: Some((body_kind, body)),
                })
            }
            Terminator::End => Err(self.error_at(start, "Unterminated at-rule")),
        }
    }

    /// Parses the `{ ... }` block whose opening brace was just consumed.
    fn block(
        &self,
        parser: &mut Parser<'_, '_>,
        open: SourcePosition,
        kind: BlockKind,
    ) -> Result<Vec<Node>, PrintError> {
        let (nodes, end) = self.nested(parser, open, |p| {
            let nodes = self.parse_block(p, kind)?;
            Ok((nodes, p.position()))
        })?;
        // cssparser closes blocks silently at end of input
        if parser.slice_from(end).is_empty() {
            return Err(self.error_at(open, "Unclosed block"));
        }
        Ok(nodes)
    }

    // === Pieces ===

    fn read_chunk(&self, parser: &mut Parser<'_, '_>) -> Result<Chunk, PrintError> {
        let start = parser.position();
        let mut pieces = Vec::new();
        loop {
            let at = parser.position();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => {
                    return Ok(Chunk {
                        pieces,
                        start,
                        end: Terminator::End,
                    })
                }
            };
            let end = match token {
                Token::Semicolon => Terminator::Semicolon,
                Token::CurlyBracketBlock => Terminator::Block(at),
                Token::CloseCurlyBracket => return Err(self.error_at(at, "Unexpected }")),
                token => {
                    pieces.push(self.piece(parser, token, at)?);
                    continue;
                }
            };
            return Ok(Chunk { pieces, start, end });
        }
    }

    /// The contents of a `(...)` or `[...]` block opened at `open`.
    fn read_inner(
        &self,
        parser: &mut Parser<'_, '_>,
        open: SourcePosition,
    ) -> Result<Vec<Piece>, PrintError> {
        let mut pieces = Vec::new();
        loop {
            let at = parser.position();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return Ok(pieces),
            };
            match token {
                Token::Semicolon | Token::CurlyBracketBlock | Token::CloseCurlyBracket => {
                    return Err(self.error_at(open, "Unclosed bracket"));
                }
                token => pieces.push(self.piece(parser, token, at)?),
            }
        }
    }

    fn piece(
        &self,
        parser: &mut Parser<'_, '_>,
        token: Token<'_>,
        at: SourcePosition,
    ) -> Result<Piece, PrintError> {
        let piece = match token {
            Token::WhiteSpace(space) => Piece::Space {
                line_break: space.contains('\n'),
            },
            Token::Comment(_) => {
                self.check_comment(parser, at)?;
                Piece::Space { line_break: false }
            }
            Token::Comma => Piece::Comma,
            Token::Colon => Piece::Colon,
            Token::Delim(c @ ('<' | '>' | '+' | '~')) => Piece::Delim { c, at },
            Token::QuotedString(_) => {
                let raw = parser.slice_from(at);
                if !is_closed_string(raw) {
                    return Err(self.error_at(at, "Unclosed string"));
                }
                Piece::Word(raw.to_string())
            }
            Token::BadString(_) => return Err(self.error_at(at, "Unclosed string")),
            Token::UnquotedUrl(_) => {
                let raw = parser.slice_from(at);
                if !raw.ends_with(')') {
                    return Err(self.error_at(at, "Unclosed bracket"));
                }
                Piece::Word(raw.to_string())
            }
            Token::BadUrl(_) => return Err(self.error_at(at, "Unknown word")),
            Token::Function(_) | Token::ParenthesisBlock => self.bracket(parser, at, ')')?,
            Token::SquareBracketBlock => self.bracket(parser, at, ']')?,
            Token::CloseParenthesis => return Err(self.error_at(at, "Unexpected )")),
            Token::CloseSquareBracket => return Err(self.error_at(at, "Unexpected ]")),
            _ => Piece::Word(parser.slice_from(at).to_string()),
        };
        Ok(piece)
    }

    fn bracket(
        &self,
        parser: &mut Parser<'_, '_>,
        open: SourcePosition,
        close: char,
    ) -> Result<Piece, PrintError> {
        let opener = parser.slice_from(open).to_string();
        let (inner, end) = self.nested(parser, open, |p| {
            let inner = self.read_inner(p, open)?;
            Ok((inner, p.position()))
        })?;
        if parser.slice_from(end).is_empty() {
            return Err(self.error_at(open, "Unclosed bracket"));
        }
        Ok(Piece::Block {
            open: opener,
            close,
            inner,
        })
    }

    /// Replaces every `<` ... `>` run with a single [`Piece::Notion`].
    fn fold_notions(&self, pieces: &[Piece]) -> Result<Vec<Piece>, PrintError> {
        let mut folded = Vec::with_capacity(pieces.len());
        let mut iter = pieces.iter();
        while let Some(piece) = iter.next() {
            let Piece::Delim { c: '<', at } = piece else {
                folded.push(piece.clone());
                continue;
            };
            let mut notion = String::from("<");
            loop {
                match iter.next() {
                    None => return Err(self.error_at(*at, "Unclosed notion")),
                    Some(Piece::Delim { c: '>', .. }) => break,
                    Some(inner) => push_tight(&mut notion, inner),
                }
            }
            notion.push('>');
            folded.push(Piece::Notion(notion));
        }
        Ok(folded)
    }

    /// Values and preludes never carry notions, so a `<` there is a typo.
    fn reject_stray_brackets(&self, pieces: &[Piece]) -> Result<(), PrintError> {
        match pieces.iter().find_map(|piece| match piece {
            Piece::Delim { c: '<', at } => Some(*at),
            _ => None,
        }) {
            Some(at) => Err(self.error_at(at, "Unexpected <")),
            None => Ok(()),
        }
    }

    // === Parser helpers ===

    /// Runs `parse` over the block that was just opened at `open`.
    fn nested<'i, T>(
        &self,
        parser: &mut Parser<'i, '_>,
        open: SourcePosition,
        parse: impl for<'tt> FnOnce(&mut Parser<'i, 'tt>) -> Result<T, PrintError>,
    ) -> Result<T, PrintError> {
        parser
            .parse_nested_block(|p| parse(p).map_err(|err| p.new_custom_error(err)))
            .map_err(|err: ParseError<'i, PrintError>| match err.kind {
                ParseErrorKind::Custom(err) => err,
                ParseErrorKind::Basic(_) => self.error_at(open, "Unclosed block"),
            })
    }

    fn skip_trivia(&self, parser: &mut Parser<'_, '_>) -> Result<(), PrintError> {
        loop {
            let state = parser.state();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return Ok(()),
            };
            match token {
                Token::WhiteSpace(_) => {}
                Token::Comment(_) => self.check_comment(parser, state.position())?,
                _ => {
                    parser.reset(&state);
                    return Ok(());
                }
            }
        }
    }

    fn check_comment(&self, parser: &Parser<'_, '_>, at: SourcePosition) -> Result<(), PrintError> {
        let raw = parser.slice_from(at);
        if raw.len() < 4 || !raw.ends_with("*/") {
            return Err(self.error_at(at, "Unclosed comment"));
        }
        Ok(())
    }

    fn error_at(&self, position: SourcePosition, reason: impl Into<String>) -> PrintError {
        let offset = position.byte_index();
        let (line, column) = get_line_and_column(self.input, offset);
        PrintError {
            reason: reason.into(),
            line,
            column,
            excerpt: line_at(self.input, offset).trim().to_string(),
        }
    }
}

fn block_kind_for(name: &str) -> BlockKind {
    // `-webkit-keyframes` behaves like `keyframes`
    let base = if name.starts_with('-') {
        name.splitn(3, '-').nth(2).unwrap_or(name)
    } else {
        name
    };
    match base {
        "media" | "supports" | "document" | "layer" | "container" | "scope" => BlockKind::Rules,
        "keyframes" => BlockKind::Keyframes,
        _ => BlockKind::Declarations,
    }
}

/// cssparser ends strings at end of input without complaint.
fn is_closed_string(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(quote) = chars.next() else {
        return false;
    };
    let body = chars.as_str();
    let Some(inner) = body.strip_suffix(quote) else {
        return false;
    };
    inner.chars().rev().take_while(|&c| c == '\\').count() % 2 == 0
}

fn top_level_colon(pieces: &[Piece]) -> Option<usize> {
    let mut in_notion = false;
    for (index, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Delim { c: '<', .. } => in_notion = true,
            Piece::Delim { c: '>', .. } => in_notion = false,
            Piece::Colon if !in_notion => return Some(index),
            _ => {}
        }
    }
    None
}

fn trim_spaces(pieces: &[Piece]) -> &[Piece] {
    let is_space = |piece: &Piece| matches!(piece, Piece::Space { .. });
    let start = pieces.iter().position(|p| !is_space(p)).unwrap_or(pieces.len());
    let end = pieces.iter().rposition(|p| !is_space(p)).map_or(start, |i| i + 1);
    &pieces[start..end]
}

fn split_commas(pieces: &[Piece]) -> Vec<&[Piece]> {
    pieces.split(|piece| *piece == Piece::Comma).collect()
}

// === Rendering ===

fn push_tight(out: &mut String, piece: &Piece) {
    match piece {
        Piece::Space { .. } => {}
        Piece::Block { open, close, inner } => {
            out.push_str(open);
            for piece in inner {
                push_tight(out, piece);
            }
            out.push(*close);
        }
        other => push_text(out, other, render_value),
    }
}

/// Text of a non-space piece. `inner` renders the contents of a bracket block.
fn push_text(out: &mut String, piece: &Piece, inner: fn(&[Piece]) -> String) {
    match piece {
        Piece::Space { .. } => {}
        Piece::Word(word) | Piece::Notion(word) => out.push_str(word),
        Piece::Comma => out.push(','),
        Piece::Colon => out.push(':'),
        Piece::Delim { c, .. } => out.push(*c),
        Piece::Block {
            open,
            close,
            inner: pieces,
        } => {
            out.push_str(open);
            out.push_str(&inner(pieces));
            out.push(*close);
        }
    }
}

/// Collapses whitespace runs to one space. Whitespace inside the ends of a bracket
/// block, before `,` and line breaks after `,` are removed.
fn render_value(pieces: &[Piece]) -> String {
    render_spaced(pieces, false)
}

fn render_feature(pieces: &[Piece]) -> String {
    render_spaced(pieces, true)
}

/// With `spaced_colons`, every `:` is followed by exactly one space (`(min-width: 600px)`).
fn render_spaced(pieces: &[Piece], spaced_colons: bool) -> String {
    let inner = if spaced_colons {
        render_feature
    } else {
        render_value
    };
    let mut out = String::new();
    let mut pending: Option<bool> = None;
    let mut after_comma = false;

    for piece in pieces {
        match piece {
            Piece::Space { line_break } => {
                pending = Some(pending.unwrap_or(false) || *line_break);
            }
            Piece::Comma => {
                out.push(',');
                pending = None;
                after_comma = true;
            }
            Piece::Colon if spaced_colons => {
                out.push(':');
                pending = Some(false);
                after_comma = false;
            }
            other => {
                if let Some(line_break) = pending.take() {
                    if !out.is_empty() && !(line_break && after_comma) {
                        out.push(' ');
                    }
                }
                after_comma = false;
                push_text(&mut out, other, inner);
            }
        }
    }
    out
}

/// Collapsed whitespace, with `feature: value` spacing inside parentheses.
fn render_prelude(pieces: &[Piece]) -> String {
    let mut out = String::new();
    let mut pending = false;
    for piece in trim_spaces(pieces) {
        if let Piece::Space { .. } = piece {
            pending = true;
            continue;
        }
        if pending && !out.is_empty() {
            out.push(' ');
        }
        pending = false;
        push_text(&mut out, piece, render_feature);
    }
    out
}

/// Collapses whitespace and spaces combinators as `a > b`, `a + b`, `a ~ b`. Notions
/// stay glued to the compound they annotate.
fn render_selector(pieces: &[Piece]) -> String {
    let mut out = String::new();
    let mut pending = false;
    for piece in pieces {
        match piece {
            Piece::Space { .. } => pending = true,
            Piece::Delim {
                c: c @ ('>' | '+' | '~'),
                ..
            } => {
                let kept = out.trim_end().len();
                out.truncate(kept);
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push(*c);
                out.push(' ');
                pending = false;
            }
            Piece::Notion(notion) => {
                out.push_str(notion);
                pending = false;
            }
            other => {
                if pending && !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                pending = false;
                push_text(&mut out, other, render_value);
            }
        }
    }
    out.trim_end().to_string()
}

// === Printing ===

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn emit(nodes: &[Node], kind: BlockKind, depth: usize, out: &mut String) {
    for node in nodes {
        match node {
            Node::Rule { selectors, body } => {
                if kind == BlockKind::Keyframes {
                    push_line(out, depth, &format!("{}{{", selectors.join(",")));
                } else {
                    let last = selectors.len().saturating_sub(1);
                    for (i, selector) in selectors.iter().enumerate() {
                        let end = if i == last { '{' } else { ',' };
                        push_line(out, depth, &format!("{selector}{end}"));
                    }
                }
                emit(body, BlockKind::Declarations, depth + 1, out);
                push_line(out, depth, "}");
            }
            Node::AtRule {
                name,
                prelude,
                body,
            } => {
                let head = if prelude.is_empty() {
                    format!("@{name}")
                } else {
                    format!("@{name} {prelude}")
                };
                match body {
                    None => push_line(out, depth, &format!("{head};")),
                    Some((body_kind, body)) => {
                        push_line(out, depth, &format!("{head}{{"));
                        emit(body, *body_kind, depth + 1, out);
                        push_line(out, depth, "}");
                    }
                }
            }
            Node::Declaration { property, value } => {
                push_line(out, depth, &format!("{property}: {value};"));
            }
        }
    }
}
