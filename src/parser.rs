use crate::error::MonoError;
use crate::lexer::{Token, TokenKind};
use crate::notion::{strip_notions, NotionData, NotionType};

const INDENT: &str = "  ";

/// Emits plain CSS from a token stream, surfacing every notion as a trailing comment.
///
/// # Errors
/// Returns `MonoError::Type` when a grouped selector carries a notion.
pub fn parse(tokens: &[Token]) -> Result<String, MonoError> {
    Parser::new(tokens).parse()
}

/// Walks the tokens once, in order. The only state carried between tokens is the nesting
/// depth and the type inferred from the selector of the current rule-set.
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    inferred: Option<NotionType>,
    lines: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
            inferred: None,
            lines: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<String, MonoError> {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.position) {
            self.parse_token(token)?;
            self.position += 1;
        }
        log::debug!("emitted {} lines of css", self.lines.len());

        if self.lines.is_empty() {
            return Ok(String::new());
        }
        let mut css = self.lines.join("\n");
        css.push('\n');
        Ok(css)
    }

    fn parse_token(&mut self, token: &Token) -> Result<(), MonoError> {
        match token.kind {
            TokenKind::MediaQuery | TokenKind::Keyframe | TokenKind::FontFace => {
                self.push_line(&token.text);
            }
            TokenKind::BraceOpen => {
                match self.lines.last_mut() {
                    Some(line) => line.push('{'),
                    None => self.lines.push("{".to_string()),
                }
                self.depth += 1;
            }
            TokenKind::Charset => self.push_line(&token.text),
            TokenKind::KeyframeSelector => {
                self.push_line(&token.text);
                self.depth += 1;
            }
            TokenKind::BraceClose => {
                self.depth = self.depth.saturating_sub(1);
                self.push_line("}");
                self.inferred = None;
            }
            TokenKind::Declaration => self.parse_declaration(token),
            TokenKind::Selector => self.parse_selector(token)?,
        }
        Ok(())
    }

    fn parse_declaration(&mut self, token: &Token) {
        let notion = match (&token.notion, self.inferred) {
            (Some(explicit), inferred) => {
                let mut notion = explicit.clone();
                if notion.notion_type.is_none() {
                    notion.notion_type = inferred;
                }
                Some(notion)
            }
            (None, Some(inferred)) => Some(NotionData {
                notion_type: Some(inferred),
                ..NotionData::default()
            }),
            (None, None) => None,
        };

        match notion.filter(|n| !n.is_empty()) {
            Some(notion) => {
                let line = format!(
                    "{} {}",
                    strip_notions(&token.text),
                    notion_comment(&notion)
                );
                self.push_line(&line);
            }
            None => self.push_line(&token.text),
        }
    }

    fn parse_selector(&mut self, token: &Token) -> Result<(), MonoError> {
        let grouped = self.previous_is(TokenKind::Selector) || self.next_is(TokenKind::Selector);
        if token.notion.is_some() && grouped {
            return Err(MonoError::type_error(
                format!("{} cannot infer a type in a grouped selector", token.text),
                token.text.clone(),
            ));
        }

        self.inferred = token.notion.as_ref().and_then(|n| n.notion_type);

        let selector = strip_notions(&token.text);
        let selector = selector.trim_end();
        if self.next_is(TokenKind::Selector) {
            self.push_line(&format!("{selector},"));
        } else {
            self.push_line(&format!("{selector}{{"));
            self.depth += 1;
        }
        Ok(())
    }

    // === Helper Methods ===

    fn push_line(&mut self, text: &str) {
        self.lines
            .push(format!("{}{}", INDENT.repeat(self.depth), text));
    }

    fn previous_is(&self, kind: TokenKind) -> bool {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .is_some_and(|t| t.kind == kind)
    }

    fn next_is(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.position + 1)
            .is_some_and(|t| t.kind == kind)
    }
}

/// `/* IMMUTABLE, OVERRIDE, PATCH, 'eng-1' */`. A `*/` inside a reason would close the
/// comment early, so it is broken up.
fn notion_comment(notion: &NotionData) -> String {
    let slots: Vec<String> = notion
        .slots()
        .into_iter()
        .map(|slot| slot.replace("*/", "* /"))
        .collect();
    format!("/* {} */", slots.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, Location};

    fn compile(canonical: &str) -> Result<String, MonoError> {
        let tokens = Lexer::new(canonical).tokenize()?;
        parse(&tokens)
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(parse(&[]).unwrap(), "");
    }

    #[test]
    fn test_declaration_comment() {
        let css = compile("div.hidden{\n  display<immutable>: none;\n}\n").unwrap();
        assert_eq!(css, "div.hidden{\n  display: none; /* IMMUTABLE */\n}\n");
    }

    #[test]
    fn test_all_slots_in_order() {
        let css =
            compile("a{\n  color<public,@override,?patch('eng-1')>: red;\n}\n").unwrap();
        assert_eq!(
            css,
            "a{\n  color: red; /* PUBLIC, OVERRIDE, PATCH, 'eng-1' */\n}\n"
        );
    }

    #[test]
    fn test_inferred_type() {
        let css = compile(
            "img.avatar<immutable>{\n  height: 40px;\n  width<?veto>: 40px;\n  margin<protected>: 0;\n}\np{\n  color: red;\n}\n",
        )
        .unwrap();
        assert_eq!(
            css,
            "img.avatar{\n  height: 40px; /* IMMUTABLE */\n  width: 40px; /* IMMUTABLE, VETO */\n  margin: 0; /* PROTECTED */\n}\np{\n  color: red;\n}\n"
        );
    }

    #[test]
    fn test_grouped_selector_with_notion() {
        let err = compile("h1,\nh2<immutable>{\n  color: red;\n}\n").unwrap_err();
        assert!(matches!(err, MonoError::Type { .. }));
        assert_eq!(
            err.to_string(),
            "h2<immutable> cannot infer a type in a grouped selector"
        );
        assert_eq!(err.offender(), "h2<immutable>");
    }

    #[test]
    fn test_structure_is_preserved() {
        let canonical = "@charset \"utf-8\";\n@media (max-width: 300px){\n  div,\n  p{\n    display: none;\n  }\n}\n@keyframes k{\n  0%,50%{\n    top: 0;\n  }\n}\n";
        assert_eq!(compile(canonical).unwrap(), canonical);
    }

    #[test]
    fn test_reason_cannot_close_comment() {
        let notion = NotionData {
            motive: Some(crate::notion::Motive {
                kind: crate::notion::MotiveKind::Because,
                reason: Some("'a */ b'".to_string()),
            }),
            ..NotionData::default()
        };
        assert_eq!(notion_comment(&notion), "/* BECAUSE, 'a * / b' */");
    }

    #[test]
    fn test_brace_close_resets_inference() {
        let tokens = vec![
            Token::new(TokenKind::Selector, "nav<immutable>", Location::Line(1)).with_notion(
                Some(NotionData {
                    notion_type: Some(NotionType::Immutable),
                    ..NotionData::default()
                }),
            ),
            Token::new(TokenKind::BraceClose, "}", Location::Line(2)),
            Token::new(TokenKind::Declaration, "top: 0;", Location::Line(3)),
        ];
        assert_eq!(parse(&tokens).unwrap(), "nav{\n}\ntop: 0;\n");
    }
}
