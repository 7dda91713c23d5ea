//! Notions and the grammar of the `<...>` blocks that carry them.
//!
//! ```text
//! Notion   ::= "<" Prospect { "," Prospect } ">"
//! Prospect ::= Type | "@" Modifier | "?" Motive [ "(" Reason ")" ]
//! ```
//!
//! A block holds at most one of each slot. Selectors may only carry a type, which their
//! declarations then inherit.

use crate::error::MonoError;
use serde::Serialize;
use std::fmt::{self, Display};

/// Mutability contract of a property or rule-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotionType {
    Immutable,
    Protected,
    Public,
}

/// Sanctioned override mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modifier {
    Override,
    Mutate,
}

/// Justification given for an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotiveKind {
    Overrule,
    Overthrow,
    Veto,
    Fallback,
    Because,
    Patch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Motive {
    pub kind: MotiveKind,
    /// Parenthesized payload, kept verbatim including its quotes.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotionData {
    pub notion_type: Option<NotionType>,
    pub modifier: Option<Modifier>,
    pub motive: Option<Motive>,
}

/// Where a notion block was found. Selector blocks may only declare a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotionMode {
    Declaration,
    Selector,
}

impl NotionType {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "immutable" => Some(NotionType::Immutable),
            "protected" => Some(NotionType::Protected),
            "public" => Some(NotionType::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotionType::Immutable => "IMMUTABLE",
            NotionType::Protected => "PROTECTED",
            NotionType::Public => "PUBLIC",
        }
    }
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "override" => Some(Modifier::Override),
            "mutate" => Some(Modifier::Mutate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Override => "OVERRIDE",
            Modifier::Mutate => "MUTATE",
        }
    }
}

impl MotiveKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "overrule" => Some(MotiveKind::Overrule),
            "overthrow" => Some(MotiveKind::Overthrow),
            "veto" => Some(MotiveKind::Veto),
            "fallback" => Some(MotiveKind::Fallback),
            "because" => Some(MotiveKind::Because),
            "patch" => Some(MotiveKind::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotiveKind::Overrule => "OVERRULE",
            MotiveKind::Overthrow => "OVERTHROW",
            MotiveKind::Veto => "VETO",
            MotiveKind::Fallback => "FALLBACK",
            MotiveKind::Because => "BECAUSE",
            MotiveKind::Patch => "PATCH",
        }
    }

    pub fn requires_reason(&self) -> bool {
        matches!(self, MotiveKind::Because | MotiveKind::Patch)
    }
}

impl Display for NotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for MotiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NotionData {
    pub fn is_empty(&self) -> bool {
        self.notion_type.is_none() && self.modifier.is_none() && self.motive.is_none()
    }

    /// Filled slots in order type, modifier, motive, reason.
    pub fn slots(&self) -> Vec<String> {
        let mut slots = Vec::new();
        if let Some(notion_type) = self.notion_type {
            slots.push(notion_type.to_string());
        }
        if let Some(modifier) = self.modifier {
            slots.push(modifier.to_string());
        }
        if let Some(motive) = &self.motive {
            slots.push(motive.kind.to_string());
            if let Some(reason) = &motive.reason {
                slots.push(reason.clone());
            }
        }
        slots
    }
}

/// Byte ranges of every `<...>` block in `text`, brackets included.
///
/// Quoted strings and `/* */` comments outside a block are skipped, and quotes inside a
/// block may contain `<`, `>` and `,`. An unterminated block yields no range.
pub fn notion_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '/' if start.is_none() && matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut previous = ' ';
                for (_, c) in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
            }
            '<' if start.is_none() => start = Some(i),
            '>' => {
                if let Some(s) = start.take() {
                    spans.push((s, i + 1));
                }
            }
            _ => {}
        }
    }
    spans
}

/// Removes every notion block from `text`.
pub fn strip_notions(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in notion_spans(text) {
        stripped.push_str(&text[last..start]);
        last = end;
    }
    stripped.push_str(&text[last..]);
    stripped
}

/// Splits notion content on commas that are not inside quotes.
fn split_prospects(content: &str) -> Vec<&str> {
    let mut prospects = Vec::new();
    let mut quote: Option<char> = None;
    let mut last = 0;
    for (i, c) in content.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                ',' => {
                    prospects.push(&content[last..i]);
                    last = i + 1;
                }
                _ => {}
            },
        }
    }
    prospects.push(&content[last..]);
    prospects
}

/// Parses the notion block of a property (`color<immutable,?veto>`) or a selector
/// (`nav<protected>`). Returns `Ok(None)` when `text` has no block.
///
/// # Errors
/// Unknown or duplicated keywords, empty segments, missing reasons, and modifiers or
/// motives on a selector each produce the matching `MonoError` variant.
pub fn parse_notion(text: &str, mode: NotionMode) -> Result<Option<NotionData>, MonoError> {
    let spans = notion_spans(text);
    let Some(&(start, end)) = spans.first() else {
        return Ok(None);
    };
    let block = &text[start..end];
    if spans.len() > 1 {
        return Err(MonoError::abstract_notion(
            format!("{text} contains more than one notion block"),
            block,
        ));
    }

    let prospects = split_prospects(&block[1..block.len() - 1]);
    let count = prospects.len();
    let mut data = NotionData::default();
    let mut modifier_prospect = None;
    let mut motive_prospect = None;

    for (index, raw) in prospects.into_iter().enumerate() {
        let prospect = raw.trim();
        if prospect.is_empty() {
            return Err(MonoError::abstract_notion(
                empty_segment_message(index, count),
                block,
            ));
        }

        if let Some(keyword) = prospect.strip_prefix('@') {
            let modifier = Modifier::from_keyword(&keyword.to_ascii_lowercase()).ok_or_else(
                || {
                    MonoError::modifier(
                        format!("{} is not a valid modifier", prospect.to_lowercase()),
                        prospect,
                    )
                },
            )?;
            if let Some(previous) = data.modifier {
                return Err(MonoError::modifier(
                    format!("{text} already assigned the modifier {previous}, cannot also assign {modifier}"),
                    prospect,
                ));
            }
            data.modifier = Some(modifier);
            modifier_prospect = Some(prospect);
        } else if prospect.starts_with('?') {
            let motive = parse_motive(prospect)?;
            if let Some(previous) = &data.motive {
                return Err(MonoError::motive(
                    format!(
                        "{text} already assigned the motive {}, cannot also assign {}",
                        previous.kind, motive.kind
                    ),
                    prospect,
                ));
            }
            data.motive = Some(motive);
            motive_prospect = Some(prospect);
        } else {
            let notion_type = NotionType::from_keyword(&prospect.to_ascii_lowercase())
                .ok_or_else(|| {
                    MonoError::type_error(
                        format!("{} is not a valid type", prospect.to_lowercase()),
                        prospect,
                    )
                })?;
            if let Some(previous) = data.notion_type {
                return Err(MonoError::type_error(
                    format!("{text} already assigned the type {previous}, cannot also assign {notion_type}"),
                    prospect,
                ));
            }
            data.notion_type = Some(notion_type);
        }
    }

    if mode == NotionMode::Selector {
        if let Some(prospect) = modifier_prospect {
            return Err(MonoError::modifier(
                format!("{text} cannot infer modifiers"),
                prospect,
            ));
        }
        if let Some(prospect) = motive_prospect {
            return Err(MonoError::motive(
                format!("{text} cannot infer motives"),
                prospect,
            ));
        }
    }

    Ok(Some(data))
}

fn empty_segment_message(index: usize, count: usize) -> &'static str {
    if count == 1 {
        "Empty combinator found"
    } else if index + 1 == count {
        "Trailing comma found in combinator"
    } else if index == 0 {
        "Leading comma found in combinator"
    } else {
        "Consecutive commas found in combinator"
    }
}

/// `?word` optionally followed by `(reason)`.
fn parse_motive(prospect: &str) -> Result<Motive, MonoError> {
    let body = &prospect[1..];
    let word_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    let word = body[..word_len].to_ascii_lowercase();
    let rest = &body[word_len..];

    let kind = MotiveKind::from_keyword(&word)
        .filter(|_| rest.is_empty() || rest.starts_with('('))
        .ok_or_else(|| {
            MonoError::motive(
                format!("{} is not a valid motive", prospect.to_lowercase()),
                prospect,
            )
        })?;
    let name = format!("?{word}");

    let reason = if rest.is_empty() {
        None
    } else if rest.len() >= 2 && rest.ends_with(')') {
        Some(rest[1..rest.len() - 1].trim())
    } else {
        return Err(MonoError::motive(
            format!("{name} has an unclosed reason"),
            prospect,
        ));
    };

    if kind.requires_reason() {
        match reason {
            Some(reason) if !is_blank_reason(reason) => Ok(Motive {
                kind,
                reason: Some(reason.to_string()),
            }),
            _ => Err(MonoError::motive(
                format!("{name} is missing a reason"),
                prospect,
            )),
        }
    } else if reason.is_some() {
        Err(MonoError::motive(
            format!("{name} does not take a reason"),
            prospect,
        ))
    } else {
        Ok(Motive { kind, reason: None })
    }
}

fn is_blank_reason(reason: &str) -> bool {
    reason
        .trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace())
        .is_empty()
}
