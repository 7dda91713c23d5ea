use crate::lexer::{Location, Token};
use crate::notion::NotionData;
use serde::{Serialize, Serializer};

/// The tuple shape tokens are exchanged in: `[kind, text, location, notion?]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Number(usize),
    Null,
    Array(Vec<Value>),
}

fn slot<T: ToString>(value: Option<T>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

pub(crate) fn location_value(location: &Location) -> Value {
    match location {
        Location::Line(line) => Value::Array(vec![Value::Number(*line)]),
        Location::LineColumn(line, column) => {
            Value::Array(vec![Value::Number(*line), Value::Number(*column)])
        }
    }
}

/// `[type, modifier, motive, reason]`, unset slots as `null`.
pub(crate) fn notion_value(notion: &NotionData) -> Value {
    let motive = notion.motive.as_ref();
    Value::Array(vec![
        slot(notion.notion_type),
        slot(notion.modifier),
        slot(motive.map(|m| m.kind)),
        slot(motive.and_then(|m| m.reason.as_deref())),
    ])
}

pub(crate) fn to_value(token: &Token) -> Value {
    let mut tuple = vec![
        Value::String(token.kind.as_str().to_string()),
        Value::String(token.text.clone()),
        location_value(&token.location),
    ];
    // declarations and selectors keep an explicit null when they carry no notion
    if token.kind.carries_notion() {
        tuple.push(token.notion.as_ref().map_or(Value::Null, notion_value));
    }
    Value::Array(tuple)
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        to_value(self).serialize(serializer)
    }
}

impl Serialize for NotionData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        notion_value(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;
    use crate::notion::{Motive, MotiveKind, NotionType};
    use serde_json::json;

    #[test]
    fn test_structural_token_is_a_triple() {
        let token = Token::new(TokenKind::BraceOpen, "{", Location::LineColumn(1, 26));
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            json!(["BRACE_OPEN", "{", [1, 26]])
        );
    }

    #[test]
    fn test_declaration_without_notion_keeps_null() {
        let token = Token::new(TokenKind::Declaration, "float: left;", Location::Line(2));
        assert_eq!(
            serde_json::to_value(&token).unwrap(),
            json!(["DECLARATION", "float: left;", [2], null])
        );
    }

    #[test]
    fn test_notion_slots() {
        let notion = NotionData {
            notion_type: Some(NotionType::Public),
            modifier: None,
            motive: Some(Motive {
                kind: MotiveKind::Because,
                reason: Some("'legacy'".to_string()),
            }),
        };
        assert_eq!(
            serde_json::to_value(&notion).unwrap(),
            json!(["PUBLIC", null, "BECAUSE", "'legacy'"])
        );
    }
}
