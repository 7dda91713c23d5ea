// Notion, selector and declaration error tests
// Tokenizing stops at the first violation and reports the offending fragment

use mono_core::lexer::tokenize;
use mono_core::{MonoError, SourceFile};

fn tokenize_err(source: &str) -> MonoError {
    let file = SourceFile::new("Lexer test mock file", source, 0);
    tokenize(&file).expect_err("source should be rejected")
}

#[test]
fn test_unknown_declaration_type() {
    let err = tokenize_err(
        "
  footer {
    display<locked>:flex;
  }
  ",
    );
    assert!(matches!(err, MonoError::Type { .. }));
    assert_eq!(err.to_string(), "locked is not a valid type");
    assert_eq!(err.offender(), "locked");
    assert_eq!(err.code(), Some("display<locked>: flex;"));
}

#[test]
fn test_unknown_inferred_type() {
    let err = tokenize_err(
        "
  nav<private> {
    background: var(--nav_background);
  }
  ",
    );
    assert!(matches!(err, MonoError::Type { .. }));
    assert_eq!(err.to_string(), "private is not a valid type");
}

#[test]
fn test_unknown_modifier() {
    let err = tokenize_err(
        "
  a.link:hover {
    border-color<@change>: cornflowerblue;
  }
  ",
    );
    assert!(matches!(err, MonoError::Modifier { .. }));
    assert_eq!(err.to_string(), "@change is not a valid modifier");
}

#[test]
fn test_unknown_motive_is_reported_in_lower_case() {
    let err = tokenize_err(
        "
  aside {
    overflow<?itsFriday>: hidden;
  }
  ",
    );
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "?itsfriday is not a valid motive");
    assert_eq!(err.offender(), "?itsFriday");
}

#[test]
fn test_patch_without_reason() {
    let err = tokenize_err("section { height<?patch>: 100%; }");
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "?patch is missing a reason");
}

#[test]
fn test_because_without_reason() {
    let err = tokenize_err(
        "
  ul.nav__links {
    clear<?because>: both;
  }
  ",
    );
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "?because is missing a reason");
}

#[test]
fn test_because_with_blank_reason() {
    let err = tokenize_err("p { clear<?because('  ')>: both; }");
    assert_eq!(err.to_string(), "?because is missing a reason");
}

#[test]
fn test_veto_does_not_take_a_reason() {
    let err = tokenize_err("p { clear<?veto('no')>: both; }");
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "?veto does not take a reason");
}

#[test]
fn test_rule_set_cannot_infer_a_modifier() {
    let err = tokenize_err(
        "
  .nav--dark<@override> {
    background: dimgrey;
  }
  ",
    );
    assert!(matches!(err, MonoError::Modifier { .. }));
    assert_eq!(err.to_string(), ".nav--dark<@override> cannot infer modifiers");
}

#[test]
fn test_rule_set_cannot_infer_a_motive() {
    let err = tokenize_err(
        "
  aside<?veto> {
    display: inline-block;
  }
  ",
    );
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "aside<?veto> cannot infer motives");
}

#[test]
fn test_multiple_types_in_declaration() {
    let err = tokenize_err(
        "
  h1 {
    color<immutable,protected>: steelblue;
  }
  ",
    );
    assert!(matches!(err, MonoError::Type { .. }));
    assert!(err
        .to_string()
        .starts_with("color<immutable,protected> already assigned the type IMMUTABLE"));
    assert!(err.to_string().contains("PROTECTED"));
}

#[test]
fn test_multiple_types_in_rule_set() {
    let err = tokenize_err("a.link<protected,public> { font-size: 14px; }");
    assert!(matches!(err, MonoError::Type { .. }));
    assert!(err
        .to_string()
        .starts_with("a.link<protected,public> already assigned the type PROTECTED"));
}

#[test]
fn test_multiple_modifiers() {
    let err = tokenize_err(
        "
  button:hover {
    background-color<@override,@mutate>: teal;
  }
  ",
    );
    assert!(matches!(err, MonoError::Modifier { .. }));
    assert!(err.to_string().starts_with(
        "background-color<@override,@mutate> already assigned the modifier OVERRIDE"
    ));
}

#[test]
fn test_multiple_motives() {
    let err = tokenize_err("p { color<?veto,?overrule>: red; }");
    assert!(matches!(err, MonoError::Motive { .. }));
    assert!(err
        .to_string()
        .starts_with("color<?veto,?overrule> already assigned the motive VETO"));
}

#[test]
fn test_trailing_comma() {
    let err = tokenize_err(
        "
  li {
    list-style<?veto,>: none;
  }
  ",
    );
    assert!(matches!(err, MonoError::AbstractNotion { .. }));
    assert_eq!(err.to_string(), "Trailing comma found in combinator");
}

#[test]
fn test_other_empty_segments() {
    assert_eq!(
        tokenize_err("li { color<,immutable>: red; }").to_string(),
        "Leading comma found in combinator"
    );
    assert_eq!(
        tokenize_err("li { color<immutable,,?veto>: red; }").to_string(),
        "Consecutive commas found in combinator"
    );
    assert_eq!(
        tokenize_err("li { color<>: red; }").to_string(),
        "Empty combinator found"
    );
}

#[test]
fn test_whitespace_inside_notion_is_ignored() {
    let err = tokenize_err("h1 { color < immutable , protected >: steelblue; }");
    assert!(err
        .to_string()
        .starts_with("color<immutable,protected> already assigned the type IMMUTABLE"));
}

#[test]
fn test_invalid_element() {
    let err = tokenize_err("spinner { display: flex; }");
    assert!(matches!(err, MonoError::Selector { .. }));
    assert_eq!(err.to_string(), "spinner is not a valid element type");
    assert_eq!(err.offender(), "spinner");
}

#[test]
fn test_invalid_element_names_only_the_fragment() {
    let err = tokenize_err("nav > ul.menu widget.item { display: flex; }");
    assert_eq!(err.to_string(), "widget is not a valid element type");
    assert_eq!(err.offender(), "widget");
}

#[test]
fn test_missing_element() {
    let err = tokenize_err("div.card, .card--wide { padding: 0; }");
    assert!(matches!(err, MonoError::Selector { .. }));
    assert_eq!(err.to_string(), ".card--wide is missing an element type");
    assert_eq!(err.code(), Some(".card--wide{"));
}

#[test]
fn test_important_is_rejected() {
    let err = tokenize_err("p { color: red !important; }");
    assert!(matches!(err, MonoError::Declaration { .. }));
    assert_eq!(err.offender(), "!important");
}

#[test]
fn test_invalid_css() {
    let err = tokenize_err("div {\n  color: red;\n");
    match err {
        MonoError::Css { message, line, .. } => {
            assert_eq!(message, "Unclosed block");
            assert_eq!(line, 1);
        }
        other => panic!("expected a CSS error, got {other:?}"),
    }
}

#[test]
fn test_more_than_one_notion_block() {
    let err = tokenize_err("p { color<immutable><public>: red; }");
    assert!(matches!(err, MonoError::AbstractNotion { .. }));
    assert_eq!(
        err.to_string(),
        "color<immutable><public> contains more than one notion block"
    );
}
