// API error path tests
// These test error handling, option parsing and fail-fast behaviour in the API layer

use mono_core::api::DiagnosticStyle;
use mono_core::{compile, Compiler, CompilerOptions, MonoError, SourceFile};
use std::fs;

fn compile_err(source: &str) -> MonoError {
    compile(&SourceFile::new("errors.mono", source, 0)).unwrap_err()
}

#[test]
fn test_duplicate_type_on_rule_set() {
    let err = compile_err("a.link<protected,public> { font-size: 14px; }");
    if let MonoError::Type { message, .. } = &err {
        assert!(message.contains("already assigned the type PROTECTED"));
    } else {
        panic!("Expected type error, got {err:?}");
    }
}

#[test]
fn test_trailing_comma() {
    let err = compile_err("li { list-style<?veto,>: none; }");
    assert!(matches!(err, MonoError::AbstractNotion { .. }));
    assert_eq!(err.to_string(), "Trailing comma found in combinator");
}

#[test]
fn test_unknown_element() {
    let err = compile_err("spinner { display: flex; }");
    assert!(matches!(err, MonoError::Selector { .. }));
    assert_eq!(err.to_string(), "spinner is not a valid element type");
}

#[test]
fn test_missing_reason() {
    let err = compile_err("section { height<?patch>: 100%; }");
    assert!(matches!(err, MonoError::Motive { .. }));
    assert_eq!(err.to_string(), "?patch is missing a reason");
}

#[test]
fn test_grouped_selector_cannot_infer_type() {
    let err = compile_err("h1, h2<immutable>, h3 { color: red; }");
    assert!(matches!(err, MonoError::Type { .. }));
    assert_eq!(
        err.to_string(),
        "h2<immutable> cannot infer a type in a grouped selector"
    );

    let err = compile_err("h1<immutable>, h2 { color: red; }");
    assert_eq!(
        err.to_string(),
        "h1<immutable> cannot infer a type in a grouped selector"
    );
}

#[test]
fn test_important_fails_before_parsing() {
    let err = compile_err("p { color: red; }\ndiv { float: left !important; }");
    assert!(matches!(err, MonoError::Declaration { .. }));
    assert_eq!(err.code(), Some("float: left !important;"));
}

#[test]
fn test_compile_all_stops_at_first_failure() {
    let files = vec![
        SourceFile::new("c.mono", "p { color: red; }", 2),
        SourceFile::new("b.mono", "spinner { color: red; }", 1),
        SourceFile::new("a.mono", "widget { color: red; }", 0),
    ];
    let err = Compiler::default().compile_all(&files).unwrap_err();
    assert_eq!(err.offender(), "widget");
}

#[test]
fn test_options_deserialize() {
    let options: CompilerOptions =
        serde_json::from_str(r#"{ "diagnostics": "fancy", "extension": ".css" }"#).unwrap();
    assert_eq!(options.diagnostics, DiagnosticStyle::Fancy);
    assert_eq!(options.extension, ".css");

    let options: CompilerOptions = serde_json::from_str(r#"{ "diagnostics": "off" }"#).unwrap();
    assert_eq!(options.diagnostics, DiagnosticStyle::Off);
    assert_eq!(options.extension, ".mono");

    let options: CompilerOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options, CompilerOptions::default());
}

#[test]
fn test_options_reject_unknown_fields() {
    let result = serde_json::from_str::<CompilerOptions>(r#"{ "watch": true }"#);
    assert!(result.is_err());

    let result = serde_json::from_str::<CompilerOptions>(r#"{ "diagnostics": "loud" }"#);
    assert!(result.is_err());
}

#[test]
fn test_compile_paths_reads_in_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.mono"), "body { margin: 0; }").unwrap();
    fs::write(dir.path().join("nav.mono"), "nav<immutable> { height: 40px; }").unwrap();

    let compiler = Compiler::default();
    let results = compiler
        .compile_paths(&[dir.path().join("base"), dir.path().join("nav.mono")])
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].order, 0);
    assert!(results[1].name.ends_with("nav.mono"));
    assert_eq!(results[1].css, "nav{\n  height: 40px; /* IMMUTABLE */\n}\n");
}

#[test]
fn test_compile_paths_custom_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("theme.mcss"), "p { color: red; }").unwrap();

    let compiler = Compiler::new(CompilerOptions {
        extension: ".mcss".to_string(),
        ..CompilerOptions::default()
    });
    let results = compiler.compile_paths(&[dir.path().join("theme")]).unwrap();
    assert_eq!(results[0].css, "p{\n  color: red;\n}\n");
}

#[test]
fn test_missing_unit_is_a_parser_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Compiler::default()
        .compile_paths(&[dir.path().join("missing")])
        .unwrap_err();
    match err {
        MonoError::Parser { path, message } => {
            assert!(path.ends_with("missing.mono"));
            assert!(message.starts_with("Unable to read"));
        }
        other => panic!("Expected parser error, got {other:?}"),
    }
}

#[test]
fn test_diagnostic_styles_do_not_change_errors() {
    for style in [DiagnosticStyle::Off, DiagnosticStyle::Snippet, DiagnosticStyle::Fancy] {
        let compiler = Compiler::new(CompilerOptions {
            diagnostics: style,
            ..CompilerOptions::default()
        });
        let err = compiler
            .compile(&SourceFile::new("style.mono", "aside<?veto> { top: 0; }", 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "aside<?veto> cannot infer motives");
    }
}
