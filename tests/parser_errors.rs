// Unhappy paths of the grouping and statement stages, checked through
// the public parse entry points.

use swatch_core::error::{CompoundKind, ErrorKind};
use swatch_core::lexer::scan;
use swatch_core::parser::{parse, ParseOutput};
use swatch_core::CompileError;

fn parse_source(source: &str) -> (ParseOutput, Vec<CompileError>) {
    let (tokens, errors) = scan(source);
    assert!(errors.is_empty(), "scanner errors: {errors:?}");
    parse(&tokens)
}

fn first_error(source: &str) -> CompileError {
    let (_, errors) = parse_source(source);
    errors.into_iter().next().expect("Expected a parse error")
}

#[test]
fn test_missing_closing_brace() {
    let err = first_error("theme t: { key: 123");
    assert_eq!(err.kind, ErrorKind::Unclosed(CompoundKind::Block));
}

#[test]
fn test_missing_closing_bracket() {
    let err = first_error("theme t: { arr: [1, 2, 3 };");
    assert!(err.message().starts_with("expected"), "{err}");
}

#[test]
fn test_unclosed_list_at_eof() {
    let err = first_error("let a: [1, 2");
    assert_eq!(err.kind, ErrorKind::Unclosed(CompoundKind::List));
}

#[test]
fn test_unclosed_group_at_eof() {
    let err = first_error("let a: (1");
    assert_eq!(err.kind, ErrorKind::Unclosed(CompoundKind::Group));
}

#[test]
fn test_missing_colon() {
    let err = first_error("theme t: { key 123 };");
    assert_eq!(err.message(), "expected ':', found number 123");
}

#[test]
fn test_unexpected_eof() {
    let err = first_error("theme t: ");
    assert!(matches!(err.kind, ErrorKind::UnexpectedEof { .. }));
}

#[test]
fn test_missing_statement_name() {
    let err = first_error("let : 1;");
    assert!(err.message().starts_with("expected a binding name"));
}

#[test]
fn test_definition_body_must_be_block() {
    let err = first_error("theme t: [1, 2];");
    assert_eq!(err.kind, ErrorKind::ExpectedBlockLiteral);
}

#[test]
fn test_unknown_instruction() {
    let err = first_error("color red: #f00;");
    assert_eq!(err.message(), "unknown instruction identifier 'color'");
}

#[test]
fn test_redeclaration() {
    let (output, errors) = parse_source("let a: 1; let a: 2; let b: 3;");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message(), "cannot redeclare 'a'");
    assert_eq!(output.bindings.len(), 2);
}

#[test]
fn test_recovery_reports_each_bad_statement_once() {
    let (output, errors) = parse_source(
        "let a 1; theme t: { x: }; let ok: 1; font f: { style: 'normal' } from; theme u: {};",
    );
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert!(output.bindings.contains_key("ok"));
    assert_eq!(output.definitions.len(), 1);
    assert_eq!(output.definitions[0].name, "u");
}

#[test]
fn test_stray_symbols_between_statements() {
    let (output, errors) = parse_source(";; let a: 1;");
    assert!(!errors.is_empty());
    assert!(output.bindings.contains_key("a"));
}

#[test]
fn test_dot_runs_are_rejected() {
    let err = first_error("let a: [1....5];");
    assert!(err.message().starts_with("expected"), "{err}");
}
