use swatch_core::lexer::scan;
use swatch_core::parser::parse;
use swatch_core::resolver::resolve;
use swatch_core::{CompileError, Definition, ResolvedValue};

fn resolve_ok(source: &str) -> Vec<Definition> {
    let (tokens, errors) = scan(source);
    assert!(errors.is_empty(), "scanner errors: {errors:?}");
    let (output, errors) = parse(&tokens);
    assert!(errors.is_empty(), "parser errors: {errors:?}");
    let (definitions, errors) = resolve(&output.bindings, &output.definitions);
    assert!(errors.is_empty(), "resolver errors: {errors:?}");
    definitions
}

fn resolve_err(source: &str) -> Vec<CompileError> {
    let (tokens, _) = scan(source);
    let (output, _) = parse(&tokens);
    let (_, errors) = resolve(&output.bindings, &output.definitions);
    assert!(!errors.is_empty(), "Expected resolver errors, but got none");
    errors
}

fn value(source: &str, key: &str) -> ResolvedValue {
    let definitions = resolve_ok(source);
    definitions[0]
        .body()
        .get(key)
        .cloned()
        .unwrap_or_else(|| panic!("missing key '{key}'"))
}

fn numbers(value: &ResolvedValue) -> Vec<f64> {
    value
        .as_list()
        .expect("Expected a list")
        .iter()
        .filter_map(ResolvedValue::as_number)
        .collect()
}

#[test]
fn test_simple_reference_resolution() {
    let definitions = resolve_ok("let a: { x: #ff0000 }; theme t: { c: a.x };");
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name(), "t");
    assert_eq!(
        definitions[0].body()["c"],
        ResolvedValue::Hex("ff0000".to_string())
    );
}

#[test]
fn test_inclusive_stepped_range() {
    let r = value("theme t: { r: [1..5^5] };", "r");
    assert_eq!(numbers(&r), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_exclusive_range() {
    let r = value("theme t: { r: [1...5] };", "r");
    assert_eq!(numbers(&r), vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_color_range() {
    let r = value("theme t: { r: [#000000..#ffffff] };", "r");
    let colors = r.as_list().unwrap();
    assert_eq!(colors.len(), 3);
    assert_eq!(colors[0], ResolvedValue::Hex("000000".to_string()));
}

#[test]
fn test_range_bounds_from_references() {
    let r = value("let lo: 2; let hi: { v: 4 }; theme t: { r: [lo..hi.v] };", "r");
    assert_eq!(numbers(&r), vec![2.0, 3.0, 4.0]);
}

#[test]
fn test_nested_indexing_and_access() {
    let source = "
        let grid: [[1, 2], [3, { deep: 'yes' }]];
        theme t: { n: grid[1][0], s: grid[1][1].deep };
    ";
    assert_eq!(value(source, "n"), ResolvedValue::Number(3.0));
    assert_eq!(value(source, "s"), ResolvedValue::String("yes".to_string()));
}

#[test]
fn test_index_expression_is_resolved() {
    let source = "let pos: { i: 2 }; let l: [5, 6, 7]; theme t: { v: l[pos.i] };";
    assert_eq!(value(source, "v"), ResolvedValue::Number(7.0));
}

#[test]
fn test_index_reuses_binding_from_the_chain() {
    let source = "let a: [1, 2]; theme t: { v: a[a[0]] };";
    assert_eq!(value(source, "v"), ResolvedValue::Number(2.0));

    let source = "let l: [1, 2]; let m: l; theme t: { v: m[l[0]] };";
    assert_eq!(value(source, "v"), ResolvedValue::Number(2.0));
}

#[test]
fn test_groups_are_transparent() {
    let source = "let a: ({ x: ([1, 2]) }); theme t: { v: a.x, w: a.x[1] };";
    let definitions = resolve_ok(source);
    let body = definitions[0].body();
    assert_eq!(numbers(&body["v"]), vec![1.0, 2.0]);
    assert_eq!(body["w"], ResolvedValue::Number(2.0));
}

#[test]
fn test_out_of_bounds() {
    let errors = resolve_err("let a: [1, 2]; theme t: { c: a[5] };");
    assert!(errors[0].message().starts_with("index out of bounds"));
}

#[test]
fn test_list_index_is_invalid() {
    let errors = resolve_err("let a: [1, 2]; let h: [0..1^3]; theme t: { c: a[h] };");
    assert!(errors[0].message().starts_with("invalid index type"));
}

#[test]
fn test_cycle_through_three_bindings() {
    let errors = resolve_err("let a: b; let b: c; let c: [a]; theme t: { v: a };");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message().starts_with("circular reference"));
}

#[test]
fn test_self_referencing_block_is_circular() {
    let errors = resolve_err("let a: { x: 1, y: a.x }; theme t: { v: a.y };");
    assert!(errors[0].message().starts_with("circular reference"));
}

#[test]
fn test_unused_broken_binding_is_silent() {
    let definitions = resolve_ok("let broken: missing; theme t: { v: 1 };");
    assert_eq!(definitions.len(), 1);
}

#[test]
fn test_reference_to_definition_name_fails() {
    let errors = resolve_err("theme base: { a: 1 }; theme t: { v: base.a };");
    assert_eq!(errors[0].message(), "reference 'base' could not be found");
}
