// Integration tests for swatch-core using test fixtures
use swatch_core::{compile, Definition, FontStyle, ResolvedValue};
use std::fs;
use std::path::PathBuf;

fn get_test_file_path(subdir: &str, filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(subdir)
        .join(filename)
}

fn read_test_file(subdir: &str, filename: &str) -> String {
    let path = get_test_file_path(subdir, filename);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read test file: {:?}", path))
}

// Fixtures that should compile without errors
mod ok_tests {
    use super::*;

    fn compile_ok(filename: &str) -> swatch_core::Compilation {
        let source = read_test_file("ok", filename);
        let compilation = compile(&source);
        assert!(
            compilation.is_ok(),
            "Should compile successfully:\n{}",
            compilation.render_errors(filename, &source)
        );
        compilation
    }

    #[test]
    fn test_palette() {
        let compilation = compile_ok("palette.swatch");
        let light = compilation.definition("light").unwrap();
        assert_eq!(
            light.body()["background"],
            ResolvedValue::Hex("cccccc".to_string())
        );
        assert_eq!(
            light.body()["accent"],
            ResolvedValue::Hex("ff0000".to_string())
        );
        assert_eq!(light.body()["grays"].as_list().unwrap().len(), 5);
    }

    #[test]
    fn test_ranges() {
        let compilation = compile_ok("ranges.swatch");
        let json = serde_json::to_value(&compilation).unwrap();
        let body = &json["definitions"][0]["body"];

        assert_eq!(body["inclusive"], serde_json::json!([1, 2, 3, 4, 5]));
        assert_eq!(body["exclusive"], serde_json::json!([1, 2, 3, 4]));
        assert_eq!(body["stepped"], serde_json::json!([0, 0.5, 1]));
        assert_eq!(body["mixed"], serde_json::json!([0, 10, 11, 12, 99]));
        assert_eq!(
            body["colors"],
            serde_json::json!(["#000000", "#555555", "#aaaaaa"])
        );
        assert_eq!(body["short"], serde_json::json!(["#ff0000", "#800080"]));
        assert_eq!(body["empty"], serde_json::json!([]));
    }

    #[test]
    fn test_fonts() {
        let compilation = compile_ok("fonts.swatch");
        assert_eq!(compilation.definitions.len(), 2);

        let Some(Definition::Font(body)) = compilation.definition("body") else {
            panic!("Expected font 'body'");
        };
        assert_eq!(body.source.as_deref(), Some("fonts/inter.ttf"));
        assert_eq!(body.weights, Some(vec![4, 7, 1]));
        assert_eq!(body.style, Some(vec![FontStyle::Normal, FontStyle::Italic]));

        let Some(Definition::Font(mono)) = compilation.definition("mono") else {
            panic!("Expected font 'mono'");
        };
        assert_eq!(mono.source, None);
        assert_eq!(mono.weights, None);
        assert_eq!(mono.style, Some(vec![FontStyle::All]));
    }

    #[test]
    fn test_references() {
        let compilation = compile_ok("references.swatch");
        let body = compilation.definitions[0].body();
        assert_eq!(body["by_key"], ResolvedValue::Number(20.0));
        assert_eq!(body["by_chain"], ResolvedValue::Number(30.0));
        assert_eq!(body["grouped"], ResolvedValue::Number(1.0));
        assert_eq!(
            body["whole"].to_string(),
            "{a: 1, b: [10, 20, 30]}"
        );
    }
}

// Fixtures that should report errors
mod bad_tests {
    use super::*;

    #[test]
    fn test_errors_fixture() {
        let source = read_test_file("bad", "errors.swatch");
        let compilation = compile(&source);

        let messages: Vec<String> = compilation.errors.iter().map(|e| e.message()).collect();
        assert_eq!(
            messages,
            vec![
                "cannot redeclare 'a'".to_string(),
                "unknown instruction identifier 'set'".to_string(),
                "reference 'missing' could not be found".to_string(),
                "type is not indexable: 'a' is a number".to_string(),
                "duplicate font weight '1'".to_string(),
            ]
        );

        assert_eq!(compilation.definitions.len(), 1);
        assert_eq!(compilation.definitions[0].name(), "fine");
        assert_eq!(
            compilation.definitions[0].body()["x"],
            ResolvedValue::Number(1.0)
        );
    }
}
