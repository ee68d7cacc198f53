use crate::config::Limits;
use crate::error::CompileError;
use crate::lexer::scan;
use crate::parser::parse_with;
use crate::resolver::resolve_with;
use crate::serialization::Definition;
use miette::{GraphicalReportHandler, GraphicalTheme, Report};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// The outcome of compiling one source text: every definition that resolved
/// cleanly, and every error from every stage, in stage order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compilation {
    pub definitions: Vec<Definition>,
    pub errors: Vec<CompileError>,
}

impl Compilation {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finds a resolved definition by name.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    /// Serializes the compilation into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the compilation into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }

    /// Wraps every error in a miette report that carries the source text.
    #[must_use]
    pub fn diagnostics(&self, name: &str, source: &str) -> Vec<Report> {
        self.errors
            .iter()
            .map(|error| Report::new(error.to_diagnostic(name, source)))
            .collect()
    }

    /// Renders every error as a plain-text snippet of the source.
    #[must_use]
    pub fn render_errors(&self, name: &str, source: &str) -> String {
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        let mut buffer = String::new();
        for report in self.diagnostics(name, source) {
            if handler.render_report(&mut buffer, &*report).is_err() {
                log::warn!("failed to render diagnostic: {report}");
            }
        }
        buffer
    }
}

struct ErrorEntry<'e>(&'e CompileError);

impl Serialize for ErrorEntry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CompileError", 4)?;
        state.serialize_field("code", self.0.kind.code())?;
        state.serialize_field("message", &self.0.message())?;
        state.serialize_field("line", &self.0.range.begin.line)?;
        state.serialize_field("column", &self.0.range.begin.column)?;
        state.end()
    }
}

impl Serialize for Compilation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let errors: Vec<ErrorEntry> = self.errors.iter().map(ErrorEntry).collect();
        let mut state = serializer.serialize_struct("Compilation", 2)?;
        state.serialize_field("definitions", &self.definitions)?;
        state.serialize_field("errors", &errors)?;
        state.end()
    }
}

/// Compiles a source text with the default [`Limits`]. This never fails as a
/// whole; problems are reported through [`Compilation::errors`].
#[must_use]
pub fn compile(source: &str) -> Compilation {
    compile_with(source, &Limits::default())
}

/// Like [`compile`], with explicit limits.
#[must_use]
pub fn compile_with(source: &str, limits: &Limits) -> Compilation {
    let (tokens, mut errors) = scan(source);
    let (output, parse_errors) = parse_with(&tokens, limits);
    errors.extend(parse_errors);
    let (definitions, resolve_errors) = resolve_with(&output.bindings, &output.definitions, limits);
    errors.extend(resolve_errors);

    log::debug!(
        "compiled {} definitions with {} errors",
        definitions.len(),
        errors.len()
    );
    Compilation {
        definitions,
        errors,
    }
}
