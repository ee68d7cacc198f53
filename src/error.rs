use crate::range::Range;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::fmt;
use thiserror::Error;

/// The compound literal a grouping error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    Group,
    List,
    Block,
    Indexer,
}

impl fmt::Display for CompoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompoundKind::Group => "group",
            CompoundKind::List => "list",
            CompoundKind::Block => "block",
            CompoundKind::Indexer => "indexer",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // == Lexer ==
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated string literal at end of file")]
    UnterminatedStringAtEof,

    #[error("expected hex digits after '#'")]
    EmptyHexLiteral,

    // == Grouper ==
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },

    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unclosed {0}")]
    Unclosed(CompoundKind),

    #[error("literals nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    // == Parser ==
    #[error("unknown instruction {found}")]
    UnknownInstruction { found: String },

    #[error("cannot redeclare '{name}'")]
    Redeclaration { name: String },

    #[error("expected a block literal")]
    ExpectedBlockLiteral,

    // == Resolver ==
    #[error("reference '{name}' could not be found")]
    ReferenceNotFound { name: String },

    #[error("circular reference through '{name}'")]
    CircularReference { name: String },

    #[error("reference chain through '{name}' exceeds {limit} links")]
    ReferenceTooDeep { name: String, limit: usize },

    #[error("property '{path}' not found")]
    PropertyNotFound { path: String },

    #[error("cannot use accessor on non-block data '{path}'")]
    AccessorOnNonBlock { path: String },

    #[error("index out of bounds: '{path}' has {len} items but the index is {index}")]
    IndexOutOfBounds {
        path: String,
        index: String,
        len: usize,
    },

    #[error("type is not indexable: '{path}' is {found}")]
    NotIndexable { path: String, found: String },

    #[error("invalid index type {found}, expected a number or a string")]
    InvalidIndex { found: String },

    #[error("cannot reference a ranged item in '{path}'")]
    RangedItemReference { path: String },

    #[error("ranged item bounds must be of the same kind, found {from} and {to}")]
    RangeKindMismatch { from: String, to: String },

    #[error("invalid type for ranged item bounds: {found}")]
    InvalidRangeBoundType { found: String },

    #[error("invalid range bounds, lower bound must be less than upper bound ({from} > {to})")]
    InvalidRangeBounds { from: String, to: String },

    #[error("interpolation steps must be a positive integer, found {steps}")]
    InvalidInterpolationSteps { steps: String },

    #[error("invalid interpolation mode '{mode}', expected FLAT")]
    InvalidInterpolationMode { mode: String },

    #[error("invalid hex color '#{value}' for ranged item bounds")]
    InvalidHexColor { value: String },

    #[error("ranged item expands past the limit of {limit} items")]
    RangeTooLarge { limit: usize },

    #[error("{kind} definition must be a block")]
    DefinitionNotBlock { kind: &'static str },

    #[error("invalid font style value {found}, expected a string")]
    InvalidFontStyleValue { found: String },

    #[error("invalid font style '{value}', expected one of normal, italic, oblique, all")]
    InvalidFontStyle { value: String },

    #[error("duplicate font style '{value}'")]
    DuplicateFontStyle { value: String },

    #[error("invalid font weight value {found}, expected a number")]
    InvalidFontWeightValue { found: String },

    #[error("invalid font weight '{value}', expected an integer between 1 and 9")]
    InvalidFontWeight { value: String },

    #[error("duplicate font weight '{value}'")]
    DuplicateFontWeight { value: String },
}

impl ErrorKind {
    /// A stable diagnostic code naming the stage and the failure.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnterminatedString => "lexer::unterminated_string",
            ErrorKind::UnterminatedStringAtEof => "lexer::unterminated_string_eof",
            ErrorKind::EmptyHexLiteral => "lexer::empty_hex",
            ErrorKind::Expected { .. } => "grouper::expected",
            ErrorKind::UnexpectedEof { .. } => "grouper::unexpected_eof",
            ErrorKind::Unclosed(_) => "grouper::unclosed",
            ErrorKind::NestingTooDeep { .. } => "grouper::nesting_too_deep",
            ErrorKind::UnknownInstruction { .. } => "parser::unknown_instruction",
            ErrorKind::Redeclaration { .. } => "parser::redeclaration",
            ErrorKind::ExpectedBlockLiteral => "parser::expected_block",
            ErrorKind::ReferenceNotFound { .. } => "resolver::reference_not_found",
            ErrorKind::CircularReference { .. } => "resolver::circular_reference",
            ErrorKind::ReferenceTooDeep { .. } => "resolver::reference_too_deep",
            ErrorKind::PropertyNotFound { .. } => "resolver::property_not_found",
            ErrorKind::AccessorOnNonBlock { .. } => "resolver::accessor_on_non_block",
            ErrorKind::IndexOutOfBounds { .. } => "resolver::index_out_of_bounds",
            ErrorKind::NotIndexable { .. } => "resolver::not_indexable",
            ErrorKind::InvalidIndex { .. } => "resolver::invalid_index",
            ErrorKind::RangedItemReference { .. } => "resolver::ranged_item_reference",
            ErrorKind::RangeKindMismatch { .. } => "resolver::range_kind_mismatch",
            ErrorKind::InvalidRangeBoundType { .. } => "resolver::invalid_range_bound",
            ErrorKind::InvalidRangeBounds { .. } => "resolver::invalid_range_bounds",
            ErrorKind::InvalidInterpolationSteps { .. } => "resolver::invalid_steps",
            ErrorKind::InvalidInterpolationMode { .. } => "resolver::invalid_mode",
            ErrorKind::InvalidHexColor { .. } => "resolver::invalid_hex",
            ErrorKind::RangeTooLarge { .. } => "resolver::range_too_large",
            ErrorKind::DefinitionNotBlock { .. } => "resolver::definition_not_block",
            ErrorKind::InvalidFontStyleValue { .. }
            | ErrorKind::InvalidFontStyle { .. }
            | ErrorKind::DuplicateFontStyle { .. } => "resolver::font_style",
            ErrorKind::InvalidFontWeightValue { .. }
            | ErrorKind::InvalidFontWeight { .. }
            | ErrorKind::DuplicateFontWeight { .. } => "resolver::font_weight",
        }
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            ErrorKind::UnterminatedString | ErrorKind::UnterminatedStringAtEof => {
                Some("Close the string with the same quote character that opened it.")
            }
            ErrorKind::Unclosed(_) => {
                Some("Every '(', '[' and '{' needs a matching closing symbol.")
            }
            ErrorKind::UnknownInstruction { .. } => {
                Some("Statements start with 'let', 'theme' or 'font'.")
            }
            ErrorKind::Redeclaration { .. } => {
                Some("Bindings are immutable; the first declaration is kept.")
            }
            ErrorKind::CircularReference { .. } => {
                Some("A binding may not refer back to itself, directly or through other bindings.")
            }
            ErrorKind::InvalidInterpolationMode { .. } => {
                Some("FLAT is the only supported interpolation mode.")
            }
            _ => None,
        }
    }
}

/// The single error type shared by every compilation stage: a message and
/// the source range it applies to.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {}", range.begin)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub range: Range,
}

impl CompileError {
    pub fn new(kind: ErrorKind, range: Range) -> Self {
        Self { kind, range }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Attaches the named source text so the error can be rendered by miette.
    pub fn to_diagnostic(&self, name: &str, source: &str) -> SourceDiagnostic {
        SourceDiagnostic {
            message: self.message(),
            code: self.kind.code(),
            src: NamedSource::new(name, source.to_string()),
            span: self.range.into(),
            help: self.kind.help().map(str::to_string),
        }
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(swatch::compile), url("https://docs.rs/swatch-core"))]
pub struct SourceDiagnostic {
    pub message: String,
    pub code: &'static str,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{code}")]
    pub span: SourceSpan,
    #[help]
    pub help: Option<String>,
}
