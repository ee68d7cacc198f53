use crate::range::Range;
use std::collections::HashMap;

/// An unresolved expression: either a reference into the binding table or a
/// literal that may itself contain further expressions.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Reference(Reference),
    Literal(Literal),
}

impl Expression {
    pub fn range(&self) -> Range {
        match self {
            Expression::Reference(reference) => reference.range,
            Expression::Literal(literal) => literal.range,
        }
    }

    /// True if the expression is syntactically a `{ ... }` literal.
    pub fn is_block_literal(&self) -> bool {
        matches!(
            self,
            Expression::Literal(Literal {
                value: NodeValue::Block(_),
                ..
            })
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Reference {
    pub name: String,
    pub extenders: Vec<Extender>,
    pub range: Range,
}

/// A postfix operation on a reference.
#[derive(Debug, PartialEq, Clone)]
pub enum Extender {
    /// `.name`
    Accessor { name: String, range: Range },
    /// `[expression]`
    Indexer {
        expression: Box<Expression>,
        range: Range,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Literal {
    pub value: NodeValue,
    pub range: Range,
}

#[derive(Debug, PartialEq, Clone)]
pub enum NodeValue {
    String(String),
    Number(f64),
    /// Hex digits without the leading `#`.
    Hex(String),
    Group(Box<Expression>),
    List(Vec<ListItem>),
    Block(Vec<Property>),
}

impl NodeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeValue::String(_) => "a string",
            NodeValue::Number(_) => "a number",
            NodeValue::Hex(_) => "a hex color",
            NodeValue::Group(_) => "a group",
            NodeValue::List(_) => "a list",
            NodeValue::Block(_) => "a block",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ListItem {
    Single(Expression),
    Range(RangeItem),
}

/// `from..to` (inclusive) or `from...to` (exclusive), with an optional
/// `^steps` and `:mode` suffix.
#[derive(Debug, PartialEq, Clone)]
pub struct RangeItem {
    pub from: Expression,
    pub to: Expression,
    pub inclusive: bool,
    pub interpolation: Interpolation,
    pub range: Range,
}

/// `None` in either field means "use the default".
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Interpolation {
    pub steps: Option<f64>,
    pub mode: Option<String>,
}

/// A `key: expression` entry of a block. Keys are not required to be unique.
#[derive(Debug, PartialEq, Clone)]
pub struct Property {
    pub key: String,
    pub expression: Expression,
    pub range: Range,
}

// --- Statements ---

/// A `let` binding.
#[derive(Debug, PartialEq, Clone)]
pub struct Binding {
    pub name: String,
    pub expression: Expression,
    pub range: Range,
}

pub type Bindings = HashMap<String, Binding>;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DefinitionKind {
    Theme,
    Font,
}

impl DefinitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Theme => "theme",
            DefinitionKind::Font => "font",
        }
    }
}

/// A `theme` or `font` statement whose body has not been resolved yet.
#[derive(Debug, PartialEq, Clone)]
pub struct UnresolvedDefinition {
    pub kind: DefinitionKind,
    pub name: String,
    pub body: Expression,
    /// The `from "<source>"` clause of a font.
    pub source: Option<String>,
    pub range: Range,
}
