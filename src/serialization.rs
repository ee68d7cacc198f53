use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A fully resolved value. No references or unresolved forms remain.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    String(String),
    Number(f64),
    /// Hex digits without the leading `#`; the `#` is added back when rendered.
    Hex(String),
    List(Vec<ResolvedValue>),
    Block(BTreeMap<String, ResolvedValue>),
}

impl ResolvedValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvedValue::String(_) => "a string",
            ResolvedValue::Number(_) => "a number",
            ResolvedValue::Hex(_) => "a hex color",
            ResolvedValue::List(_) => "a list",
            ResolvedValue::Block(_) => "a block",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            ResolvedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&BTreeMap<String, ResolvedValue>> {
        match self {
            ResolvedValue::Block(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a block.
    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.as_block()?.get(key)
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::String(s) => write!(f, "{s:?}"),
            ResolvedValue::Number(n) => write!(f, "{n}"),
            ResolvedValue::Hex(h) => write!(f, "#{h}"),
            ResolvedValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ResolvedValue::Block(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ResolvedValue::String(s) => serializer.serialize_str(s),
            ResolvedValue::Number(n) => {
                // Integral values render without a trailing `.0`.
                if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            ResolvedValue::Hex(h) => serializer.serialize_str(&format!("#{h}")),
            ResolvedValue::List(items) => serializer.collect_seq(items),
            ResolvedValue::Block(map) => serializer.collect_map(map),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
    All,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Normal,
        FontStyle::Italic,
        FontStyle::Oblique,
        FontStyle::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
            FontStyle::All => "all",
        }
    }

    pub fn parse(name: &str) -> Option<FontStyle> {
        FontStyle::ALL.into_iter().find(|style| style.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeDefinition {
    pub name: String,
    pub body: BTreeMap<String, ResolvedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontDefinition {
    pub name: String,
    pub source: Option<String>,
    pub style: Option<Vec<FontStyle>>,
    pub weights: Option<Vec<u8>>,
    pub body: BTreeMap<String, ResolvedValue>,
}

/// A resolved `theme` or `font` definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Definition {
    Theme(ThemeDefinition),
    Font(FontDefinition),
}

impl Definition {
    pub fn name(&self) -> &str {
        match self {
            Definition::Theme(theme) => &theme.name,
            Definition::Font(font) => &font.name,
        }
    }

    pub fn body(&self) -> &BTreeMap<String, ResolvedValue> {
        match self {
            Definition::Theme(theme) => &theme.body,
            Definition::Font(font) => &font.body,
        }
    }
}
