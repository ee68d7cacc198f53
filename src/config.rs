use serde::{Deserialize, Serialize};

/// Bounds applied while compiling, so that hostile input fails with an
/// error instead of exhausting the stack or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// How deeply groups, lists, blocks and indexers may nest.
    pub max_nesting_depth: usize,
    /// How many references may be in flight while one value is resolved.
    pub max_reference_depth: usize,
    /// How many values a single ranged item may expand into.
    pub max_range_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nesting_depth: 128,
            max_reference_depth: 64,
            max_range_items: 100_000,
        }
    }
}

impl Limits {
    /// Reads limits from a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if the document is not a valid limits object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reads limits from a YAML document; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if the document is not a valid limits object.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let limits = Limits::from_json(r#"{ "max_range_items": 10 }"#).unwrap();
        assert_eq!(limits.max_range_items, 10);
        assert_eq!(limits.max_nesting_depth, Limits::default().max_nesting_depth);
    }

    #[test]
    fn test_yaml_limits() {
        let limits = Limits::from_yaml("max_reference_depth: 3\n").unwrap();
        assert_eq!(limits.max_reference_depth, 3);
        assert_eq!(limits.max_range_items, 100_000);
    }
}
