//! Value coercion
//!
//! Converts self-describing JSON values from a settings document into the
//! closed set of values that have a command-line representation.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::SettingsError;

/// A settings value that can be rendered on a command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Null,
    Array(Vec<ScalarValue>),
}

impl ScalarValue {
    /// Coerce a JSON value found at `path` in a settings document.
    ///
    /// Objects are rejected: there is no textual form for a nested object.
    /// Numbers must fit in an `i64`; fractional numbers are rejected too.
    pub fn from_json(path: &str, value: &Value) -> Result<Self, SettingsError> {
        match value {
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Null => Ok(Self::Null),
            Value::Number(n) => n.as_i64().map(Self::Integer).ok_or_else(|| {
                SettingsError::UnsupportedValueKind {
                    path: path.to_string(),
                    kind: if n.is_f64() {
                        "fractional number"
                    } else {
                        "out-of-range integer"
                    },
                }
            }),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Self::from_json(&format!("{}[{}]", path, i), item))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            Value::Object(_) => Err(SettingsError::UnsupportedValueKind {
                path: path.to_string(),
                kind: "object",
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Textual form used in every projection.
///
/// Null renders as nothing; arrays render their elements joined by `,`.
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Null => Ok(()),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}
