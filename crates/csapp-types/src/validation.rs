//! Field-level validation errors as reported by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segment of an error location, e.g. `["body", "lots", 2, "price"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(u64),
    Key(String),
}

impl fmt::Display for LocSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocSegment::Index(i) => write!(f, "{}", i),
            LocSegment::Key(k) => f.write_str(k),
        }
    }
}

/// A single validation failure tied to a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<LocSegment>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// The field this error belongs to, without the leading `body`/`query`
    /// marker (`"lots.2.price"`).
    pub fn field(&self) -> String {
        let segments = match self.loc.first() {
            Some(LocSegment::Key(k)) if matches!(k.as_str(), "body" | "query" | "path") => {
                &self.loc[1..]
            }
            _ => &self.loc[..],
        };
        segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field();
        if field.is_empty() {
            f.write_str(&self.msg)
        } else {
            write!(f, "{}: {}", field, self.msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_location() {
        let err: FieldError = serde_json::from_value(serde_json::json!({
            "loc": ["body", "lots", 2, "price"],
            "msg": "value must be positive",
            "type": "value_error"
        }))
        .unwrap();

        assert_eq!(err.loc[2], LocSegment::Index(2));
        assert_eq!(err.field(), "lots.2.price");
        assert_eq!(err.to_string(), "lots.2.price: value must be positive");
    }

    #[test]
    fn test_field_without_marker() {
        let err = FieldError {
            loc: vec![LocSegment::Key("email".into())],
            msg: "invalid email".into(),
            kind: "value_error".into(),
        };
        assert_eq!(err.field(), "email");
    }
}
