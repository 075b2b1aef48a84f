//! Response shape error

use serde_json::Value;

/// The fetcher returned data that is not a sequence of rows.
///
/// This is a contract violation between the backend and the table, not a
/// transient failure. The message names the JSON type that was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid data provided. Expected array, but got {received}")]
pub struct ShapeError {
    received: &'static str,
}

impl ShapeError {
    /// Creates a shape error describing the type of `value`.
    pub fn of(value: &Value) -> Self {
        Self {
            received: json_type_name(value),
        }
    }

    /// Returns the name of the JSON type that was received.
    pub fn received(&self) -> &'static str {
        self.received
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_names_received_type() {
        let err = ShapeError::of(&json!({ "rows": [] }));
        assert_eq!(err.received(), "object");
        assert_eq!(
            err.to_string(),
            "Invalid data provided. Expected array, but got object"
        );
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(ShapeError::of(&json!(null)).received(), "null");
        assert_eq!(ShapeError::of(&json!(true)).received(), "boolean");
        assert_eq!(ShapeError::of(&json!(3)).received(), "number");
        assert_eq!(ShapeError::of(&json!("x")).received(), "string");
    }
}
