//! Row type and identity helpers

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Field holding a row's identity key.
pub const ID_FIELD: &str = "id";

/// Field holding the group label attached by select-all.
pub const GROUP_FIELD: &str = "tableName";

/// A single row of fetched data.
///
/// Rows are arbitrary JSON values. Identity is taken from the `id` field; rows
/// without one share the same (absent) identity.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
/// use serde_json::json;
///
/// let row = Row::new(json!({ "id": 7, "title": "write docs" }));
/// assert_eq!(row.id(), Some(&json!(7)));
/// assert_eq!(row.get("title"), Some(&json!("write docs")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Value);

impl Row {
    /// Wraps a JSON value as a row.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Returns the row's `id` field, if present.
    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Returns a hashable identity for set operations over rows.
    pub fn identity(&self) -> RowId {
        RowId(self.id().map(Value::to_string))
    }

    /// Returns `true` if both rows carry the same identity key.
    pub fn same_id(&self, other: &Row) -> bool {
        self.id() == other.id()
    }

    /// Returns a field of the row.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the group label, if the row carries one.
    pub fn group(&self) -> Option<&str> {
        self.0.get(GROUP_FIELD).and_then(Value::as_str)
    }

    /// Tags the row with `group` unless it already has a truthy label.
    ///
    /// Non-object rows cannot carry fields and are returned unchanged.
    pub fn with_group(mut self, group: &str) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            let tagged = fields.get(GROUP_FIELD).is_some_and(is_truthy);
            if !tagged {
                fields.insert(GROUP_FIELD.to_string(), Value::String(group.to_string()));
            }
        }
        self
    }

    /// Returns the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the row and returns the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Row {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        row.0
    }
}

/// Hashable identity of a [`Row`], derived from its serialized `id`.
///
/// `1` and `"1"` are distinct identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowId(Option<String>);

impl RowId {
    /// Returns `true` if the row had no `id` field.
    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

/// Loose truthiness over JSON values: `null`, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
