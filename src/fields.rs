use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedInputError {
    pub message: String,
}

impl MalformedInputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for MalformedInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for MalformedInputError {}

pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn require_str<'a>(node: &'a Value, key: &str, owner: &str) -> Result<&'a str, MalformedInputError> {
    match node.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(MalformedInputError::new(format!(
            "{} field '{}' must be a string, found {}.",
            owner,
            key,
            shape_name(other)
        ))),
        None => Err(MalformedInputError::new(format!(
            "{} is missing required field '{}'.",
            owner, key
        ))),
    }
}

pub fn require_array<'a>(
    node: &'a Value,
    key: &str,
    owner: &str,
) -> Result<&'a [Value], MalformedInputError> {
    optional_array(node, key, owner)?.ok_or_else(|| {
        MalformedInputError::new(format!("{} is missing required field '{}'.", owner, key))
    })
}

// Absent and `null` both read as `None`.
pub fn optional_array<'a>(
    node: &'a Value,
    key: &str,
    owner: &str,
) -> Result<Option<&'a [Value]>, MalformedInputError> {
    match node.get(key) {
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(MalformedInputError::new(format!(
            "{} field '{}' must be an array, found {}.",
            owner,
            key,
            shape_name(other)
        ))),
    }
}
