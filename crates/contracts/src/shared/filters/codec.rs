use serde_json::Value;
use thiserror::Error;

use super::patch::FilterPatch;
use super::state::FilterState;

/// Failure to read or write the persisted filter blob
#[derive(Debug, Error)]
pub enum FilterCodecError {
    #[error("persisted filters are not valid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persisted filters must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FilterPatch {
    /// Parse a persisted blob. Unknown keys are ignored; a known key with
    /// the wrong type rejects the whole blob.
    pub fn from_json(raw: &str) -> Result<Self, FilterCodecError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(FilterCodecError::NotAnObject(kind(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl FilterState {
    /// Full normalized state as stored under the persisted key
    pub fn to_json(&self) -> Result<String, FilterCodecError> {
        Ok(serde_json::to_string(self)?)
    }
}
