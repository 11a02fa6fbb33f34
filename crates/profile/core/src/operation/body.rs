//! Request-body decoding shared by the operation handlers.
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{McpError, ParameterCheck};

/// Fails with `ValidationFailed` listing every required field that is absent,
/// `null`, an empty string or an empty array.
pub fn require(body: &Value, fields: &[&str]) -> Result<(), McpError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| match body.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        })
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(McpError::missing(missing))
    }
}

/// Decodes a body after its required fields were checked.
pub fn decode<T: DeserializeOwned>(body: &Value) -> Result<T, McpError> {
    let body = if body.is_null() {
        Value::Object(Default::default())
    } else {
        body.clone()
    };
    serde_json::from_value(body).map_err(|err| {
        McpError::invalid(
            ParameterCheck::Value,
            format!("Validation Failed. Invalid request body: {err}"),
            Vec::new(),
        )
    })
}
