use serde_json::Value;

use super::{CheckError, Result};

pub(crate) fn get_optional_u64(params: &Value, key: &str, default: u64) -> Result<u64> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| invalid(key, "a non-negative integer")),
    }
}

pub(crate) fn get_optional_f64(params: &Value, key: &str) -> Result<Option<f64>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(key, "a number")),
    }
}

pub(crate) fn get_optional_str<'a>(params: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid(key, "a string")),
    }
}

pub(crate) fn get_string_list(params: &Value, key: &str) -> Result<Option<Vec<String>>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(key, "an array of strings"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(invalid(key, "an array of strings")),
    }
}

/// Typos in a suite file should fail loudly instead of silently using defaults.
pub(crate) fn reject_unknown_params(params: &Value, known: &[&str]) -> Result<()> {
    if let Some(map) = params.as_object() {
        for key in map.keys() {
            if !known.contains(&key.as_str()) {
                return Err(CheckError::InvalidParams(format!(
                    "unknown parameter `{key}` (expected one of: {})",
                    known.join(", ")
                )));
            }
        }
    }
    Ok(())
}

fn invalid(key: &str, expected: &str) -> CheckError {
    CheckError::InvalidParams(format!("parameter `{key}` must be {expected}"))
}
