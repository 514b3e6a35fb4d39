use serde_json::Value;
use std::collections::BTreeMap;

/// Flat field set keyed by path, as delivered to an [`Accumulator`](super::Accumulator).
pub type Fields = BTreeMap<String, f64>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("JSON flattener: number at {path:?} cannot be represented as a float")]
    UnrepresentableNumber { path: String },
}

/// Flattens a JSON tree into numeric fields.
///
/// Nested object keys and array indices are joined with `_`. Strings, booleans
/// and nulls carry no numeric value and are skipped.
pub fn flatten(prefix: &str, value: &Value) -> Result<Fields, FlattenError> {
    let mut fields = Fields::new();
    flatten_into(&mut fields, prefix, value)?;
    Ok(fields)
}

fn flatten_into(fields: &mut Fields, path: &str, value: &Value) -> Result<(), FlattenError> {
    let path = path.trim_matches('_');
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(fields, &format!("{path}_{key}_"), value)?;
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(fields, &format!("{path}_{index}_"), value)?;
            }
        }
        Value::Number(number) => {
            let number = number
                .as_f64()
                .ok_or_else(|| FlattenError::UnrepresentableNumber { path: path.to_string() })?;
            fields.insert(path.to_string(), number);
        }
        Value::String(_) | Value::Bool(_) | Value::Null => {}
    }
    Ok(())
}
