//! JSON conversion utilities for CLI input and output

use serde::Serialize;
use serde_json::json;

use super::CliError;
use crate::{error::FormulaError, schema::StaticSchema};

/// Parse a schema document
///
/// ```json
/// {
///   "fields": { "price": { "type": "number", "decimal_places": 2 } },
///   "links": { "orders": { "total": { "type": "number", "decimal_places": 2 } } }
/// }
/// ```
pub fn load_schema(json: &str) -> Result<StaticSchema, CliError> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

/// Machine readable form of a formula error: its serialized fields plus
/// `status` and the display `message`.
pub fn error_to_json(error: &FormulaError) -> Result<serde_json::Value, CliError> {
    let mut value = serde_json::to_value(error)?;
    if let serde_json::Value::Object(fields) = &mut value {
        fields.insert("status".into(), json!("error"));
        fields.insert("message".into(), json!(error.to_string()));
    }
    Ok(value)
}
