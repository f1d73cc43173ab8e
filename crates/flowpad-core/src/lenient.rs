//! Field deserializers for hand-written import files.
//!
//! Ids and labels are text, but files routinely spell them as bare numbers
//! (`id: 1`). These helpers accept any JSON scalar and keep its text.

use serde::{
    Deserialize, Deserializer,
    de::{Error, Unexpected},
};
use serde_json::Value;

fn scalar_text<E: Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) => Err(E::invalid_type(Unexpected::Seq, &"a string or number")),
        Value::Object(_) => Err(E::invalid_type(Unexpected::Map, &"a string or number")),
    }
}

/// A string, number or boolean as text. `null` reads as the empty string.
pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_text(Value::deserialize(deserializer)?).map(Option::unwrap_or_default)
}

/// Like [`string`], with `null` read as `None`.
pub fn optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    scalar_text(Value::deserialize(deserializer)?)
}
