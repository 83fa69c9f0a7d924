//! Bidirectional conversion between [`Bencode`] trees and `serde_json::Value`.
//!
//! | Bencode | JSON |
//! |---------|------|
//! | Integer | number |
//! | String | string, through [`from_raw_string`] / [`to_raw_string`] |
//! | List | array |
//! | Dictionary | object, keys escaped the same way as strings |
//!
//! Objects are emitted in the dictionary's sorted order (`serde_json` is built
//! with `preserve_order`). Going the other way, fractional numbers are
//! truncated toward zero, and booleans and null are rejected.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::decoder::parse_with;
use crate::encoder::encode;
use crate::error::{BencodeError, Result};
use crate::escape::{from_raw_string, to_raw_string};
use crate::options::Options;
use crate::types::{Bencode, Payload};

/// Convert a value tree into JSON.
///
/// ```
/// use bencode_core::{parse, to_json};
/// let value = parse(b"l4:spam4:eggse").unwrap().unwrap();
/// assert_eq!(to_json(&value).to_string(), r#"["spam","eggs"]"#);
/// ```
pub fn to_json(value: &Bencode) -> Value {
    match value.value().payload() {
        Payload::Integer(integer) => Value::Number(Number::from(*integer)),
        Payload::String(bytes) => Value::String(from_raw_string(bytes)),
        Payload::List => Value::Array(value.children().iter().map(to_json).collect()),
        Payload::Dictionary => {
            let mut map = Map::new();
            for (key, item) in value.entries() {
                map.insert(from_raw_string(key), to_json(item));
            }
            Value::Object(map)
        }
    }
}

/// Build a value tree from JSON with the default [`Options`].
pub fn from_json(json: &Value) -> Result<Bencode> {
    from_json_with(json, &Options::default())
}

/// Build a value tree from JSON, marking values under the configured hex keys
/// for hex display.
pub fn from_json_with(json: &Value, options: &Options) -> Result<Bencode> {
    match json {
        Value::String(text) => Ok(Bencode::string(to_raw_string(text)?)),
        Value::Number(number) => json_integer(number).map(Bencode::integer),
        Value::Array(items) => {
            let mut list = Bencode::list();
            for item in items {
                list.append_child(from_json_with(item, options)?);
            }
            Ok(list)
        }
        Value::Object(members) => {
            let mut dict = Bencode::dictionary();
            for (name, member) in members {
                let key = to_raw_string(name)?;
                let row = match dict.sorted_position(&key) {
                    Ok(_) => return Err(BencodeError::DuplicateKey(name.clone())),
                    Err(row) => row,
                };
                let hex = options.is_hex_key(&key);
                let item = from_json_with(member, options)?;
                dict.insert_child(row, item.with_key(key).with_hex(hex));
            }
            Ok(dict)
        }
        Value::Bool(flag) => Err(BencodeError::UnsupportedJson(format!("boolean {flag}"))),
        Value::Null => Err(BencodeError::UnsupportedJson("null".to_string())),
    }
}

/// Decode bencode bytes straight to JSON. Empty input yields `null`.
pub fn raw_to_json(raw: &[u8], options: &Options) -> Result<Value> {
    let json = parse_with(raw, options)?
        .as_ref()
        .map_or(Value::Null, to_json);
    Ok(json)
}

/// Parse JSON text and encode it as bencode bytes.
pub fn json_to_raw(json: &str, options: &Options) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_str(json)?;
    let raw = encode(&from_json_with(&value, options)?);
    debug!(json_bytes = json.len(), bencode_bytes = raw.len(), "JSON converted to bencode");
    Ok(raw)
}

/// Integer part of a JSON number, or an error when it does not fit in `i64`.
fn json_integer(number: &Number) -> Result<i64> {
    if let Some(integer) = number.as_i64() {
        return Ok(integer);
    }
    if number.is_u64() {
        return Err(BencodeError::IntegerOutOfRange(number.to_string()));
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    number
        .as_f64()
        .map(f64::trunc)
        .filter(|&whole| whole >= i64::MIN as f64 && whole < i64::MAX as f64)
        .map(|whole| whole as i64)
        .ok_or_else(|| BencodeError::IntegerOutOfRange(number.to_string()))
}
