// src/firestore/value.rs
// Conversion between plain JSON and Firestore's typed REST values

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::error::{FirebaseError, Result};

/// Encode a plain JSON value as a Firestore `Value`.
///
/// Integers outside the int64 range are rejected; Firestore has no wider
/// integer type and a double would round them.
pub fn encode(value: &Value) -> Result<Value> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // int64 travels as a decimal string in the REST mapping
                json!({ "integerValue": i.to_string() })
            } else if n.is_u64() {
                return Err(FirebaseError::InvalidInput(format!(
                    "integer {} exceeds the Firestore int64 range",
                    n
                )));
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(f64::NAN) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items.iter().map(encode).collect::<Result<Vec<_>>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(k, v)| Ok((k.clone(), encode(v)?)))
                .collect::<Result<Map<String, Value>>>()?;
            json!({ "mapValue": { "fields": fields } })
        }
    };
    Ok(encoded)
}

pub fn encode_timestamp(ts: &DateTime<Utc>) -> Value {
    json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::AutoSi, true) })
}

/// Decode a Firestore `Value` into plain JSON.
///
/// Timestamps, references and bytes come back as strings; geo points as
/// `{latitude, longitude}`. Unrecognized shapes are passed through untouched.
pub fn decode(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };
    if map.len() != 1 {
        return Value::Object(map);
    }
    let Some((kind, inner)) = map.iter_mut().next().map(|(k, v)| (k.clone(), v.take())) else {
        return Value::Object(map);
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "stringValue" | "timestampValue" | "bytesValue" | "referenceValue"
        | "geoPointValue" => inner,
        "integerValue" => decode_integer(inner),
        "doubleValue" => inner,
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => match array.remove("values") {
                    Some(Value::Array(values)) => values,
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            Value::Array(values.into_iter().map(decode).collect())
        }
        "mapValue" => {
            let fields = match inner {
                Value::Object(mut m) => match m.remove("fields") {
                    Some(Value::Object(fields)) => fields,
                    _ => Map::new(),
                },
                _ => Map::new(),
            };
            Value::Object(decode_fields(fields))
        }
        _ => {
            let mut original = Map::new();
            original.insert(kind, inner);
            Value::Object(original)
        }
    }
}

fn decode_integer(inner: Value) -> Value {
    match inner.as_str().and_then(|s| s.parse::<i64>().ok()) {
        Some(i) => Value::from(i),
        None => inner,
    }
}

/// Decode every field of a document's `fields` map.
pub fn decode_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields.into_iter().map(|(k, v)| (k, decode(v))).collect()
}
