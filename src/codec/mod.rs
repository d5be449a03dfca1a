//! Serialization codec
//!
//! Wire format is plain JSON:
//! - records are objects (keys in sorted order)
//! - sequences are arrays
//! - scalars are literals
//! - enum constants are strings holding the constant name
//!
//! Decoding is steered by a [`Witness`]. Explicit witnesses decode to an exact
//! shape and fail loudly; sample witnesses fall back to widening instead.

pub mod value;
pub mod witness;

pub use value::{ConstantSet, EnumConstant, Record, Value};
pub use witness::{ScalarKind, Schema, Witness};

use serde_json::Value as Json;

use crate::error::{Error, Result};

/// Encode a value to its canonical JSON text
pub fn encode(value: &Value) -> Result<String> {
    let json = value.to_json()?;
    serde_json::to_string(&json).map_err(|e| Error::Serialization(e.to_string()))
}

/// Decode text into the exact shape named by `witness`
pub fn decode(text: &str, witness: &Witness) -> Result<Value> {
    from_json(&parse(text)?, witness)
}

/// Decode text using a sample (default) value as the witness.
///
/// Never fails on shape: if the stored value does not fit the sample's
/// shape it is decoded by inference instead. Malformed text still fails.
pub fn decode_with_sample(text: &str, sample: &Value) -> Result<Value> {
    let json = parse(text)?;
    Ok(fit_or_widen(&json, &Witness::from_sample(sample)))
}

/// Decode a stored sequence with an explicit element witness.
///
/// Returns `None` for a stored `null`.
pub fn decode_list(text: &str, element: &Witness) -> Result<Option<Vec<Value>>> {
    let json = parse(text)?;
    match &json {
        Json::Null => Ok(None),
        Json::Array(items) => items
            .iter()
            .map(|item| from_json(item, element))
            .collect::<Result<Vec<_>>>()
            .map(Some),
        other => Err(Error::mismatch("array", other)),
    }
}

/// Decode a stored sequence using a sample sequence as the witness.
///
/// Elements take the shape of the sample's first element; on mismatch the
/// whole sequence is widened.
pub fn decode_list_with_sample(text: &str, sample: &[Value]) -> Result<Option<Vec<Value>>> {
    let json = parse(text)?;
    let element = Witness::element_of(sample);
    match &json {
        Json::Null => Ok(None),
        Json::Array(items) => {
            let exact = items
                .iter()
                .map(|item| from_json(item, &element))
                .collect::<Result<Vec<_>>>();
            match exact {
                Ok(values) => Ok(Some(values)),
                Err(err) => {
                    log::debug!("list does not fit sample shape ({err}), widening");
                    Ok(Some(items.iter().map(infer).collect()))
                }
            }
        }
        other => Err(Error::mismatch("array", other)),
    }
}

fn parse(text: &str) -> Result<Json> {
    serde_json::from_str(text).map_err(|e| Error::Deserialization(format!("malformed text: {e}")))
}

fn fit_or_widen(json: &Json, witness: &Witness) -> Value {
    match from_json(json, witness) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("value does not fit sample shape ({err}), widening");
            infer(json)
        }
    }
}

/// Decode a parsed JSON value. `null` is accepted by every witness.
pub(crate) fn from_json(json: &Json, witness: &Witness) -> Result<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }

    match witness {
        Witness::Infer => Ok(infer(json)),
        Witness::Scalar(kind) => scalar(json, *kind),
        Witness::Enum(set) => {
            let Some(name) = json.as_str() else {
                return Err(Error::mismatch(set.name(), json));
            };
            set.constant(name).map(Value::Enum).ok_or_else(|| {
                Error::Deserialization(format!("`{name}` is not a constant of {}", set.name()))
            })
        }
        Witness::Struct(schema) => {
            let Json::Object(map) = json else {
                return Err(Error::mismatch(schema.name().unwrap_or("object"), json));
            };
            let mut record = Record::with_type_name(schema.name().map(str::to_owned));
            for (field, field_witness) in schema.fields() {
                let value = match map.get(field) {
                    Some(field_json) => from_json(field_json, field_witness)?,
                    None => Value::Null,
                };
                record.insert(field.as_str(), value);
            }
            Ok(Value::Struct(record))
        }
        Witness::Seq(element) => {
            let Json::Array(items) = json else {
                return Err(Error::mismatch("array", json));
            };
            items
                .iter()
                .map(|item| from_json(item, element))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq)
        }
    }
}

fn scalar(json: &Json, kind: ScalarKind) -> Result<Value> {
    let value = match (kind, json) {
        (ScalarKind::Str, Json::String(s)) => Some(Value::Str(s.clone())),
        (ScalarKind::Str, Json::Number(n)) => Some(Value::Str(n.to_string())),
        (ScalarKind::Str, Json::Bool(b)) => Some(Value::Str(b.to_string())),
        (ScalarKind::Int, Json::Number(n)) => integral(n).map(Value::Int),
        (ScalarKind::Float, Json::Number(n)) => n.as_f64().map(Value::Float),
        (ScalarKind::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        _ => None,
    };
    value.ok_or_else(|| Error::mismatch(kind.as_str(), json))
}

/// Integer view of a JSON number; integral floats such as `10.0` qualify
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Fallback-widening: the JSON alone decides the shape
pub(crate) fn infer(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Float),
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::Seq(items.iter().map(infer).collect()),
        Json::Object(map) => {
            let mut record = Record::anonymous();
            for (field, value) in map {
                record.insert(field.as_str(), infer(value));
            }
            Value::Struct(record)
        }
    }
}
