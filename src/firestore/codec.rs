//! Conversion between JSON values and Firestore documents.
//!
//! Backups are plain JSON, so rather than going through a typed serde
//! serializer every document passes through [`serde_json::Value`].

use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use firestore_grpc::v1::{value::ValueType, ArrayValue, Document, MapValue, Value};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Number};

#[derive(Debug)]
pub enum Error {
    Message(String),
    /// Documents are maps; anything else can't be stored as a document body.
    InvalidDocument(&'static str),
    IntegerOutOfRange(u64),
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Message(msg) => formatter.write_str(msg),
            Self::InvalidDocument(kind) => {
                write!(formatter, "a document must be a map, got {kind}")
            }
            Self::IntegerOutOfRange(n) => {
                write!(formatter, "integer {n} does not fit in a Firestore integer")
            }
            Self::Unsupported(kind) => write!(formatter, "unsupported value type: {kind}"),
        }
    }
}

impl std::error::Error for Error {}

/// Serializes `value` into a document named `name`. Pass an empty name when
/// creating a document, Firestore derives it from the request.
pub(crate) fn serialize_to_document<T: Serialize + ?Sized>(
    value: &T,
    name: String,
) -> Result<Document, Error> {
    let map = match serde_json::to_value(value).map_err(|e| Error::Message(e.to_string()))? {
        serde_json::Value::Object(map) => map,
        other => return Err(Error::InvalidDocument(kind_of(&other))),
    };

    let fields = map
        .into_iter()
        .map(|(k, v)| Ok((k, json_to_value(v)?)))
        .collect::<Result<_, Error>>()?;

    Ok(Document {
        name,
        fields,
        create_time: None,
        update_time: None,
    })
}

pub(crate) fn deserialize_document_fields<T: DeserializeOwned>(
    fields: HashMap<String, Value>,
) -> Result<T, Error> {
    let json = fields_to_json(&fields)?;
    serde_json::from_value(json).map_err(|e| Error::Message(e.to_string()))
}

pub(crate) fn kind_of(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn json_to_value_type(json: serde_json::Value) -> Result<ValueType, Error> {
    use serde_json::Value as Json;

    let value_type = match json {
        Json::Null => ValueType::NullValue(0),
        Json::Bool(b) => ValueType::BooleanValue(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueType::IntegerValue(i)
            } else if let Some(u) = n.as_u64() {
                return Err(Error::IntegerOutOfRange(u));
            } else {
                // Every JSON number that isn't an integer is representable as f64.
                ValueType::DoubleValue(n.as_f64().unwrap_or_default())
            }
        }
        Json::String(s) => ValueType::StringValue(s),
        Json::Array(items) => ValueType::ArrayValue(ArrayValue {
            values: items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        }),
        Json::Object(map) => ValueType::MapValue(MapValue {
            fields: map
                .into_iter()
                .map(|(k, v)| Ok((k, json_to_value(v)?)))
                .collect::<Result<_, Error>>()?,
        }),
    };

    Ok(value_type)
}

fn json_to_value(json: serde_json::Value) -> Result<Value, Error> {
    Ok(Value {
        value_type: Some(json_to_value_type(json)?),
    })
}

fn fields_to_json(fields: &HashMap<String, Value>) -> Result<serde_json::Value, Error> {
    let map = fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), value_to_json(v)?)))
        .collect::<Result<Map<_, _>, Error>>()?;
    Ok(serde_json::Value::Object(map))
}

fn value_to_json(value: &Value) -> Result<serde_json::Value, Error> {
    use serde_json::Value as Json;

    let Some(value_type) = &value.value_type else {
        return Ok(Json::Null);
    };

    let json = match value_type {
        ValueType::NullValue(_) => Json::Null,
        ValueType::BooleanValue(b) => Json::Bool(*b),
        ValueType::IntegerValue(i) => Json::from(*i),
        // JSON has no representation for NaN or infinities.
        ValueType::DoubleValue(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
        ValueType::StringValue(s) => Json::String(s.clone()),
        ValueType::TimestampValue(ts) => {
            let nanos = u32::try_from(ts.nanos).unwrap_or_default();
            let time = DateTime::from_timestamp(ts.seconds, nanos)
                .ok_or_else(|| Error::Message(format!("invalid timestamp {}s", ts.seconds)))?;
            Json::String(time.to_rfc3339())
        }
        ValueType::ReferenceValue(reference) => Json::String(reference.clone()),
        ValueType::GeoPointValue(point) => serde_json::json!({
            "latitude": point.latitude,
            "longitude": point.longitude,
        }),
        ValueType::ArrayValue(array) => Json::Array(
            array
                .values
                .iter()
                .map(value_to_json)
                .collect::<Result<_, _>>()?,
        ),
        ValueType::MapValue(map) => fields_to_json(&map.fields)?,
        ValueType::BytesValue(_) => return Err(Error::Unsupported("bytes")),
        #[allow(unreachable_patterns)]
        _ => return Err(Error::Unsupported("unknown")),
    };

    Ok(json)
}
