//! # Firestore Typed Values
//!
//! The REST API wraps every field in a one-key object naming its type.
//! This module unwraps them into plain JSON so documents can be decoded
//! straight into `Category` / `Product`.
//!
//! ```text
//! {"stringValue": "Shirts"}                        → "Shirts"
//! {"integerValue": "12"}                           → 12
//! {"doubleValue": 49.99}                           → 49.99
//! {"arrayValue": {"values": [{"stringValue": "S"}]}} → ["S"]
//! {"mapValue": {"fields": {"a": {"booleanValue": true}}}} → {"a": true}
//! ```

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::{CatalogError, CatalogResult};

/// A document as returned by the REST API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{collection}/{id}`.
    pub name: String,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    /// Document id (last segment of the resource name).
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Flattens the document into `{ "id": <doc id>, ...fields }`.
    ///
    /// A field literally named `id` overrides the path id.
    pub fn into_plain(self) -> CatalogResult<Value> {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id().to_string()));

        for (key, typed) in self.fields {
            object.insert(key, decode_value(typed)?);
        }

        Ok(Value::Object(object))
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsPage {
    #[serde(default)]
    pub documents: Vec<RawDocument>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Decodes one typed value into plain JSON.
pub fn decode_value(typed: Value) -> CatalogResult<Value> {
    let wrapper = match typed {
        Value::Object(wrapper) => wrapper,
        other => {
            return Err(CatalogError::Decode(format!(
                "expected a typed value object, got: {other}"
            )))
        }
    };

    let Some((kind, inner)) = wrapper.into_iter().next() else {
        return Err(CatalogError::Decode("empty typed value".into()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => match inner {
            Value::Bool(_) => Ok(inner),
            other => Err(type_mismatch(&kind, &other)),
        },
        "integerValue" => decode_integer(&kind, inner),
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner),
            // NaN / Infinity arrive as strings and have no JSON form
            Value::String(_) => Ok(Value::Null),
            other => Err(type_mismatch(&kind, &other)),
        },
        "timestampValue" | "stringValue" | "referenceValue" | "bytesValue" => match inner {
            Value::String(_) => Ok(inner),
            other => Err(type_mismatch(&kind, &other)),
        },
        "geoPointValue" => Ok(inner),
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => array.remove("values").unwrap_or(Value::Null),
                other => return Err(type_mismatch(&kind, &other)),
            };
            match values {
                Value::Null => Ok(Value::Array(Vec::new())),
                Value::Array(items) => items
                    .into_iter()
                    .map(decode_value)
                    .collect::<CatalogResult<Vec<_>>>()
                    .map(Value::Array),
                other => Err(type_mismatch(&kind, &other)),
            }
        }
        "mapValue" => {
            let fields = match inner {
                Value::Object(mut map) => map.remove("fields").unwrap_or(Value::Null),
                other => return Err(type_mismatch(&kind, &other)),
            };
            match fields {
                Value::Null => Ok(Value::Object(Map::new())),
                Value::Object(fields) => {
                    let mut out = Map::new();
                    for (key, value) in fields {
                        out.insert(key, decode_value(value)?);
                    }
                    Ok(Value::Object(out))
                }
                other => Err(type_mismatch(&kind, &other)),
            }
        }
        unknown => Err(CatalogError::Decode(format!("unknown value type: {unknown}"))),
    }
}

/// `integerValue` is an int64 encoded as a JSON string.
fn decode_integer(kind: &str, inner: Value) -> CatalogResult<Value> {
    match inner {
        Value::String(text) => text
            .parse::<i64>()
            .map(|n| Value::Number(Number::from(n)))
            .map_err(|e| CatalogError::Decode(format!("bad integerValue {text:?}: {e}"))),
        Value::Number(_) => Ok(inner),
        other => Err(type_mismatch(kind, &other)),
    }
}

fn type_mismatch(kind: &str, value: &Value) -> CatalogError {
    CatalogError::Decode(format!("{kind} has unexpected payload: {value}"))
}

// =============================================================================
// Unit Tests
// =============================================================================
