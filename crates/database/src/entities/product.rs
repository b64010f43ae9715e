//! Product catalog entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{CatalogError, CatalogResult};

/// A catalog record: the assigned identifier plus whatever fields the caller sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Caller-supplied product fields, checked only for being a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    fields: Map<String, Value>,
}

impl NewProduct {
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl TryFrom<Value> for NewProduct {
    type Error = CatalogError;

    fn try_from(value: Value) -> CatalogResult<Self> {
        match value {
            Value::Object(mut fields) => {
                // The store assigns the identifier.
                fields.remove("id");
                Ok(Self { fields })
            }
            other => Err(CatalogError::InvalidProduct(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
