//! The JSON Schema value model (spec §3/§6.3): a typed struct instead of a
//! loose `serde_json::Value`, so field order is emission order and absent
//! keys are omitted rather than nulled.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Schema {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "$id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "$defs", skip_serializing_if = "IndexMap::is_empty")]
    pub defs: IndexMap<String, Schema>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<SchemaType>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "prefixItems", skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<Schema>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    /// draft-07 sibling of `$defs`, used only in batch mode (spec §4.5.2).
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
}

impl Schema {
    pub fn empty() -> Self {
        Schema::default()
    }

    pub fn typed(ty: &str) -> Self {
        Schema {
            ty: Some(SchemaType::Single(ty.to_string())),
            ..Schema::default()
        }
    }

    pub fn string() -> Self {
        Schema::typed("string")
    }

    pub fn number() -> Self {
        Schema::typed("number")
    }

    pub fn integer() -> Self {
        Schema::typed("integer")
    }

    pub fn boolean() -> Self {
        Schema::typed("boolean")
    }

    pub fn null() -> Self {
        Schema::typed("null")
    }

    pub fn object() -> Self {
        Schema::typed("object")
    }

    pub fn array() -> Self {
        Schema::typed("array")
    }

    pub fn not_anything() -> Self {
        Schema {
            not: Some(Box::new(Schema::empty())),
            ..Schema::default()
        }
    }

    pub fn reference(pointer: impl Into<String>) -> Self {
        Schema {
            reference: Some(pointer.into()),
            ..Schema::default()
        }
    }

    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }
}

/// `type` is either a single string or, for nullable unions collapsed onto
/// one JSON type, a two-element array (spec §4.5.5).
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaType::Single(s) => s.serialize(serializer),
            SchemaType::Multiple(v) => v.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

impl Serialize for AdditionalProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AdditionalProperties::Bool(b) => b.serialize(serializer),
            AdditionalProperties::Schema(s) => s.serialize(serializer),
        }
    }
}
