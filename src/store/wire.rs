//! Firestore REST wire models
//!
//! Firestore encodes every field as a one-key object naming its type, e.g.
//! `{"stringValue": "Intro"}` or `{"integerValue": "3"}`. These types mirror
//! that JSON and convert to and from the store's [`Value`] model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::{Document, Fields, Value};

/// A typed Firestore value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum WireValue {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers travel as decimal strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(serde_json::Value),
    ArrayValue(WireArray),
    MapValue(WireMap),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WireArray {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<WireValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WireMap {
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
}

impl From<&Value> for WireValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => WireValue::NullValue(()),
            Value::Boolean(b) => WireValue::BooleanValue(*b),
            Value::Integer(i) => WireValue::IntegerValue(i.to_string()),
            Value::Double(d) => WireValue::DoubleValue(*d),
            Value::String(s) => WireValue::StringValue(s.clone()),
            Value::Array(values) => {
                WireValue::ArrayValue(WireArray { values: values.iter().map(Into::into).collect() })
            }
            Value::Map(fields) => WireValue::MapValue(WireMap { fields: encode_fields(fields) }),
        }
    }
}

impl TryFrom<WireValue> for Value {
    type Error = StoreError;

    fn try_from(wire: WireValue) -> Result<Self, Self::Error> {
        Ok(match wire {
            WireValue::NullValue(()) | WireValue::GeoPointValue(_) => Value::Null,
            WireValue::BooleanValue(b) => Value::Boolean(b),
            WireValue::IntegerValue(s) => Value::Integer(
                s.parse().map_err(|_| StoreError::Decode(format!("invalid integer {:?}", s)))?,
            ),
            WireValue::DoubleValue(d) => Value::Double(d),
            WireValue::TimestampValue(s)
            | WireValue::StringValue(s)
            | WireValue::BytesValue(s)
            | WireValue::ReferenceValue(s) => Value::String(s),
            WireValue::ArrayValue(array) => Value::Array(
                array.values.into_iter().map(Value::try_from).collect::<Result<_, _>>()?,
            ),
            WireValue::MapValue(map) => Value::Map(decode_fields(map.fields)?),
        })
    }
}

/// Encode store fields into their wire form
pub fn encode_fields(fields: &Fields) -> BTreeMap<String, WireValue> {
    fields.iter().map(|(name, value)| (name.clone(), value.into())).collect()
}

/// Decode wire fields into store fields
pub fn decode_fields(fields: BTreeMap<String, WireValue>) -> Result<Fields, StoreError> {
    fields.into_iter().map(|(name, value)| Ok((name, Value::try_from(value)?))).collect()
}

/// A document resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    /// Full resource name, `projects/{p}/databases/{d}/documents/{collection}/{id}`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl WireDocument {
    /// Build a request body carrying only fields
    pub fn with_fields(fields: &Fields) -> Self {
        Self { name: String::new(), fields: encode_fields(fields), create_time: None, update_time: None }
    }

    /// The document identifier, i.e. the last segment of its resource name
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

impl TryFrom<WireDocument> for Document {
    type Error = StoreError;

    fn try_from(wire: WireDocument) -> Result<Self, Self::Error> {
        let id = wire.id().to_string();
        if id.is_empty() {
            return Err(StoreError::Decode("document without a name".into()));
        }
        Ok(Document { id, fields: decode_fields(wire.fields)? })
    }
}

/// Response of a collection listing
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Body of a `:runQuery` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where")]
    pub filter: Filter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_filter: FieldFilter,
}

#[derive(Debug, Serialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: &'static str,
    pub value: WireValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl RunQueryRequest {
    /// Query for documents in `collection` whose `field` equals `value`
    pub fn field_equals(collection: &str, field: &str, value: &Value) -> Self {
        Self {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector { collection_id: collection.to_string() }],
                filter: Filter {
                    field_filter: FieldFilter {
                        field: FieldReference { field_path: field.to_string() },
                        op: "EQUAL",
                        value: value.into(),
                    },
                },
            },
        }
    }
}

/// One element of the `:runQuery` response stream
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<WireDocument>,
    #[serde(default)]
    pub read_time: Option<String>,
}

/// Body of a `:commit` request
#[derive(Debug, Serialize)]
pub struct CommitRequest {
    pub writes: Vec<WireWrite>,
}

/// A single write inside a commit
#[derive(Debug, Serialize)]
pub struct WireWrite {
    /// Resource name of the document to delete
    pub delete: String,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}
