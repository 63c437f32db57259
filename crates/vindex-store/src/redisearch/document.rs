//! Mapping between records and RediSearch hash documents.

use serde_json::Value;
use std::collections::HashMap;
use vindex_core::{codec, BackendError, Data, Metadata, SearchResult, CONTENT_KEY};

use super::{SCORE_FIELD, VECTOR_FIELD};

/// A raw hash field as stored by Redis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Binary(Vec<u8>),
}

impl FieldValue {
    /// Classify raw reply bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(err) => Self::Binary(err.into_bytes()),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes.as_slice(),
        }
    }
}

/// A hash document: key plus fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub fields: HashMap<String, FieldValue>,
}

/// Build the hash document for a record stored under `key`.
///
/// Metadata keys map verbatim to fields. The encoded vector goes last under
/// the reserved vector field and wins over any metadata key of that name.
#[must_use]
pub fn to_document(key: String, data: &Data) -> Document {
    let mut fields: HashMap<String, FieldValue> = data
        .metadata
        .iter()
        .filter_map(|(name, value)| render_value(value).map(|v| (name.clone(), FieldValue::Text(v))))
        .collect();

    fields.insert(
        VECTOR_FIELD.to_string(),
        FieldValue::Binary(codec::encode(&data.values)),
    );

    Document { id: key, fields }
}

/// Hash fields are flat strings: scalars use their plain text form, nested
/// values are stored as compact JSON, nulls are dropped.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Copy a document's fields into caller-facing metadata.
///
/// Never aliases `fields`. Drops the vector and score fields, and the
/// content key unless `include_content` is set.
#[must_use]
pub fn sanitize(fields: &HashMap<String, FieldValue>, include_content: bool) -> Metadata {
    fields
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            name != VECTOR_FIELD && name != SCORE_FIELD && (include_content || name != CONTENT_KEY)
        })
        .map(|(name, value)| {
            let text = match value {
                FieldValue::Text(text) => text.clone(),
                FieldValue::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            };
            (name.clone(), Value::String(text))
        })
        .collect()
}

/// Parse the score field. Anything but parseable text yields `0.0`.
#[must_use]
pub fn extract_score(field: Option<&FieldValue>) -> f64 {
    match field {
        Some(FieldValue::Text(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// How stored documents are turned back into results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultShape {
    pub include_content: bool,
    pub include_values: bool,
    /// Stripped from document keys to recover record ids
    pub key_prefix: String,
}

impl ResultShape {
    /// Reconstruct a search result.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Encoding`] if values are requested and the
    /// stored vector is malformed.
    pub fn build(&self, document: &Document) -> Result<SearchResult, BackendError> {
        let values = match (self.include_values, document.fields.get(VECTOR_FIELD)) {
            (true, Some(stored)) => codec::decode(stored.as_bytes())?,
            _ => Vec::new(),
        };

        let id = document
            .id
            .strip_prefix(self.key_prefix.as_str())
            .unwrap_or(&document.id)
            .to_string();

        Ok(SearchResult {
            data: Data {
                id,
                values,
                metadata: sanitize(&document.fields, self.include_content),
            },
            score: extract_score(document.fields.get(SCORE_FIELD)),
        })
    }
}
