//! Wire DTOs for the Elasticsearch REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::ports::{ITEM_ID_FIELD, SearchDocument};

/// Document body stored per item.
#[derive(Debug, Serialize)]
pub(super) struct IndexDocumentDto<'a> {
    pub(super) id: String,
    pub(super) title: &'a str,
    pub(super) description: &'a str,
}

impl<'a> From<&'a SearchDocument> for IndexDocumentDto<'a> {
    fn from(document: &'a SearchDocument) -> Self {
        Self {
            id: document.id.to_string(),
            title: &document.title,
            description: &document.description,
        }
    }
}

/// Index creation body. The id field is a keyword so matching on it is exact.
pub(super) fn create_index_body(document_type: Option<&str>) -> Value {
    let mut properties = Map::new();
    properties.insert(ITEM_ID_FIELD.to_owned(), json!({ "type": "keyword" }));
    properties.insert("title".to_owned(), json!({ "type": "text" }));
    properties.insert("description".to_owned(), json!({ "type": "text" }));
    let mapping = json!({ "properties": properties });

    match document_type {
        Some(document_type) => {
            let mut typed = Map::new();
            typed.insert(document_type.to_owned(), mapping);
            json!({ "mappings": typed })
        }
        None => json!({ "mappings": mapping }),
    }
}

/// `_delete_by_query` body matching one field.
pub(super) fn delete_by_query_body(field: &str, value: &str) -> Value {
    let mut matcher = Map::new();
    matcher.insert(field.to_owned(), Value::String(value.to_owned()));
    json!({ "query": { "match": matcher } })
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteByQueryResponseDto {
    #[serde(default)]
    pub(super) deleted: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
struct ErrorBodyDto {
    #[serde(rename = "type")]
    error_type: String,
}

/// Extract `error.type` from an Elasticsearch error response, if present.
pub(super) fn error_type(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .ok()
        .map(|envelope| envelope.error.error_type)
}
