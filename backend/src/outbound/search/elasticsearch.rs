//! Reqwest-backed Elasticsearch adapter for the item search index.
//!
//! This adapter owns transport details only: URL construction, request
//! bodies, timeout and HTTP status mapping. Retrying is the sync worker's job.
//!
//! Deletes go through `_delete_by_query`, which only sees searchable
//! documents. Upserts therefore wait for the refresh that makes them visible,
//! so a delete queued right behind an upsert of the same item still matches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, info};

use super::dto::{
    DeleteByQueryResponseDto, IndexDocumentDto, create_index_body, delete_by_query_body,
    error_type,
};
use crate::domain::ports::{IndexName, ItemSearchIndex, ItemSearchIndexError, SearchDocument};

const DEFAULT_DOCUMENT_PATH: &str = "_doc";
const ALREADY_EXISTS_ERRORS: [&str; 2] = [
    "resource_already_exists_exception",
    "index_already_exists_exception",
];
const INDEX_NOT_FOUND_ERROR: &str = "index_not_found_exception";

/// Search index adapter speaking the Elasticsearch REST API.
pub struct ElasticsearchItemIndex {
    client: Client,
    endpoint: Url,
    document_type: Option<String>,
}

impl ElasticsearchItemIndex {
    /// Build an adapter with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            document_type: None,
        })
    }

    /// Address documents under a legacy mapping type instead of `_doc`.
    #[must_use]
    pub fn with_document_type(mut self, document_type: Option<String>) -> Self {
        self.document_type = document_type.filter(|value| !value.trim().is_empty());
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ItemSearchIndexError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ItemSearchIndexError::rejected(format!(
                    "search endpoint {} cannot carry a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn document_url(
        &self,
        index: &IndexName,
        document: &SearchDocument,
    ) -> Result<Url, ItemSearchIndexError> {
        let document_path = self
            .document_type
            .as_deref()
            .unwrap_or(DEFAULT_DOCUMENT_PATH);
        let id = document.id.to_string();
        let mut url = self.url(&[index.as_str(), document_path, &id])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");
        Ok(url)
    }

    fn delete_by_query_url(&self, index: &IndexName) -> Result<Url, ItemSearchIndexError> {
        let mut url = match self.document_type.as_deref() {
            Some(document_type) => self.url(&[index.as_str(), document_type, "_delete_by_query"]),
            None => self.url(&[index.as_str(), "_delete_by_query"]),
        }?;
        url.query_pairs_mut()
            .append_pair("conflicts", "proceed")
            .append_pair("refresh", "true");
        Ok(url)
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), ItemSearchIndexError> {
        let response = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl ItemSearchIndex for ElasticsearchItemIndex {
    async fn ensure_index(&self, index: &IndexName) -> Result<(), ItemSearchIndexError> {
        let url = self.url(&[index.as_str()])?;
        let body = create_index_body(self.document_type.as_deref());
        let (status, response) = self.send(reqwest::Method::PUT, url, &body).await?;
        if status.is_success() {
            info!(%index, "search index created");
            return Ok(());
        }
        if is_already_exists(status, &response) {
            debug!(%index, "search index already exists");
            return Ok(());
        }
        Err(map_status_error(status, &response))
    }

    async fn upsert(
        &self,
        index: &IndexName,
        document: &SearchDocument,
    ) -> Result<(), ItemSearchIndexError> {
        let url = self.document_url(index, document)?;
        let (status, response) = self
            .send(reqwest::Method::PUT, url, &IndexDocumentDto::from(document))
            .await?;
        if status.is_success() {
            return Ok(());
        }
        Err(map_status_error(status, &response))
    }

    async fn delete_by_field(
        &self,
        index: &IndexName,
        field: &str,
        value: &str,
    ) -> Result<u64, ItemSearchIndexError> {
        let url = self.delete_by_query_url(index)?;
        let body = delete_by_query_body(field, value);
        let (status, response) = self.send(reqwest::Method::POST, url, &body).await?;
        if status == StatusCode::NOT_FOUND
            && error_type(&response).as_deref() == Some(INDEX_NOT_FOUND_ERROR)
        {
            return Ok(0);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &response));
        }
        parse_deleted(&response)
    }
}

fn is_already_exists(status: StatusCode, body: &[u8]) -> bool {
    status == StatusCode::BAD_REQUEST
        && error_type(body).is_some_and(|kind| ALREADY_EXISTS_ERRORS.contains(&kind.as_str()))
}

fn parse_deleted(body: &[u8]) -> Result<u64, ItemSearchIndexError> {
    serde_json::from_slice::<DeleteByQueryResponseDto>(body)
        .map(|decoded| decoded.deleted)
        .map_err(|error| {
            ItemSearchIndexError::decode(format!("invalid delete-by-query response: {error}"))
        })
}

fn map_transport_error(error: reqwest::Error) -> ItemSearchIndexError {
    if error.is_timeout() {
        ItemSearchIndexError::timeout(error.to_string())
    } else {
        ItemSearchIndexError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ItemSearchIndexError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ItemSearchIndexError::timeout(message)
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => ItemSearchIndexError::unavailable(message),
        _ if status.is_client_error() => ItemSearchIndexError::rejected(message),
        _ => ItemSearchIndexError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}


#[cfg(test)]
#[path = "elasticsearch_http_tests.rs"]
mod http_tests;
