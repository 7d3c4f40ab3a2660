//! # REST Client
//!
//! The Fetch and Submit collaborators over reqwest.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_list(Endpoint::Lentes)                                           │
//! │    GET {base}/lentes ──► 2xx? ──► JSON ──► envelope ──► Vec<Product>    │
//! │                           │                                             │
//! │                           └─ no ──► ApiError::Status { status, message }│
//! │                                                                         │
//! │  create / update (SubmitPayload)                                        │
//! │    Json(value)       ──► POST|PUT  application/json                     │
//! │    Multipart(parts)  ──► POST|PUT  multipart/form-data                  │
//! │                                                                         │
//! │  One request per user action; no automatic retry.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use optica_core::payload::{Part, PartContent, SubmitPayload};
use optica_core::reference::ReferenceTable;
use optica_core::types::ReferenceItem;
use reqwest::{multipart, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ConsoleConfig;
use crate::endpoint::Endpoint;
use crate::envelope::{decode_list, error_message};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ConsoleConfig) -> ApiResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(ApiClient {
            http,
            base_url: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}{path}[/{id}]`. The base path is kept (`Url::join` would
    /// replace it).
    fn url(&self, endpoint: Endpoint, id: Option<&str>) -> ApiResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = match id {
            Some(id) => format!("{}{}/{}", base, endpoint.path(), id),
            None => format!("{}{}", base, endpoint.path()),
        };
        Ok(Url::parse(&raw)?)
    }

    // =========================================================================
    // Fetch
    // =========================================================================

    /// Loads every record of a collection.
    pub async fn fetch_list<T: DeserializeOwned>(&self, endpoint: Endpoint) -> ApiResult<Vec<T>> {
        let url = self.url(endpoint, None)?;
        debug!(%url, "fetching list");
        let body = self.send(self.http.get(url)).await?;
        let records = decode_list(body)?;
        info!(endpoint = %endpoint, count = records.len(), "list loaded");
        Ok(records)
    }

    /// Loads a reference collection as `{_id, nombre}` rows.
    pub async fn fetch_reference(&self, endpoint: Endpoint) -> ApiResult<Vec<ReferenceItem>> {
        self.fetch_list(endpoint).await
    }

    /// Loads the given reference collections into one table. A collection
    /// that fails to load is left empty; joins then show blank names.
    pub async fn fetch_references(&self, collections: &[&str]) -> ReferenceTable {
        let mut table = ReferenceTable::new();
        for collection in collections {
            let Some(endpoint) = Endpoint::for_collection(collection) else {
                warn!(collection, "no endpoint for reference collection");
                continue;
            };
            match self.fetch_reference(endpoint).await {
                Ok(items) => table.insert(collection, items),
                Err(err) => warn!(collection, error = %err, "reference collection not loaded"),
            }
        }
        table
    }

    // =========================================================================
    // Submit
    // =========================================================================

    pub async fn create(&self, endpoint: Endpoint, payload: SubmitPayload) -> ApiResult<Value> {
        let url = self.url(endpoint, None)?;
        let request = with_payload(self.http.request(Method::POST, url), payload)?;
        let body = self.send(request).await?;
        info!(endpoint = %endpoint, "record created");
        Ok(body)
    }

    pub async fn update(&self, endpoint: Endpoint, id: &str, payload: SubmitPayload) -> ApiResult<Value> {
        let url = self.url(endpoint, Some(id))?;
        let request = with_payload(self.http.request(Method::PUT, url), payload)?;
        let body = self.send(request).await?;
        info!(endpoint = %endpoint, id, "record updated");
        Ok(body)
    }

    pub async fn delete(&self, endpoint: Endpoint, id: &str) -> ApiResult<()> {
        let url = self.url(endpoint, Some(id))?;
        self.send(self.http.delete(url)).await?;
        info!(endpoint = %endpoint, id, "record deleted");
        Ok(())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Sends the request and returns the JSON body (`null` when empty).
    async fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await?;
        read_body(response).await
    }
}

async fn read_body(response: Response) -> ApiResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = error_message(&bytes).unwrap_or_default();
        warn!(status = status.as_u16(), message = %message, "request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn with_payload(request: RequestBuilder, payload: SubmitPayload) -> ApiResult<RequestBuilder> {
    match payload {
        SubmitPayload::Json(body) => Ok(request.json(&body)),
        SubmitPayload::Multipart(parts) => Ok(request.multipart(multipart_form(parts)?)),
    }
}

fn multipart_form(parts: Vec<Part>) -> ApiResult<multipart::Form> {
    let mut form = multipart::Form::new();
    for part in parts {
        form = match part.content {
            PartContent::Text(text) => form.text(part.name, text),
            PartContent::File(file) => {
                let file_part = multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|e| ApiError::Payload(e.to_string()))?;
                form.part(part.name, file_part)
            }
        };
    }
    Ok(form)
}
