//! JSON-over-HTTP client for the contact endpoints.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | call                  | request                                   |
//! |-----------------------|-------------------------------------------|
//! | fetch_contacts        | `GET /api/doctors`                        |
//! | fetch_sync_status     | `GET /api/sync-status`                    |
//! | upsert_contact        | `POST /api/doctors`                       |
//! | bulk_upsert_contacts  | `POST /api/doctors/bulk`                  |
//! | delete_contact        | `DELETE /api/doctors/{id}`                |
//! | delete_visit          | `DELETE /api/doctors/{id}/visits/{visit}` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use medicall_core::models::Contact;
use medicall_core::sync::{ApiError, ApiResult, CrmApi, SyncStatus};
use medicall_core::SyncConfig;

pub struct HttpCrmApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCrmApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("not a base URL: {base_url}")));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &SyncConfig) -> ApiResult<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL plus path segments, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport(&url, e))?;
        decode_json(check_status(resp).await?).await
    }

    async fn send_expecting_success(&self, request: reqwest::RequestBuilder, url: &Url) -> ApiResult<()> {
        let resp = request.send().await.map_err(|e| transport(url, e))?;
        check_status(resp).await?;
        Ok(())
    }
}

fn transport(url: &Url, error: reqwest::Error) -> ApiError {
    ApiError::Transport(format!("{url}: {error}"))
}

async fn check_status(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Decode a JSON body, rejecting anything not labelled as JSON.
async fn decode_json<T: DeserializeOwned>(resp: Response) -> ApiResult<T> {
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with("application/json") {
        return Err(ApiError::Malformed(format!(
            "expected application/json, got {:?}",
            content_type
        )));
    }
    let body = resp
        .bytes()
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait]
impl CrmApi for HttpCrmApi {
    async fn fetch_contacts(&self) -> ApiResult<Vec<Contact>> {
        let contacts: Vec<Contact> = self.get_json(&["api", "doctors"]).await?;
        tracing::debug!(count = contacts.len(), "fetched contacts");
        Ok(contacts)
    }

    async fn fetch_sync_status(&self) -> ApiResult<SyncStatus> {
        self.get_json(&["api", "sync-status"]).await
    }

    async fn upsert_contact(&self, contact: &Contact) -> ApiResult<()> {
        let url = self.endpoint(&["api", "doctors"]);
        let request = self.client.post(url.clone()).json(contact);
        self.send_expecting_success(request, &url).await
    }

    async fn bulk_upsert_contacts(&self, contacts: &[Contact]) -> ApiResult<()> {
        let url = self.endpoint(&["api", "doctors", "bulk"]);
        let request = self.client.post(url.clone()).json(contacts);
        self.send_expecting_success(request, &url).await?;
        tracing::debug!(count = contacts.len(), "bulk upsert accepted");
        Ok(())
    }

    async fn delete_contact(&self, contact_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "doctors", contact_id]);
        let request = self.client.delete(url.clone());
        self.send_expecting_success(request, &url).await
    }

    async fn delete_visit(&self, contact_id: &str, visit_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["api", "doctors", contact_id, "visits", visit_id]);
        let request = self.client.delete(url.clone());
        self.send_expecting_success(request, &url).await
    }
}
