//! The CRM backend as seen by the sync shell.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::Contact;

/// Failures talking to the CRM backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Non-JSON body, wrong content type or unexpected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Lightweight version markers, one per server collection.
///
/// Markers are opaque: only equality with the last seen value matters.
/// Backends send either timestamp strings or epoch numbers; both are kept
/// in their JSON text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    #[serde(rename = "doctors", default, deserialize_with = "marker")]
    pub contacts: Option<String>,
    #[serde(default, deserialize_with = "marker")]
    pub procedures: Option<String>,
}

fn marker<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "sync marker must be a scalar, got {other}"
        ))),
    }
}

/// REST collaborator endpoints used by [`SyncController`](super::SyncController).
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Full contact list, each with its embedded visits.
    async fn fetch_contacts(&self) -> ApiResult<Vec<Contact>>;

    async fn fetch_sync_status(&self) -> ApiResult<SyncStatus>;

    /// Create or replace one contact, visits included.
    async fn upsert_contact(&self, contact: &Contact) -> ApiResult<()>;

    async fn bulk_upsert_contacts(&self, contacts: &[Contact]) -> ApiResult<()>;

    async fn delete_contact(&self, contact_id: &str) -> ApiResult<()>;

    async fn delete_visit(&self, contact_id: &str, visit_id: &str) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_wire_format() {
        let status: SyncStatus =
            serde_json::from_str(r#"{"doctors":"2024-03-05T10:00:00Z","procedures":null}"#)
                .unwrap();
        assert_eq!(status.contacts.as_deref(), Some("2024-03-05T10:00:00Z"));
        assert_eq!(status.procedures, None);

        let empty: SyncStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SyncStatus::default());
    }

    #[test]
    fn test_sync_status_numeric_markers() {
        let status: SyncStatus =
            serde_json::from_str(r#"{"doctors":1710000000000,"procedures":1709999999000}"#)
                .unwrap();
        assert_eq!(status.contacts.as_deref(), Some("1710000000000"));
        assert_eq!(status.procedures.as_deref(), Some("1709999999000"));
    }

    #[test]
    fn test_sync_status_rejects_structured_marker() {
        let result = serde_json::from_str::<SyncStatus>(r#"{"doctors":{"at":1}}"#);
        assert!(result.is_err());
    }
}
