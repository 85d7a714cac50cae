use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw image bytes ready to be forwarded upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePayload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl ResourcePayload {
    pub fn new(bytes: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Byte length of the payload
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// An upstream inference space and the endpoint paths tried under it, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointCandidate {
    pub label: String,
    pub base_url: String,
    pub paths: Vec<String>,
}

/// Normalized result of a successful upstream call
///
/// Serializes as `{"image_url": ...}` or `{"image_base64": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalResult {
    /// Absolute URL of the generated image
    ImageUrl(String),
    /// Base64 image payload, without any `data:` prefix
    ImageBase64(String),
}

/// Liveness of one candidate address, as seen by a HEAD probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpaceStatus {
    Reachable { status: u16, ok: bool },
    Unreachable { error: String },
}

impl SpaceStatus {
    pub fn reachable(status: u16) -> Self {
        SpaceStatus::Reachable {
            status,
            ok: (200..300).contains(&status),
        }
    }
}

/// Diagnostics attached to the degraded response after every candidate failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub spaces_checked: usize,
    pub space_status: BTreeMap<String, SpaceStatus>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
