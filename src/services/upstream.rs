use crate::config::UpstreamSettings;
use crate::core::catalog::Attempt;
use crate::core::normalizer::{normalize, UnrecognizedFormat, FORMAT_EXCERPT_CHARS};
use crate::core::text::excerpt;
use crate::models::{CanonicalResult, ResourcePayload, SpaceStatus};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Length of the body excerpt carried by [`InvokeError::Upstream`]
pub const ERROR_EXCERPT_CHARS: usize = 100;

/// Errors from a single upstream invocation
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body_excerpt}")]
    Upstream { status: u16, body_excerpt: String },

    #[error(transparent)]
    UnrecognizedFormat(#[from] UnrecognizedFormat),
}

/// Client for the inference spaces listed in the catalog
pub struct UpstreamClient {
    client: Client,
    user_agent: String,
    invoke_timeout: Duration,
    probe_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(client: Client, settings: &UpstreamSettings) -> Self {
        Self {
            client,
            user_agent: settings.user_agent.clone(),
            invoke_timeout: settings.invoke_timeout(),
            probe_timeout: settings.probe_timeout(),
        }
    }

    /// POST both images to one `(address, path)` pair and normalize the answer
    pub async fn invoke(
        &self,
        attempt: &Attempt,
        person: &ResourcePayload,
        garment: &ResourcePayload,
    ) -> Result<CanonicalResult, InvokeError> {
        let url = attempt.url();
        tracing::debug!("Calling: {}", url);

        let form = Form::new()
            .part("person", image_part(person, "person.jpg")?)
            .part("garment", image_part(garment, "garment.jpg")?);

        let response = self
            .client
            .post(&url)
            .timeout(self.invoke_timeout)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Error response body from {}: {}", url, excerpt(&body, 200));
            return Err(InvokeError::Upstream {
                status: status.as_u16(),
                body_excerpt: excerpt(&body, ERROR_EXCERPT_CHARS),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_else(|| "unknown".to_string());

        if content_type.contains("application/json") {
            let body = response.bytes().await?;
            let json: Value = serde_json::from_slice(&body).map_err(|_| UnrecognizedFormat {
                content_type: content_type.clone(),
                body_excerpt: excerpt(&String::from_utf8_lossy(&body), FORMAT_EXCERPT_CHARS),
            })?;
            return Ok(normalize(&json)?);
        }

        if content_type.contains("image/") {
            let body = response.bytes().await?;
            if body.is_empty() {
                return Err(UnrecognizedFormat {
                    content_type,
                    body_excerpt: String::new(),
                }
                .into());
            }
            tracing::debug!("Response from {} is a direct image ({} bytes)", url, body.len());
            return Ok(CanonicalResult::ImageBase64(BASE64.encode(&body)));
        }

        let body = response.text().await.unwrap_or_default();
        Err(UnrecognizedFormat {
            content_type,
            body_excerpt: excerpt(&body, FORMAT_EXCERPT_CHARS),
        }
        .into())
    }

    /// Best-effort HEAD probe of a candidate address
    pub async fn probe(&self, address: &str) -> SpaceStatus {
        let result = self
            .client
            .head(address)
            .timeout(self.probe_timeout)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await;

        match result {
            Ok(response) => SpaceStatus::reachable(response.status().as_u16()),
            Err(e) => SpaceStatus::Unreachable { error: e.to_string() },
        }
    }
}

fn image_part(
    payload: &ResourcePayload,
    file_name: &'static str,
) -> Result<Part, reqwest::Error> {
    // Bytes clones share the buffer
    let part = || {
        Part::stream_with_length(Body::from(payload.bytes.clone()), payload.len() as u64)
            .file_name(file_name)
    };
    part()
        .mime_str(&payload.content_type)
        .or_else(|_| part().mime_str("application/octet-stream"))
}
