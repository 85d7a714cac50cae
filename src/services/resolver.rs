use crate::models::{InboundFields, ResourcePayload};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

pub const PERSON: &str = "person";
pub const PERSON_URL: &str = "person_url";
pub const GARMENT: &str = "garment";
pub const GARMENT_URL: &str = "garment_url";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors that can occur while resolving the request's images
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{binary_key} or {url_key} required")]
    MissingInput {
        binary_key: &'static str,
        url_key: &'static str,
    },

    #[error("Failed to fetch {key} image from {url}: HTTP {status}")]
    UpstreamFetch {
        key: &'static str,
        url: String,
        status: u16,
    },

    #[error("Failed to fetch {key} image from {url}: {source}")]
    Request {
        key: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ResolveError {
    /// Category name reported in the error envelope
    pub fn error_type(&self) -> &'static str {
        match self {
            ResolveError::MissingInput { .. } => "MissingInputError",
            ResolveError::UpstreamFetch { .. } | ResolveError::Request { .. } => {
                "UpstreamFetchError"
            }
        }
    }
}

/// Where an image comes from, decided before any network I/O
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    Inline(ResourcePayload),
    Remote(String),
}

/// Pick the binary field if present, else the URL field
pub fn locate(
    fields: &InboundFields,
    binary_key: &'static str,
    url_key: &'static str,
) -> Result<ResourceSource, ResolveError> {
    if let Some(field) = fields.binary(binary_key) {
        let content_type = field
            .content_type
            .clone()
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        return Ok(ResourceSource::Inline(ResourcePayload::new(field.bytes.clone(), content_type)));
    }

    match fields.text(url_key) {
        Some(url) => Ok(ResourceSource::Remote(url)),
        None => Err(ResolveError::MissingInput { binary_key, url_key }),
    }
}

/// Turns request fields into image payloads, downloading URL-supplied images
pub struct ResourceResolver {
    client: Client,
    timeout: Duration,
}

impl ResourceResolver {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Resolve a single image from `binary_key`, falling back to `url_key`
    pub async fn resolve(
        &self,
        fields: &InboundFields,
        binary_key: &'static str,
        url_key: &'static str,
    ) -> Result<ResourcePayload, ResolveError> {
        let source = locate(fields, binary_key, url_key)?;
        self.fetch(binary_key, source).await
    }

    /// Resolve person and garment images
    ///
    /// Both sources are located before anything is fetched, so a request
    /// missing either image never causes an outbound call.
    pub async fn resolve_pair(
        &self,
        fields: &InboundFields,
    ) -> Result<(ResourcePayload, ResourcePayload), ResolveError> {
        let person = locate(fields, PERSON, PERSON_URL)?;
        let garment = locate(fields, GARMENT, GARMENT_URL)?;

        tokio::try_join!(self.fetch(PERSON, person), self.fetch(GARMENT, garment))
    }

    async fn fetch(
        &self,
        key: &'static str,
        source: ResourceSource,
    ) -> Result<ResourcePayload, ResolveError> {
        let url = match source {
            ResourceSource::Inline(payload) => return Ok(payload),
            ResourceSource::Remote(url) => url,
        };

        tracing::info!("Fetching {} from URL: {}", key, url);

        let request_error = |source: reqwest::Error| ResolveError::Request {
            key,
            url: url.clone(),
            source,
        };

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(ResolveError::UpstreamFetch {
                key,
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let bytes = response.bytes().await.map_err(request_error)?;

        Ok(ResourcePayload::new(bytes, content_type))
    }
}
