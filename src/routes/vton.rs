use crate::config::Settings;
use crate::core::{EndpointCatalog, Failover};
use crate::error::{GatewayError, StartupError};
use crate::models::{FormField, InboundFields};
use crate::services::{http_client, ResourceResolver, UpstreamClient};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use std::sync::Arc;
use tracing::Instrument;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResourceResolver>,
    pub failover: Arc<Failover>,
    pub max_field_bytes: usize,
}

impl AppState {
    /// Build the resolver and failover pipeline from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        let catalog = EndpointCatalog::from_settings(&settings.catalog)?;
        let client = http_client(&settings.upstream)?;

        let resolver = ResourceResolver::new(client.clone(), settings.upstream.fetch_timeout());
        let upstream = UpstreamClient::new(client, &settings.upstream);
        let failover = Failover::new(catalog, upstream, settings.fallback.clone());

        Ok(Self {
            resolver: Arc::new(resolver),
            failover: Arc::new(failover),
            max_field_bytes: settings.limits.max_field_bytes,
        })
    }
}

/// Virtual try-on endpoint
///
/// POST /v1/vton/idm
///
/// Multipart fields: `person` or `person_url`, `garment` or `garment_url`.
/// Answers with the first upstream result, or a placeholder with diagnostics
/// when every upstream failed.
pub async fn try_on(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, GatewayError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("vton_request", request_id = %request_id);

    async move {
        let result = process(&state, payload).await;
        if let Err(e) = &result {
            tracing::error!("Request failed ({}): {}", e.error_type(), e);
        }
        result
    }
    .instrument(span)
    .await
}

async fn process(state: &AppState, payload: Multipart) -> Result<HttpResponse, GatewayError> {
    let fields = read_fields(payload, state.max_field_bytes).await?;
    let (person, garment) = state.resolver.resolve_pair(&fields).await?;

    tracing::info!(
        "Person payload: {} bytes ({}), garment payload: {} bytes ({})",
        person.len(),
        person.content_type,
        garment.len(),
        garment.content_type
    );

    let outcome = state.failover.run(&person, &garment).await;

    if outcome.is_degraded() {
        tracing::warn!("Serving placeholder after {} failed attempts", outcome.attempts.len());
    }

    Ok(HttpResponse::Ok().json(outcome.response))
}

/// Collect every multipart field, bounding each one to `limit` bytes
async fn read_fields(mut payload: Multipart, limit: usize) -> Result<InboundFields, GatewayError> {
    let mut fields = InboundFields::new();

    while let Some(mut field) = payload.try_next().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            if buf.len() + chunk.len() > limit {
                return Err(GatewayError::FieldTooLarge { field: name, limit });
            }
            buf.extend_from_slice(&chunk);
        }

        fields.insert(
            name,
            FormField {
                bytes: buf.freeze(),
                content_type,
            },
        );
    }

    tracing::debug!("Received {} multipart fields", fields.len());
    Ok(fields)
}
