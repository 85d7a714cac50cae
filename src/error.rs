use crate::core::text::excerpt;
use crate::core::CatalogError;
use crate::models::{ErrorDebug, ErrorResponse, OutwardResponse};
use crate::services::ResolveError;
use actix_multipart::MultipartError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Length of the `debug.stack` text in the error envelope
pub const STACK_EXCERPT_CHARS: usize = 500;

/// Failures that abort a try-on request before failover can run
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Field '{field}' exceeds {limit} bytes")]
    FieldTooLarge { field: String, limit: usize },
}

impl GatewayError {
    /// Category name reported in the error envelope
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Resolve(e) => e.error_type(),
            GatewayError::Multipart(_) => "MultipartError",
            GatewayError::FieldTooLarge { .. } => "PayloadTooLargeError",
        }
    }

    pub fn to_response_body(&self) -> OutwardResponse {
        OutwardResponse::Error(ErrorResponse {
            error: self.to_string(),
            debug: ErrorDebug {
                error_type: self.error_type().to_string(),
                stack: excerpt(&format!("{:?}", self), STACK_EXCERPT_CHARS),
            },
        })
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}

/// Failures while wiring the service together at start-up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl From<StartupError> for std::io::Error {
    fn from(err: StartupError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}
