use serde::{Deserialize, Serialize};
use crate::models::domain::{CanonicalResult, DiagnosticReport};

/// Body returned to the caller of `POST /v1/vton/idm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutwardResponse {
    Degraded(DegradedResponse),
    Error(ErrorResponse),
    Success(CanonicalResult),
}

/// Placeholder result served when no candidate produced an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedResponse {
    #[serde(flatten)]
    pub result: CanonicalResult,
    pub warning: String,
    pub debug: DiagnosticReport,
}

/// Error envelope for input and internal failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub debug: ErrorDebug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDebug {
    pub error_type: String,
    pub stack: String,
}
