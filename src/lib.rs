//! VTON Gateway - failover gateway for virtual try-on inference services
//!
//! Accepts a person image and a garment image, tries a fixed catalog of
//! upstream inference spaces in order until one produces a result, and
//! normalizes whatever shape that space answered with. When every space
//! fails it answers with a placeholder image and liveness diagnostics.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, EndpointCatalog, Failover, FailoverOutcome};
pub use crate::error::GatewayError;
pub use crate::models::{CanonicalResult, DiagnosticReport, OutwardResponse, ResourcePayload};
