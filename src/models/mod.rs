// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CanonicalResult, DiagnosticReport, EndpointCandidate, ResourcePayload, SpaceStatus,
};
pub use requests::{FormField, InboundFields};
pub use responses::{DegradedResponse, ErrorDebug, ErrorResponse, OutwardResponse};
