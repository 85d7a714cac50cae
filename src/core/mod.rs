// Core gateway exports
pub mod catalog;
pub mod failover;
pub mod normalizer;
pub mod text;

pub use catalog::{Attempt, CatalogError, EndpointCatalog};
pub use failover::{AttemptOutcome, AttemptRecord, Failover, FailoverOutcome};
pub use normalizer::{normalize, ResponseShape, UnrecognizedFormat, SHAPE_PRIORITY};
