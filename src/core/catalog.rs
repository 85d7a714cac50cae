use crate::config::EndpointSettings;
use crate::models::EndpointCandidate;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Errors raised while building the catalog from configuration
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Endpoint catalog is empty")]
    Empty,

    #[error("Invalid catalog entry '{label}': {source}")]
    Invalid {
        label: String,
        #[source]
        source: ValidationErrors,
    },
}

/// One `(address, path)` pair to try, in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub label: String,
    pub address: String,
    pub path: String,
}

impl Attempt {
    /// Full URL the invocation is POSTed to
    pub fn url(&self) -> String {
        format!("{}{}", self.address, self.path)
    }
}

/// Ordered, immutable list of upstream candidates
///
/// The candidate × path nesting is flattened once at construction so the
/// failover loop is a single linear scan.
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    candidates: Vec<EndpointCandidate>,
    attempts: Vec<Attempt>,
}

impl EndpointCatalog {
    pub fn new(candidates: Vec<EndpointCandidate>) -> Result<Self, CatalogError> {
        if candidates.is_empty() {
            return Err(CatalogError::Empty);
        }

        let attempts = candidates
            .iter()
            .flat_map(|candidate| {
                let address = candidate.base_url.trim_end_matches('/').to_string();
                candidate.paths.iter().map(move |path| Attempt {
                    label: candidate.label.clone(),
                    address: address.clone(),
                    path: normalize_path(path),
                })
            })
            .collect();

        Ok(Self { candidates, attempts })
    }

    /// Validate configured entries and build the catalog
    pub fn from_settings(entries: &[EndpointSettings]) -> Result<Self, CatalogError> {
        let mut candidates = Vec::with_capacity(entries.len());
        for entry in entries {
            entry.validate().map_err(|source| CatalogError::Invalid {
                label: entry.label.clone(),
                source,
            })?;
            candidates.push(EndpointCandidate {
                label: entry.label.clone(),
                base_url: entry.base_url.clone(),
                paths: entry.paths.clone(),
            });
        }
        Self::new(candidates)
    }

    pub fn candidates(&self) -> &[EndpointCandidate] {
        &self.candidates
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    /// Distinct candidate addresses, in first-seen order
    pub fn addresses(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for attempt in &self.attempts {
            if !seen.contains(&attempt.address) {
                seen.push(attempt.address.clone());
            }
        }
        seen
    }

    /// Number of candidates (not attempts)
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn normalize_path(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
