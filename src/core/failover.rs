use crate::config::FallbackSettings;
use crate::core::catalog::{Attempt, EndpointCatalog};
use crate::models::{
    CanonicalResult, DegradedResponse, DiagnosticReport, OutwardResponse, ResourcePayload,
};
use crate::services::UpstreamClient;
use futures_util::future::join_all;
use std::collections::BTreeMap;

/// How a single `(address, path)` attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

/// One entry of the per-request attempt trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub label: String,
    pub url: String,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    fn new(attempt: &Attempt, outcome: AttemptOutcome) -> Self {
        Self {
            label: attempt.label.clone(),
            url: attempt.url(),
            outcome,
        }
    }
}

/// Result of a failover run: the body to send plus what was tried on the way
#[derive(Debug, Clone)]
pub struct FailoverOutcome {
    pub response: OutwardResponse,
    pub attempts: Vec<AttemptRecord>,
}

impl FailoverOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self.response, OutwardResponse::Degraded(_))
    }
}

/// Walks the catalog until one upstream produces a result
///
/// # States
/// 1. Trying: each attempt is invoked once, in catalog order
/// 2. Succeeded: the first normalized result is returned, nothing else is called
/// 3. AllFailed: candidate addresses are probed and a placeholder is returned
pub struct Failover {
    catalog: EndpointCatalog,
    upstream: UpstreamClient,
    fallback: FallbackSettings,
}

impl Failover {
    pub fn new(
        catalog: EndpointCatalog,
        upstream: UpstreamClient,
        fallback: FallbackSettings,
    ) -> Self {
        Self {
            catalog,
            upstream,
            fallback,
        }
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.catalog
    }

    /// Run the failover scan for one request. Never fails.
    pub async fn run(
        &self,
        person: &ResourcePayload,
        garment: &ResourcePayload,
    ) -> FailoverOutcome {
        let mut attempts = Vec::with_capacity(self.catalog.attempts().len());

        for attempt in self.catalog.attempts() {
            tracing::info!("Trying {} with endpoint {}", attempt.label, attempt.path);

            match self.upstream.invoke(attempt, person, garment).await {
                Ok(result) => {
                    tracing::info!("Success with {}{}", attempt.label, attempt.path);
                    attempts.push(AttemptRecord::new(attempt, AttemptOutcome::Succeeded));
                    return FailoverOutcome {
                        response: OutwardResponse::Success(result),
                        attempts,
                    };
                }
                Err(e) => {
                    tracing::warn!("Failed {}{}: {}", attempt.label, attempt.path, e);
                    let outcome = AttemptOutcome::Failed(e.to_string());
                    attempts.push(AttemptRecord::new(attempt, outcome));
                }
            }
        }

        tracing::error!(
            "All {} upstream attempts failed, checking space availability",
            attempts.len()
        );

        let report = self.diagnose().await;

        FailoverOutcome {
            response: OutwardResponse::Degraded(DegradedResponse {
                result: CanonicalResult::ImageUrl(self.fallback.placeholder_url.clone()),
                warning: self.fallback.warning.clone(),
                debug: report,
            }),
            attempts,
        }
    }

    /// Probe every distinct candidate address concurrently
    pub async fn diagnose(&self) -> DiagnosticReport {
        let addresses = self.catalog.addresses();
        let probes = addresses.iter().map(|address| async move {
            let status = self.upstream.probe(address).await;
            tracing::debug!("Probe {}: {:?}", address, status);
            (address.clone(), status)
        });

        let space_status: BTreeMap<_, _> = join_all(probes).await.into_iter().collect();

        DiagnosticReport {
            spaces_checked: self.catalog.len(),
            space_status,
            timestamp: chrono::Utc::now(),
        }
    }
}
