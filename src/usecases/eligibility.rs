//! Eligibility resolver. Turns a session requirement into a candidate list.

use super::catalog::contains_ci;
use crate::domain::{DomainError, EmployeeCandidate, ResolvedRequirement};
use crate::ports::TrainingBackend;
use std::sync::Arc;
use tracing::{debug, info};

/// Queries the backend for employees eligible for a session.
pub struct EligibilityResolver {
    backend: Arc<dyn TrainingBackend>,
}

impl EligibilityResolver {
    pub fn new(backend: Arc<dyn TrainingBackend>) -> Self {
        Self { backend }
    }

    /// Resolve `requirement` into level labels and issue one candidate query.
    ///
    /// Candidates come back in backend order. An empty list is a valid answer.
    pub async fn query_candidates(
        &self,
        topic: &str,
        requirement: &str,
    ) -> Result<Vec<EmployeeCandidate>, DomainError> {
        let resolved = ResolvedRequirement::resolve(requirement);
        if !resolved.is_range() {
            debug!(requirement, "requirement is not a level range, matching it literally");
        }
        let labels = resolved.into_labels();
        let candidates = self.backend.query_candidates(topic, &labels).await?;
        info!(
            topic,
            levels = labels.len(),
            candidates = candidates.len(),
            "eligible candidates fetched"
        );
        Ok(candidates)
    }

    /// Same as `query_candidates`, wrapped in a searchable pool.
    pub async fn candidate_pool(
        &self,
        topic: &str,
        requirement: &str,
    ) -> Result<CandidatePool, DomainError> {
        self.query_candidates(topic, requirement)
            .await
            .map(CandidatePool::new)
    }
}

/// Candidate list of one registration dialog, with a free-text filter.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    all: Vec<EmployeeCandidate>,
    search: String,
}

impl CandidatePool {
    pub fn new(all: Vec<EmployeeCandidate>) -> Self {
        Self {
            all,
            search: String::new(),
        }
    }

    pub fn all(&self) -> &[EmployeeCandidate] {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Match name, department or nip. An empty term shows everyone.
    pub fn set_search(&mut self, search: &str) -> Vec<&EmployeeCandidate> {
        self.search = search.trim().to_string();
        self.visible()
    }

    pub fn visible(&self) -> Vec<&EmployeeCandidate> {
        let needle = self.search.to_lowercase();
        self.all
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || contains_ci(&c.name, &needle)
                    || contains_ci(&c.department, &needle)
                    || contains_ci(&c.nip, &needle)
            })
            .collect()
    }
}
