//! In-memory case store.
//!
//! Ordered collection of case records, newest first once uploads start
//! arriving. Only the ingestion pipeline prepends; nothing else changes the
//! shape of the collection, so no synchronization is needed.

use crate::error::ViewerError;
use crate::model::{Case, CaseStatus};

/// Number of cases per status, for dashboard summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub critical: usize,
    pub review: usize,
    pub normal: usize,
}

/// Dashboard listing filter.
#[derive(Debug, Clone, Default)]
pub struct CaseQuery {
    /// Only cases with this status (None = all)
    pub status: Option<CaseStatus>,
    /// Case-insensitive substring of patient name or patient id
    pub search: String,
}

impl CaseQuery {
    pub fn matches(&self, case: &Case) -> bool {
        let status_ok = self.status.is_none_or(|s| case.status == s);
        status_ok && (self.search.is_empty() || case.matches_search(&self.search))
    }
}

/// Ordered, id-keyed storage for case records.
#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    cases: Vec<Case>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Create a store holding the given cases in order.
    pub fn with_cases(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    /// Insert a case at the front so it becomes the first listed entry.
    ///
    /// Fails without touching the store if the id is already present.
    pub fn prepend(&mut self, case: Case) -> Result<(), ViewerError> {
        if self.contains(&case.id) {
            return Err(ViewerError::DuplicateCase { id: case.id });
        }
        log::info!(
            "Case store: prepended case '{}' ({})",
            case.id,
            case.status.name()
        );
        self.cases.insert(0, case);
        Ok(())
    }

    /// Borrow the stored case with the given id.
    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Mutable access to the stored case; changes are visible to every later lookup.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Case> {
        self.cases.iter_mut().find(|c| c.id == id)
    }

    /// Like [`get`](Self::get) but reports a missing id as `NotFound`.
    pub fn find(&self, id: &str) -> Result<&Case, ViewerError> {
        self.get(id).ok_or_else(|| ViewerError::not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Full listing, in store order.
    pub fn list(&self) -> &[Case] {
        &self.cases
    }

    /// Cases matching a dashboard query, in store order.
    pub fn query(&self, query: &CaseQuery) -> Vec<&Case> {
        self.cases.iter().filter(|c| query.matches(c)).collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.cases
            .iter()
            .fold(StatusCounts::default(), |mut counts, case| {
                counts.total += 1;
                match case.status {
                    CaseStatus::Critical => counts.critical += 1,
                    CaseStatus::Review => counts.review += 1,
                    CaseStatus::Normal => counts.normal += 1,
                }
                counts
            })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
