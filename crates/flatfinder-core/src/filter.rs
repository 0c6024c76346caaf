//! Structured listing filter handed to the candidate store.
//!
//! A [`ListingFilter`] is the store-independent form of a predicate: the
//! typed structured fields from the classifier plus the pre-rank row cap.
//! Rows always come back ordered by ascending price. `flatfinder-db` compiles
//! it into a parameter-bound SQL statement.

use crate::attributes::{ClassifiedFilters, KnownField, StructuredField};
use crate::defaults;

/// Conjunction of structured field constraints with a row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    fields: Vec<StructuredField>,
    limit: i64,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            limit: defaults::CANDIDATE_LIMIT,
        }
    }
}

impl ListingFilter {
    /// Empty filter: matches every listing, capped at the default limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter over the structured subset of a classified mapping.
    pub fn from_classified(classified: &ClassifiedFilters) -> Self {
        classified
            .structured
            .iter()
            .cloned()
            .fold(Self::new(), Self::with_field)
    }

    /// Add a field constraint, replacing any existing constraint on the same
    /// key. Fields stay in canonical order.
    pub fn with_field(mut self, field: StructuredField) -> Self {
        let key = field.field();
        self.fields.retain(|f| f.field() != key);
        self.fields.push(field);
        self.fields.sort_by_key(StructuredField::field);
        self
    }

    /// Set the pre-rank row cap.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn fields(&self) -> &[StructuredField] {
        &self.fields
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn has_field(&self, field: KnownField) -> bool {
        self.fields.iter().any(|f| f.field() == field)
    }

    /// No field constraints (matches all rows up to the cap).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
