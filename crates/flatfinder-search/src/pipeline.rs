//! Search pipeline orchestration.
//!
//! One request runs classify → build filter → synthesize text →
//! (fetch candidates ‖ embed text) → rank → negation veto → cap.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use flatfinder_core::{
    classify, defaults, synthesize_query_text, AttributeMapping, EmbeddingBackend, Error,
    IntentExtractor, ListingFilter, ListingRecord, ListingStore, NegationPatternTable, Result,
};

use crate::negation::apply_negation_veto;
use crate::ranking::{rank_by_similarity, rank_unscored, ExclusionReason, RankedCandidates};

/// Pipeline limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Rows fetched from the store before re-ranking.
    pub candidate_limit: i64,
    /// Candidates kept after similarity ranking.
    pub rank_top_k: usize,
    /// Listings returned to the caller.
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: defaults::CANDIDATE_LIMIT,
            rank_top_k: defaults::RANK_TOP_K,
            result_limit: defaults::RESULT_LIMIT,
        }
    }
}

impl SearchConfig {
    /// Read `SEARCH_CANDIDATE_LIMIT`, `SEARCH_RANK_TOP_K` and
    /// `SEARCH_RESULT_LIMIT`, then validate.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            candidate_limit: defaults::env_parse("SEARCH_CANDIDATE_LIMIT", defaults::CANDIDATE_LIMIT)?,
            rank_top_k: defaults::env_parse("SEARCH_RANK_TOP_K", defaults::RANK_TOP_K)?,
            result_limit: defaults::env_parse("SEARCH_RESULT_LIMIT", defaults::RESULT_LIMIT)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidate_limit <= 0 {
            return Err(Error::Config(format!(
                "candidate_limit must be positive, got {}",
                self.candidate_limit
            )));
        }
        if self.rank_top_k == 0 {
            return Err(Error::Config("rank_top_k must be positive".to_string()));
        }
        if self.result_limit == 0 {
            return Err(Error::Config("result_limit must be positive".to_string()));
        }
        Ok(())
    }
}

/// Terminal state of a search that did not hit an infrastructure failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "listings", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Best matches, most similar first.
    Results(Vec<ListingRecord>),
    /// The query was understood but nothing survived filtering.
    NoMatch,
    /// No attribute mapping could be extracted from the request.
    QueryMisunderstood,
}

impl SearchOutcome {
    pub fn listings(&self) -> &[ListingRecord] {
        match self {
            Self::Results(listings) => listings,
            _ => &[],
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Results(_) => "results",
            Self::NoMatch => "no_match",
            Self::QueryMisunderstood => "query_misunderstood",
        }
    }
}

/// Text shown to the person who asked.
///
/// Infrastructure failures are never reported as "no match".
pub fn user_message(outcome: &Result<SearchOutcome>) -> String {
    match outcome {
        Ok(SearchOutcome::Results(listings)) => {
            format!("Found {} matching apartments:", listings.len())
        }
        Ok(SearchOutcome::NoMatch) => "No apartments matched your request.".to_string(),
        Ok(SearchOutcome::QueryMisunderstood) => {
            "Sorry, I couldn't understand your request.".to_string()
        }
        Err(Error::InvalidInput(msg)) => format!("Invalid search request: {}", msg),
        Err(_) => "Search is temporarily unavailable, please try again later.".to_string(),
    }
}

/// Hybrid apartment search over an injected store and embedding backend.
#[derive(Clone)]
pub struct ApartmentSearchEngine {
    store: Arc<dyn ListingStore>,
    embedder: Arc<dyn EmbeddingBackend>,
    config: SearchConfig,
    negation: NegationPatternTable,
}

impl ApartmentSearchEngine {
    /// Engine with default limits and the built-in negation table.
    pub fn new(store: Arc<dyn ListingStore>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            store,
            embedder,
            config: SearchConfig::default(),
            negation: NegationPatternTable::shared().clone(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_negation_table(mut self, table: NegationPatternTable) -> Self {
        self.negation = table;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the pipeline for an already extracted mapping.
    ///
    /// `None` means extraction failed upstream and yields
    /// [`SearchOutcome::QueryMisunderstood`] without touching the store.
    pub async fn search(&self, mapping: Option<AttributeMapping>) -> Result<SearchOutcome> {
        let Some(mapping) = mapping else {
            info!(
                subsystem = "search",
                component = "pipeline",
                outcome = "query_misunderstood",
                "No search intent extracted"
            );
            return Ok(SearchOutcome::QueryMisunderstood);
        };

        let start = Instant::now();
        let classified = classify(&mapping);
        let filter =
            ListingFilter::from_classified(&classified).with_limit(self.config.candidate_limit);
        let query_text = synthesize_query_text(&mapping);

        debug!(
            subsystem = "search",
            component = "pipeline",
            op = "plan",
            param_count = filter.fields().len(),
            extra_count = classified.extras.len(),
            query_text = %query_text,
            "Planned search"
        );

        let (candidate_count, ranked) = self.retrieve(&filter, &query_text).await?;
        let ranked_count = ranked.len();
        let excluded_count = ranked.excluded.len();

        let kept = apply_negation_veto(ranked.ranked, &mapping, &self.negation);
        let vetoed_count = ranked_count - kept.len();

        let listings: Vec<ListingRecord> = kept
            .into_iter()
            .take(self.config.result_limit)
            .map(|c| c.listing)
            .collect();

        let outcome = if listings.is_empty() {
            SearchOutcome::NoMatch
        } else {
            SearchOutcome::Results(listings)
        };

        info!(
            subsystem = "search",
            component = "pipeline",
            op = "search",
            candidate_count,
            ranked_count,
            excluded_count,
            vetoed_count,
            result_count = outcome.listings().len(),
            outcome = outcome.label(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(outcome)
    }

    /// Extract intent from free text, then search.
    pub async fn search_text(
        &self,
        extractor: &dyn IntentExtractor,
        text: &str,
    ) -> Result<SearchOutcome> {
        let mapping = extractor.extract(text).await?;
        self.search(mapping).await
    }

    /// Fetch candidates and, when there is text to embed, rank them.
    ///
    /// The store query and the embedding call run concurrently; the first
    /// failure aborts the request.
    async fn retrieve(
        &self,
        filter: &ListingFilter,
        query_text: &str,
    ) -> Result<(usize, RankedCandidates)> {
        if query_text.is_empty() {
            let candidates = self.store.fetch_candidates(filter).await?;
            let count = candidates.len();
            return Ok((count, rank_unscored(candidates, self.config.rank_top_k)));
        }

        let texts = vec![query_text.to_string()];
        let (candidates, vectors) = futures::try_join!(
            self.store.fetch_candidates(filter),
            self.embedder.embed_texts(&texts)
        )?;

        let query = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Embedding backend returned no vector".to_string()))?;

        let expected = self.embedder.dimension();
        if query.as_slice().len() != expected {
            return Err(Error::Config(format!(
                "Query embedding from {} has {} dimensions, expected {}",
                self.embedder.model_name(),
                query.as_slice().len(),
                expected
            )));
        }

        let count = candidates.len();
        let ranked = rank_by_similarity(candidates, query.as_slice(), self.config.rank_top_k);

        // The vector column has one fixed dimension, so a stored length that
        // disagrees with the embedder affects every row.
        if let Some(mismatch) = ranked.excluded.iter().find_map(|e| match e.reason {
            ExclusionReason::DimensionMismatch { expected, actual } => {
                Some((e.listing_id, expected, actual))
            }
            _ => None,
        }) {
            let (listing_id, expected, actual) = mismatch;
            return Err(Error::Config(format!(
                "Stored embedding for listing {} has {} dimensions, but {} produces {}",
                listing_id,
                actual,
                self.embedder.model_name(),
                expected
            )));
        }

        Ok((count, ranked))
    }
}
