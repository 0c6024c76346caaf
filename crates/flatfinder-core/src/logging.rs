//! Structured logging field name constants for flatfinder.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Per-record data defects, rejected filter values |
//! | INFO  | Lifecycle events, pipeline completions |
//! | DEBUG | Compiled predicates, synthesized text, config choices |
//! | TRACE | Per-candidate scores and veto decisions |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "search", "db", "inference", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pipeline", "ranker", "negation", "pool", "openai"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "fetch_candidates", "embed_texts", "extract"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Listing identifier being operated on.
pub const LISTING_ID: &str = "listing_id";

/// Attribute key (structured or extra).
pub const ATTRIBUTE: &str = "attribute";

/// Synthesized embedding input text.
pub const QUERY_TEXT: &str = "query_text";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned to the caller.
pub const RESULT_COUNT: &str = "result_count";

/// Number of candidates fetched from the store.
pub const CANDIDATE_COUNT: &str = "candidate_count";

/// Number of candidates that survived ranking.
pub const RANKED_COUNT: &str = "ranked_count";

/// Number of candidates excluded for malformed vectors.
pub const EXCLUDED_COUNT: &str = "excluded_count";

/// Number of candidates vetoed by the negation filter.
pub const VETOED_COUNT: &str = "vetoed_count";

/// Number of bound SQL parameters.
pub const PARAM_COUNT: &str = "param_count";

/// Similarity score.
pub const SCORE: &str = "score";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Embedding dimension.
pub const DIMENSION: &str = "dimension";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Terminal state of a pipeline run.
pub const OUTCOME: &str = "outcome";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
