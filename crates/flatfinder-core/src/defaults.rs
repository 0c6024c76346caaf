//! Centralized default constants for flatfinder.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Rows fetched from the structured store before vector re-ranking.
pub const CANDIDATE_LIMIT: i64 = 20;

/// Candidates kept after similarity ranking, fed into the negation filter.
pub const RANK_TOP_K: usize = 10;

/// Final number of listings handed back to the caller.
pub const RESULT_LIMIT: usize = 3;

// =============================================================================
// STORE
// =============================================================================

/// Table holding listing rows and their embeddings.
pub const LISTINGS_TABLE: &str = "apartments";

/// Default database URL when `DATABASE_URL` is unset.
pub const DATABASE_URL: &str = "postgres://localhost/flatfinder";

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model name.
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Default embedding vector dimension for text-embedding-3-small.
pub const EMBED_DIMENSION: usize = 1536;

/// Default model used for intent extraction.
pub const GEN_MODEL: &str = "gpt-4o-mini";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Read `key` from the environment, falling back to `default` when unset.
///
/// A set but unparseable value is a configuration error rather than a silent
/// fallback.
pub fn env_parse<T>(key: &str, default: T) -> crate::Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            crate::Error::Config(format!("{} has an invalid value: '{}'", key, raw))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_default_when_unset() {
        let v: usize = env_parse("FLATFINDER_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("FLATFINDER_TEST_GARBAGE_VAR", "seven");
        let r: crate::Result<usize> = env_parse("FLATFINDER_TEST_GARBAGE_VAR", 7);
        assert!(matches!(r, Err(crate::Error::Config(_))));
        std::env::remove_var("FLATFINDER_TEST_GARBAGE_VAR");
    }

    #[test]
    fn test_env_parse_trims() {
        std::env::set_var("FLATFINDER_TEST_TRIM_VAR", " 42 ");
        let v: i64 = env_parse("FLATFINDER_TEST_TRIM_VAR", 1).unwrap();
        assert_eq!(v, 42);
        std::env::remove_var("FLATFINDER_TEST_TRIM_VAR");
    }
}
