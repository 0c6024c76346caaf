//! # flatfinder-db
//!
//! PostgreSQL + pgvector listing store for flatfinder.
//!
//! This crate provides:
//! - Connection pool management
//! - The predicate builder compiling a [`ListingFilter`] into bound SQL
//! - [`PgListingRepository`], the [`ListingStore`] over the `apartments` table
//!
//! ## Example
//!
//! ```rust,ignore
//! use flatfinder_db::{create_pool, ListingFilter, ListingStore, PgListingRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/flatfinder").await?;
//!     let repo = PgListingRepository::new(pool);
//!     let rows = repo.fetch_candidates(&ListingFilter::new()).await?;
//!     println!("{} listings", rows.len());
//!     Ok(())
//! }
//! ```

pub mod listing_filter;
pub mod listings;
pub mod pool;

// Re-export core types
pub use flatfinder_core::*;

pub use listing_filter::{
    ComparisonOp, ListingFilterQueryBuilder, PredicateClause, QueryParam, LISTING_COLUMNS,
};
pub use listings::{validate_table_name, PgListingRepository};
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
