//! Listing repository: the Postgres implementation of [`ListingStore`].

use std::time::Instant;

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, warn};

use flatfinder_core::{defaults, Error, ListingFilter, ListingRecord, ListingStore, Result};

use crate::listing_filter::{ListingFilterQueryBuilder, QueryParam};

/// Validate a table name before it is spliced into SQL.
///
/// Identifiers cannot be bound as parameters, so the name must be a plain
/// Postgres identifier: non-empty, at most 63 bytes, starting with a letter
/// or underscore, and containing only ASCII alphanumerics and underscores.
///
/// ```
/// use flatfinder_db::validate_table_name;
///
/// assert!(validate_table_name("apartments").is_ok());
/// assert!(validate_table_name("apartments; DROP").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("Table name cannot be empty".to_string()));
    }

    if name.len() > 63 {
        return Err(Error::InvalidInput(format!(
            "Table name exceeds 63 character limit: {} characters",
            name.len()
        )));
    }

    if let Some(first) = name.chars().next() {
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::InvalidInput(format!(
                "Table name must start with a letter or underscore, found: '{}'",
                first
            )));
        }
    }

    if let Some(ch) = name
        .chars()
        .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(Error::InvalidInput(format!(
            "Table name contains invalid character: '{}'",
            ch
        )));
    }

    Ok(())
}

/// Listing store backed by a Postgres table with a pgvector `embedding`
/// column.
#[derive(Clone)]
pub struct PgListingRepository {
    pool: PgPool,
    table: String,
}

impl PgListingRepository {
    /// Repository over the default `apartments` table.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table: defaults::LISTINGS_TABLE.to_string(),
        }
    }

    /// Repository over a different table with the same columns.
    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn row_to_listing(row: &PgRow) -> Result<ListingRecord> {
    let id: i32 = row.try_get("id")?;

    // A malformed stored vector only costs this row its score; the ranker
    // excludes it rather than failing the whole search.
    let embedding = match row.try_get::<Option<Vector>, _>("embedding") {
        Ok(v) => v,
        Err(e) => {
            warn!(
                subsystem = "database",
                component = "listings",
                listing_id = id,
                error = %e,
                "Failed to decode stored embedding"
            );
            None
        }
    };

    Ok(ListingRecord {
        id,
        location: row.try_get("location")?,
        rooms: row.try_get("rooms")?,
        price: row.try_get("price")?,
        area: row.try_get("area")?,
        floor: row.try_get("floor")?,
        beds: row.try_get("beds")?,
        has_wifi: row.try_get("has_wifi")?,
        has_parking: row.try_get("has_parking")?,
        has_kitchen: row.try_get("has_kitchen")?,
        description: row.try_get("description")?,
        embedding,
    })
}

#[async_trait]
impl ListingStore for PgListingRepository {
    async fn fetch_candidates(&self, filter: &ListingFilter) -> Result<Vec<ListingRecord>> {
        let start = Instant::now();
        let (sql, params) = ListingFilterQueryBuilder::new(filter.clone(), 0).build_select(&self.table);

        let mut q = sqlx::query(&sql);
        for param in &params {
            q = match param {
                QueryParam::Int(v) => q.bind(v),
                QueryParam::BigInt(v) => q.bind(v),
                QueryParam::Float(v) => q.bind(v),
                QueryParam::Bool(v) => q.bind(v),
                QueryParam::String(v) => q.bind(v),
            };
        }

        let rows = q.fetch_all(&self.pool).await.map_err(Error::Database)?;
        let listings = rows
            .iter()
            .map(row_to_listing)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "database",
            component = "listings",
            op = "fetch_candidates",
            param_count = params.len(),
            candidate_count = listings.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched candidate listings"
        );

        Ok(listings)
    }
}
