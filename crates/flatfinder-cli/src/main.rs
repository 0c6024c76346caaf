//! `flatfinder` command-line driver.

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use flatfinder_core::{
    classify, defaults, synthesize_query_text, AttributeMapping, AttributeValue, Error,
    ListingFilter, Result,
};
use flatfinder_db::{create_pool_with_config, ListingFilterQueryBuilder, PgListingRepository, PoolConfig};
use flatfinder_inference::OpenAIBackend;
use flatfinder_search::{user_message, ApartmentSearchEngine, SearchConfig, SearchOutcome};

mod logging;

#[derive(Parser)]
#[command(name = "flatfinder")]
#[command(author, version, about = "Hybrid structured + semantic apartment search")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listings from a natural-language request or explicit filters
    Search {
        /// Free-text request, e.g. "2-room flat in Lviv with wifi"
        #[arg(required_unless_present = "filters", conflicts_with = "filters")]
        text: Option<String>,

        /// Attribute mapping as a JSON object; skips intent extraction
        #[arg(short, long)]
        filters: Option<String>,
    },

    /// Show how filters are classified and compiled, without running a search
    Explain {
        /// Attribute mapping as a JSON object
        #[arg(short, long)]
        filters: String,
    },
}

/// Offline view of the query plan for a mapping.
#[derive(Debug, Serialize)]
struct Explanation {
    structured: Vec<String>,
    extras: BTreeMap<String, AttributeValue>,
    rejected: Vec<String>,
    sql: String,
    params: Vec<String>,
    query_text: String,
}

fn explain(mapping: &AttributeMapping, candidate_limit: i64) -> Explanation {
    let classified = classify(mapping);
    let filter = ListingFilter::from_classified(&classified).with_limit(candidate_limit);
    let builder = ListingFilterQueryBuilder::new(filter, 0);
    let structured = builder
        .clauses()
        .iter()
        .map(|c| format!("{} {} {}", c.column, c.op, c.param))
        .collect();
    let (sql, params) = builder.build_select(defaults::LISTINGS_TABLE);

    Explanation {
        structured,
        extras: classified.extras,
        rejected: classified.rejected,
        sql,
        params: params.iter().map(ToString::to_string).collect(),
        query_text: synthesize_query_text(mapping),
    }
}

/// What the caller asked to search for.
#[derive(Debug)]
enum SearchRequest {
    Text(String),
    Filters(AttributeMapping),
}

/// Validate caller input before any connection is opened.
///
/// A malformed `--filters` value is the caller's mistake, so it is reported
/// as [`Error::InvalidInput`].
fn parse_request(text: Option<String>, filters: Option<String>) -> Result<SearchRequest> {
    match (filters, text) {
        (Some(filters), _) => AttributeMapping::from_json_str(&filters)
            .map(SearchRequest::Filters)
            .map_err(|e| match e {
                Error::InvalidInput(msg) => Error::InvalidInput(msg),
                other => Error::InvalidInput(format!("--filters is not valid JSON: {}", other)),
            }),
        (None, Some(text)) => Ok(SearchRequest::Text(text)),
        (None, None) => Err(Error::InvalidInput(
            "either a request text or --filters is required".to_string(),
        )),
    }
}

async fn run_search(request: SearchRequest) -> Result<SearchOutcome> {
    let search_config = SearchConfig::from_env()?;
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| defaults::DATABASE_URL.to_string());

    let pool = create_pool_with_config(&database_url, PoolConfig::from_env()?).await?;
    let backend = Arc::new(OpenAIBackend::from_env()?);
    let engine = ApartmentSearchEngine::new(Arc::new(PgListingRepository::new(pool)), backend.clone())
        .with_config(search_config)?;

    match request {
        SearchRequest::Filters(mapping) => engine.search(Some(mapping)).await,
        SearchRequest::Text(text) => engine.search_text(backend.as_ref(), &text).await,
    }
}

fn report(outcome: &Result<SearchOutcome>) -> anyhow::Result<ExitCode> {
    eprintln!("{}", user_message(outcome));

    match outcome {
        Ok(outcome) => {
            for listing in outcome.listings() {
                println!("{}", serde_json::to_string(listing)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(
                subsystem = "cli",
                infrastructure = e.is_infrastructure(),
                error = %e,
                "Search failed"
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { text, filters } => {
            info!(subsystem = "cli", op = "search", "Starting search");
            let outcome = match parse_request(text, filters) {
                Ok(request) => run_search(request).await,
                Err(e) => Err(e),
            };
            report(&outcome)
        }
        Commands::Explain { filters } => {
            let mapping = AttributeMapping::from_json_str(&filters)
                .context("--filters must be a JSON object")?;
            let search_config = SearchConfig::from_env()?;
            let explanation = explain(&mapping, search_config.candidate_limit);
            println!("{}", serde_json::to_string_pretty(&explanation)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_text() {
        let cli = Cli::try_parse_from(["flatfinder", "search", "flat in Lviv"]).unwrap();
        match cli.command {
            Commands::Search { text, filters } => {
                assert_eq!(text.as_deref(), Some("flat in Lviv"));
                assert!(filters.is_none());
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_search_filters() {
        let cli =
            Cli::try_parse_from(["flatfinder", "search", "--filters", r#"{"rooms":2}"#]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Search { text: None, filters: Some(_) }
        ));
    }

    #[test]
    fn test_search_requires_text_or_filters() {
        assert!(Cli::try_parse_from(["flatfinder", "search"]).is_err());
        assert!(
            Cli::try_parse_from(["flatfinder", "search", "x", "--filters", "{}"]).is_err()
        );
    }

    #[test]
    fn test_malformed_filters_are_invalid_input() {
        let outcome = parse_request(None, Some("{rooms: 2".to_string())).map(|_| SearchOutcome::NoMatch);

        assert!(matches!(outcome, Err(Error::InvalidInput(_))));
        assert!(user_message(&outcome).starts_with("Invalid search request:"));
    }

    #[test]
    fn test_non_object_filters_are_invalid_input() {
        let request = parse_request(None, Some("[1, 2]".to_string()));
        assert!(matches!(request, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_request_prefers_filters() {
        let request = parse_request(None, Some(r#"{"rooms":2}"#.to_string())).unwrap();
        match request {
            SearchRequest::Filters(mapping) => assert!(mapping.get("rooms").is_some()),
            SearchRequest::Text(_) => panic!("expected filters"),
        }
        assert!(matches!(
            parse_request(Some("flat in Lviv".to_string()), None),
            Ok(SearchRequest::Text(_))
        ));
    }

    #[test]
    fn test_explain_lviv() {
        let mapping = AttributeMapping::from_json_str(
            r#"{"location":"Lviv","rooms":2,"has_wifi":true,"allows_pets":true,"floor":"high"}"#,
        )
        .unwrap();

        let plan = explain(&mapping, 20);

        assert_eq!(
            plan.structured,
            vec![
                "location ILIKE '%Lviv%'".to_string(),
                "rooms = 2".to_string(),
                "has_wifi = true".to_string(),
            ]
        );
        assert!(plan
            .sql
            .ends_with("WHERE location ILIKE $1 AND rooms = $2 AND has_wifi = $3 \
                        ORDER BY apartments.price ASC NULLS LAST LIMIT $4"));
        assert_eq!(plan.params.last().map(String::as_str), Some("20"));
        assert_eq!(plan.rejected, vec!["floor".to_string()]);
        assert!(plan.extras.contains_key("allows_pets"));
        assert!(plan.query_text.contains("has wifi"));
    }
}
