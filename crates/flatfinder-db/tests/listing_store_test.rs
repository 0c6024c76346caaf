//! Candidate fetch against a live Postgres with pgvector.
//!
//! Run with `DATABASE_URL` pointing at a scratch database:
//! `cargo test -p flatfinder-db -- --ignored`

use flatfinder_core::{classify, AttributeMapping, ListingFilter, ListingStore};
use flatfinder_db::{create_pool, PgListingRepository};
use pgvector::Vector;
use sqlx::PgPool;

async fn setup_table(table: &str) -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/flatfinder_test".to_string());
    let pool = create_pool(&database_url)
        .await
        .expect("Failed to create test pool");

    sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
        .execute(&pool)
        .await
        .expect("pgvector extension");
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE {} (
            id SERIAL PRIMARY KEY,
            location TEXT,
            rooms INTEGER,
            price NUMERIC,
            area NUMERIC,
            floor INTEGER,
            beds INTEGER,
            has_wifi BOOLEAN,
            has_parking BOOLEAN,
            has_kitchen BOOLEAN,
            description TEXT,
            embedding VECTOR(3)
        )",
        table
    ))
    .execute(&pool)
    .await
    .unwrap();

    let rows: [(&str, i32, f64, bool, &str, Option<Vec<f32>>); 4] = [
        ("Lviv, Center", 2, 900.0, true, "Cozy, pets welcome", Some(vec![1.0, 0.0, 0.0])),
        ("Lviv", 2, 700.0, true, "No pets allowed", Some(vec![0.0, 1.0, 0.0])),
        ("Kyiv", 2, 500.0, true, "Quiet flat", Some(vec![0.0, 0.0, 1.0])),
        ("lviv suburbs", 2, 650.0, false, "Garden", None),
    ];
    for (location, rooms, price, wifi, description, embedding) in rows {
        sqlx::query(&format!(
            "INSERT INTO {} (location, rooms, price, area, floor, beds, has_wifi, has_parking, has_kitchen, description, embedding)
             VALUES ($1, $2, $3, 50, 3, 1, $4, FALSE, TRUE, $5, $6)",
            table
        ))
        .bind(location)
        .bind(rooms)
        .bind(price)
        .bind(wifi)
        .bind(description)
        .bind(embedding.map(Vector::from))
        .execute(&pool)
        .await
        .unwrap();
    }

    pool
}

#[tokio::test]
#[ignore = "requires Postgres with pgvector"]
async fn test_fetch_candidates_filters_and_orders_by_price() {
    let table = "flatfinder_test_fetch";
    let pool = setup_table(table).await;
    let repo = PgListingRepository::with_table(pool.clone(), table).unwrap();

    let mapping = AttributeMapping::new()
        .with("location", "Lviv")
        .with("rooms", 2)
        .with("has_wifi", true);
    let filter = ListingFilter::from_classified(&classify(&mapping));

    let rows = repo.fetch_candidates(&filter).await.unwrap();

    let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![700.0, 900.0]);
    assert!(rows.iter().all(|r| r.location.to_lowercase().contains("lviv")));
    assert_eq!(rows[0].embedding_slice(), Some(&[0.0f32, 1.0, 0.0][..]));

    sqlx::query(&format!("DROP TABLE {}", table))
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Postgres with pgvector"]
async fn test_empty_filter_respects_limit_and_null_embeddings() {
    let table = "flatfinder_test_limit";
    let pool = setup_table(table).await;
    let repo = PgListingRepository::with_table(pool.clone(), table).unwrap();

    let rows = repo
        .fetch_candidates(&ListingFilter::new().with_limit(2))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].price, 500.0);

    let all = repo.fetch_candidates(&ListingFilter::new()).await.unwrap();
    assert_eq!(all.len(), 4);
    let garden = all.iter().find(|r| r.description == "Garden").unwrap();
    assert!(garden.embedding.is_none());

    sqlx::query(&format!("DROP TABLE {}", table))
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Postgres with pgvector"]
async fn test_hostile_location_matches_nothing() {
    let table = "flatfinder_test_hostile";
    let pool = setup_table(table).await;
    let repo = PgListingRepository::with_table(pool.clone(), table).unwrap();

    let mapping = AttributeMapping::new().with("location", "%' OR 1=1 --");
    let filter = ListingFilter::from_classified(&classify(&mapping));
    let rows = repo.fetch_candidates(&filter).await.unwrap();
    assert!(rows.is_empty());

    sqlx::query(&format!("DROP TABLE {}", table))
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires Postgres with pgvector"]
async fn test_null_price_sorts_after_priced_rows() {
    let table = "flatfinder_test_null_price";
    let pool = setup_table(table).await;
    let repo = PgListingRepository::with_table(pool.clone(), table).unwrap();

    sqlx::query(&format!(
        "INSERT INTO {} (location, rooms, description) VALUES ('Lviv', 2, 'Price on request')",
        table
    ))
    .execute(&pool)
    .await
    .unwrap();

    let rows = repo.fetch_candidates(&ListingFilter::new()).await.unwrap();

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].price, 500.0);
    let last = rows.last().unwrap();
    assert_eq!(last.description, "Price on request");
    assert_eq!(last.price, 0.0);

    sqlx::query(&format!("DROP TABLE {}", table))
        .execute(&pool)
        .await
        .unwrap();
}
