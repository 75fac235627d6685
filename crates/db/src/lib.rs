use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

mod admin;
mod bookings;
mod tours;

pub use admin::{find_admin_by_username, set_admin};
pub use bookings::{
    create_airport_booking, create_tour_booking, list_airport_bookings, list_tour_bookings,
};
pub use tours::{
    add_review, create_tour, delete_tour, get_tour, insert_tour_with_id, list_reviews,
    list_tours, update_tour,
};

pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives and dies with its connection.
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new().connect_with(options).await?
    };

    info!("Connected to database: {database_url}");
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Migrations applied");
    Ok(())
}

/// Empties every collection, including the admin credential. The tour id
/// high-water mark is kept so ids stay unique across reseeds.
pub async fn clear_all(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in ["tour_reviews", "tours", "tour_bookings", "airport_bookings", "admins"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    info!("All collections cleared");
    Ok(())
}

fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// Fixed precision keeps lexical order equal to chronological order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:").await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}
