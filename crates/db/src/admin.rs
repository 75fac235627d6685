use anyhow::Result;
use chrono::Utc;
use seaside_models::AdminCredential;
use sqlx::SqlitePool;
use tracing::info;

use crate::{new_key, timestamp};

/// Provisions the administrator, replacing any previous credential so
/// exactly one remains.
pub async fn set_admin(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<AdminCredential> {
    let key = new_key();
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM admins").execute(&mut *tx).await?;
    sqlx::query("INSERT INTO admins (uid, username, password_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(&key)
        .bind(username)
        .bind(password_hash)
        .bind(timestamp(Utc::now()))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!("Admin credential set for {username}");

    Ok(AdminCredential {
        key,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
    })
}

pub async fn find_admin_by_username(pool: &SqlitePool, username: &str) -> Result<Option<AdminCredential>> {
    let admin = sqlx::query_as::<_, AdminCredential>(
        "SELECT uid, username, password_hash FROM admins WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}
