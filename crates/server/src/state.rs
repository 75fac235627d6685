use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt_secret: &str) -> Self {
        Self {
            pool,
            tokens: Arc::new(TokenKeys::new(jwt_secret)),
        }
    }
}
