//! Admin authentication: password check at login, signed bearer tokens
//! for everything behind the admin gate.

use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use seaside_models::{LoginRequest, LoginResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Tokens stay valid this long after issue.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims: the admin's storage id plus issue and expiry times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material derived from the server secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, admin_key: &str) -> AppResult<String> {
        self.issue_at(admin_key, Utc::now())
    }

    pub fn issue_at(&self, admin_key: &str, issued_at: DateTime<Utc>) -> AppResult<String> {
        let claims = Claims {
            id: admin_key.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    /// Checks signature and expiry. Every failure looks the same to the caller.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token validation failed: {e}");
                AppError::Unauthorized("Not authorized, token failed")
            })
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Checks a username/password pair against the stored credential and
/// issues a token. Unknown user and wrong password fail identically.
pub async fn authenticate(state: &AppState, username: &str, password: &str) -> AppResult<LoginResponse> {
    let Some(admin) = seaside_db::find_admin_by_username(&state.pool, username).await? else {
        return Err(AppError::InvalidCredentials);
    };

    let password = password.to_string();
    let hash = admin.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .map_err(anyhow::Error::from)?;
    if !matches {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&admin.key)?;
    Ok(LoginResponse {
        id: admin.key,
        username: admin.username,
        token,
    })
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    match authenticate(&state, &body.username, &body.password).await {
        Ok(response) => {
            info!("Admin {} logged in", response.username);
            Ok(Json(response))
        }
        Err(e) => {
            if matches!(e, AppError::InvalidCredentials) {
                warn!("Failed login attempt for {:?}", body.username);
            }
            Err(e)
        }
    }
}

/// Gate for admin-only routes. Expects `Authorization: Bearer <token>`
/// and attaches the decoded [`Claims`] to the request.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> AppResult<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized("Not authorized, no token"))?;

    let claims = state.tokens.verify(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
