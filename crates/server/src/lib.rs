use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::{AppError, AppResult};
pub use state::AppState;

use handlers::{bookings, tours};

/// `X.Y.Z (githash)`
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SEASIDE_GIT_HASH"), ")");

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "API is running...",
        "version": VERSION
    }))
}

/// Builds the `/api` router. Admin-only routes sit behind
/// [`auth::require_admin`]; everything else is public.
pub fn router(state: AppState, body_limit: usize) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::login))
        .route("/tours", get(tours::list_tours))
        .route("/tours/{id}", get(tours::get_tour))
        .route("/tours/{id}/reviews", get(tours::list_reviews).post(tours::create_review))
        .route("/bookings/tour", post(bookings::create_tour_booking))
        .route("/bookings/airport", post(bookings::create_airport_booking));

    let admin_routes = Router::new()
        .route("/tours", post(tours::create_tour))
        .route("/tours/{id}", put(tours::update_tour).delete(tours::delete_tour))
        .route("/bookings/tours", get(bookings::list_tour_bookings))
        .route("/bookings/airport", get(bookings::list_airport_bookings))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
