use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use seaside_models::{Review, ReviewInput, Tour, TourInput};
use serde_json::{Value, json};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::state::AppState;

const TOUR_NOT_FOUND: &str = "Tour not found";

pub async fn list_tours(State(state): State<AppState>) -> AppResult<Json<Vec<Tour>>> {
    let tours = seaside_db::list_tours(&state.pool).await?;
    Ok(Json(tours))
}

pub async fn get_tour(State(state): State<AppState>, Path(key): Path<String>) -> AppResult<Json<Tour>> {
    seaside_db::get_tour(&state.pool, &key)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(TOUR_NOT_FOUND))
}

pub async fn create_tour(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<TourInput>, AppError>,
) -> AppResult<(StatusCode, Json<Tour>)> {
    let ValidatedJson(input) = payload.map_err(|e| e.while_doing("Error creating tour"))?;
    let tour = seaside_db::create_tour(&state.pool, &input).await?;
    info!("Tour {} \"{}\" created", tour.id, tour.name);
    Ok((StatusCode::CREATED, Json(tour)))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<ValidatedJson<TourInput>, AppError>,
) -> AppResult<Json<Tour>> {
    let ValidatedJson(input) = payload.map_err(|e| e.while_doing("Error updating tour"))?;
    let tour = seaside_db::update_tour(&state.pool, &key, &input)
        .await?
        .ok_or(AppError::NotFound(TOUR_NOT_FOUND))?;
    info!("Tour {} updated", tour.id);
    Ok(Json(tour))
}

pub async fn delete_tour(State(state): State<AppState>, Path(key): Path<String>) -> AppResult<Json<Value>> {
    if !seaside_db::delete_tour(&state.pool, &key).await? {
        return Err(AppError::NotFound(TOUR_NOT_FOUND));
    }
    info!("Tour {key} removed");
    Ok(Json(json!({ "message": "Tour removed" })))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Vec<Review>>> {
    seaside_db::list_reviews(&state.pool, &key)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(TOUR_NOT_FOUND))
}

pub async fn create_review(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<ValidatedJson<ReviewInput>, AppError>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let ValidatedJson(input) = payload.map_err(|e| e.while_doing("Error creating review"))?;
    let review = seaside_db::add_review(&state.pool, &key, &input)
        .await?
        .ok_or(AppError::NotFound(TOUR_NOT_FOUND))?;
    info!("Review by {} added to tour {}", review.author, review.tour_id);
    Ok((StatusCode::CREATED, Json(review)))
}
