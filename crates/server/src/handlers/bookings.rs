use axum::{Json, extract::State, http::StatusCode};
use seaside_models::{AirportBooking, AirportBookingInput, TourBooking, TourBookingInput};
use serde_json::{Value, json};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::state::AppState;

pub async fn create_tour_booking(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<TourBookingInput>, AppError>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let ValidatedJson(input) = payload.map_err(|e| e.while_doing("Error creating tour booking"))?;
    let booking = seaside_db::create_tour_booking(&state.pool, &input).await?;
    info!("Tour booking received for \"{}\" on {}", booking.tour_name, booking.date);
    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

pub async fn create_airport_booking(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<AirportBookingInput>, AppError>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let ValidatedJson(input) = payload.map_err(|e| e.while_doing("Error creating airport booking"))?;
    let booking = seaside_db::create_airport_booking(&state.pool, &input).await?;
    info!("Airport transfer booking received for flight {}", booking.flight_number);
    Ok((StatusCode::CREATED, Json(json!({ "booking": booking }))))
}

pub async fn list_tour_bookings(State(state): State<AppState>) -> AppResult<Json<Vec<TourBooking>>> {
    let bookings = seaside_db::list_tour_bookings(&state.pool).await?;
    Ok(Json(bookings))
}

pub async fn list_airport_bookings(State(state): State<AppState>) -> AppResult<Json<Vec<AirportBooking>>> {
    let bookings = seaside_db::list_airport_bookings(&state.pool).await?;
    Ok(Json(bookings))
}
