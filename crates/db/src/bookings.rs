use anyhow::Result;
use chrono::Utc;
use seaside_models::{AirportBooking, AirportBookingInput, TourBooking, TourBookingInput};
use sqlx::SqlitePool;
use tracing::debug;

use crate::{new_key, timestamp};

const TOUR_BOOKING_COLUMNS: &str = "uid, tour_id, tour_name, date, passengers, email, requests, \
    booking_date, created_at, updated_at";

const AIRPORT_BOOKING_COLUMNS: &str = "uid, name, email, flight_number, pickup_date, passengers, \
    pickup_location, dropoff_location, booking_date, created_at, updated_at";

/// Stores the booking as submitted. `tour_id` and `tour_name` are a
/// snapshot and are not checked against the catalog.
pub async fn create_tour_booking(pool: &SqlitePool, input: &TourBookingInput) -> Result<TourBooking> {
    let key = new_key();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO tour_bookings (uid, tour_id, tour_name, date, passengers, email, requests, \
            booking_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&key)
    .bind(input.tour_id)
    .bind(&input.tour_name)
    .bind(&input.date)
    .bind(input.passengers)
    .bind(&input.email)
    .bind(input.requests.as_deref())
    .bind(timestamp(now))
    .bind(timestamp(now))
    .bind(timestamp(now))
    .execute(pool)
    .await?;
    debug!("Tour booking {key} stored for tour {}", input.tour_id);

    Ok(TourBooking {
        key,
        tour_id: input.tour_id,
        tour_name: input.tour_name.clone(),
        date: input.date.clone(),
        passengers: input.passengers,
        email: input.email.clone(),
        requests: input.requests.clone(),
        booking_date: now,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_tour_bookings(pool: &SqlitePool) -> Result<Vec<TourBooking>> {
    let sql = format!("SELECT {TOUR_BOOKING_COLUMNS} FROM tour_bookings ORDER BY created_at DESC, seq DESC");
    let bookings = sqlx::query_as::<_, TourBooking>(&sql).fetch_all(pool).await?;
    Ok(bookings)
}

pub async fn create_airport_booking(
    pool: &SqlitePool,
    input: &AirportBookingInput,
) -> Result<AirportBooking> {
    let key = new_key();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO airport_bookings (uid, name, email, flight_number, pickup_date, passengers, \
            pickup_location, dropoff_location, booking_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&key)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.flight_number)
    .bind(&input.pickup_date)
    .bind(&input.passengers)
    .bind(&input.pickup_location)
    .bind(&input.dropoff_location)
    .bind(timestamp(now))
    .bind(timestamp(now))
    .bind(timestamp(now))
    .execute(pool)
    .await?;
    debug!("Airport booking {key} stored for flight {}", input.flight_number);

    Ok(AirportBooking {
        key,
        name: input.name.clone(),
        email: input.email.clone(),
        flight_number: input.flight_number.clone(),
        pickup_date: input.pickup_date.clone(),
        passengers: input.passengers.clone(),
        pickup_location: input.pickup_location.clone(),
        dropoff_location: input.dropoff_location.clone(),
        booking_date: now,
        created_at: now,
        updated_at: now,
    })
}

pub async fn list_airport_bookings(pool: &SqlitePool) -> Result<Vec<AirportBooking>> {
    let sql = format!("SELECT {AIRPORT_BOOKING_COLUMNS} FROM airport_bookings ORDER BY created_at DESC, seq DESC");
    let bookings = sqlx::query_as::<_, AirportBooking>(&sql).fetch_all(pool).await?;
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    fn tour_booking(tour_name: &str) -> TourBookingInput {
        TourBookingInput {
            tour_id: 1,
            tour_name: tour_name.to_string(),
            date: "2025-01-01".to_string(),
            passengers: 2,
            email: "a@b.com".to_string(),
            requests: None,
        }
    }

    #[tokio::test]
    async fn tour_bookings_list_newest_first() {
        let pool = test_pool().await;
        for name in ["first", "second", "third"] {
            create_tour_booking(&pool, &tour_booking(name)).await.unwrap();
        }
        let names: Vec<_> = list_tour_bookings(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.tour_name)
            .collect();
        assert_eq!(names, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn tour_booking_keeps_optional_requests() {
        let pool = test_pool().await;
        let mut input = tour_booking("Lunenburg");
        input.requests = Some("Child seat please".to_string());
        let created = create_tour_booking(&pool, &input).await.unwrap();

        let listed = list_tour_bookings(&pool).await.unwrap();
        assert_eq!(listed[0].key, created.key);
        assert_eq!(listed[0].requests.as_deref(), Some("Child seat please"));
        assert_eq!(listed[0].passengers, 2);
    }

    #[tokio::test]
    async fn airport_bookings_list_newest_first() {
        let pool = test_pool().await;
        for flight in ["AC 601", "WS 248"] {
            let input = AirportBookingInput {
                name: "Sam".to_string(),
                email: "sam@example.com".to_string(),
                flight_number: flight.to_string(),
                pickup_date: "2025-06-01T10:00".to_string(),
                passengers: "3".to_string(),
                pickup_location: "Halifax Stanfield".to_string(),
                dropoff_location: "Downtown".to_string(),
            };
            create_airport_booking(&pool, &input).await.unwrap();
        }
        let listed = list_airport_bookings(&pool).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].flight_number, "WS 248");
        assert_eq!(listed[1].passengers, "3");
    }
}
