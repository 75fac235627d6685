use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub mod coerce;

// --- Stored records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalInfo {
    #[validate(length(min = 1, message = "groupSize is required"))]
    pub group_size: String,
    pub included: Vec<String>,
    pub not_included: Vec<String>,
}

/// A catalog entry. `key` is the storage identifier, `id` the public
/// sequential number shown to customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    #[serde(rename = "_id")]
    pub key: String,
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub duration: String,
    pub additional_info: AdditionalInfo,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    #[sqlx(rename = "uid")]
    pub key: String,
    pub tour_id: i64,
    pub author: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TourBooking {
    #[serde(rename = "_id")]
    #[sqlx(rename = "uid")]
    pub key: String,
    pub tour_id: i64,
    pub tour_name: String,
    pub date: String,
    pub passengers: i64,
    pub email: String,
    pub requests: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Passenger count stays a string here, unlike [`TourBooking`], to keep
/// the airport form's wire format.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AirportBooking {
    #[serde(rename = "_id")]
    #[sqlx(rename = "uid")]
    pub key: String,
    pub name: String,
    pub email: String,
    pub flight_number: String,
    pub pickup_date: String,
    pub passengers: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub booking_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The single administrator account. Never serialized with its hash.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminCredential {
    #[serde(rename = "_id")]
    #[sqlx(rename = "uid")]
    pub key: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

// --- Request payloads ---

/// Mutable tour fields, used for both create and full-replace update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(deserialize_with = "coerce::number")]
    pub price: f64,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    pub images: Vec<String>,
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration: String,
    #[validate(nested)]
    pub additional_info: AdditionalInfo,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[serde(deserialize_with = "coerce::number")]
    pub rating: f64,
    #[validate(length(min = 1, message = "comment is required"))]
    pub comment: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub tour_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TourBookingInput {
    #[serde(deserialize_with = "coerce::integer")]
    pub tour_id: i64,
    #[validate(length(min = 1, message = "tourName is required"))]
    pub tour_name: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub passengers: i64,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    pub requests: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AirportBookingInput {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "flightNumber is required"))]
    pub flight_number: String,
    #[validate(length(min = 1, message = "pickupDate is required"))]
    pub pickup_date: String,
    #[serde(deserialize_with = "coerce::text")]
    #[validate(length(min = 1, message = "passengers is required"))]
    pub passengers: String,
    #[validate(length(min = 1, message = "pickupLocation is required"))]
    pub pickup_location: String,
    #[validate(length(min = 1, message = "dropoffLocation is required"))]
    pub dropoff_location: String,
}

/// Missing fields deserialize as empty strings so they fail like a wrong
/// password instead of as a malformed body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tour_payload() -> serde_json::Value {
        json!({
            "name": "Test Tour",
            "price": 100,
            "description": "d",
            "image": "data:image/png;base64,AAAA",
            "images": ["data:image/png;base64,BBBB"],
            "duration": "2 Hours",
            "additionalInfo": {
                "groupSize": "Up to 4",
                "included": ["Water"],
                "notIncluded": ["Lunch"]
            }
        })
    }

    #[test]
    fn tour_input_accepts_full_payload() {
        let input: TourInput = serde_json::from_value(tour_payload()).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.price, 100.0);
        assert_eq!(input.additional_info.not_included, vec!["Lunch"]);
    }

    #[test]
    fn tour_input_rejects_missing_field() {
        let mut payload = tour_payload();
        payload.as_object_mut().unwrap().remove("duration");
        let err = serde_json::from_value::<TourInput>(payload).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn tour_input_rejects_empty_nested_group_size() {
        let mut payload = tour_payload();
        payload["additionalInfo"]["groupSize"] = json!("");
        let input: TourInput = serde_json::from_value(payload).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn review_input_coerces_string_numbers() {
        let input: ReviewInput = serde_json::from_value(json!({
            "author": "Emily",
            "rating": "5",
            "comment": "Great",
            "tourId": "3"
        }))
        .unwrap();
        assert_eq!(input.rating, 5.0);
        assert_eq!(input.tour_id, 3);
    }

    #[test]
    fn tour_booking_requires_valid_email() {
        let input: TourBookingInput = serde_json::from_value(json!({
            "tourId": 1,
            "tourName": "Lunenburg Tour",
            "date": "2025-01-01",
            "passengers": 2,
            "email": "not-an-email"
        }))
        .unwrap();
        assert!(input.validate().is_err());
        assert_eq!(input.requests, None);
    }

    #[test]
    fn airport_booking_stringifies_numeric_passengers() {
        let input: AirportBookingInput = serde_json::from_value(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "flightNumber": "AC 123",
            "pickupDate": "2025-06-01T10:00",
            "passengers": 3,
            "pickupLocation": "YHZ",
            "dropoffLocation": "Downtown"
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.passengers, "3");
    }

    #[test]
    fn admin_credential_hides_hash() {
        let admin = AdminCredential {
            key: "abc".into(),
            username: "admin".into(),
            password_hash: "$2b$12$secret".into(),
        };
        let value = serde_json::to_value(&admin).unwrap();
        assert_eq!(value, json!({ "_id": "abc", "username": "admin" }));
    }
}
