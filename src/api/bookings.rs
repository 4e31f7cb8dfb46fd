//! Booking endpoints

use serde::Serialize;

use crate::api::common::{decode, decode_body, decode_message};
use crate::api::{ApiClient, ApiError};
use crate::models::{Booking, BookingStatus, NewBooking};

#[derive(Debug, Serialize)]
struct StatusBody {
    status: BookingStatus,
}

/// Create a booking. Availability and overlap rules are enforced
/// server-side; a conflict comes back as [`ApiError::Rejected`].
pub async fn create(api: &ApiClient, token: &str, booking: &NewBooking) -> Result<String, ApiError> {
    let response = api
        .post("/bookings")
        .bearer_auth(token)
        .json(booking)
        .send()
        .await?;
    decode_message(response).await
}

/// Move a booking to a new lifecycle status.
pub async fn set_status(
    api: &ApiClient,
    token: &str,
    booking_id: i64,
    status: BookingStatus,
) -> Result<String, ApiError> {
    let response = api
        .patch(&format!("/bookings/{}", booking_id))
        .bearer_auth(token)
        .json(&StatusBody { status })
        .send()
        .await?;
    decode_message(response).await
}

/// List every booking (admin dashboard view).
pub async fn list(api: &ApiClient, token: &str) -> Result<Vec<Booking>, ApiError> {
    let response = api.get("/bookings").bearer_auth(token).send().await?;
    decode(response).await
}

/// List one user's bookings.
///
/// The backend answers "no bookings" with a 404 message body; that case
/// maps to an empty list here. The payload omits `user_id` (it is the
/// filter), so it is filled back in before returning.
pub async fn by_user(api: &ApiClient, token: &str, user_id: i64) -> Result<Vec<Booking>, ApiError> {
    let response = api
        .get(&format!("/bookings/user/{}", user_id))
        .bearer_auth(token)
        .send()
        .await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }

    let body = response.text().await?;
    let mut bookings: Vec<Booking> = decode_body(status, &body)?;
    for booking in &mut bookings {
        booking.user_id = user_id;
    }
    Ok(bookings)
}

/// List the bookings held against one car.
pub async fn by_car(api: &ApiClient, car_id: i64) -> Result<Vec<Booking>, ApiError> {
    let response = api.get(&format!("/bookings/car/{}", car_id)).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(Vec::new());
    }

    let body = response.text().await?;
    let mut bookings: Vec<Booking> = decode_body(status, &body)?;
    for booking in &mut bookings {
        booking.car_id = car_id;
    }
    Ok(bookings)
}

/// Delete a booking outright (admin operation; the backend releases the
/// car as part of it).
pub async fn delete(api: &ApiClient, token: &str, booking_id: i64) -> Result<String, ApiError> {
    let response = api
        .delete(&format!("/bookings/{}", booking_id))
        .bearer_auth(token)
        .send()
        .await?;
    decode_message(response).await
}
