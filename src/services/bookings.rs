//! Booking service
//!
//! Booking a car, listing "my bookings" with their car records attached,
//! and cancelling. Availability and overlap rules live server-side; the
//! client checks only what a form would (dates in order) and keeps the
//! car's availability flag in step with the booking it belongs to.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::api::{self, ApiClient, ApiError};
use crate::models::{Booking, BookingStatus, BookingWithCar, CarStatus, NewBooking};

/// Error types for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct BookingService {
    api: Arc<ApiClient>,
}

impl BookingService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Book a car for a date range.
    pub async fn book(
        &self,
        token: &str,
        user_id: i64,
        car_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<String, BookingError> {
        if end_date <= start_date {
            return Err(BookingError::Validation(
                "End date must be after start date".to_string(),
            ));
        }

        let booking = NewBooking {
            user_id,
            car_id,
            start_date,
            end_date,
        };
        let message = api::bookings::create(&self.api, token, &booking).await?;
        info!(car_id, %start_date, %end_date, "booking placed");
        Ok(message)
    }

    /// The user's bookings, each joined with its car record.
    ///
    /// A user with no bookings yet gets an empty list, not an error.
    pub async fn my_bookings(
        &self,
        token: &str,
        user_id: i64,
    ) -> Result<Vec<BookingWithCar>, BookingError> {
        let (cars, bookings) = futures::try_join!(
            api::cars::list(&self.api),
            api::bookings::by_user(&self.api, token, user_id),
        )?;

        Ok(bookings
            .into_iter()
            .map(|booking| {
                let car = cars.iter().find(|car| car.id == booking.car_id).cloned();
                BookingWithCar { booking, car }
            })
            .collect())
    }

    /// Sum of the stays whose car record (and so price) is known.
    pub fn total_spent(bookings: &[BookingWithCar]) -> f64 {
        bookings.iter().filter_map(BookingWithCar::total_price).sum()
    }

    /// Cancel a pending booking and release its car.
    pub async fn cancel(&self, token: &str, booking: &Booking) -> Result<(), BookingError> {
        if !booking.is_cancellable() {
            return Err(BookingError::Validation(
                "Only pending bookings can be cancelled".to_string(),
            ));
        }

        api::bookings::set_status(&self.api, token, booking.id, BookingStatus::Cancelled).await?;
        api::cars::set_status(&self.api, token, booking.car_id, CarStatus::Available).await?;
        info!(booking_id = booking.id, car_id = booking.car_id, "booking cancelled, car released");
        Ok(())
    }
}
