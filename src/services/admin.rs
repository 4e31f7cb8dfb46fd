//! Admin service
//!
//! The dashboard behind the admin role: one concurrent load of every
//! collection, deletes that update the held lists on confirmed success,
//! and booking status transitions that keep the car's availability flag
//! in step (cancelling releases the car, anything else holds it).

use std::sync::Arc;

use tracing::info;

use crate::api::{self, ApiClient, ApiError};
use crate::models::{Booking, BookingStatus, Car, CarStatus, Review, User};

/// Error types for admin operations
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// A status change referenced a booking the dashboard doesn't hold
    #[error("No booking with id {0} in the dashboard")]
    UnknownBooking(i64),

    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything the dashboard shows, as last fetched.
#[derive(Debug, Default)]
pub struct AdminDashboard {
    pub bookings: Vec<Booking>,
    pub cars: Vec<Car>,
    pub reviews: Vec<Review>,
    pub users: Vec<User>,
}

pub struct AdminService {
    api: Arc<ApiClient>,
}

impl AdminService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Fetch all four collections concurrently.
    pub async fn load_dashboard(&self, token: &str) -> Result<AdminDashboard, AdminError> {
        let (bookings, cars, reviews, users) = futures::try_join!(
            api::bookings::list(&self.api, token),
            api::cars::list(&self.api),
            api::reviews::list(&self.api),
            api::users::list(&self.api, token),
        )?;

        info!(
            bookings = bookings.len(),
            cars = cars.len(),
            reviews = reviews.len(),
            users = users.len(),
            "dashboard loaded"
        );
        Ok(AdminDashboard {
            bookings,
            cars,
            reviews,
            users,
        })
    }

    /// Delete a user account and drop it from the held list.
    pub async fn delete_user(
        &self,
        token: &str,
        dashboard: &mut AdminDashboard,
        user_id: i64,
    ) -> Result<String, AdminError> {
        let message = api::users::delete(&self.api, token, user_id).await?;
        dashboard.users.retain(|user| user.id != user_id);
        Ok(message)
    }

    /// Delete a booking outright and drop it from the held list.
    pub async fn delete_booking(
        &self,
        token: &str,
        dashboard: &mut AdminDashboard,
        booking_id: i64,
    ) -> Result<String, AdminError> {
        let message = api::bookings::delete(&self.api, token, booking_id).await?;
        dashboard.bookings.retain(|booking| booking.id != booking_id);
        Ok(message)
    }

    /// Delete a review and drop it from the held list. The backend
    /// rejects non-admin tokens; the list is only updated on success.
    pub async fn delete_review(
        &self,
        token: &str,
        dashboard: &mut AdminDashboard,
        review_id: i64,
    ) -> Result<String, AdminError> {
        let message = api::reviews::delete(&self.api, token, review_id).await?;
        dashboard.reviews.retain(|review| review.id != review_id);
        Ok(message)
    }

    /// Move a booking to a new status and sync its car.
    ///
    /// A cancelled booking releases the car; pending or confirmed keeps it
    /// held. Both the booking list and the car list are updated in place.
    pub async fn set_booking_status(
        &self,
        token: &str,
        dashboard: &mut AdminDashboard,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<(), AdminError> {
        let car_id = dashboard
            .bookings
            .iter()
            .find(|booking| booking.id == booking_id)
            .map(|booking| booking.car_id)
            .ok_or(AdminError::UnknownBooking(booking_id))?;

        api::bookings::set_status(&self.api, token, booking_id, status).await?;
        if let Some(booking) = dashboard
            .bookings
            .iter_mut()
            .find(|booking| booking.id == booking_id)
        {
            booking.status = status;
        }

        let car_status = match status {
            BookingStatus::Cancelled => CarStatus::Available,
            BookingStatus::Pending | BookingStatus::Confirmed => CarStatus::Booked,
        };
        api::cars::set_status(&self.api, token, car_id, car_status).await?;
        if let Some(car) = dashboard.cars.iter_mut().find(|car| car.id == car_id) {
            car.status = car_status;
        }

        info!(booking_id, %status, car_id, car_status = %car_status, "booking status updated");
        Ok(())
    }
}
