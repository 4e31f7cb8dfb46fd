//! Booking models
//!
//! Bookings tie a user to a car over a date range. The backend owns the
//! availability rules; the client only validates the obvious (end after
//! start) before sending, and enriches listings with the matching car
//! record for display.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Car;

/// A booking as returned by the backend.
///
/// The per-user and per-car listings omit the id they were filtered by;
/// those fields default to zero and are filled back in by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i64,
    /// Owning user
    #[serde(default)]
    pub user_id: i64,
    /// Booked car
    #[serde(default)]
    pub car_id: i64,
    /// First rental day
    pub start_date: NaiveDate,
    /// Day the car is returned
    pub end_date: NaiveDate,
    /// Booking lifecycle status
    pub status: BookingStatus,
    /// Creation timestamp
    pub created_at: Option<NaiveDateTime>,
}

impl Booking {
    /// Number of billable nights.
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Only pending bookings may be cancelled from the client.
    pub fn is_cancellable(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}

/// Booking lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting admin confirmation
    Pending,
    /// Confirmed by an admin
    Confirmed,
    /// Cancelled by the user or an admin
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Invalid booking status: {}", s)),
        }
    }
}

/// Payload for creating a booking.
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub user_id: i64,
    pub car_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A booking joined with its car record, for profile views.
#[derive(Debug, Clone)]
pub struct BookingWithCar {
    pub booking: Booking,
    pub car: Option<Car>,
}

impl BookingWithCar {
    /// Total cost of the stay, when the car record is known.
    pub fn total_price(&self) -> Option<f64> {
        self.car
            .as_ref()
            .map(|car| car.price_per_day * self.booking.nights() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CarStatus;

    fn booking(start: &str, end: &str) -> Booking {
        Booking {
            id: 1,
            user_id: 1,
            car_id: 1,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            status: BookingStatus::Pending,
            created_at: None,
        }
    }

    #[test]
    fn test_nights() {
        assert_eq!(booking("2026-08-10", "2026-08-13").nights(), 3);
        assert_eq!(booking("2026-08-10", "2026-08-11").nights(), 1);
    }

    #[test]
    fn test_only_pending_is_cancellable() {
        let mut b = booking("2026-08-10", "2026-08-13");
        assert!(b.is_cancellable());

        b.status = BookingStatus::Confirmed;
        assert!(!b.is_cancellable());

        b.status = BookingStatus::Cancelled;
        assert!(!b.is_cancellable());
    }

    #[test]
    fn test_booking_deserialize_without_user_id() {
        // The per-user listing omits user_id
        let b: Booking = serde_json::from_str(
            r#"{"id": 7, "car_id": 2, "start_date": "2026-08-10", "end_date": "2026-08-12",
                "status": "confirmed", "created_at": "2026-08-01T09:30:00"}"#,
        )
        .unwrap();

        assert_eq!(b.user_id, 0);
        assert_eq!(b.car_id, 2);
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert!(b.created_at.is_some());
    }

    #[test]
    fn test_booking_status_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            let parsed: BookingStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("expired".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_total_price() {
        let with_car = BookingWithCar {
            booking: booking("2026-08-10", "2026-08-13"),
            car: Some(Car {
                id: 1,
                brand: "Toyota".to_string(),
                model: "Corolla".to_string(),
                image1: None,
                image2: None,
                price_per_day: 45.0,
                status: CarStatus::Booked,
            }),
        };
        assert_eq!(with_car.total_price(), Some(135.0));

        let without_car = BookingWithCar {
            booking: booking("2026-08-10", "2026-08-13"),
            car: None,
        };
        assert_eq!(without_car.total_price(), None);
    }

    #[test]
    fn test_new_booking_serializes_iso_dates() {
        let payload = NewBooking {
            user_id: 1,
            car_id: 2,
            start_date: "2026-08-10".parse().unwrap(),
            end_date: "2026-08-12".parse().unwrap(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["start_date"], "2026-08-10");
        assert_eq!(json["end_date"], "2026-08-12");
    }
}
