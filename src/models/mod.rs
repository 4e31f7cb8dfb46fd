//! Data models
//!
//! This module contains all data structures used throughout the Motorent
//! client. Models represent:
//! - Records returned by the rental backend (User, Car, Booking, Review)
//! - The client-side session state
//! - Request payloads and per-page view models

mod booking;
mod car;
mod review;
mod session;
mod user;

pub use booking::{Booking, BookingStatus, BookingWithCar, NewBooking};
pub use car::{Car, CarInput, CarStatus};
pub use review::{CarReview, NewReview, Review};
pub use session::Session;
pub use user::{User, UserRole};
