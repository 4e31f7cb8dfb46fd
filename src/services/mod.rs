//! Services layer - client-side behavior
//!
//! This module contains the logic that sits between the typed API
//! bindings and whatever front end drives them:
//! - Owning the session lifecycle and deriving roles from it
//! - Assembling per-page view models (fleet, bookings, admin dashboard)
//! - Validating input before it ever reaches the network

pub mod admin;
pub mod bookings;
pub mod fleet;
pub mod role;
pub mod session;

pub use admin::{AdminDashboard, AdminError, AdminService};
pub use bookings::{BookingError, BookingService};
pub use fleet::{CarDetails, FleetError, FleetService};
pub use role::Role;
pub use session::{SessionError, SessionManager};
