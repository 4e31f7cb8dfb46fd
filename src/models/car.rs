//! Car model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A car in the rental fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    /// Unique identifier
    pub id: i64,
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// Primary photo URL
    pub image1: Option<String>,
    /// Secondary photo URL
    pub image2: Option<String>,
    /// Daily rental price
    pub price_per_day: f64,
    /// Availability status, kept in sync with bookings by the client
    #[serde(default)]
    pub status: CarStatus,
}

impl Car {
    /// Human-readable label, e.g. "Toyota Corolla"
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    pub fn is_available(&self) -> bool {
        self.status == CarStatus::Available
    }
}

/// Car availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarStatus {
    /// Can be booked
    Available,
    /// Held by an active booking
    Booked,
}

impl Default for CarStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarStatus::Available => write!(f, "available"),
            CarStatus::Booked => write!(f, "booked"),
        }
    }
}

impl FromStr for CarStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(CarStatus::Available),
            "booked" => Ok(CarStatus::Booked),
            _ => Err(anyhow::anyhow!("Invalid car status: {}", s)),
        }
    }
}

/// Payload for creating or updating a car.
///
/// The backend requires the full field set on updates as well, so the same
/// shape serves both operations.
#[derive(Debug, Clone, Serialize)]
pub struct CarInput {
    pub brand: String,
    pub model: String,
    pub image1: String,
    pub image2: String,
    pub price_per_day: f64,
    pub status: CarStatus,
}

impl CarInput {
    /// Build an update payload from an existing car record.
    ///
    /// Missing photo URLs are sent as empty strings; the backend treats
    /// them as required fields.
    pub fn from_car(car: &Car) -> Self {
        Self {
            brand: car.brand.clone(),
            model: car.model.clone(),
            image1: car.image1.clone().unwrap_or_default(),
            image2: car.image2.clone().unwrap_or_default(),
            price_per_day: car.price_per_day,
            status: car.status,
        }
    }

    pub fn with_status(mut self, status: CarStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_car() -> Car {
        Car {
            id: 1,
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            image1: Some("https://img.example.com/corolla-front.jpg".to_string()),
            image2: None,
            price_per_day: 45.0,
            status: CarStatus::Available,
        }
    }

    #[test]
    fn test_car_label() {
        assert_eq!(sample_car().label(), "Toyota Corolla");
    }

    #[test]
    fn test_car_status_default_when_missing() {
        let car: Car = serde_json::from_str(
            r#"{"id": 2, "brand": "Mazda", "model": "3", "image1": null, "image2": null, "price_per_day": 40.0}"#,
        )
        .unwrap();

        assert_eq!(car.status, CarStatus::Available);
        assert!(car.is_available());
    }

    #[test]
    fn test_car_status_roundtrip() {
        for status in [CarStatus::Available, CarStatus::Booked] {
            let parsed: CarStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("totalled".parse::<CarStatus>().is_err());
    }

    #[test]
    fn test_car_input_from_car_carries_status() {
        let mut car = sample_car();
        car.status = CarStatus::Booked;

        let input = CarInput::from_car(&car);
        assert_eq!(input.status, CarStatus::Booked);
        assert_eq!(input.image2, "");

        let released = input.with_status(CarStatus::Available);
        assert_eq!(released.status, CarStatus::Available);
        assert_eq!(released.brand, "Toyota");
    }
}
