//! Fleet service
//!
//! Browsing and car details for everyone, reviews for logged-in users,
//! and car management for admins. Input is validated locally before any
//! network call; everything else is the backend's ruling, surfaced
//! verbatim.

use std::sync::Arc;

use crate::api::{self, ApiClient, ApiError};
use crate::models::{Car, CarInput, CarReview, NewReview};

/// Error types for fleet operations
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A car together with its reviews, as shown on the details page.
#[derive(Debug, Clone)]
pub struct CarDetails {
    pub car: Car,
    pub reviews: Vec<CarReview>,
}

pub struct FleetService {
    api: Arc<ApiClient>,
}

impl FleetService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// The whole fleet, as last reported by the backend.
    pub async fn browse(&self) -> Result<Vec<Car>, FleetError> {
        Ok(api::cars::list(&self.api).await?)
    }

    /// One car plus its reviews, fetched together.
    pub async fn car_details(&self, car_id: i64) -> Result<CarDetails, FleetError> {
        let (car, reviews) = futures::try_join!(
            api::cars::get(&self.api, car_id),
            api::reviews::by_car(&self.api, car_id),
        )?;
        Ok(CarDetails { car, reviews })
    }

    /// Submit a review for a car. Requires a logged-in token.
    pub async fn submit_review(
        &self,
        token: &str,
        car_id: i64,
        rating: u8,
        comment: Option<String>,
    ) -> Result<String, FleetError> {
        if !(1..=5).contains(&rating) {
            return Err(FleetError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let review = NewReview {
            car_id,
            rating,
            comment: comment.filter(|c| !c.trim().is_empty()),
        };
        Ok(api::reviews::create(&self.api, token, &review).await?)
    }

    /// Add a car to the fleet (admin affordance).
    pub async fn add_car(&self, token: &str, input: &CarInput) -> Result<String, FleetError> {
        validate_car_input(input)?;
        Ok(api::cars::create(&self.api, token, input).await?)
    }

    /// Replace a car's record (admin affordance).
    pub async fn update_car(
        &self,
        token: &str,
        car_id: i64,
        input: &CarInput,
    ) -> Result<String, FleetError> {
        validate_car_input(input)?;
        Ok(api::cars::update(&self.api, token, car_id, input).await?)
    }

    /// Remove a car from the fleet (admin affordance).
    pub async fn remove_car(&self, token: &str, car_id: i64) -> Result<String, FleetError> {
        Ok(api::cars::delete(&self.api, token, car_id).await?)
    }
}

/// The backend requires every field; catching that locally saves a round
/// trip and gives the user a field-level message.
fn validate_car_input(input: &CarInput) -> Result<(), FleetError> {
    for (value, name) in [
        (&input.brand, "Brand"),
        (&input.model, "Model"),
        (&input.image1, "First image"),
        (&input.image2, "Second image"),
    ] {
        if value.trim().is_empty() {
            return Err(FleetError::Validation(format!("{} is required", name)));
        }
    }
    if input.price_per_day <= 0.0 {
        return Err(FleetError::Validation(
            "Price per day must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
