//! Review endpoints
//!
//! Submitting requires a token (the backend reads the author from it);
//! deleting is admin-only server-side.

use crate::api::common::{decode, decode_message};
use crate::api::{ApiClient, ApiError};
use crate::models::{CarReview, NewReview, Review};

/// Submit a review for a car.
pub async fn create(api: &ApiClient, token: &str, review: &NewReview) -> Result<String, ApiError> {
    let response = api
        .post("/reviews")
        .bearer_auth(token)
        .json(review)
        .send()
        .await?;
    decode_message(response).await
}

/// List every review (admin dashboard view).
pub async fn list(api: &ApiClient) -> Result<Vec<Review>, ApiError> {
    let response = api.get("/reviews").send().await?;
    decode(response).await
}

/// List the reviews for one car, joined with author and car names.
pub async fn by_car(api: &ApiClient, car_id: i64) -> Result<Vec<CarReview>, ApiError> {
    let response = api.get(&format!("/reviews/car/{}", car_id)).send().await?;
    decode(response).await
}

/// Delete a review. The backend rejects non-admin tokens.
pub async fn delete(api: &ApiClient, token: &str, review_id: i64) -> Result<String, ApiError> {
    let response = api
        .delete(&format!("/reviews/{}", review_id))
        .bearer_auth(token)
        .send()
        .await?;
    decode_message(response).await
}
