//! Fleet endpoints
//!
//! Car listings are public; mutations carry the bearer token.

use crate::api::common::{decode, decode_message};
use crate::api::{ApiClient, ApiError};
use crate::models::{Car, CarInput, CarStatus};

/// List the whole fleet.
pub async fn list(api: &ApiClient) -> Result<Vec<Car>, ApiError> {
    let response = api.get("/cars").send().await?;
    decode(response).await
}

/// Fetch a single car.
pub async fn get(api: &ApiClient, car_id: i64) -> Result<Car, ApiError> {
    let response = api.get(&format!("/cars/{}", car_id)).send().await?;
    decode(response).await
}

/// Add a car to the fleet.
pub async fn create(api: &ApiClient, token: &str, input: &CarInput) -> Result<String, ApiError> {
    let response = api
        .post("/cars")
        .bearer_auth(token)
        .json(input)
        .send()
        .await?;
    decode_message(response).await
}

/// Replace a car's record. The backend requires the full field set even
/// for partial edits.
pub async fn update(
    api: &ApiClient,
    token: &str,
    car_id: i64,
    input: &CarInput,
) -> Result<String, ApiError> {
    let response = api
        .patch(&format!("/cars/{}", car_id))
        .bearer_auth(token)
        .json(input)
        .send()
        .await?;
    decode_message(response).await
}

/// Flip a car's availability status.
///
/// There is no partial-update endpoint, so this reads the current record
/// and re-sends it with the new status.
pub async fn set_status(
    api: &ApiClient,
    token: &str,
    car_id: i64,
    status: CarStatus,
) -> Result<(), ApiError> {
    let car = get(api, car_id).await?;
    let input = CarInput::from_car(&car).with_status(status);
    update(api, token, car_id, &input).await?;
    Ok(())
}

/// Remove a car from the fleet.
pub async fn delete(api: &ApiClient, token: &str, car_id: i64) -> Result<String, ApiError> {
    let response = api
        .delete(&format!("/cars/{}", car_id))
        .bearer_auth(token)
        .send()
        .await?;
    decode_message(response).await
}
