//! User account endpoints
//!
//! - `POST /users` - registration (no token required)
//! - `GET /users` - full listing (admin dashboard)
//! - `GET /users/{id}` - single record
//! - `PUT /users/{id}` - update email and password
//! - `DELETE /users/{id}` - delete an account

use serde::Serialize;

use crate::api::common::{decode, decode_message};
use crate::api::{ApiClient, ApiError};
use crate::models::User;

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Register a new account. Registration does not log the user in; the
/// backend only acknowledges, and a separate login issues the token.
pub async fn register(
    api: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<String, ApiError> {
    let response = api
        .post("/users")
        .json(&RegisterBody {
            username,
            email,
            password,
        })
        .send()
        .await?;

    decode_message(response).await
}

/// List every account (admin dashboard view).
pub async fn list(api: &ApiClient, token: &str) -> Result<Vec<User>, ApiError> {
    let response = api.get("/users").bearer_auth(token).send().await?;
    decode(response).await
}

/// Fetch a single account.
pub async fn get(api: &ApiClient, token: &str, user_id: i64) -> Result<User, ApiError> {
    let response = api
        .get(&format!("/users/{}", user_id))
        .bearer_auth(token)
        .send()
        .await?;
    decode(response).await
}

/// Update an account's email and password.
pub async fn update(
    api: &ApiClient,
    token: &str,
    user_id: i64,
    email: &str,
    password: &str,
) -> Result<String, ApiError> {
    let response = api
        .put(&format!("/users/{}", user_id))
        .bearer_auth(token)
        .json(&UpdateBody { email, password })
        .send()
        .await?;

    decode_message(response).await
}

/// Delete an account.
pub async fn delete(api: &ApiClient, token: &str, user_id: i64) -> Result<String, ApiError> {
    let response = api
        .delete(&format!("/users/{}", user_id))
        .bearer_auth(token)
        .send()
        .await?;

    decode_message(response).await
}
