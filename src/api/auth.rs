//! Authentication endpoints
//!
//! - `POST /login` - exchange credentials for a bearer token
//! - `GET /current_user` - fetch the user record the token belongs to
//! - `DELETE /logout` - invalidate the token server-side

use serde::{Deserialize, Serialize};

use crate::api::common::{decode, decode_message};
use crate::api::{ApiClient, ApiError};
use crate::models::User;

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: String,
}

/// Exchange credentials for a bearer token.
///
/// Bad credentials come back as [`ApiError::Rejected`] with the backend's
/// message; no token is issued.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<String, ApiError> {
    let response = api
        .post("/login")
        .json(&LoginBody { email, password })
        .send()
        .await?;

    let body: TokenBody = decode(response).await?;
    Ok(body.access_token)
}

/// Fetch the user record for a token.
///
/// An invalid or expired token comes back as [`ApiError::Unauthorized`];
/// callers are expected to treat that as a forced logout.
pub async fn current_user(api: &ApiClient, token: &str) -> Result<User, ApiError> {
    let response = api.get("/current_user").bearer_auth(token).send().await?;
    decode(response).await
}

/// Invalidate a token server-side. Returns the backend's acknowledgement.
pub async fn logout(api: &ApiClient, token: &str) -> Result<String, ApiError> {
    let response = api.delete("/logout").bearer_auth(token).send().await?;
    decode_message(response).await
}
