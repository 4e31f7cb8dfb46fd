//! Common response handling for backend calls
//!
//! The backend speaks three envelope dialects: application failures arrive
//! as `{"error": ...}` bodies, token failures as `{"msg": ...}` (the JWT
//! layer's key), and acknowledgements as `{"message": ...}` or
//! `{"success": ...}`. Everything here decodes those uniformly so the
//! per-resource modules stay one-liners.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::ApiError;

/// The union of envelope keys the backend uses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    pub error: Option<String>,
    pub message: Option<String>,
    pub success: Option<String>,
    /// Emitted by the token layer on auth failures
    pub msg: Option<String>,
}

/// Decode a response body into `T`, classifying failures first.
pub(crate) async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    decode_body(status, &body)
}

/// Decode a response expected to carry only an acknowledgement message.
pub(crate) async fn decode_message(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    message_from_body(status, &body)
}

/// Status+body classification, separated from I/O so it can be tested
/// directly.
pub(crate) fn decode_body<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<T, ApiError> {
    classify(status, body)?;
    serde_json::from_str(body)
        .map_err(|e| ApiError::Malformed(format!("{} (body: {})", e, truncate(body))))
}

pub(crate) fn message_from_body(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<String, ApiError> {
    classify(status, body)?;
    let envelope: Envelope = serde_json::from_str(body).unwrap_or_default();
    Ok(envelope
        .message
        .or(envelope.success)
        .unwrap_or_else(|| "ok".to_string()))
}

/// Map failure envelopes and non-success statuses to [`ApiError`].
///
/// A `msg` key outranks everything: it only ever comes from the token
/// layer, so it marks the difference between "the backend said no" and
/// "the backend no longer knows who you are".
fn classify(status: reqwest::StatusCode, body: &str) -> Result<(), ApiError> {
    if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
        if let Some(msg) = envelope.msg {
            return Err(ApiError::Unauthorized(msg));
        }
        if let Some(error) = envelope.error {
            return Err(ApiError::Rejected(error));
        }
    }

    if !status.is_success() {
        return Err(ApiError::Rejected(format!(
            "server answered with status {}",
            status
        )));
    }

    Ok(())
}

fn truncate(body: &str) -> &str {
    let limit = body
        .char_indices()
        .nth(120)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..limit]
}
