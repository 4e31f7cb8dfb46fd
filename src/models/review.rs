//! Review models

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A review as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier
    pub id: i64,
    /// Author
    pub user_id: i64,
    /// Reviewed car
    pub car_id: i64,
    /// Star rating, 1 to 5
    pub rating: u8,
    /// Free-form comment
    pub comment: Option<String>,
    /// Submission time; the backend sends an empty string when unset
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub timestamp: Option<NaiveDateTime>,
}

/// A review joined with author and car names, as returned by the per-car
/// listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarReview {
    pub username: String,
    pub car_model: String,
    pub rating: u8,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub timestamp: Option<NaiveDateTime>,
}

/// Payload for submitting a review. The author is taken from the bearer
/// token server-side.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub car_id: i64,
    pub rating: u8,
    pub comment: Option<String>,
}

/// The backend serializes a missing timestamp as `""` rather than null.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<NaiveDateTime>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_deserialize() {
        let review: Review = serde_json::from_str(
            r#"{"id": 1, "user_id": 2, "car_id": 3, "rating": 5,
                "comment": "Smooth ride", "timestamp": "2026-08-01T10:00:00"}"#,
        )
        .unwrap();

        assert_eq!(review.rating, 5);
        assert_eq!(review.comment.as_deref(), Some("Smooth ride"));
        assert!(review.timestamp.is_some());
    }

    #[test]
    fn test_empty_timestamp_reads_as_none() {
        let review: Review = serde_json::from_str(
            r#"{"id": 1, "user_id": 2, "car_id": 3, "rating": 4, "comment": null, "timestamp": ""}"#,
        )
        .unwrap();

        assert!(review.timestamp.is_none());
        assert!(review.comment.is_none());
    }

    #[test]
    fn test_car_review_deserialize() {
        let review: CarReview = serde_json::from_str(
            r#"{"username": "alice", "car_model": "Corolla", "rating": 3,
                "comment": "Okay", "timestamp": "2026-07-15T08:00:00"}"#,
        )
        .unwrap();

        assert_eq!(review.username, "alice");
        assert_eq!(review.car_model, "Corolla");
    }
}
