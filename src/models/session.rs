//! Session model
//!
//! The client-side record of who is logged in: the bearer token issued at
//! login and the user record hydrated from it. Exactly one of these exists
//! per running client, owned by the session manager; everything else reads
//! snapshots.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Client-side authentication state.
///
/// Invariant: `current_user` is only ever present while `token` is
/// present. A token without a user means hydration is still in flight
/// (or failed); neither field is ever set directly by UI code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token, mirrored to durable storage
    pub token: Option<String>,
    /// User record hydrated from the token
    pub current_user: Option<User>,
}

impl Session {
    /// A fresh, logged-out session.
    pub fn guest() -> Self {
        Self::default()
    }

    /// Token present and the user record has been hydrated.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.current_user.is_some()
    }
}
