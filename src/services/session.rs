//! Session manager
//!
//! Single authority for authentication state. Every credential operation
//! funnels through here: registration, login, logout, account deletion,
//! profile updates, and hydration of the user record behind the token.
//!
//! Two rules keep the state trustworthy:
//! - `current_user` is only ever set under a token, and only while the
//!   token the record was fetched for is still the current one. A slow
//!   hydration response landing after a logout is discarded, never
//!   applied.
//! - When the backend rejects the token, the session is torn down
//!   completely - memory and durable store - before the error surfaces.

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::api::{self, ApiClient, ApiError};
use crate::models::{Session, User};
use crate::services::role::Role;
use crate::storage::{StorageError, TokenStore};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Error types for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation needs a hydrated login
    #[error("You must be logged in to do that")]
    NotLoggedIn,

    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// The backend no longer accepts the token; the session has been
    /// cleared
    #[error("Your session has expired, please log in again")]
    SessionExpired,

    /// A backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The durable token slot failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owner of the client's authentication state.
///
/// One instance exists per running client, shared behind `Arc`; readers
/// take snapshots, and all writes go through the operations below.
pub struct SessionManager {
    api: Arc<ApiClient>,
    store: Arc<dyn TokenStore>,
    state: RwLock<Session>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            state: RwLock::new(Session::guest()),
        }
    }

    /// Snapshot of the current session state.
    pub fn session(&self) -> Session {
        self.state.read().expect("session lock poisoned").clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .expect("session lock poisoned")
            .token
            .clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state
            .read()
            .expect("session lock poisoned")
            .current_user
            .clone()
    }

    /// The viewer's standing right now. Derived, never cached.
    pub fn role(&self) -> Role {
        Role::derive(&self.state.read().expect("session lock poisoned"))
    }

    /// Register a new account.
    ///
    /// Registration does not issue a token - on success the caller moves
    /// on to the login flow. Session state is never touched.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, SessionError> {
        if username.trim().is_empty() {
            return Err(SessionError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }
        validate_credentials(email, password)?;

        let message = api::users::register(&self.api, username, email, password).await?;
        info!(username, "account registered, continue to login");
        Ok(message)
    }

    /// Exchange credentials for a session.
    ///
    /// On success the token is stored (memory and durable slot) and the
    /// user record is hydrated before returning. On any failure the
    /// session is left exactly as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        validate_credentials(email, password)?;

        let token = api::auth::login(&self.api, email, password).await?;
        {
            let mut state = self.state.write().expect("session lock poisoned");
            state.token = Some(token.clone());
            state.current_user = None;
        }
        self.store.save(&token).await?;
        debug!("token stored, hydrating user record");

        match self.hydrate().await? {
            Some(user) => {
                info!(username = %user.username, "logged in");
                Ok(user)
            }
            // Only reachable if another login/logout raced this one and
            // superseded the token before hydration applied
            None => Err(SessionError::SessionExpired),
        }
    }

    /// Fetch the user record for the held token and apply it.
    ///
    /// The result is applied only while the token it was fetched for is
    /// still the current one; a response that arrives after a logout or a
    /// newer login is dropped. Returns `Ok(None)` when there is nothing to
    /// hydrate (logged out, or the result was superseded).
    pub async fn hydrate(&self) -> Result<Option<User>, SessionError> {
        let token = match self.token() {
            Some(token) => token,
            None => return Ok(None),
        };

        match api::auth::current_user(&self.api, &token).await {
            Ok(user) => {
                let mut state = self.state.write().expect("session lock poisoned");
                if state.token.as_deref() == Some(token.as_str()) {
                    state.current_user = Some(user.clone());
                    Ok(Some(user))
                } else {
                    debug!("discarding hydration result for a superseded token");
                    Ok(None)
                }
            }
            Err(err) if err.is_unauthorized() => {
                if self.clear_memory_if_current(&token) {
                    self.store.clear().await?;
                    warn!("backend rejected the stored token, session cleared");
                    Err(SessionError::SessionExpired)
                } else {
                    Ok(None)
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Startup path: pick up a persisted token and hydrate it.
    ///
    /// Returns the hydrated user, or `None` for a clean logged-out start -
    /// including the case where the persisted token turned out to be dead
    /// (it is erased on the way). Network failures propagate; the token is
    /// kept, since nothing proved it invalid.
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        let token = match self.store.load().await? {
            Some(token) => token,
            None => return Ok(None),
        };

        {
            let mut state = self.state.write().expect("session lock poisoned");
            state.token = Some(token);
            state.current_user = None;
        }

        match self.hydrate().await {
            Ok(user) => Ok(user),
            Err(SessionError::SessionExpired) => {
                info!("persisted token no longer valid, starting logged out");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// End the session.
    ///
    /// Already being logged out is a no-op. The local session is cleared
    /// only once the backend confirms the invalidation - or tells us the
    /// token was already dead, which ends in the same place. A network
    /// failure leaves the session untouched and surfaces the error.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = match self.token() {
            Some(token) => token,
            None => return Ok(()),
        };

        match api::auth::logout(&self.api, &token).await {
            Ok(message) => {
                info!(%message, "logged out");
                self.clear(&token).await
            }
            Err(err) if err.is_unauthorized() => {
                warn!("logout found the token already invalid");
                self.clear(&token).await
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete the logged-in account. On success the end state is identical
    /// to a logout.
    pub async fn delete_account(&self) -> Result<(), SessionError> {
        let (token, user) = self.authenticated()?;

        match api::users::delete(&self.api, &token, user.id).await {
            Ok(message) => {
                info!(%message, username = %user.username, "account deleted");
                self.clear(&token).await
            }
            Err(err) if err.is_unauthorized() => {
                self.clear(&token).await?;
                Err(SessionError::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Update the account's email and password.
    ///
    /// The local user record picks up the accepted email immediately; the
    /// token is never touched by a profile update.
    pub async fn update_profile(
        &self,
        email: &str,
        password: &str,
    ) -> Result<String, SessionError> {
        validate_credentials(email, password)?;
        let (token, user) = self.authenticated()?;

        match api::users::update(&self.api, &token, user.id, email, password).await {
            Ok(message) => {
                let mut state = self.state.write().expect("session lock poisoned");
                if state.token.as_deref() == Some(token.as_str()) {
                    if let Some(current) = state.current_user.as_mut() {
                        current.email = email.to_string();
                    }
                }
                Ok(message)
            }
            Err(err) if err.is_unauthorized() => {
                self.clear(&token).await?;
                Err(SessionError::SessionExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn authenticated(&self) -> Result<(String, User), SessionError> {
        let state = self.state.read().expect("session lock poisoned");
        match (&state.token, &state.current_user) {
            (Some(token), Some(user)) => Ok((token.clone(), user.clone())),
            _ => Err(SessionError::NotLoggedIn),
        }
    }

    /// Drop token and user from memory, but only if `token` is still the
    /// current one - a session established since then must survive.
    fn clear_memory_if_current(&self, token: &str) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.token.as_deref() == Some(token) {
            state.token = None;
            state.current_user = None;
            true
        } else {
            false
        }
    }

    async fn clear(&self, token: &str) -> Result<(), SessionError> {
        if self.clear_memory_if_current(token) {
            self.store.clear().await?;
        }
        Ok(())
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    if email.trim().is_empty() {
        return Err(SessionError::Validation("Email cannot be empty".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(SessionError::Validation("Invalid email format".to_string()));
    }
    if password.is_empty() {
        return Err(SessionError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }
    Ok(())
}
