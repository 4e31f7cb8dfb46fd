//! Role derivation
//!
//! Which navigation links and operations are available is a pure function
//! of session state, recomputed on every read - there is nothing to cache
//! and therefore nothing to go stale across a login or logout. Admin
//! standing is keyed off the hydrated record's `is_admin` flag and never
//! off token presence, so privileged affordances cannot flash into view
//! while hydration is still in flight.

use std::fmt;

use crate::models::Session;

/// The viewer's standing, derived from session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// No token held
    Guest,
    /// Token held, hydration not yet complete
    Authenticating,
    /// Hydrated, regular customer
    User,
    /// Hydrated, administrator
    Admin,
}

impl Role {
    /// Derive the role for a session snapshot.
    pub fn derive(session: &Session) -> Self {
        match (&session.token, &session.current_user) {
            (None, _) => Role::Guest,
            (Some(_), None) => Role::Authenticating,
            (Some(_), Some(user)) if user.is_admin => Role::Admin,
            (Some(_), Some(_)) => Role::User,
        }
    }

    /// Hydration has confirmed who the viewer is.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Role::User | Role::Admin)
    }

    /// Fleet management and the dashboard are admin-only.
    pub fn can_manage_fleet(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Profile, bookings, and reviews need a confirmed account.
    pub fn can_access_account(&self) -> bool {
        self.is_authenticated()
    }

    /// The navigation links this role gets to see.
    ///
    /// While authenticating, only the public links are shown - the account
    /// and admin entries wait for hydration.
    pub fn nav_links(&self) -> &'static [&'static str] {
        match self {
            Role::Guest => &["/", "/cars", "/about", "/contact", "/login", "/signup"],
            Role::Authenticating => &["/", "/cars", "/about", "/contact"],
            Role::User => &["/", "/cars", "/about", "/contact", "/profile"],
            Role::Admin => &["/", "/cars", "/about", "/contact", "/profile", "/admin"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Guest => write!(f, "guest"),
            Role::Authenticating => write!(f, "authenticating"),
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::{User, UserRole};
    use proptest::prelude::*;

    fn arb_session() -> impl Strategy<Value = Session> {
        (
            proptest::option::of("[a-zA-Z0-9]{1,32}"),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(token, admin_flag)| {
                let current_user = match (&token, admin_flag) {
                    // A user without a token cannot be constructed through
                    // the session manager; derivation still has to cope
                    (_, Some(is_admin)) => Some(User {
                        id: 1,
                        username: "u".to_string(),
                        email: "u@x.com".to_string(),
                        role: UserRole::default(),
                        is_admin,
                    }),
                    _ => None,
                };
                Session {
                    token,
                    current_user,
                }
            })
    }

    proptest! {
        /// Admin is reported only when the hydrated record says so.
        #[test]
        fn never_admin_without_flag(session in arb_session()) {
            let role = Role::derive(&session);
            if role == Role::Admin {
                prop_assert_eq!(
                    session.current_user.map(|u| u.is_admin),
                    Some(true)
                );
            }
        }

        /// No authenticated role can exist without a token.
        #[test]
        fn never_authenticated_without_token(session in arb_session()) {
            let role = Role::derive(&session);
            if session.token.is_none() {
                prop_assert_eq!(role, Role::Guest);
            }
        }

        /// Privileged navigation is reachable only through Admin.
        #[test]
        fn admin_nav_requires_admin_role(session in arb_session()) {
            let role = Role::derive(&session);
            if role.nav_links().contains(&"/admin") {
                prop_assert_eq!(role, Role::Admin);
            }
        }
    }
}
