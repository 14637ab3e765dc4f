//! Explicitly owned authentication state.
//!
//! The session is created once at startup (loaded from disk) and passed by
//! reference to everything that needs it; login and logout replace it
//! wholesale. Nothing consults a cached copy of the auth flag - the cart
//! synchronizer reads it at the moment of each operation.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use tavola_core::UserId;

/// The signed-in user as reported by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Current authentication state: anonymous, or a bearer token plus the
/// profile it was issued to.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<UserProfile>,
}

impl Session {
    /// An unauthenticated session.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
        }
    }

    /// A session for a signed-in user.
    #[must_use]
    pub const fn authenticated(token: SecretString, user: UserProfile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The bearer token, when signed in.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// The signed-in user's profile.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_anonymous_session() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_authenticated_session() {
        let session = Session::authenticated(SecretString::from("tok_123"), profile());
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|u| u.email.as_str()), Some("ada@example.com"));
    }
}
