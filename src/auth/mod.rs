//! Authentication providers
//!
//! The journal flow only needs the signed-in user's id; the provider owns
//! how that session is obtained, persisted, and cleared.

use crate::error::{JournalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

pub mod supabase;
pub mod vault;

pub use supabase::SupabaseAuth;
pub use vault::SessionVault;

/// The user behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Stable user identifier
    pub id: String,
    /// Email address, when known
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for requests made on the user's behalf
    pub access_token: String,
    /// Token used to obtain a new access token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry of the access token; `None` means it does not expire
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Signed-in user
    pub user: AuthUser,
}

impl AuthSession {
    /// Returns `true` when the access token is expired or within 60 seconds
    /// of expiring
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use dayjot::auth::{AuthSession, AuthUser};
    ///
    /// let mut session = AuthSession {
    ///     access_token: "tok".into(),
    ///     refresh_token: None,
    ///     expires_at: None,
    ///     user: AuthUser { id: "u1".into(), email: None },
    /// };
    /// assert!(!session.is_expired());
    ///
    /// session.expires_at = Some(Utc::now() + Duration::seconds(30));
    /// assert!(session.is_expired());
    /// ```
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => Utc::now() >= expires_at - chrono::Duration::seconds(60),
        }
    }
}

/// Source of the current user session
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, if signed in
    fn current_session(&self) -> Option<AuthSession>;

    /// `true` until the provider has finished restoring a persisted session
    fn is_loading(&self) -> bool;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Create an account
    ///
    /// Returns `None` when the account needs confirmation before a session
    /// is issued.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthSession>>;

    /// End the current session
    async fn sign_out(&self) -> Result<()>;

    /// Identifier of the signed-in user
    fn current_user_id(&self) -> Option<String> {
        self.current_session().map(|session| session.user.id)
    }
}

/// Fixed-user provider for offline use
///
/// Always reports the configured user until signed out. Interactive sign-in
/// is unavailable.
pub struct StaticAuth {
    session: RwLock<Option<AuthSession>>,
}

impl StaticAuth {
    /// Provider signed in as `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            session: RwLock::new(Some(AuthSession {
                access_token: String::new(),
                refresh_token: None,
                expires_at: None,
                user: AuthUser {
                    id: user_id.into(),
                    email: None,
                },
            })),
        }
    }

    /// Provider with no session
    pub fn signed_out() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    fn current_session(&self) -> Option<AuthSession> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    fn is_loading(&self) -> bool {
        false
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        Err(JournalError::Authentication(
            "Sign-in is disabled while an offline user is configured".to_string(),
        )
        .into())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Option<AuthSession>> {
        Err(JournalError::Authentication(
            "Sign-up is disabled while an offline user is configured".to_string(),
        )
        .into())
    }

    async fn sign_out(&self) -> Result<()> {
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_auth_reports_user_until_sign_out() {
        let auth = StaticAuth::new("offline-user");
        assert_eq!(auth.current_user_id().as_deref(), Some("offline-user"));
        assert!(!auth.is_loading());

        auth.sign_out().await.unwrap();
        assert!(auth.current_session().is_none());
    }

    #[tokio::test]
    async fn test_static_auth_rejects_sign_in() {
        let auth = StaticAuth::signed_out();
        let err = auth.sign_in("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JournalError>(),
            Some(JournalError::Authentication(_))
        ));
        assert!(auth.current_user_id().is_none());
    }

    #[test]
    fn test_session_expiry_buffer() {
        let session = AuthSession {
            access_token: "t".into(),
            refresh_token: None,
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
            user: AuthUser {
                id: "u".into(),
                email: None,
            },
        };
        assert!(!session.is_expired());
    }
}
