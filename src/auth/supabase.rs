//! Email/password auth against the project's GoTrue endpoints
//!
//! Implements sign-in, sign-up, sign-out, and token refresh. The active
//! session's access token is installed on the shared [`SupabaseClient`] so
//! row store and gateway requests run as the signed-in user.

use crate::auth::{AuthProvider, AuthSession, AuthUser, SessionVault};
use crate::error::{JournalError, Result};
use crate::supabase::SupabaseClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token response from `/token` and (when auto-confirmed) `/signup`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Error payload; GoTrue versions disagree on the field name
#[derive(Debug, Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self, status: reqwest::StatusCode) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| format!("request failed with status {}", status))
    }
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: AuthUser {
                id: self.user.id,
                email: self.user.email,
            },
        }
    }
}

#[derive(Debug)]
struct AuthState {
    session: Option<AuthSession>,
    loading: bool,
}

/// Auth provider backed by the hosted project
pub struct SupabaseAuth {
    client: SupabaseClient,
    vault: Option<SessionVault>,
    state: RwLock<AuthState>,
}

impl SupabaseAuth {
    /// Provider without session persistence
    ///
    /// Starts out not loading and signed out.
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            vault: None,
            state: RwLock::new(AuthState {
                session: None,
                loading: false,
            }),
        }
    }

    /// Persist sessions in the given keyring vault
    ///
    /// The provider reports loading until [`SupabaseAuth::restore`] runs.
    pub fn with_vault(mut self, vault: SessionVault) -> Self {
        self.vault = Some(vault);
        if let Ok(mut state) = self.state.write() {
            state.loading = true;
        }
        self
    }

    /// Restore a persisted session, refreshing it if it has expired
    ///
    /// Failures are logged and leave the provider signed out; restoring
    /// never fails the caller.
    pub async fn restore(&self) {
        let stored = match &self.vault {
            Some(vault) => vault.load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load stored session: {:#}", e);
                None
            }),
            None => None,
        };

        let session = match stored {
            Some(session) if session.is_expired() => match session.refresh_token.as_deref() {
                Some(refresh_token) => match self.refresh(refresh_token).await {
                    Ok(refreshed) => Some(refreshed),
                    Err(e) => {
                        tracing::warn!("Session refresh failed, signing out: {:#}", e);
                        None
                    }
                },
                None => None,
            },
            other => other,
        };

        match session {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "Restored auth session");
                self.install(Some(session));
            }
            None => self.install(None),
        }
        self.set_loading(false);
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        self.token_request(
            "token?grant_type=refresh_token",
            &RefreshRequest { refresh_token },
        )
        .await
    }

    async fn token_request<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<AuthSession> {
        let response = self
            .client
            .request(Method::POST, &self.client.auth_url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| JournalError::Authentication(format!("auth request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(JournalError::Authentication(error.into_message(status)).into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            JournalError::Authentication(format!("unreadable auth response: {}", e))
        })?;
        Ok(token.into_session())
    }

    /// Record the session in memory, on the client, and in the vault
    fn install(&self, session: Option<AuthSession>) {
        self.client
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));

        if let Some(vault) = &self.vault {
            let persisted = match &session {
                Some(session) => vault.save(session),
                None => vault.clear(),
            };
            if let Err(e) = persisted {
                tracing::warn!("Failed to persist auth session: {:#}", e);
            }
        }

        if let Ok(mut state) = self.state.write() {
            state.session = session;
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(mut state) = self.state.write() {
            state.loading = loading;
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    fn current_session(&self) -> Option<AuthSession> {
        self.state.read().ok().and_then(|state| state.session.clone())
    }

    fn is_loading(&self) -> bool {
        self.state.read().map(|state| state.loading).unwrap_or(false)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self
            .token_request(
                "token?grant_type=password",
                &PasswordCredentials { email, password },
            )
            .await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.install(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthSession>> {
        let response = self
            .client
            .request(Method::POST, &self.client.auth_url("signup"))
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| JournalError::Authentication(format!("sign-up request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(JournalError::Authentication(error.into_message(status)).into());
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            JournalError::Authentication(format!("unreadable sign-up response: {}", e))
        })?;

        if body.get("access_token").is_none() {
            tracing::info!("Account created; confirmation required before sign-in");
            return Ok(None);
        }

        let token: TokenResponse = serde_json::from_value(body).map_err(|e| {
            JournalError::Authentication(format!("unreadable sign-up session: {}", e))
        })?;
        let session = token.into_session();
        tracing::info!(user_id = %session.user.id, "Signed up");
        self.install(Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<()> {
        if self.current_session().is_some() {
            let result = self
                .client
                .request(Method::POST, &self.client.auth_url("logout"))
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!("Remote sign-out failed, clearing local session anyway: {}", e);
            }
        }
        self.install(None);
        tracing::info!("Signed out");
        Ok(())
    }
}
