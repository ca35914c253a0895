//! Shared HTTP client for the backend-as-a-service project
//!
//! One [`SupabaseClient`] is built per application context and shared by the
//! row store adapter, the auth provider, and the AI gateway. It carries the
//! project URL, the publishable key, and the access token of the signed-in
//! user so every request is made on that user's behalf.

use crate::config::RemoteConfig;
use crate::error::{JournalError, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Cheaply clonable handle to the project endpoints
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("has_access_token", &self.access_token().is_some())
            .finish()
    }
}

impl SupabaseClient {
    /// Create a client for the configured project
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use dayjot::config::RemoteConfig;
    /// use dayjot::supabase::SupabaseClient;
    ///
    /// let client = SupabaseClient::new(&RemoteConfig::default()).unwrap();
    /// assert_eq!(client.rest_url("journal_sessions"), "http://localhost/rest/v1/journal_sessions");
    /// ```
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("dayjot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JournalError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized backend client: url={}", config.url);

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// PostgREST endpoint of a table
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// GoTrue endpoint below `/auth/v1`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Edge function endpoint
    pub fn functions_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Replace the access token used for subsequent requests
    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    /// Access token of the signed-in user, if any
    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|guard| guard.clone())
    }

    /// Start a request with the project key and bearer token applied
    ///
    /// The bearer is the user's access token when signed in, otherwise the
    /// publishable key.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }
}

/// Turn a non-success response into an error message containing the body
pub async fn error_for_status(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("{} {}", status, body.trim()))
}
