//! Application context
//!
//! Bundles the collaborators of one running app (row store, auth provider,
//! AI gateway, settings, and the local session cache) so the journal flow and
//! the commands receive them explicitly.

use crate::ai::{AiGateway, HttpAiGateway};
use crate::auth::{AuthProvider, SessionVault, StaticAuth, SupabaseAuth};
use crate::cache::LocalSessionCache;
use crate::config::Config;
use crate::domain::MeDbSnapshot;
use crate::error::Result;
use crate::reconcile::{load_history, HistoryView};
use crate::settings::SettingsStore;
use crate::store::{create_store, RemoteStore};
use crate::supabase::SupabaseClient;
use std::sync::Arc;

/// Everything a journaling session needs, wired once at startup
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn RemoteStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub gateway: Arc<dyn AiGateway>,
    pub settings: SettingsStore,
    pub cache: LocalSessionCache,
    /// User model sent with pipeline requests
    pub me_db: MeDbSnapshot,
}

/// Create the configured auth provider
///
/// A configured offline user selects [`StaticAuth`]; otherwise the hosted
/// provider is used and any session persisted in the keyring is restored.
pub async fn create_auth(config: &Config, client: &SupabaseClient) -> Arc<dyn AuthProvider> {
    match &config.auth.offline_user {
        Some(user_id) => {
            tracing::debug!("Using offline user {}", user_id);
            Arc::new(StaticAuth::new(user_id.clone()))
        }
        None => {
            let auth = SupabaseAuth::new(client.clone())
                .with_vault(SessionVault::for_project(&config.remote.url));
            auth.restore().await;
            Arc::new(auth)
        }
    }
}

impl AppContext {
    /// Assemble a context from explicit collaborators
    pub fn new(
        config: Config,
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        gateway: Arc<dyn AiGateway>,
        settings: SettingsStore,
    ) -> Self {
        Self {
            config,
            store,
            auth,
            gateway,
            settings,
            cache: LocalSessionCache::new(),
            me_db: MeDbSnapshot::default(),
        }
    }

    /// Build the production context described by `config`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client, the SQLite store, or the settings
    /// location cannot be set up.
    pub async fn from_config(config: Config) -> Result<Self> {
        let client = SupabaseClient::new(&config.remote)?;
        let store = create_store(&config, &client)?;
        let auth = create_auth(&config, &client).await;
        let gateway: Arc<dyn AiGateway> =
            Arc::new(HttpAiGateway::new(client, config.ai.function_name.clone()));
        let settings = SettingsStore::new()?;

        tracing::info!(
            store = store.name(),
            signed_in = auth.current_session().is_some(),
            "Application context ready"
        );

        Ok(Self::new(config, store, auth, gateway, settings))
    }

    /// Whether AI features run locally
    ///
    /// `ai.mock_mode` in the config overrides the persisted setting.
    pub fn mock_ai(&self) -> bool {
        self.config
            .ai
            .mock_mode
            .unwrap_or(self.settings.settings().mock_ai_enabled)
    }

    /// Gateway to use for AI requests; `None` in mock mode
    pub fn ai_gateway(&self) -> Option<&dyn AiGateway> {
        if self.mock_ai() {
            None
        } else {
            Some(self.gateway.as_ref())
        }
    }

    /// Identifier of the signed-in user
    pub fn current_user_id(&self) -> Option<String> {
        self.auth.current_user_id()
    }

    /// Reconciled history of the signed-in user
    pub async fn history(&self, limit: usize) -> HistoryView {
        let user_id = self.current_user_id();
        load_history(self.store.as_ref(), user_id.as_deref(), &self.cache, limit).await
    }
}
