//! Auth session persistence via OS keyring
//!
//! The signed-in session is serialized to JSON and stored in the operating
//! system's credential store so it survives restarts, one entry per project.

use crate::auth::AuthSession;
use crate::error::{JournalError, Result};

/// Keyring accessor for one project's auth session
///
/// # Examples
///
/// ```no_run
/// use dayjot::auth::SessionVault;
///
/// let vault = SessionVault::for_project("https://abc.supabase.co");
/// if let Some(session) = vault.load().unwrap() {
///     println!("signed in as {}", session.user.id);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionVault {
    account: String,
}

impl SessionVault {
    const SERVICE: &'static str = "dayjot-auth";

    /// Vault entry keyed by the project URL
    pub fn for_project(project_url: &str) -> Self {
        let account = url::Url::parse(project_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| project_url.to_string());
        Self { account }
    }

    /// Keyring account name used for this project
    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(Self::SERVICE, &self.account)
            .map_err(|e| JournalError::Keyring(e).into())
    }

    /// Persist the session
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Serialization`] if JSON serialization fails or
    /// [`JournalError::Keyring`] if the credential store rejects the write.
    pub fn save(&self, session: &AuthSession) -> Result<()> {
        let json_str = serde_json::to_string(session).map_err(JournalError::Serialization)?;
        self.entry()?
            .set_password(&json_str)
            .map_err(JournalError::Keyring)?;
        Ok(())
    }

    /// Load the stored session
    ///
    /// Returns `Ok(None)` when nothing has been stored.
    pub fn load(&self) -> Result<Option<AuthSession>> {
        match self.entry()?.get_password() {
            Ok(json_str) => Ok(Some(
                serde_json::from_str(&json_str).map_err(JournalError::Serialization)?,
            )),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(JournalError::Keyring(e).into()),
        }
    }

    /// Remove the stored session; a missing entry is not an error
    pub fn clear(&self) -> Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(JournalError::Keyring(e).into()),
        }
    }
}
