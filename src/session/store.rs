use tokio::sync::watch;

use crate::common::{Credential, StorageError};
use crate::storage::LocalStore;
use crate::storage::local_store::{TOKEN_KEY, USERNAME_KEY};

/// Sole source of truth for whether the user is authenticated.
///
/// The credential is mirrored in memory and in the durable [`LocalStore`].
/// Token and username are always written and removed in one transaction.
pub struct SessionStore {
    storage: LocalStore,
    current: Option<Credential>,
    updates: watch::Sender<Option<Credential>>,
}

impl SessionStore {
    /// Restores whatever credential survived the last run.
    pub fn load(mut storage: LocalStore) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty());
        let username = storage.get(USERNAME_KEY)?;

        let current = match (token, username) {
            (Some(token), Some(username)) => Some(Credential { token, username }),
            (None, None) => None,
            _ => {
                log::warn!("Discarding partially stored credential");
                storage.remove_many(&[TOKEN_KEY, USERNAME_KEY])?;
                None
            }
        };

        if let Some(credential) = &current {
            log::info!("Restored session for {}", credential.username);
        }

        let (updates, _) = watch::channel(current.clone());
        Ok(Self {
            storage,
            current,
            updates,
        })
    }

    pub fn set_credential(&mut self, credential: Credential) -> Result<(), StorageError> {
        self.storage.set_many(&[
            (TOKEN_KEY, credential.token.as_str()),
            (USERNAME_KEY, credential.username.as_str()),
        ])?;
        log::info!("Stored credential for {}", credential.username);
        self.current = Some(credential);
        self.publish();
        Ok(())
    }

    pub fn clear_credential(&mut self) -> Result<(), StorageError> {
        self.storage.remove_many(&[TOKEN_KEY, USERNAME_KEY])?;
        if let Some(previous) = self.current.take() {
            log::info!("Cleared credential for {}", previous.username);
        }
        self.publish();
        Ok(())
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.current.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.current.as_ref().map(|credential| credential.username.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Receives the credential every time it is set or cleared.
    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.updates.subscribe()
    }

    /// Underlying storage, shared with peripheral preferences such as the theme.
    pub fn storage(&self) -> &LocalStore {
        &self.storage
    }

    fn publish(&self) {
        self.updates.send_replace(self.current.clone());
    }
}
