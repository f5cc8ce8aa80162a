use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::credential::Credential;

/// Single-slot credential cache.
///
/// The slot is only ever replaced as a whole under the write lock, so readers
/// see either the previous credential or the new one.
#[derive(Debug, Clone, Default)]
pub struct CredentialCache {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<Credential> {
        self.inner.read().await.clone()
    }

    /// Replace the cached credential
    pub async fn set(&self, credential: Credential) {
        *self.inner.write().await = Some(credential);
    }

    /// Drop the cached credential, returns true if one was present
    pub async fn clear(&self) -> bool {
        self.inner.write().await.take().is_some()
    }
}
