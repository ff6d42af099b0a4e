// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use davsync_webdav::WebDavClient;

use crate::error::SyncError;
use crate::target::{SyncTarget, TargetKey};

/// A client shared through the registry. The async mutex keeps two tasks
/// from using one client at the same time.
pub type SharedClient = Arc<tokio::sync::Mutex<WebDavClient>>;

/// Maps each target identity to its long-lived client.
///
/// Entries are never removed, so the authentication state learned by a
/// client survives between tasks.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<Mutex<HashMap<TargetKey, SharedClient>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the client for `target`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if a new client cannot be created.
    pub fn ensure(&self, target: &SyncTarget) -> Result<SharedClient, SyncError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let key = target.key();
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        tracing::debug!(target = %key, "registering WebDAV client");
        let client = Arc::new(tokio::sync::Mutex::new(WebDavClient::new(
            target.dav_config(),
        )?));
        clients.insert(key, client.clone());
        Ok(client)
    }

    /// Returns the client registered under `key`.
    #[must_use]
    pub fn get(&self, key: &TargetKey) -> Option<SharedClient> {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Returns the number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no target is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use davsync_webdav::Scheme;

    use super::*;

    fn target(user: &str, base: &str, password: &str) -> SyncTarget {
        SyncTarget {
            scheme: Scheme::Https,
            host: "example.com".to_string(),
            username: user.to_string(),
            password: password.to_string(),
            remote_base_path: base.to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn same_identity_shares_one_client() {
        let registry = ClientRegistry::new();
        let a = registry.ensure(&target("u", "/remote", "p")).unwrap();
        let b = registry.ensure(&target("u", "/remote", "other")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn different_identity_gets_its_own_client() {
        let registry = ClientRegistry::new();
        let a = registry.ensure(&target("u", "/remote", "p")).unwrap();
        let b = registry.ensure(&target("u", "/other", "p")).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(&target("u", "/other", "p").key()).is_some());
        assert!(registry.get(&target("v", "/other", "p").key()).is_none());
    }
}
