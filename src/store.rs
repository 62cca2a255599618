//! Collaborators the form drives: the network list and the hosting view.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::form::NetworkConfiguration;

/// Persistent list of custom networks. Each call is all-or-nothing.
#[async_trait]
pub trait NetworkStore: Send + Sync {
    async fn list_networks(&self) -> Result<Vec<NetworkConfiguration>>;

    /// Insert or replace the network keyed by `config.rpc_url` and make it
    /// the active one.
    async fn create_or_select_network(&self, config: &NetworkConfiguration) -> Result<()>;

    /// Replace the network keyed by `old_rpc_url` with `config`.
    async fn rename_network(&self, old_rpc_url: &str, config: &NetworkConfiguration) -> Result<()>;

    async fn remove_network(&self, rpc_url: &str) -> Result<()>;
}

/// The view hosting a form session.
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// Ask the user to confirm deleting `target_rpc_url`.
    async fn request_delete_confirmation(&self, target_rpc_url: &str) -> bool;

    /// The session is over; `navigate_away` asks the host to leave the form.
    fn end_session(&self, navigate_away: bool);
}

/// Duplicate-detection set for the RPC URL field.
pub async fn known_rpc_urls_from(store: &dyn NetworkStore) -> Result<HashSet<String>> {
    Ok(store
        .list_networks()
        .await?
        .into_iter()
        .map(|n| n.rpc_url)
        .collect())
}

#[derive(Debug, Default)]
struct MemoryState {
    networks: Vec<NetworkConfiguration>,
    selected: Option<String>,
}

/// In-process store keeping networks in insertion order.
#[derive(Debug, Default)]
pub struct MemoryNetworkStore {
    state: Mutex<MemoryState>,
}

impl MemoryNetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_networks(networks: Vec<NetworkConfiguration>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                networks,
                selected: None,
            }),
        }
    }

    /// RPC URL of the active network, if any.
    pub fn selected(&self) -> Option<String> {
        self.state.lock().ok().and_then(|s| s.selected.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| anyhow!("Failed to lock network store: {}", e))
    }
}

#[async_trait]
impl NetworkStore for MemoryNetworkStore {
    async fn list_networks(&self) -> Result<Vec<NetworkConfiguration>> {
        Ok(self.lock()?.networks.clone())
    }

    async fn create_or_select_network(&self, config: &NetworkConfiguration) -> Result<()> {
        let mut state = self.lock()?;
        match state.networks.iter_mut().find(|n| n.rpc_url == config.rpc_url) {
            Some(existing) => *existing = config.clone(),
            None => state.networks.push(config.clone()),
        }
        state.selected = Some(config.rpc_url.clone());
        Ok(())
    }

    async fn rename_network(&self, old_rpc_url: &str, config: &NetworkConfiguration) -> Result<()> {
        let mut state = self.lock()?;
        if old_rpc_url != config.rpc_url && state.networks.iter().any(|n| n.rpc_url == config.rpc_url) {
            return Err(anyhow!("Network already exists: {}", config.rpc_url));
        }
        let existing = state
            .networks
            .iter_mut()
            .find(|n| n.rpc_url == old_rpc_url)
            .ok_or_else(|| anyhow!("Network not found: {}", old_rpc_url))?;
        *existing = config.clone();
        if state.selected.as_deref() == Some(old_rpc_url) {
            state.selected = Some(config.rpc_url.clone());
        }
        Ok(())
    }

    async fn remove_network(&self, rpc_url: &str) -> Result<()> {
        let mut state = self.lock()?;
        let before = state.networks.len();
        state.networks.retain(|n| n.rpc_url != rpc_url);
        if state.networks.len() == before {
            return Err(anyhow!("Network not found: {}", rpc_url));
        }
        if state.selected.as_deref() == Some(rpc_url) {
            state.selected = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(rpc_url: &str, chain_id: &str) -> NetworkConfiguration {
        NetworkConfiguration {
            rpc_url: rpc_url.into(),
            chain_id: chain_id.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_upserts_and_selects() {
        let store = MemoryNetworkStore::new();
        store.create_or_select_network(&network("https://a.test", "0x1")).await.unwrap();
        store.create_or_select_network(&network("https://a.test", "0x2")).await.unwrap();
        let networks = store.list_networks().await.unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].chain_id, "0x2");
        assert_eq!(store.selected().as_deref(), Some("https://a.test"));
    }

    #[tokio::test]
    async fn test_rename_replaces_in_place() {
        let store = MemoryNetworkStore::with_networks(vec![
            network("https://a.test", "0x1"),
            network("https://b.test", "0x2"),
        ]);
        store.rename_network("https://a.test", &network("https://c.test", "0x1")).await.unwrap();
        let urls: Vec<_> = store.list_networks().await.unwrap().into_iter().map(|n| n.rpc_url).collect();
        assert_eq!(urls, vec!["https://c.test", "https://b.test"]);

        assert!(store.rename_network("https://missing.test", &network("https://d.test", "0x1")).await.is_err());
        assert!(store.rename_network("https://c.test", &network("https://b.test", "0x1")).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_and_known_urls() {
        let store = MemoryNetworkStore::with_networks(vec![
            network("https://a.test", "0x1"),
            network("https://b.test", "0x2"),
        ]);
        store.remove_network("https://a.test").await.unwrap();
        assert!(store.remove_network("https://a.test").await.is_err());
        let known = known_rpc_urls_from(&store).await.unwrap();
        assert_eq!(known, HashSet::from(["https://b.test".to_string()]));
    }
}
