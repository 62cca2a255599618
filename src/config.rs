//! Form configuration
//!
//! Resolution order: defaults, then the optional TOML file, then environment
//! overrides (`NETWORK_FORM_*`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const ENV_RPC_TIMEOUT_MS: &str = "NETWORK_FORM_RPC_TIMEOUT_MS";
pub const ENV_USER_AGENT: &str = "NETWORK_FORM_USER_AGENT";
pub const ENV_LOG: &str = "NETWORK_FORM_LOG";

/// Settings for the `eth_chainId` transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcSettings {
    /// Request timeout. Unset means the call waits for the endpoint.
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            rpc: RpcSettings::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl FormConfig {
    /// Read `path` if it exists; a missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            let s = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.as_ref().display()))?;
            let cfg: FormConfig = toml::from_str(&s)
                .with_context(|| format!("parsing {}", path.as_ref().display()))?;
            Ok(cfg)
        } else {
            Ok(Default::default())
        }
    }

    /// File (if any) plus process environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from `lookup`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(ENV_RPC_TIMEOUT_MS) {
            match val.trim().parse::<u64>() {
                Ok(0) => self.rpc.timeout_ms = None,
                Ok(ms) => self.rpc.timeout_ms = Some(ms),
                Err(_) => tracing::warn!(value = %val, "ignoring invalid {}", ENV_RPC_TIMEOUT_MS),
            }
        }

        if let Some(val) = lookup(ENV_USER_AGENT) {
            let val = val.trim();
            if !val.is_empty() {
                self.rpc.user_agent = Some(val.to_string());
            }
        }

        // NETWORK_FORM_LOG wins over RUST_LOG
        if let Some(filter) = lookup(ENV_LOG).or_else(|| lookup("RUST_LOG")) {
            self.log_filter = filter;
        }
    }
}
