//! Form buffer and dirty-state tracking

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::chain_id;

/// Preference key the block explorer override is merged under.
pub const BLOCK_EXPLORER_PREF: &str = "blockExplorerUrl";

/// A persisted custom network. `rpc_url` is the identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
    pub rpc_url: String,
    /// `0x`-prefixed lowercase hex; legacy entries may hold anything.
    pub chain_id: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub network_name: String,
    #[serde(default)]
    pub block_explorer_url: String,
    #[serde(default, rename = "rpcPrefs")]
    pub rpc_preferences: HashMap<String, String>,
}

impl NetworkConfiguration {
    /// Block explorer shown in the form. Persisted networks keep it under
    /// `rpcPrefs`; the top-level field wins when both are set.
    pub fn block_explorer(&self) -> &str {
        if self.block_explorer_url.is_empty() {
            self.rpc_preferences
                .get(BLOCK_EXPLORER_PREF)
                .map(String::as_str)
                .unwrap_or_default()
        } else {
            &self.block_explorer_url
        }
    }
}

/// Editable fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    NetworkName,
    RpcUrl,
    ChainId,
    Ticker,
    BlockExplorerUrl,
}

impl Field {
    /// Display order of the form rows.
    pub const ALL: [Field; 5] = [
        Field::NetworkName,
        Field::RpcUrl,
        Field::ChainId,
        Field::Ticker,
        Field::BlockExplorerUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::NetworkName => "networkName",
            Field::RpcUrl => "rpcUrl",
            Field::ChainId => "chainId",
            Field::Ticker => "ticker",
            Field::BlockExplorerUrl => "blockExplorerUrl",
        }
    }

    /// Translation key of the row label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Field::Ticker => "optionalCurrencySymbol",
            Field::BlockExplorerUrl => "optionalBlockExplorerUrl",
            other => other.as_str(),
        }
    }
}

/// Per-field error messages. Only fields that currently fail hold an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    /// Record `message` for `field`; an empty message clears the entry.
    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        let message = message.into();
        if message.is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, message);
        }
    }

    pub fn clear_field(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// In-progress edit of one network. Always an owned copy of its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBuffer {
    pub rpc_url: String,
    /// Chain id as typed: decimal, `0x` hex, or a legacy value shown verbatim.
    pub chain_id: String,
    pub ticker: String,
    pub network_name: String,
    pub block_explorer_url: String,
    pub errors: FieldErrors,
}

impl FormBuffer {
    /// Buffer for `original`, or an all-empty buffer when adding a network.
    pub fn from_original(original: Option<&NetworkConfiguration>) -> Self {
        match original {
            Some(cfg) => Self {
                rpc_url: cfg.rpc_url.clone(),
                chain_id: chain_id::to_display(&cfg.chain_id),
                ticker: cfg.ticker.clone(),
                network_name: cfg.network_name.clone(),
                block_explorer_url: cfg.block_explorer().to_string(),
                errors: FieldErrors::default(),
            },
            None => Self::default(),
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::NetworkName => &self.network_name,
            Field::RpcUrl => &self.rpc_url,
            Field::ChainId => &self.chain_id,
            Field::Ticker => &self.ticker,
            Field::BlockExplorerUrl => &self.block_explorer_url,
        }
    }

    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::NetworkName => self.network_name = value,
            Field::RpcUrl => self.rpc_url = value,
            Field::ChainId => self.chain_id = value,
            Field::Ticker => self.ticker = value,
            Field::BlockExplorerUrl => self.block_explorer_url = value,
        }
    }

    /// Whether the buffer still matches `original` (empty defaults in add mode).
    ///
    /// A chain id only counts as unchanged when the original is `0x` hex;
    /// legacy values saved without format validation always read as changed so
    /// the user can overwrite them.
    pub fn is_unchanged(&self, original: Option<&NetworkConfiguration>) -> bool {
        let empty = NetworkConfiguration::default();
        let original = original.unwrap_or(&empty);

        let chain_id_unchanged = original.chain_id.to_lowercase().starts_with("0x")
            && self.chain_id == chain_id::to_display(&original.chain_id);

        self.rpc_url == original.rpc_url
            && chain_id_unchanged
            && self.ticker == original.ticker
            && self.network_name == original.network_name
            && self.block_explorer_url == original.block_explorer()
    }
}

/// True when any field the form shows differs between the two sources.
pub fn form_fields_differ(a: Option<&NetworkConfiguration>, b: Option<&NetworkConfiguration>) -> bool {
    let empty = NetworkConfiguration::default();
    let (a, b) = (a.unwrap_or(&empty), b.unwrap_or(&empty));
    a.rpc_url != b.rpc_url
        || a.chain_id != b.chain_id
        || a.ticker != b.ticker
        || a.network_name != b.network_name
        || a.block_explorer() != b.block_explorer()
}
