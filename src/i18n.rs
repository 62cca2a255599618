//! Translation seam
//!
//! The form never formats user-facing text itself. Every message goes through a
//! [`Translator`] keyed by a [`MessageKey`]; hosts plug in their own catalog.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Message keys the form emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    InvalidHexNumber,
    InvalidHexNumberLeadingZeros,
    InvalidNumber,
    InvalidNumberLeadingZeros,
    InvalidChainIdTooBig,
    InvalidRpc,
    InvalidBlockExplorerUrl,
    UrlErrorMsg,
    UrlExistsErrorMsg,
    FailedToFetchChainId,
    EndpointReturnedDifferentChainId,
    OnlyAddTrustedNetworks,
    NetworkSettingsChainIdDescription,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::InvalidHexNumber => "invalidHexNumber",
            MessageKey::InvalidHexNumberLeadingZeros => "invalidHexNumberLeadingZeros",
            MessageKey::InvalidNumber => "invalidNumber",
            MessageKey::InvalidNumberLeadingZeros => "invalidNumberLeadingZeros",
            MessageKey::InvalidChainIdTooBig => "invalidChainIdTooBig",
            MessageKey::InvalidRpc => "invalidRPC",
            MessageKey::InvalidBlockExplorerUrl => "invalidBlockExplorerURL",
            MessageKey::UrlErrorMsg => "urlErrorMsg",
            MessageKey::UrlExistsErrorMsg => "urlExistsErrorMsg",
            MessageKey::FailedToFetchChainId => "failedToFetchChainId",
            MessageKey::EndpointReturnedDifferentChainId => "endpointReturnedDifferentChainId",
            MessageKey::OnlyAddTrustedNetworks => "onlyAddTrustedNetworks",
            MessageKey::NetworkSettingsChainIdDescription => "networkSettingsChainIdDescription",
        }
    }
}

/// Opaque `translate(key, args)` service supplied by the host.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str, args: &[String]) -> String;

    fn message(&self, key: MessageKey) -> String {
        self.translate(key.as_str(), &[])
    }

    fn message_with(&self, key: MessageKey, args: &[String]) -> String {
        self.translate(key.as_str(), args)
    }
}

/// Echoes the key, with any arguments appended. Useful for hosts that
/// translate downstream and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str, args: &[String]) -> String {
        if args.is_empty() {
            key.to_string()
        } else {
            format!("{key}: {}", args.join(", "))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogEntry {
    message: String,
}

/// Locale catalog in the `{ "key": { "message": "... $1 ..." } }` layout.
///
/// Missing keys fall back to the key itself.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn from_json(source: &str) -> Result<Self> {
        let raw: HashMap<String, CatalogEntry> =
            serde_json::from_str(source).context("parsing message catalog")?;
        Ok(Self {
            entries: raw.into_iter().map(|(k, v)| (k, v.message)).collect(),
        })
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.as_ref().display()))?;
        Self::from_json(&s)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, args: &[String]) -> String {
        let Some(template) = self.entries.get(key) else {
            return key.to_string();
        };
        // Substitute from the highest index down so `$1` never eats `$10`.
        args.iter()
            .enumerate()
            .rev()
            .fold(template.clone(), |acc, (i, arg)| {
                acc.replace(&format!("${}", i + 1), arg)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "invalidNumber": { "message": "Invalid number. Enter a decimal or '0x'-prefixed hexadecimal number." },
        "endpointReturnedDifferentChainId": {
            "message": "The endpoint returned a different chain ID: $1",
            "description": "$1 is the return value of eth_chainId from an RPC endpoint"
        }
    }"#;

    #[test]
    fn test_key_translator_echoes() {
        let t = KeyTranslator;
        assert_eq!(t.message(MessageKey::InvalidRpc), "invalidRPC");
        assert_eq!(
            t.message_with(MessageKey::EndpointReturnedDifferentChainId, &["2".into()]),
            "endpointReturnedDifferentChainId: 2"
        );
    }

    #[test]
    fn test_catalog_substitutes_placeholders() {
        let catalog = MessageCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.message_with(MessageKey::EndpointReturnedDifferentChainId, &["137".into()]),
            "The endpoint returned a different chain ID: 137"
        );
        assert_eq!(catalog.message(MessageKey::UrlErrorMsg), "urlErrorMsg");
    }

    #[test]
    fn test_catalog_rejects_malformed_json() {
        assert!(MessageCatalog::from_json("{ not json").is_err());
    }
}
