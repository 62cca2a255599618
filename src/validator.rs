//! Synchronous field validation.
//!
//! The `check_*` functions classify a raw value into an optional
//! [`MessageKey`]; [`Validator`] translates the result into the buffer's
//! error map, touching only the field it validated.

use std::collections::HashSet;
use std::sync::Arc;

use crate::chain_id::{self, Radix};
use crate::form::{Field, FieldErrors};
use crate::i18n::{MessageKey, Translator};
use crate::url_check::{is_valid_when_appended, is_web_uri};

pub fn check_chain_id(raw: &str) -> Option<MessageKey> {
    let chain_id = raw.trim();
    let radix = Radix::of(chain_id);

    match radix {
        Radix::Hex => {
            let digits = &chain_id[2..];
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Some(MessageKey::InvalidHexNumber);
            }
            if digits.starts_with('0') {
                return Some(MessageKey::InvalidHexNumberLeadingZeros);
            }
        }
        Radix::Decimal => {
            if chain_id.is_empty() || !chain_id.chars().all(|c| c.is_ascii_digit()) {
                return Some(MessageKey::InvalidNumber);
            }
            if chain_id.starts_with('0') && chain_id != "0" {
                return Some(MessageKey::InvalidNumberLeadingZeros);
            }
        }
    }

    match chain_id::parse(chain_id) {
        Some(value) if chain_id::is_safe_chain_id(value) => None,
        _ => Some(MessageKey::InvalidChainIdTooBig),
    }
}

/// Well-formedness shared by both URL fields. `invalid` is the field's own
/// "malformed" key; a likely missing scheme gets the hint instead.
fn check_web_url(url: &str, invalid: MessageKey) -> Option<MessageKey> {
    if url.is_empty() || is_web_uri(url) {
        None
    } else if is_valid_when_appended(url) {
        Some(MessageKey::UrlErrorMsg)
    } else {
        Some(invalid)
    }
}

pub fn check_rpc_url(url: &str, known_rpc_urls: &HashSet<String>) -> Option<MessageKey> {
    check_web_url(url, MessageKey::InvalidRpc).or_else(|| {
        known_rpc_urls
            .contains(url)
            .then_some(MessageKey::UrlExistsErrorMsg)
    })
}

pub fn check_block_explorer_url(url: &str) -> Option<MessageKey> {
    check_web_url(url, MessageKey::InvalidBlockExplorerUrl)
}

/// Writes translated validation results into a [`FieldErrors`] map.
#[derive(Clone)]
pub struct Validator {
    translator: Arc<dyn Translator>,
}

impl Validator {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    fn record(&self, errors: &mut FieldErrors, field: Field, result: Option<MessageKey>) {
        match result {
            Some(key) => {
                tracing::debug!(field = field.as_str(), error = key.as_str(), "field failed validation");
                errors.set(field, self.translator.message(key));
            }
            None => errors.clear_field(field),
        }
    }

    pub fn validate_chain_id_on_change(&self, raw: &str, errors: &mut FieldErrors) {
        self.record(errors, Field::ChainId, check_chain_id(raw));
    }

    pub fn validate_url_rpc_url(
        &self,
        url: &str,
        known_rpc_urls: &HashSet<String>,
        errors: &mut FieldErrors,
    ) {
        self.record(errors, Field::RpcUrl, check_rpc_url(url, known_rpc_urls));
    }

    pub fn validate_block_explorer_url(&self, url: &str, errors: &mut FieldErrors) {
        self.record(errors, Field::BlockExplorerUrl, check_block_explorer_url(url));
    }

    /// Run the validator registered for `field`, if any. Name and ticker are
    /// free text.
    pub fn validate_field(
        &self,
        field: Field,
        value: &str,
        known_rpc_urls: &HashSet<String>,
        errors: &mut FieldErrors,
    ) {
        match field {
            Field::ChainId => self.validate_chain_id_on_change(value, errors),
            Field::RpcUrl => self.validate_url_rpc_url(value, known_rpc_urls, errors),
            Field::BlockExplorerUrl => self.validate_block_explorer_url(value, errors),
            Field::NetworkName | Field::Ticker => {}
        }
    }
}
