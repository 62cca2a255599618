//! Chain-id reconciliation against the live endpoint.
//!
//! Before a network is saved, its RPC endpoint is asked for `eth_chainId` and
//! the answer must equal the chain id the user entered. One call per submit,
//! no caching, no retry.

use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::chain_id::{self, Radix};
use crate::i18n::{MessageKey, Translator};
use crate::rpc::JsonRpcTransport;

pub const CHAIN_ID_METHOD: &str = "eth_chainId";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainIdError {
    #[error("failed to fetch the chain id from the endpoint")]
    EndpointUnreachable,
    /// `reported` is the raw endpoint value, `display` the form shown to the user.
    #[error("endpoint returned a different chain id: {display}")]
    ChainIdMismatch { reported: String, display: String },
    #[error("session ended before the endpoint answered")]
    SessionEnded,
}

impl ChainIdError {
    /// Translated message for the chain-id field; `None` when the session is
    /// gone and there is no field left to write.
    pub fn field_message(&self, translator: &dyn Translator) -> Option<String> {
        match self {
            ChainIdError::EndpointUnreachable => {
                Some(translator.message(MessageKey::FailedToFetchChainId))
            }
            ChainIdError::ChainIdMismatch { display, .. } => Some(
                translator.message_with(MessageKey::EndpointReturnedDifferentChainId, &[display.clone()]),
            ),
            ChainIdError::SessionEnded => None,
        }
    }
}

/// Endpoint id as shown in a mismatch message: decimal when the user typed
/// decimal, truncated when long.
fn mismatch_display(form_chain_id: &str, reported: &str) -> String {
    let shown = match (Radix::of(form_chain_id), Radix::of(reported)) {
        (Radix::Decimal, Radix::Hex) => chain_id::hex_to_decimal(reported).unwrap_or_else(|| {
            tracing::warn!(endpoint_chain_id = reported, "failed to convert endpoint chain id to decimal");
            reported.to_string()
        }),
        _ => reported.to_string(),
    };
    chain_id::truncate_for_display(&shown)
}

#[derive(Clone)]
pub struct ChainIdReconciler {
    transport: Arc<dyn JsonRpcTransport>,
}

impl ChainIdReconciler {
    pub fn new(transport: Arc<dyn JsonRpcTransport>) -> Self {
        Self { transport }
    }

    /// Compare `candidate_hex_chain_id` with what `rpc_url` reports.
    ///
    /// `form_chain_id` is the user's normalized input and only decides how a
    /// mismatching value is displayed. Cancelling `lifetime` drops the call.
    pub async fn reconcile(
        &self,
        form_chain_id: &str,
        candidate_hex_chain_id: &str,
        rpc_url: &str,
        lifetime: &CancellationToken,
    ) -> Result<(), ChainIdError> {
        let response = tokio::select! {
            biased;
            _ = lifetime.cancelled() => {
                tracing::debug!(rpc_url, "session ended during chain id lookup; dropping result");
                return Err(ChainIdError::SessionEnded);
            }
            response = self.transport.call(rpc_url, CHAIN_ID_METHOD) => response,
        };

        let endpoint_chain_id = match response {
            Ok(serde_json::Value::String(id)) => id,
            Ok(other) => {
                tracing::warn!(rpc_url, result = %other, "endpoint returned a non-string chain id");
                return Err(ChainIdError::EndpointUnreachable);
            }
            Err(e) => {
                tracing::warn!(rpc_url, error = %e, "failed to fetch the chain id from the endpoint");
                return Err(ChainIdError::EndpointUnreachable);
            }
        };

        if endpoint_chain_id != candidate_hex_chain_id {
            let display = mismatch_display(form_chain_id, &endpoint_chain_id);
            tracing::info!(
                rpc_url,
                expected = candidate_hex_chain_id,
                reported = %endpoint_chain_id,
                "endpoint chain id mismatch"
            );
            return Err(ChainIdError::ChainIdMismatch {
                reported: endpoint_chain_id,
                display,
            });
        }

        Ok(())
    }
}
