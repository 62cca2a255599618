//! Validation and submission controller for custom blockchain networks.
//!
//! A [`NetworkFormSession`] owns the edit buffer for one network (RPC URL,
//! chain id, ticker, name, block explorer), validates fields as they change,
//! confirms the chain id against the endpoint's `eth_chainId` on submit, and
//! only then hands the configuration to a [`NetworkStore`].

// ---- Clippy/lints: keep signals high, noise low ----
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod chain_id;
pub mod config;
pub mod form;
pub mod i18n;
pub mod logging;
pub mod reconcile;
pub mod rpc;
pub mod session;
pub mod store;
pub mod url_check;
pub mod validator;

pub use config::{FormConfig, RpcSettings};
pub use form::{Field, FieldErrors, FormBuffer, NetworkConfiguration};
pub use i18n::{KeyTranslator, MessageCatalog, MessageKey, Translator};
pub use reconcile::{ChainIdError, ChainIdReconciler};
pub use rpc::{HttpJsonRpc, JsonRpcTransport, TransportError};
pub use session::{
    CancelOutcome, Collaborators, DeleteOutcome, FormContext, FormControls, FormError,
    NetworkFormSession, SessionHandle, SubmitBlock, SubmitOutcome, SubmitState,
};
pub use store::{known_rpc_urls_from, MemoryNetworkStore, NetworkStore, SessionHost};
pub use validator::Validator;
