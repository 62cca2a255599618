//! Network form session
//!
//! One [`NetworkFormSession`] per edit of a network. The host drives the
//! lifecycle explicitly: [`NetworkFormSession::start`], field edits,
//! `submit`/`cancel`/`delete`, [`NetworkFormSession::sync_original`] when the
//! edited network changes underneath the form, and finally
//! [`NetworkFormSession::end`].
//!
//! Submission runs `Idle -> Submitting -> Idle | Cleared`. The chain-id
//! lookup is the only suspension point and is tied to the session's
//! cancellation token, so a host that ends the session mid-submit through a
//! [`SessionHandle`] never sees a late result applied.

use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::chain_id;
use crate::form::{Field, FieldErrors, FormBuffer, NetworkConfiguration, BLOCK_EXPLORER_PREF};
use crate::i18n::{MessageKey, Translator};
use crate::reconcile::{ChainIdError, ChainIdReconciler};
use crate::rpc::JsonRpcTransport;
use crate::store::{NetworkStore, SessionHost};
use crate::validator::{check_chain_id, Validator};

#[derive(Debug, Error)]
pub enum FormError {
    /// The network store failed; the submit or delete did not happen.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn NetworkStore>,
    pub host: Arc<dyn SessionHost>,
    pub translator: Arc<dyn Translator>,
    pub transport: Arc<dyn JsonRpcTransport>,
}

/// How the hosting view opened the form.
#[derive(Debug, Clone, Default)]
pub struct FormContext {
    /// Adding a new network rather than editing one.
    pub add_mode: bool,
    /// Built-in networks are shown read-only.
    pub view_only: bool,
    /// The edited network is the active one and cannot be deleted.
    pub is_current_rpc_target: bool,
    pub is_full_screen: bool,
    pub known_rpc_urls: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    /// The host has been told to end the session.
    Cleared,
}

/// Why a submit was refused before anything ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlock {
    ViewOnly,
    NotIdle,
    FieldErrors,
    Unchanged,
    MissingRpcUrl,
    MissingChainId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the session stays open on the saved configuration.
    Saved(NetworkConfiguration),
    /// Saved from add mode; the host was told to end the session.
    Cleared(NetworkConfiguration),
    /// The endpoint check failed; the message is on the chain-id field.
    Rejected(ChainIdError),
    Blocked(SubmitBlock),
    /// The session ended while the endpoint was being asked.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The host was told to end the session.
    Ended,
    /// Edits were discarded; the session stays open.
    Reset,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotDeletable,
    Declined,
    Removed,
    /// The session ended while the host was asking for confirmation.
    Abandoned,
}

/// Which controls the view should offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControls {
    pub show_trusted_warning: bool,
    pub deletable: bool,
    pub cancel_enabled: bool,
    pub submit_enabled: bool,
    pub chain_id_tooltip: Option<String>,
}

/// Lets a host end a session from outside while a submit holds it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    lifetime: CancellationToken,
}

impl SessionHandle {
    pub fn end(&self) {
        self.lifetime.cancel();
    }

    pub fn is_ended(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

pub struct NetworkFormSession {
    original: Option<NetworkConfiguration>,
    context: FormContext,
    buffer: FormBuffer,
    state: SubmitState,
    validator: Validator,
    reconciler: ChainIdReconciler,
    store: Arc<dyn NetworkStore>,
    host: Arc<dyn SessionHost>,
    translator: Arc<dyn Translator>,
    lifetime: CancellationToken,
}

impl NetworkFormSession {
    /// Open a session on `original`, or on an empty form when `None`.
    pub fn start(
        original: Option<NetworkConfiguration>,
        context: FormContext,
        deps: Collaborators,
    ) -> Self {
        let buffer = FormBuffer::from_original(original.as_ref());
        tracing::debug!(
            rpc_url = original.as_ref().map(|o| o.rpc_url.as_str()).unwrap_or(""),
            add_mode = context.add_mode,
            "network form session started"
        );
        Self {
            original,
            context,
            buffer,
            state: SubmitState::Idle,
            validator: Validator::new(deps.translator.clone()),
            reconciler: ChainIdReconciler::new(deps.transport),
            store: deps.store,
            host: deps.host,
            translator: deps.translator,
            lifetime: CancellationToken::new(),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            lifetime: self.lifetime.clone(),
        }
    }

    pub fn buffer(&self) -> &FormBuffer {
        &self.buffer
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.buffer.errors
    }

    pub fn original(&self) -> Option<&NetworkConfiguration> {
        self.original.as_ref()
    }

    pub fn context(&self) -> &FormContext {
        &self.context
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub fn is_unchanged(&self) -> bool {
        self.buffer.is_unchanged(self.original.as_ref())
    }

    fn is_live(&self) -> bool {
        self.state != SubmitState::Cleared && !self.lifetime.is_cancelled()
    }

    /// Store a field edit and run its validator. Ignored when read-only or
    /// once the session is over.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.context.view_only || !self.is_live() {
            return false;
        }
        let value = value.into();
        self.validator
            .validate_field(field, &value, &self.context.known_rpc_urls, &mut self.buffer.errors);
        self.buffer.set_value(field, value);
        true
    }

    pub fn set_known_rpc_urls(&mut self, known_rpc_urls: HashSet<String>) {
        self.context.known_rpc_urls = known_rpc_urls;
    }

    /// Discard edits and errors, re-deriving the buffer from the original.
    pub fn reset(&mut self) {
        self.buffer = FormBuffer::from_original(self.original.as_ref());
        if self.state == SubmitState::Submitting {
            self.state = SubmitState::Idle;
        }
    }

    /// The edited network changed outside the form. The buffer is reset only
    /// when a field the form shows actually differs. Selecting an existing
    /// network leaves add mode.
    pub fn sync_original(&mut self, original: Option<NetworkConfiguration>) {
        if !self.is_live() {
            return;
        }
        if original.is_some() {
            self.context.add_mode = false;
        }
        let changed = crate::form::form_fields_differ(self.original.as_ref(), original.as_ref());
        self.original = original;
        if changed {
            tracing::debug!("edited network changed externally; resetting form");
            self.reset();
        }
    }

    /// Switch to adding a new network with an empty buffer. No-op when
    /// already in add mode.
    pub fn enter_add_mode(&mut self) {
        if self.context.add_mode || !self.is_live() {
            return;
        }
        self.context.add_mode = true;
        self.original = None;
        self.buffer = FormBuffer::default();
        self.state = SubmitState::Idle;
    }

    fn is_deletable(&self) -> bool {
        !self.context.add_mode && !self.context.is_current_rpc_target && !self.context.view_only
    }

    /// First reason a submit would be refused right now.
    pub fn submit_block(&self) -> Option<SubmitBlock> {
        if self.context.view_only {
            Some(SubmitBlock::ViewOnly)
        } else if self.state != SubmitState::Idle || self.lifetime.is_cancelled() {
            Some(SubmitBlock::NotIdle)
        } else if !self.buffer.errors.is_empty() {
            Some(SubmitBlock::FieldErrors)
        } else if self.is_unchanged() {
            Some(SubmitBlock::Unchanged)
        } else if self.buffer.rpc_url.is_empty() {
            Some(SubmitBlock::MissingRpcUrl)
        } else if self.buffer.chain_id.is_empty() {
            Some(SubmitBlock::MissingChainId)
        } else {
            None
        }
    }

    pub fn controls(&self) -> FormControls {
        let editable = !self.context.view_only;
        FormControls {
            show_trusted_warning: editable,
            deletable: self.is_deletable(),
            cancel_enabled: editable && !self.is_unchanged(),
            submit_enabled: self.submit_block().is_none(),
            chain_id_tooltip: editable
                .then(|| self.translator.message(MessageKey::NetworkSettingsChainIdDescription)),
        }
    }

    pub fn field_label(&self, field: Field) -> String {
        self.translator.translate(field.label_key(), &[])
    }

    /// Full configuration for `chain_id`, merging the block explorer into the
    /// original's preferences.
    fn submitted_configuration(&self, chain_id: String) -> NetworkConfiguration {
        let mut rpc_preferences = self
            .original
            .as_ref()
            .map(|o| o.rpc_preferences.clone())
            .unwrap_or_default();
        if !self.buffer.block_explorer_url.is_empty() {
            rpc_preferences.insert(
                BLOCK_EXPLORER_PREF.to_string(),
                self.buffer.block_explorer_url.clone(),
            );
        }
        let block_explorer_url = rpc_preferences
            .get(BLOCK_EXPLORER_PREF)
            .cloned()
            .unwrap_or_default();

        NetworkConfiguration {
            rpc_url: self.buffer.rpc_url.clone(),
            chain_id,
            ticker: self.buffer.ticker.clone(),
            network_name: self.buffer.network_name.clone(),
            block_explorer_url,
            rpc_preferences,
        }
    }

    /// Rename when the session's original RPC URL changed, otherwise create
    /// (or re-select) the network.
    async fn persist(&self, config: &NetworkConfiguration) -> anyhow::Result<Option<String>> {
        let previous = self
            .original
            .as_ref()
            .map(|o| o.rpc_url.as_str())
            .filter(|url| !url.is_empty());

        match previous {
            Some(old) if old != config.rpc_url => {
                self.store
                    .rename_network(old, config)
                    .await
                    .with_context(|| format!("renaming network {} to {}", old, config.rpc_url))?;
                Ok(Some(old.to_string()))
            }
            _ => {
                self.store
                    .create_or_select_network(config)
                    .await
                    .with_context(|| format!("saving network {}", config.rpc_url))?;
                Ok(None)
            }
        }
    }

    /// Validate, reconcile the chain id with the endpoint, then save.
    ///
    /// Endpoint problems come back as `Ok(SubmitOutcome::Rejected)` with the
    /// chain-id field error set. A store failure is returned as `Err` after
    /// the session has left `Submitting`.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        if let Some(block) = self.submit_block() {
            return Ok(SubmitOutcome::Blocked(block));
        }
        self.state = SubmitState::Submitting;

        // Untouched legacy ids never went through the on-change validator.
        let form_chain_id = self.buffer.chain_id.trim().to_lowercase();
        let canonical = check_chain_id(&form_chain_id).map_or_else(
            || chain_id::canonicalize(&form_chain_id).ok_or(MessageKey::InvalidNumber),
            Err,
        );
        let chain_id = match canonical {
            Ok(id) => id,
            Err(key) => {
                self.buffer.errors.set(Field::ChainId, self.translator.message(key));
                self.state = SubmitState::Idle;
                return Ok(SubmitOutcome::Blocked(SubmitBlock::FieldErrors));
            }
        };

        let lifetime = self.lifetime.clone();
        let reconciled = self
            .reconciler
            .reconcile(&form_chain_id, &chain_id, &self.buffer.rpc_url, &lifetime)
            .await;

        match reconciled {
            Ok(()) => {}
            Err(ChainIdError::SessionEnded) => {
                // The host still gets its notification from `end`.
                self.state = SubmitState::Idle;
                return Ok(SubmitOutcome::Abandoned);
            }
            Err(err) => {
                if let Some(message) = err.field_message(self.translator.as_ref()) {
                    self.buffer.errors.set(Field::ChainId, message);
                }
                self.state = SubmitState::Idle;
                return Ok(SubmitOutcome::Rejected(err));
            }
        }

        let config = self.submitted_configuration(chain_id);
        let persisted = self.persist(&config).await;
        self.state = SubmitState::Idle;
        let renamed_from = persisted?;

        if let Some(old) = renamed_from {
            self.context.known_rpc_urls.remove(&old);
        }
        self.context.known_rpc_urls.insert(config.rpc_url.clone());
        tracing::info!(
            rpc_url = %config.rpc_url,
            chain_id = %config.chain_id,
            "network saved"
        );

        if self.context.add_mode {
            self.state = SubmitState::Cleared;
            self.host.end_session(true);
            Ok(SubmitOutcome::Cleared(config))
        } else {
            self.original = Some(config.clone());
            self.reset();
            Ok(SubmitOutcome::Saved(config))
        }
    }

    /// Leave the form (add mode, or when not full-screen) or discard edits.
    pub fn cancel(&mut self) -> CancelOutcome {
        if self.state != SubmitState::Idle || self.lifetime.is_cancelled() {
            return CancelOutcome::Ignored;
        }
        if self.context.add_mode || !self.context.is_full_screen {
            self.state = SubmitState::Cleared;
            self.host.end_session(true);
            CancelOutcome::Ended
        } else {
            self.reset();
            CancelOutcome::Reset
        }
    }

    /// Delete the edited network after the host confirms.
    pub async fn delete(&mut self) -> Result<DeleteOutcome, FormError> {
        if self.state != SubmitState::Idle || self.lifetime.is_cancelled() || !self.is_deletable() {
            return Ok(DeleteOutcome::NotDeletable);
        }
        let Some(target) = self
            .original
            .as_ref()
            .map(|o| o.rpc_url.clone())
            .filter(|url| !url.is_empty())
        else {
            return Ok(DeleteOutcome::NotDeletable);
        };

        if !self.host.request_delete_confirmation(&target).await {
            return Ok(DeleteOutcome::Declined);
        }
        if self.lifetime.is_cancelled() {
            return Ok(DeleteOutcome::Abandoned);
        }

        self.reset();
        self.store
            .remove_network(&target)
            .await
            .with_context(|| format!("removing network {}", target))?;
        self.context.known_rpc_urls.remove(&target);
        tracing::info!(rpc_url = %target, "network removed");

        self.state = SubmitState::Cleared;
        self.host.end_session(true);
        Ok(DeleteOutcome::Removed)
    }

    /// Tear the session down: cancel any in-flight lookup, drop the buffer and
    /// tell the host, unless the host was already told. Idempotent.
    pub fn end(&mut self) {
        self.lifetime.cancel();
        self.buffer = FormBuffer::default();
        if self.state != SubmitState::Cleared {
            self.state = SubmitState::Cleared;
            self.host.end_session(false);
        }
    }
}
