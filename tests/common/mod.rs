#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json, Router,
};
use network_form::{
    Collaborators, JsonRpcTransport, KeyTranslator, MemoryNetworkStore, NetworkConfiguration,
    NetworkStore, SessionHandle, SessionHost, TransportError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use network_form::logging::init_test_tracing;

// ---------------------------------------------------------------------------
// JSON-RPC endpoint stub
// ---------------------------------------------------------------------------

struct StubState {
    status: StatusCode,
    reply: Value,
    calls: AtomicUsize,
    last_method: Mutex<Option<String>>,
    last_auth: Mutex<Option<String>>,
}

/// In-process JSON-RPC endpoint answering every POST with a fixed body.
pub struct RpcStub {
    pub url: String,
    state: Arc<StubState>,
}

impl RpcStub {
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn last_method(&self) -> Option<String> {
        self.state.last_method.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.state.last_auth.lock().unwrap().clone()
    }
}

async fn handle_rpc(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_method.lock().unwrap() = body["method"].as_str().map(str::to_string);
    *state.last_auth.lock().unwrap() = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (state.status, Json(state.reply.clone()))
}

pub async fn spawn_rpc_stub_with(status: StatusCode, reply: Value) -> RpcStub {
    let state = Arc::new(StubState {
        status,
        reply,
        calls: AtomicUsize::new(0),
        last_method: Mutex::new(None),
        last_auth: Mutex::new(None),
    });
    let app = Router::new().fallback(handle_rpc).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    RpcStub {
        url: format!("http://{}", addr),
        state,
    }
}

/// Endpoint whose `eth_chainId` answers `chain_id`.
pub async fn spawn_chain_id_stub(chain_id: &str) -> RpcStub {
    spawn_rpc_stub_with(
        StatusCode::OK,
        json!({ "jsonrpc": "2.0", "id": 1, "result": chain_id }),
    )
    .await
}

// ---------------------------------------------------------------------------
// In-memory transports
// ---------------------------------------------------------------------------

/// Answers every call with the same chain id.
pub struct StaticChainId {
    pub chain_id: String,
    pub calls: AtomicUsize,
}

impl StaticChainId {
    pub fn new(chain_id: &str) -> Arc<Self> {
        Arc::new(Self {
            chain_id: chain_id.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonRpcTransport for StaticChainId {
    async fn call(&self, _endpoint: &str, _method: &str) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Value::String(self.chain_id.clone()))
    }
}

/// Never answers; used to end a session mid-submit.
pub struct HangingTransport;

#[async_trait]
impl JsonRpcTransport for HangingTransport {
    async fn call(&self, _endpoint: &str, _method: &str) -> Result<Value, TransportError> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// Store and host fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create(NetworkConfiguration),
    Rename(String, NetworkConfiguration),
    Remove(String),
}

/// Memory store that records every mutating call and can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryNetworkStore,
    pub calls: Mutex<Vec<StoreCall>>,
    pub fail: AtomicBool,
}

impl RecordingStore {
    pub fn with_networks(networks: Vec<NetworkConfiguration>) -> Self {
        Self {
            inner: MemoryNetworkStore::with_networks(networks),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkStore for RecordingStore {
    async fn list_networks(&self) -> Result<Vec<NetworkConfiguration>> {
        self.inner.list_networks().await
    }

    async fn create_or_select_network(&self, config: &NetworkConfiguration) -> Result<()> {
        self.record(StoreCall::Create(config.clone()))?;
        self.inner.create_or_select_network(config).await
    }

    async fn rename_network(&self, old_rpc_url: &str, config: &NetworkConfiguration) -> Result<()> {
        self.record(StoreCall::Rename(old_rpc_url.to_string(), config.clone()))?;
        self.inner.rename_network(old_rpc_url, config).await
    }

    async fn remove_network(&self, rpc_url: &str) -> Result<()> {
        self.record(StoreCall::Remove(rpc_url.to_string()))?;
        self.inner.remove_network(rpc_url).await
    }
}

/// Host that records `end_session` calls and answers delete prompts with
/// `confirm`. When `end_on_prompt` holds a handle, the prompt ends that
/// session before answering.
#[derive(Default)]
pub struct RecordingHost {
    pub confirm: AtomicBool,
    pub ended: Mutex<Vec<bool>>,
    pub prompts: Mutex<Vec<String>>,
    pub end_on_prompt: Mutex<Option<SessionHandle>>,
}

impl RecordingHost {
    pub fn confirming() -> Self {
        let host = Self::default();
        host.confirm.store(true, Ordering::SeqCst);
        host
    }

    pub fn ended(&self) -> Vec<bool> {
        self.ended.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionHost for RecordingHost {
    async fn request_delete_confirmation(&self, target_rpc_url: &str) -> bool {
        self.prompts.lock().unwrap().push(target_rpc_url.to_string());
        if let Some(handle) = self.end_on_prompt.lock().unwrap().as_ref() {
            handle.end();
        }
        self.confirm.load(Ordering::SeqCst)
    }

    fn end_session(&self, navigate_away: bool) {
        self.ended.lock().unwrap().push(navigate_away);
    }
}

pub fn collaborators(
    store: Arc<RecordingStore>,
    host: Arc<RecordingHost>,
    transport: Arc<dyn JsonRpcTransport>,
) -> Collaborators {
    Collaborators {
        store,
        host,
        translator: Arc::new(KeyTranslator),
        transport,
    }
}

pub fn polygon() -> NetworkConfiguration {
    NetworkConfiguration {
        rpc_url: "https://polygon.test".into(),
        chain_id: "0x89".into(),
        ticker: "MATIC".into(),
        network_name: "Polygon".into(),
        block_explorer_url: "https://polygonscan.test".into(),
        rpc_preferences: [(
            "blockExplorerUrl".to_string(),
            "https://polygonscan.test".to_string(),
        )]
        .into(),
    }
}
