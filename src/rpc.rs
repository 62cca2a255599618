//! JSON-RPC transport used to ask an endpoint for its chain id.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::RpcSettings;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint url '{0}'")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("rpc error: {0}")]
    Rpc(Value),
}

/// Single JSON-RPC call without parameters.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    async fn call(&self, endpoint: &str, method: &str) -> Result<Value, TransportError>;
}

/// reqwest-backed transport. One attempt per call, no failover.
#[derive(Debug, Clone)]
pub struct HttpJsonRpc {
    http: Client,
}

impl HttpJsonRpc {
    pub fn new() -> Result<Self, TransportError> {
        Self::from_settings(&RpcSettings::default())
    }

    pub fn from_settings(settings: &RpcSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(ms) = settings.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(agent) = &settings.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

/// Split `user:pass@` credentials out of an endpoint URL so they travel in
/// an Authorization header instead of the request line.
fn split_credentials(endpoint: &str) -> Result<(Url, Option<(String, String)>), TransportError> {
    let mut url = Url::parse(endpoint).map_err(|_| TransportError::InvalidUrl(endpoint.to_string()))?;
    let username = url.username().to_string();
    let password = url.password().map(str::to_string);
    match password {
        Some(password) if !username.is_empty() && !password.is_empty() => {
            // Both setters only fail for cannot-be-a-base URLs, which carry no credentials.
            let _ = url.set_username("");
            let _ = url.set_password(None);
            Ok((url, Some((username, password))))
        }
        _ => Ok((url, None)),
    }
}

#[async_trait]
impl JsonRpcTransport for HttpJsonRpc {
    async fn call(&self, endpoint: &str, method: &str) -> Result<Value, TransportError> {
        let (url, credentials) = split_credentials(endpoint)?;

        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": [],
        });

        let mut req = self.http.post(url.clone()).json(&body);
        if let Some((user, pass)) = credentials {
            req = req.basic_auth(user, Some(pass));
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            tracing::warn!(
                url = %url,
                status = %resp.status(),
                method,
                "RPC endpoint returned error status"
            );
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        let json: Value = resp.json().await?;
        if let Some(err) = json.get("error") {
            if !err.is_null() {
                tracing::warn!(url = %url, error = %err, method, "RPC returned error response");
                return Err(TransportError::Rpc(err.clone()));
            }
        }

        Ok(json["result"].clone())
    }
}
