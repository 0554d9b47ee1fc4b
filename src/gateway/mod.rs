//! Gateway client — HTTP access to the remote tool-execution service.
//!
//! [`GatewayApi`] is the seam the rest of the adapter programs against;
//! [`GatewayClient`] is the reqwest implementation. Tests swap in an
//! in-memory fake behind the same trait.

pub mod protocol;

pub use protocol::{
    AuthorizationRequirement, AuthorizationResponse, AuthorizationStatus, ExecuteResponse,
    InputParameter, ToolDefinition, ToolInputs, ToolOutput, ToolRequirements, ToolkitRef,
    ValueSchema,
};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::types::{AuthorizationId, Error, GatewayConfig, Result, UserId};

/// Gateway operations consumed by the adapter.
///
/// One implementation per transport; the adapter holds it as
/// `Arc<dyn GatewayApi>` so wrapped tools share a single connection pool.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// List tool definitions, optionally filtered by toolkit name.
    async fn list_tools(&self, toolkit: Option<&str>) -> Result<Vec<ToolDefinition>>;

    /// Fetch a single tool definition by id.
    async fn get_tool(&self, tool_id: &str) -> Result<ToolDefinition>;

    /// Request authorization for (tool, user).
    async fn authorize(&self, tool_name: &str, user_id: &UserId) -> Result<AuthorizationResponse>;

    /// Query the status of a previously requested authorization. Idempotent.
    async fn authorization_status(
        &self,
        authorization_id: &AuthorizationId,
    ) -> Result<AuthorizationResponse>;

    /// Execute a tool by qualified name with serialized inputs.
    async fn execute(
        &self,
        tool_name: &str,
        inputs: &str,
        user_id: Option<&UserId>,
    ) -> Result<ExecuteResponse>;
}

/// HTTP gateway client.
///
/// The underlying `reqwest::Client` pools connections and is cheap to
/// clone; bearer auth and the request timeout are installed once at
/// construction.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| Error::config(format!("invalid api key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a gateway response, surfacing non-2xx statuses as errors
    /// with a body snippet for diagnosis.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(Error::gateway(format!("{}: {}", status, snippet)));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn list_tools(&self, toolkit: Option<&str>) -> Result<Vec<ToolDefinition>> {
        let mut request = self.http.get(self.url("/v1/tools/list"));
        if let Some(toolkit) = toolkit {
            request = request.query(&[("toolkit", toolkit)]);
        }
        Self::decode(request.send().await?).await
    }

    async fn get_tool(&self, tool_id: &str) -> Result<ToolDefinition> {
        let request = self
            .http
            .get(self.url("/v1/tools/definition"))
            .query(&[("tool_id", tool_id)]);
        Self::decode(request.send().await?).await
    }

    async fn authorize(&self, tool_name: &str, user_id: &UserId) -> Result<AuthorizationResponse> {
        let body = serde_json::json!({
            "tool_name": tool_name,
            "user_id": user_id,
        });
        let request = self.http.post(self.url("/v1/tools/authorize")).json(&body);
        Self::decode(request.send().await?).await
    }

    async fn authorization_status(
        &self,
        authorization_id: &AuthorizationId,
    ) -> Result<AuthorizationResponse> {
        let request = self
            .http
            .get(self.url("/v1/auth/status"))
            .query(&[("authorization_id", authorization_id.as_str())]);
        Self::decode(request.send().await?).await
    }

    async fn execute(
        &self,
        tool_name: &str,
        inputs: &str,
        user_id: Option<&UserId>,
    ) -> Result<ExecuteResponse> {
        let body = serde_json::json!({
            "tool_name": tool_name,
            "inputs": inputs,
            "user_id": user_id.map(UserId::as_str),
        });
        let request = self.http.post(self.url("/v1/tools/execute")).json(&body);
        Self::decode(request.send().await?).await
    }
}
