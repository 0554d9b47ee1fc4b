//! Gateway wire types.
//!
//! Request/response shapes for the remote tool-execution gateway. These
//! mirror the gateway's JSON API and are treated as given: the adapter
//! derives its own local types from them but never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::AuthorizationId;

/// The toolkit a tool belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitRef {
    pub name: String,
}

/// Declared value type of a single input parameter.
///
/// `val_type` is an open string on the wire; the closed set the adapter
/// understands lives in [`crate::schema::ValueType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSchema {
    pub val_type: String,
}

/// A single declared input parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputParameter {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub value_schema: ValueSchema,
}

/// Declared inputs of a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInputs {
    #[serde(default)]
    pub parameters: Vec<InputParameter>,
}

/// Authorization requirement declared by a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequirement {
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Tool requirements block. Presence of `authorization` means the tool
/// must not execute without completed user consent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolRequirements {
    #[serde(default)]
    pub authorization: Option<AuthorizationRequirement>,
}

/// Complete tool definition as published by the gateway catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub toolkit: ToolkitRef,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: ToolInputs,
    #[serde(default)]
    pub requirements: Option<ToolRequirements>,
}

impl ToolDefinition {
    /// Fully qualified tool name: `{toolkit}.{tool}`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.toolkit.name, self.name)
    }

    /// Whether the tool declares an authorization requirement.
    pub fn requires_authorization(&self) -> bool {
        self.requirements
            .as_ref()
            .map_or(false, |r| r.authorization.is_some())
    }
}

/// Status of an authorization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Pending,
    Completed,
    Failed,
}

/// Response to an authorize request or a status query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    #[serde(default)]
    pub authorization_id: Option<AuthorizationId>,
    pub status: AuthorizationStatus,

    /// Consent URL to surface to the user while status is pending.
    #[serde(default)]
    pub authorization_url: Option<String>,

    /// When a completed authorization expires, if the provider reports it.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Output of a tool execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolOutput {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response to an execute request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default)]
    pub output: Option<ToolOutput>,
}
