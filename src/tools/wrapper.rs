//! Wrapped tools — gateway definitions as authorization-gated callables.
//!
//! A [`WrappedTool`] owns immutable shared references (gateway client,
//! definition, derived schema) and nothing else; every invocation is a
//! sequential chain of at most two gateway round trips with per-call
//! local state only, so concurrent calls need no coordination.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::gateway::{AuthorizationStatus, GatewayApi, ToolDefinition};
use crate::schema::ArgumentSchema;
use crate::types::{Error, InvocationId, Result, UserId};

// =============================================================================
// Execution context
// =============================================================================

/// Per-call carrier of caller identity.
///
/// The user identity is injected only from here, never accepted as a
/// tool argument, so callers and models cannot spoof it.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    user_id: Option<UserId>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

// =============================================================================
// Short-circuit channel
// =============================================================================

/// Why an invocation was short-circuited before (or by) remote execution.
#[derive(Debug, Clone)]
pub enum BlockReason {
    /// Tool requires authorization and the context carries no user.
    MissingUserIdentity { tool_name: String },
    /// Authorization is not completed; the user must visit the URL.
    AuthorizationPending { url: Option<String> },
    /// Supplied arguments failed schema validation.
    InvalidArguments { message: String },
    /// The gateway reported an execution failure.
    RemoteFailure { message: String },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::MissingUserIdentity { tool_name } => {
                write!(f, "user_id is required to run {}", tool_name)
            }
            BlockReason::AuthorizationPending { url: Some(url) } => {
                write!(f, "please use the following link to authorize: {}", url)
            }
            BlockReason::AuthorizationPending { url: None } => {
                write!(f, "authorization is pending and no authorization url was provided")
            }
            BlockReason::InvalidArguments { message } => write!(f, "{}", message),
            BlockReason::RemoteFailure { message } => write!(f, "{}", message),
        }
    }
}

impl BlockReason {
    fn kind(&self) -> &'static str {
        match self {
            BlockReason::MissingUserIdentity { .. } => "missing_user_identity",
            BlockReason::AuthorizationPending { .. } => "authorization_pending",
            BlockReason::InvalidArguments { .. } => "invalid_arguments",
            BlockReason::RemoteFailure { .. } => "remote_failure",
        }
    }
}

/// How blocked invocations are reported. Chosen once at wrap time; every
/// short-circuit site routes through the same strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockBehavior {
    /// Return `{"error": message}` as the tool's output value, for plain
    /// agent loops that surface tool output to the model.
    #[default]
    Report,

    /// Raise [`Error::Interrupted`] carrying the message, for graph
    /// engines that pause the workflow until the condition clears.
    Interrupt,
}

impl BlockBehavior {
    pub(crate) fn short_circuit(self, reason: BlockReason) -> Result<Value> {
        let message = reason.to_string();
        match self {
            BlockBehavior::Report => Ok(serde_json::json!({ "error": message })),
            BlockBehavior::Interrupt => Err(Error::Interrupted(message)),
        }
    }
}

// =============================================================================
// Wrapped tool
// =============================================================================

/// A remote tool wrapped as a locally validated callable.
pub struct WrappedTool {
    client: Arc<dyn GatewayApi>,
    definition: ToolDefinition,
    schema: ArgumentSchema,
    qualified_name: String,
    requires_authorization: bool,
    behavior: BlockBehavior,
}

impl fmt::Debug for WrappedTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedTool")
            .field("qualified_name", &self.qualified_name)
            .field("requires_authorization", &self.requires_authorization)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl WrappedTool {
    /// Wrap a definition. Fails with a wrap error when schema derivation
    /// rejects the definition.
    pub fn new(
        client: Arc<dyn GatewayApi>,
        definition: ToolDefinition,
        behavior: BlockBehavior,
    ) -> Result<Self> {
        let schema = ArgumentSchema::from_definition(&definition)?;
        let qualified_name = definition.qualified_name();
        let requires_authorization = definition.requires_authorization();
        Ok(Self {
            client,
            definition,
            schema,
            qualified_name,
            requires_authorization,
            behavior,
        })
    }

    /// Bare tool name as listed in the catalog.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Qualified name used on the wire: `{toolkit}.{tool}`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn description(&self) -> &str {
        self.definition
            .description
            .as_deref()
            .unwrap_or("No description provided.")
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    pub fn requires_authorization(&self) -> bool {
        self.requires_authorization
    }

    pub fn behavior(&self) -> BlockBehavior {
        self.behavior
    }

    /// Render a prompt line for this tool.
    ///
    /// Format: `- Toolkit.Tool(param: type, opt?: type): description`
    pub fn prompt_line(&self) -> String {
        let params: Vec<String> = self
            .schema
            .fields()
            .iter()
            .map(|field| {
                let optional = if field.required { "" } else { "?" };
                format!("{}{}: {}", field.name, optional, field.value_type.display_name())
            })
            .collect();

        format!(
            "- {}({}): {}",
            self.qualified_name,
            params.join(", "),
            self.description()
        )
    }

    /// Execute the tool end-to-end: authorization gate, argument
    /// validation, remote execution.
    ///
    /// On success returns the gateway's output value unchanged. Blocked
    /// invocations are routed through the configured [`BlockBehavior`];
    /// transport and serialization failures are always hard errors.
    pub async fn call(&self, context: &ExecutionContext, args: Value) -> Result<Value> {
        let invocation = InvocationId::new();
        let user_id = context.user_id();

        if self.requires_authorization {
            let Some(user_id) = user_id else {
                return self.blocked(
                    &invocation,
                    BlockReason::MissingUserIdentity {
                        tool_name: self.qualified_name.clone(),
                    },
                );
            };

            let auth = self.client.authorize(&self.qualified_name, user_id).await?;
            if auth.status != AuthorizationStatus::Completed {
                return self.blocked(
                    &invocation,
                    BlockReason::AuthorizationPending {
                        url: auth.authorization_url,
                    },
                );
            }
        }

        let Some(arg_map) = args.as_object() else {
            return self.blocked(
                &invocation,
                BlockReason::InvalidArguments {
                    message: "invalid arguments provided\n- arguments must be a JSON object"
                        .to_string(),
                },
            );
        };
        if let Err(message) = self.schema.validate(arg_map) {
            return self.blocked(&invocation, BlockReason::InvalidArguments { message });
        }

        let inputs = serde_json::to_string(arg_map)?;
        let response = self
            .client
            .execute(&self.qualified_name, &inputs, user_id)
            .await?;

        if response.success {
            tracing::debug!(
                "tool_call_completed: tool={}, invocation={}",
                self.qualified_name,
                invocation
            );
            return Ok(response.output.and_then(|o| o.value).unwrap_or(Value::Null));
        }

        let message = response.output.and_then(|o| o.error).unwrap_or_else(|| {
            format!("{} failed without an error message", self.qualified_name)
        });
        self.blocked(&invocation, BlockReason::RemoteFailure { message })
    }

    fn blocked(&self, invocation: &InvocationId, reason: BlockReason) -> Result<Value> {
        tracing::debug!(
            "tool_call_blocked: tool={}, invocation={}, reason={}",
            self.qualified_name,
            invocation,
            reason.kind()
        );
        self.behavior.short_circuit(reason)
    }
}

// =============================================================================
// Tests
// =============================================================================
