//! Toolkit registry — scoped catalog fetch, bulk wrapping, authorization helpers.
//!
//! Definitions are fetched once at construction and cached for the
//! process lifetime; wrapped tools are built from the cache on demand.

use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::gateway::{AuthorizationResponse, AuthorizationStatus, GatewayApi, ToolDefinition};
use crate::tools::wrapper::{BlockBehavior, WrappedTool};
use crate::types::{AuthorizationId, Error, Result, UserId};

// =============================================================================
// Scope
// =============================================================================

/// Which slice of the catalog a toolkit is built from.
///
/// Explicit tool ids and toolkit names may be combined; the default
/// (neither) selects the full catalog.
#[derive(Debug, Clone, Default)]
pub struct ToolScope {
    tools: Option<Vec<String>>,
    toolkits: Option<Vec<String>>,
}

impl ToolScope {
    /// Full catalog.
    pub fn all() -> Self {
        Self::default()
    }

    /// Explicit tool ids, fetched individually.
    pub fn tools(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tools: Some(ids.into_iter().map(Into::into).collect()),
            toolkits: None,
        }
    }

    /// Everything in the named toolkits.
    pub fn toolkits(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tools: None,
            toolkits: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Add explicit tool ids to an existing scope.
    pub fn with_tools(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tools = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    fn is_all(&self) -> bool {
        self.tools.is_none() && self.toolkits.is_none()
    }
}

// =============================================================================
// Toolkit
// =============================================================================

/// A cached, scoped set of gateway tool definitions.
pub struct Toolkit {
    client: Arc<dyn GatewayApi>,
    definitions: Vec<ToolDefinition>,
    behavior: BlockBehavior,
}

impl fmt::Debug for Toolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolkit")
            .field("definitions", &self.definitions.len())
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

impl Toolkit {
    /// Fetch and cache the scoped definitions.
    pub async fn connect(
        client: Arc<dyn GatewayApi>,
        scope: ToolScope,
        behavior: BlockBehavior,
    ) -> Result<Self> {
        let definitions = Self::fetch_definitions(client.as_ref(), &scope).await?;
        tracing::info!("toolkit_connected: tools={}", definitions.len());
        Ok(Self {
            client,
            definitions,
            behavior,
        })
    }

    async fn fetch_definitions(
        client: &dyn GatewayApi,
        scope: &ToolScope,
    ) -> Result<Vec<ToolDefinition>> {
        if scope.is_all() {
            return client.list_tools(None).await;
        }

        let mut definitions = Vec::new();
        if let Some(ids) = &scope.tools {
            let fetched = try_join_all(ids.iter().map(|id| client.get_tool(id))).await?;
            definitions.extend(fetched);
        }
        if let Some(toolkits) = &scope.toolkits {
            for toolkit in toolkits {
                definitions.extend(client.list_tools(Some(toolkit)).await?);
            }
        }
        Ok(definitions)
    }

    /// Cached definitions, in catalog order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Wrap every cached definition.
    ///
    /// A definition that fails to wrap is logged and skipped; one
    /// malformed catalog entry never aborts the batch.
    pub fn tools(&self) -> Vec<WrappedTool> {
        let mut wrapped = Vec::with_capacity(self.definitions.len());
        for definition in &self.definitions {
            match WrappedTool::new(self.client.clone(), definition.clone(), self.behavior) {
                Ok(tool) => wrapped.push(tool),
                Err(e) => {
                    tracing::warn!("tool_wrap_skipped: tool={}, error={}", definition.name, e);
                }
            }
        }
        wrapped
    }

    /// Wrap a single tool by name.
    pub fn tool(&self, tool_name: &str) -> Result<WrappedTool> {
        let definition = self.definition(tool_name)?.clone();
        WrappedTool::new(self.client.clone(), definition, self.behavior)
    }

    /// Whether the named tool declares an authorization requirement.
    pub fn requires_auth(&self, tool_name: &str) -> Result<bool> {
        Ok(self.definition(tool_name)?.requires_authorization())
    }

    /// Request authorization for (tool, user).
    pub async fn authorize(
        &self,
        tool_name: &str,
        user_id: &UserId,
    ) -> Result<AuthorizationResponse> {
        let definition = self.definition(tool_name)?;
        self.client
            .authorize(&definition.qualified_name(), user_id)
            .await
    }

    /// Whether a previously requested authorization has completed.
    pub async fn is_authorized(&self, authorization_id: &AuthorizationId) -> Result<bool> {
        let response = self.client.authorization_status(authorization_id).await?;
        Ok(response.status == AuthorizationStatus::Completed)
    }

    /// Poll until an authorization completes.
    ///
    /// Fixed-delay loop with no internal deadline; the caller bounds it
    /// by dropping the future (e.g. inside `tokio::select!` or
    /// `tokio::time::timeout`). A `failed` status ends the wait with an
    /// error instead of spinning forever.
    pub async fn wait_for_authorization(
        &self,
        authorization_id: &AuthorizationId,
        poll_interval: Duration,
    ) -> Result<()> {
        loop {
            let response = self.client.authorization_status(authorization_id).await?;
            match response.status {
                AuthorizationStatus::Completed => return Ok(()),
                AuthorizationStatus::Failed => {
                    return Err(Error::gateway(format!(
                        "authorization '{}' failed",
                        authorization_id
                    )));
                }
                AuthorizationStatus::Pending => tokio::time::sleep(poll_interval).await,
            }
        }
    }

    /// Render the cached catalog as a prompt section for LLM consumption.
    pub fn prompt(&self) -> String {
        let tools = self.tools();
        if tools.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(tools.len() + 1);
        lines.push("Available tools:".to_string());
        for tool in &tools {
            lines.push(tool.prompt_line());
        }
        lines.join("\n")
    }

    fn definition(&self, tool_name: &str) -> Result<&ToolDefinition> {
        self.definitions
            .iter()
            .find(|d| d.name == tool_name)
            .ok_or_else(|| {
                Error::tool_not_found(format!("tool '{}' is not in this toolkit", tool_name))
            })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{
        AuthorizationRequirement, ExecuteResponse, InputParameter, ToolInputs, ToolRequirements,
        ToolkitRef, ValueSchema,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Catalog-serving fake with a scripted sequence of status responses.
    struct FakeCatalog {
        definitions: Vec<ToolDefinition>,
        status_script: Mutex<VecDeque<AuthorizationStatus>>,
        authorize_calls: Mutex<Vec<String>>,
        list_calls: Mutex<Vec<Option<String>>>,
    }

    impl FakeCatalog {
        fn new(definitions: Vec<ToolDefinition>) -> Self {
            Self {
                definitions,
                status_script: Mutex::new(VecDeque::new()),
                authorize_calls: Mutex::new(Vec::new()),
                list_calls: Mutex::new(Vec::new()),
            }
        }

        fn script_statuses(&self, statuses: impl IntoIterator<Item = AuthorizationStatus>) {
            self.status_script.lock().unwrap().extend(statuses);
        }
    }

    #[async_trait]
    impl GatewayApi for FakeCatalog {
        async fn list_tools(&self, toolkit: Option<&str>) -> Result<Vec<ToolDefinition>> {
            self.list_calls
                .lock()
                .unwrap()
                .push(toolkit.map(str::to_string));
            Ok(self
                .definitions
                .iter()
                .filter(|d| toolkit.map_or(true, |tk| d.toolkit.name == tk))
                .cloned()
                .collect())
        }

        async fn get_tool(&self, tool_id: &str) -> Result<ToolDefinition> {
            self.definitions
                .iter()
                .find(|d| d.name == tool_id)
                .cloned()
                .ok_or_else(|| Error::tool_not_found(tool_id.to_string()))
        }

        async fn authorize(
            &self,
            tool_name: &str,
            _user_id: &UserId,
        ) -> Result<AuthorizationResponse> {
            self.authorize_calls.lock().unwrap().push(tool_name.to_string());
            Ok(AuthorizationResponse {
                authorization_id: Some(
                    AuthorizationId::from_string("auth-1".to_string()).unwrap(),
                ),
                status: AuthorizationStatus::Pending,
                authorization_url: Some("https://gw/consent/auth-1".to_string()),
                expires_at: None,
            })
        }

        async fn authorization_status(
            &self,
            _authorization_id: &AuthorizationId,
        ) -> Result<AuthorizationResponse> {
            let status = self
                .status_script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(AuthorizationStatus::Completed);
            Ok(AuthorizationResponse {
                authorization_id: None,
                status,
                authorization_url: None,
                expires_at: None,
            })
        }

        async fn execute(
            &self,
            _tool_name: &str,
            _inputs: &str,
            _user_id: Option<&UserId>,
        ) -> Result<ExecuteResponse> {
            Ok(ExecuteResponse {
                success: true,
                output: None,
            })
        }
    }

    fn definition(name: &str, toolkit: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            toolkit: ToolkitRef {
                name: toolkit.to_string(),
            },
            description: Some(format!("{} tool", name)),
            inputs: ToolInputs {
                parameters: vec![InputParameter {
                    name: "query".to_string(),
                    required: true,
                    description: None,
                    value_schema: ValueSchema {
                        val_type: "string".to_string(),
                    },
                }],
            },
            requirements: None,
        }
    }

    fn auth_definition(name: &str, toolkit: &str) -> ToolDefinition {
        let mut def = definition(name, toolkit);
        def.requirements = Some(ToolRequirements {
            authorization: Some(AuthorizationRequirement {
                provider_id: None,
                scopes: Vec::new(),
            }),
        });
        def
    }

    fn bad_definition(name: &str, toolkit: &str) -> ToolDefinition {
        let mut def = definition(name, toolkit);
        let duplicate = def.inputs.parameters[0].clone();
        def.inputs.parameters.push(duplicate);
        def
    }

    async fn toolkit_with(defs: Vec<ToolDefinition>) -> (Arc<FakeCatalog>, Toolkit) {
        let catalog = Arc::new(FakeCatalog::new(defs));
        let toolkit = Toolkit::connect(
            catalog.clone() as Arc<dyn GatewayApi>,
            ToolScope::all(),
            BlockBehavior::Report,
        )
        .await
        .unwrap();
        (catalog, toolkit)
    }

    #[tokio::test]
    async fn test_connect_all_caches_full_catalog() {
        let (_, toolkit) =
            toolkit_with(vec![definition("Search", "Google"), definition("Add", "Math")]).await;
        assert_eq!(toolkit.len(), 2);
    }

    #[tokio::test]
    async fn test_scope_by_toolkit_filters() {
        let catalog = Arc::new(FakeCatalog::new(vec![
            definition("Search", "Google"),
            definition("Add", "Math"),
        ]));
        let toolkit = Toolkit::connect(
            catalog.clone() as Arc<dyn GatewayApi>,
            ToolScope::toolkits(["Math"]),
            BlockBehavior::Report,
        )
        .await
        .unwrap();

        assert_eq!(toolkit.len(), 1);
        assert_eq!(toolkit.definitions()[0].name, "Add");
        assert_eq!(
            *catalog.list_calls.lock().unwrap(),
            vec![Some("Math".to_string())]
        );
    }

    #[tokio::test]
    async fn test_scope_by_explicit_tools_fetches_each() {
        let catalog = Arc::new(FakeCatalog::new(vec![
            definition("Search", "Google"),
            definition("Add", "Math"),
        ]));
        let toolkit = Toolkit::connect(
            catalog as Arc<dyn GatewayApi>,
            ToolScope::tools(["Search"]),
            BlockBehavior::Report,
        )
        .await
        .unwrap();

        assert_eq!(toolkit.len(), 1);
        assert_eq!(toolkit.definitions()[0].name, "Search");
    }

    #[tokio::test]
    async fn test_scope_unknown_tool_propagates_not_found() {
        let catalog = Arc::new(FakeCatalog::new(vec![]));
        let result = Toolkit::connect(
            catalog as Arc<dyn GatewayApi>,
            ToolScope::tools(["Nonexistent"]),
            BlockBehavior::Report,
        )
        .await;
        assert!(matches!(result, Err(Error::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_bulk_wrap_skips_bad_definition() {
        let (_, toolkit) = toolkit_with(vec![
            definition("Search", "Google"),
            bad_definition("Broken", "Google"),
            definition("Add", "Math"),
        ])
        .await;

        let tools = toolkit.tools();
        assert_eq!(tools.len(), 2);
        assert!(tools.iter().all(|t| t.name() != "Broken"));
    }

    #[tokio::test]
    async fn test_requires_auth_and_not_found() {
        let (_, toolkit) = toolkit_with(vec![
            auth_definition("Search", "Google"),
            definition("Add", "Math"),
        ])
        .await;

        assert!(toolkit.requires_auth("Search").unwrap());
        assert!(!toolkit.requires_auth("Add").unwrap());
        assert!(matches!(
            toolkit.requires_auth("Missing"),
            Err(Error::ToolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_authorize_uses_qualified_name() {
        let (catalog, toolkit) = toolkit_with(vec![auth_definition("Search", "Google")]).await;
        let user = UserId::from_string("u1".to_string()).unwrap();

        let response = toolkit.authorize("Search", &user).await.unwrap();

        assert_eq!(response.status, AuthorizationStatus::Pending);
        assert_eq!(
            *catalog.authorize_calls.lock().unwrap(),
            vec!["Google.Search".to_string()]
        );
    }

    #[tokio::test]
    async fn test_is_authorized_reports_completion() {
        let (catalog, toolkit) = toolkit_with(vec![auth_definition("Search", "Google")]).await;
        let id = AuthorizationId::from_string("auth-1".to_string()).unwrap();

        catalog.script_statuses([AuthorizationStatus::Pending]);
        assert!(!toolkit.is_authorized(&id).await.unwrap());
        assert!(toolkit.is_authorized(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_for_authorization_polls_until_completed() {
        let (catalog, toolkit) = toolkit_with(vec![auth_definition("Search", "Google")]).await;
        let id = AuthorizationId::from_string("auth-1".to_string()).unwrap();

        catalog.script_statuses([AuthorizationStatus::Pending, AuthorizationStatus::Pending]);
        toolkit
            .wait_for_authorization(&id, Duration::from_millis(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_authorization_failed_is_terminal() {
        let (catalog, toolkit) = toolkit_with(vec![auth_definition("Search", "Google")]).await;
        let id = AuthorizationId::from_string("auth-1".to_string()).unwrap();

        catalog.script_statuses([AuthorizationStatus::Failed]);
        let err = toolkit
            .wait_for_authorization(&id, Duration::from_millis(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
    }

    #[tokio::test]
    async fn test_prompt_renders_catalog() {
        let (_, toolkit) = toolkit_with(vec![definition("Search", "Google")]).await;
        let prompt = toolkit.prompt();
        assert!(prompt.starts_with("Available tools:"));
        assert!(prompt.contains("- Google.Search(query: string): Search tool"));
    }

    #[tokio::test]
    async fn test_prompt_empty_catalog() {
        let (_, toolkit) = toolkit_with(vec![]).await;
        assert!(toolkit.prompt().is_empty());
    }
}
