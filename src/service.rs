use anyhow::Result;
use reqwest::Client;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use std::sync::Arc;

use crate::background::BackgroundFetcher;
use crate::config::{build_client, Endpoints};
use crate::controller::ResolutionController;
use crate::location::LocationResolver;
use crate::models::GetWelcomeRequest;
use crate::render::render;

/// MCP front end for the welcome view
#[derive(Clone)]
pub struct WelcomeService {
    controller: ResolutionController,
    tool_router: ToolRouter<Self>,
}

impl WelcomeService {
    /// Creates a service wired to the production endpoints
    pub fn new() -> Result<Self> {
        let client = Arc::new(build_client()?);
        Ok(Self::with_endpoints(client, Endpoints::default()))
    }

    pub fn with_endpoints(client: Arc<Client>, endpoints: Endpoints) -> Self {
        let fetcher = BackgroundFetcher::new(Arc::clone(&client), endpoints.webhook_url.clone());
        let resolver = LocationResolver::new(client, endpoints);

        Self {
            controller: ResolutionController::new(resolver, fetcher),
            tool_router: Self::tool_router(),
        }
    }

    pub fn controller(&self) -> &ResolutionController {
        &self.controller
    }
}

#[tool_handler]
impl ServerHandler for WelcomeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "welcome-background".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Locates the visitor by IP address and shows a welcome view over a \
                background image chosen for that location. Use get_welcome_view to read \
                the view and restart_resolution to run the lookup again."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl WelcomeService {
    /// Renders the current welcome view
    #[tool(description = "Get the welcome view: a loading notice, an error message, or the resolved city/country with its background image URL. Set format to 'json' for structured output and wait to true to block until the lookup has finished.")]
    async fn get_welcome_view(
        &self,
        Parameters(request): Parameters<GetWelcomeRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Rendering welcome view (wait: {})", request.wait);

        let state = if request.wait {
            self.controller.wait_settled().await
        } else {
            self.controller.state()
        };

        let view = render(&state, request.format).map_err(|e| {
            McpError::internal_error(format!("Failed to render view: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(view)]))
    }

    /// Starts a fresh resolution cycle
    #[tool(description = "Discard the current result and run the location and background lookup again.")]
    async fn restart_resolution(&self) -> Result<CallToolResult, McpError> {
        if !self.controller.restart() {
            return Err(McpError::internal_error(
                "Resolver has been shut down",
                None,
            ));
        }

        Ok(CallToolResult::success(vec![Content::text(
            "Resolution restarted.",
        )]))
    }
}
