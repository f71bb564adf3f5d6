//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::url_check::{UrlCheckParams, check_impl};

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use urlfilter_core::Filter;

/// The main MCP server handler for urlfilter.
///
/// Clones share one chain; lookups run concurrently against it.
#[derive(Clone)]
pub struct UrlFilterServer {
    chain: Arc<dyn Filter>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl UrlFilterServer {
    /// Create a new server handler around a built chain.
    pub fn new(chain: Arc<dyn Filter>) -> Self {
        Self { chain, tool_router: Self::tool_router() }
    }

    /// Check a URL against the filter chain.
    #[tool(
        description = "Check whether a URL is known to be malicious. Returns the verdict (flagged, clear or inconclusive) and any error seen while checking."
    )]
    async fn url_check(&self, params: Parameters<UrlCheckParams>) -> Result<CallToolResult, McpError> {
        check_impl(self.chain.as_ref(), params.0).await
    }
}

impl ServerHandler for UrlFilterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "urlfilter".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urlfilter_core::filter::FakeFilter;

    #[test]
    fn test_lists_url_check_tool() {
        let server = UrlFilterServer::new(Arc::new(FakeFilter::default()));
        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "url_check");
    }

    #[test]
    fn test_server_info() {
        let server = UrlFilterServer::new(Arc::new(FakeFilter::default()));
        assert_eq!(server.get_info().server_info.name, "urlfilter");
    }
}
