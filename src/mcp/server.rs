//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! Serves the tool registry over stdio or streamable HTTP.

use crate::client::AbstractClient;
use crate::mcp::tools::{ToolError, ToolRegistry};
use async_trait::async_trait;
use pmcp::{
    server::streamable_http_server::StreamableHttpServer, Error, RequestHandlerExtra, Server,
    ServerCapabilities, ToolHandler, ToolInfo,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Name the server reports during MCP initialization
pub const SERVER_NAME: &str = "abstract-api-mcp";

/// The MCP server exposing Abstract API operations as tools
#[derive(Debug, Clone)]
pub struct McpServer {
    server: Arc<Mutex<Server>>,
    tool_count: usize,
}

impl McpServer {
    /// Create a new MCP server backed by the given client
    pub fn new(client: AbstractClient) -> Result<Self, pmcp::Error> {
        let tools = ToolRegistry::new(client);
        let tool_count = tools.all().len();
        let server = Self::build_server(tools)?;
        Ok(Self {
            server: Arc::new(Mutex::new(server)),
            tool_count,
        })
    }

    /// Number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tool_count
    }

    fn build_server(tools: ToolRegistry) -> Result<Server, pmcp::Error> {
        let mut builder = Server::builder()
            .name(SERVER_NAME)
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::default());

        for tool in tools.all() {
            let tool_handler = ToolWrapper {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                input_schema: tool.input_schema.clone(),
                handler: tool.handler.clone(),
            };
            builder = builder.tool(tool_handler.name.clone(), tool_handler);
        }

        builder.build()
    }

    /// Run the server in stdio mode
    pub async fn run(self) -> Result<(), pmcp::Error> {
        tracing::info!(tools = self.tool_count, "Starting MCP server in stdio mode");

        // run_stdio() takes ownership of the Server
        let server = Arc::try_unwrap(self.server)
            .map_err(|_| Error::internal("MCP server is shared and cannot be moved to stdio"))?
            .into_inner();

        server.run_stdio().await
    }

    /// Run the server over streamable HTTP
    pub async fn run_http(&self, addr: &str) -> Result<(SocketAddr, JoinHandle<()>), pmcp::Error> {
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::invalid_params(format!("Invalid address: {}", e)))?;

        tracing::info!(tools = self.tool_count, "Starting MCP server in HTTP mode on {}", socket_addr);

        let http_server = StreamableHttpServer::new(socket_addr, self.server.clone());
        http_server.start().await
    }
}

/// Adapts a registry tool to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: Arc<dyn crate::mcp::tools::ToolHandler>,
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.handler.execute(args).await.map_err(into_protocol_error)
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        ))
    }
}

/// Bad arguments become invalid-params; everything else is an internal error
/// whose message carries the upstream status.
fn into_protocol_error(err: ToolError) -> Error {
    if err.is_invalid_params() {
        Error::invalid_params(err.to_string())
    } else {
        Error::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, Credentials};
    use crate::config::HttpConfig;

    #[test]
    fn test_server_registers_every_tool() {
        let client = AbstractClient::new(Credentials::new(), &HttpConfig::default()).unwrap();
        let server = McpServer::new(client).unwrap();
        assert_eq!(server.tool_count(), 14);
    }

    #[test]
    fn test_error_mapping_keeps_upstream_status() {
        let err = into_protocol_error(ToolError::Api(ApiError::Upstream {
            status: 401,
            message: "Invalid API key".to_string(),
            details: None,
        }));
        let text = err.to_string();
        assert!(text.contains("401"), "{text}");
        assert!(text.contains("Invalid API key"), "{text}");
    }

    #[test]
    fn test_invalid_arguments_message() {
        let err = into_protocol_error(ToolError::InvalidArguments(
            "Missing 'email' parameter".to_string(),
        ));
        assert!(err.to_string().contains("Missing 'email' parameter"));
    }
}
