//! Structured errors for the urlfilter server.
//!
//! Tool failures are reported to the client as JSON-RPC errors with the codes
//! below. An inconclusive lookup is not a tool failure: it is returned as a
//! verdict.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use urlfilter_core::Error;

/// Errors raised by the server's tools.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Rejected input or a fault in the filter chain itself.
    #[error(transparent)]
    Filter(#[from] Error),

    /// The server failed to render a result.
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match &err {
            ToolError::Filter(Error::InvalidInput(_)) => -32602,
            ToolError::Filter(_) => -32001,
            ToolError::Internal(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
