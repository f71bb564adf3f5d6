//! url_check tool implementation.
//!
//! Runs one URL through the filter chain. The URL is passed through as given;
//! keys are matched exactly, so callers normalise before asking.

use crate::error::ToolError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use urlfilter_core::{Error, Filter};

/// Input parameters for the url_check tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UrlCheckParams {
    /// The URL to check, e.g. "www.example.com/path".
    pub url: String,
}

/// Output structure for the url_check tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UrlCheckOutput {
    /// The URL that was checked.
    pub url: String,
    /// "flagged", "clear" or "inconclusive".
    pub verdict: String,
    /// First error seen along the chain, if any.
    pub error: Option<String>,
}

/// Implementation of the url_check tool.
pub async fn check_impl(chain: &dyn Filter, params: UrlCheckParams) -> Result<CallToolResult, McpError> {
    let output = check(chain, params).await?;

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| ToolError::Internal(format!("Failed to serialize result: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

async fn check(chain: &dyn Filter, params: UrlCheckParams) -> Result<UrlCheckOutput, ToolError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let mut lookup = chain.contains_url(&params.url).await;
    // Store failures are a verdict; anything else means the chain itself is broken.
    if let Some(e) = lookup.error.take_if(|e| !e.is_inconclusive()) {
        tracing::error!(url = %params.url, error = %e, "filter chain is broken");
        return Err(e.into());
    }

    if let Some(e) = &lookup.error {
        tracing::warn!(url = %params.url, verdict = %lookup.verdict, error = %e, "lookup reported an error");
    } else {
        tracing::debug!(url = %params.url, verdict = %lookup.verdict, "lookup complete");
    }

    Ok(UrlCheckOutput {
        url: params.url,
        verdict: lookup.verdict.to_string(),
        error: lookup.error.map(|e| e.to_string()),
    })
}
