//! MCP tool implementations.
//!
//! This module contains all tools exposed by the urlfilter server.

pub mod url_check;
