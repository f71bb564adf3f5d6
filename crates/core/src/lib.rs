//! Core types and shared functionality for urlfilter.
//!
//! This crate provides:
//! - The filter chain: stages, lookups and the chain builder
//! - Store connectors with SQLite and in-memory backends
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod filter;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use filter::{Filter, Lookup, Verdict, build_from_config};
pub use store::{Connector, Loader, MemoryStore, SqliteStore};
