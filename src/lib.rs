//! # Abstract API MCP
//!
//! A Model Context Protocol (MCP) server exposing the Abstract API enrichment
//! services (validation, IP intelligence, time, currency, web) as tools.
//!
//! ## Architecture
//!
//! - [`client`]: Abstract API client with per-service keys and uniform errors
//! - [`models`]: Typed response records
//! - [`mcp`]: Tool registry and MCP server
//! - [`config`]: Configuration management
//! - [`utils`]: Shared HTTP client

pub mod client;
pub mod config;
pub mod mcp;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use client::{AbstractClient, ApiError, Credentials, ServiceKey};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
