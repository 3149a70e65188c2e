//! Kruize MCP server: HTTP surface and configuration for the mock HPO loop

pub mod api;
pub mod config;
