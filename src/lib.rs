//! Memgate - MCP stdio bridge to a hosted Mem0 memory service
//!
//! This crate exposes four memory tools (add, search, update, delete) to AI
//! assistants over the Model Context Protocol and translates tool calls into
//! requests against the Mem0 API:
//! - Static tool catalog with JSON-schema input declarations
//! - Stateless router that formats every outcome as flagged text
//! - `reqwest`-based adapter behind a [`MemoryStore`] trait
//!
//! # Usage
//!
//! As a library:
//! ```ignore
//! use memgate::{Config, Mem0Client, ToolRouter};
//! use std::sync::Arc;
//!
//! let config = Config::from_file("~/.memgate/config.toml").unwrap();
//! let client = Mem0Client::new(&config.mem0).unwrap();
//! let router = ToolRouter::new(Arc::new(client), config.mem0.default_user_id.clone());
//! // memgate::mcp::run_mcp_server(router).await
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! MEM0_API_KEY=m0-... memgate
//! ```

pub mod config;
pub mod error;
pub mod mcp;
pub mod mem0;

// Re-export main types for convenience
pub use config::Config;
pub use error::{MemgateError, Result};
pub use mcp::handlers::ToolRouter;
pub use mem0::{Mem0Client, MemoryStore};
