//! Revit bridge — tool dispatch and response normalization.
//!
//! This crate turns the Revit automation HTTP API into MCP tools:
//!
//! - **RevitClient**: the HTTP transport (fetch, submit, submit-for-binary),
//!   with per-call timeouts.
//! - **normalize**: the pure function collapsing the backend's variable
//!   response shapes into one deterministic string.
//! - **Registry**: the immutable tool catalog, built once at startup by
//!   [`tools::build_registry`] and served through `mcp::ToolRouter`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bridge::{RevitClient, tools};
//!
//! # async fn example() -> bridge::Result<()> {
//! let client = Arc::new(RevitClient::new("http://localhost:48884/revit_mcp_api"));
//! let registry = tools::build_registry(client)?;
//! assert!(!registry.is_empty());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod normalize;
mod registry;
pub mod tools;

pub use client::{BinaryResponse, ClientError, DEFAULT_TIMEOUT, RevitClient};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use registry::{Handler, Registry};
