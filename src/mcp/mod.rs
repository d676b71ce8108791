//! MCP protocol front end.
//!
//! Exposes the capability table over newline-delimited JSON-RPC on stdio:
//! `tools/list` for discovery, `tools/call` for invocation, plus a
//! `tools/reload` extension that re-runs registration with upsert semantics.

pub mod protocol;
mod server;

pub use server::McpServer;
