//! toolforge - an MCP tool server that materializes declaratively described
//! tools into live, remotely invocable capabilities.
//!
//! The pipeline:
//! - A JSON registry file holds an ordered list of tool descriptors
//!   (name, description, source body).
//! - The forge compiles each source body (WebAssembly text or binary) into a
//!   shared execution namespace, where its exports become live symbols that
//!   later descriptors can build on.
//! - Resolved functions land in the process-wide capability table.
//! - A stdio JSON-RPC front end serves tool discovery and invocation to an
//!   external agent runtime.
//!
//! One malformed descriptor never takes the server down: registration
//! isolates failures per descriptor, and invocation failures are returned to
//! the caller as structured errors.

pub mod logging;
pub mod mcp;
pub mod settings;
pub mod tools;
