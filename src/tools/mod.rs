//! Dynamic tool system.
//!
//! Tools arrive as declarative descriptors and leave as live capabilities:
//! - The descriptor store loads the ordered registry file.
//! - The forge materializes each source body into the shared execution
//!   namespace and resolves the declared symbol.
//! - The registry is the process-wide capability table read by the protocol
//!   front end.
//! - The orchestrator drives the whole pipeline, isolating failures per
//!   descriptor.

pub mod descriptor;
pub mod forge;

mod invoker;
mod orchestrator;
mod registry;
mod tool;

pub use descriptor::{DescriptorError, ToolDescriptor, load_descriptors};
pub use invoker::Invoker;
pub use orchestrator::{RegistrationReport, register_all};
pub use registry::ToolRegistry;
pub use tool::{InvokeError, RegisteredTool, ToolInfo, ToolParam, ToolSignature, WasmType};
