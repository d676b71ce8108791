//! Registration orchestration.
//!
//! Drives every descriptor through materialize -> resolve -> register, in
//! load order, isolating failures per descriptor. Order is not a detail:
//! the execution namespace is shared, so a later descriptor may depend on
//! symbols published by an earlier one, and a redefinition must land after
//! the definition it overwrites.

use crate::tools::descriptor::ToolDescriptor;
use crate::tools::forge::{Forge, ForgeError};
use crate::tools::registry::ToolRegistry;
use crate::tools::tool::RegisteredTool;

/// Outcome of one `register_all` run.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Names registered this run, in registration order.
    pub registered: Vec<String>,

    /// Descriptors that failed, with the error that stopped them.
    pub failed: Vec<(String, ForgeError)>,
}

impl RegistrationReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Register every descriptor, strictly in the given order.
///
/// A failed descriptor is skipped for this run with no retry; a later
/// `register_all` (hot reload) gets a fresh attempt. Re-running with the
/// same sequence is idempotent: upserts replace entries wholesale and
/// nothing is deleted.
pub async fn register_all(
    forge: &Forge,
    registry: &ToolRegistry,
    descriptors: &[ToolDescriptor],
) -> RegistrationReport {
    let mut report = RegistrationReport::default();

    for descriptor in descriptors {
        match register_one(forge, descriptor) {
            Ok(tool) => {
                tracing::info!(
                    name = %descriptor.name,
                    params = tool.signature.params.len(),
                    "Registered tool"
                );
                registry.upsert(tool).await;
                report.registered.push(descriptor.name.clone());
            }
            Err(error) => {
                tracing::warn!(
                    name = %descriptor.name,
                    error = %error,
                    "Skipping tool"
                );
                report.failed.push((descriptor.name.clone(), error));
            }
        }

        // Keep startup responsive to cancellation between descriptors.
        tokio::task::yield_now().await;
    }

    tracing::info!(
        count = report.registered.len(),
        tools = ?report.registered,
        "Tool registration complete"
    );

    report
}

fn register_one(forge: &Forge, descriptor: &ToolDescriptor) -> Result<RegisteredTool, ForgeError> {
    forge.materialize(&descriptor.name, &descriptor.script_content)?;
    let (handle, signature) = forge.resolve(descriptor)?;
    Ok(RegisteredTool::new(
        descriptor.name.clone(),
        descriptor.description.clone(),
        signature,
        handle,
    ))
}
