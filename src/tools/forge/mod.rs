//! The forge: turns descriptor source bodies into live wasm functions.
//!
//! A source body is WebAssembly text (or a raw binary module). Materializing
//! it compiles and instantiates it against one shared execution namespace,
//! where every export becomes a named symbol. Resolution then picks the
//! symbol matching the descriptor's declared name and extracts its calling
//! signature for advertisement to remote callers.
//!
//! The namespace is shared on purpose: a later descriptor can import symbols
//! published by an earlier one, and redefining a name overwrites it. Both
//! behaviors are part of the external contract (see the namespace module).

mod error;
mod materializer;
mod namespace;
mod reflect;
mod resolver;
mod runtime;

use std::sync::{Mutex, MutexGuard};

pub use error::ForgeError;
pub use namespace::{Namespace, SYMBOL_MODULE};
pub use runtime::{ForgeRuntime, ResourceLimits};

use wasmtime::Func;

use crate::tools::descriptor::ToolDescriptor;
use crate::tools::tool::ToolSignature;

/// Engine plus the shared execution namespace.
///
/// The namespace is written only during registration (single task, strict
/// descriptor order) and locked per call during invocation, because a wasm
/// call needs exclusive access to the underlying store.
pub struct Forge {
    runtime: ForgeRuntime,
    namespace: Mutex<Namespace>,
}

impl Forge {
    pub fn new(limits: ResourceLimits) -> Result<Self, ForgeError> {
        let runtime = ForgeRuntime::new(limits)?;
        let namespace = Namespace::new(runtime.engine());
        Ok(Self {
            runtime,
            namespace: Mutex::new(namespace),
        })
    }

    /// A forge with small budgets and fast compilation, for tests.
    pub fn for_testing() -> Self {
        let runtime = ForgeRuntime::for_testing();
        let namespace = Namespace::new(runtime.engine());
        Self {
            runtime,
            namespace: Mutex::new(namespace),
        }
    }

    /// Materialize a source body into the shared namespace.
    pub fn materialize(&self, name: &str, source: &str) -> Result<(), ForgeError> {
        let mut namespace = self.lock_namespace();
        materializer::materialize(&mut namespace, self.runtime.engine(), name, source)
    }

    /// Resolve a descriptor's declared name to a callable and its signature.
    pub fn resolve(&self, descriptor: &ToolDescriptor) -> Result<(Func, ToolSignature), ForgeError> {
        let mut namespace = self.lock_namespace();
        resolver::resolve(&mut namespace, descriptor)
    }

    pub fn limits(&self) -> &ResourceLimits {
        self.runtime.limits()
    }

    pub(crate) fn deadline_ticks(&self) -> u64 {
        self.runtime.deadline_ticks()
    }

    pub(crate) fn lock_namespace(&self) -> MutexGuard<'_, Namespace> {
        // A poisoned lock only means some call panicked mid-execution; the
        // namespace itself is still consistent, so recover the guard.
        self.namespace
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Forge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forge")
            .field("limits", self.runtime.limits())
            .finish()
    }
}
