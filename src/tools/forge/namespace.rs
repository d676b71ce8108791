//! The shared execution namespace.
//!
//! One store and one linker live for the whole registration session. Every
//! successfully materialized module publishes its exports under the
//! [`SYMBOL_MODULE`] namespace, so a later descriptor can import symbols
//! defined by an earlier one:
//!
//! ```text
//! (import "env" "helper" (func $helper (result i64)))
//! ```
//!
//! Shadowing is enabled: redefining an existing name overwrites it and the
//! later definition wins. Cross-descriptor visibility and last-write-wins
//! collisions are both part of the external contract — the registration
//! order of descriptors is observable and must be preserved.

use std::collections::HashMap;

use wasmtime::{Engine, Extern, Instance, Linker, Module, Store};

use crate::tools::forge::error::ForgeError;
use crate::tools::forge::reflect;

/// Module namespace under which published symbols are importable.
pub const SYMBOL_MODULE: &str = "env";

/// Fuel budget for module start functions during registration.
const REGISTRATION_FUEL: u64 = 1_000_000;

/// Epoch deadline for registration, in ticks (5s at the 10ms tick).
const REGISTRATION_DEADLINE_TICKS: u64 = 500;

/// The explicit shared symbol table all materializations execute against.
pub struct Namespace {
    store: Store<()>,
    linker: Linker<()>,
    /// Parameter names recorded from each published module's name section,
    /// keyed by export name, then by parameter position. Later publishes
    /// overwrite earlier ones, matching the linker's shadowing rule.
    param_names: HashMap<String, HashMap<u32, String>>,
}

impl Namespace {
    pub fn new(engine: &Engine) -> Self {
        let store = Store::new(engine, ());
        let mut linker = Linker::new(engine);
        linker.allow_shadowing(true);
        Self {
            store,
            linker,
            param_names: HashMap::new(),
        }
    }

    /// Instantiate a compiled module against the namespace and publish its
    /// exports. `binary` is the module's wire bytes, used for name-section
    /// reflection; `tool_name` labels errors.
    pub(crate) fn instantiate_and_publish(
        &mut self,
        tool_name: &str,
        module: &Module,
        binary: &[u8],
    ) -> Result<(), ForgeError> {
        self.store
            .set_fuel(REGISTRATION_FUEL)
            .map_err(|e| ForgeError::Engine(format!("{e:#}")))?;
        self.store.set_epoch_deadline(REGISTRATION_DEADLINE_TICKS);

        let instance = self
            .linker
            .instantiate(&mut self.store, module)
            .map_err(|e| ForgeError::Materialization {
                name: tool_name.to_string(),
                reason: format!("{e:#}"),
            })?;

        self.publish(tool_name, &instance, binary)
    }

    /// Define every export of an instance into the shared table.
    fn publish(
        &mut self,
        tool_name: &str,
        instance: &Instance,
        binary: &[u8],
    ) -> Result<(), ForgeError> {
        let names = reflect::export_param_names(binary).unwrap_or_else(|e| {
            tracing::debug!(tool = tool_name, error = %e, "No usable name section");
            HashMap::new()
        });

        let exports: Vec<(String, Extern)> = instance
            .exports(&mut self.store)
            .map(|export| {
                let name = export.name().to_string();
                (name, export.into_extern())
            })
            .collect();

        for (name, item) in exports {
            if let Some(params) = names.get(&name) {
                self.param_names.insert(name.clone(), params.clone());
            }
            self.linker
                .define(&self.store, SYMBOL_MODULE, &name, item)
                .map_err(|e| ForgeError::Materialization {
                    name: tool_name.to_string(),
                    reason: format!("{e:#}"),
                })?;
            tracing::debug!(tool = tool_name, symbol = %name, "Published symbol");
        }

        Ok(())
    }

    /// Look up a symbol by name in the shared table.
    pub(crate) fn lookup(&mut self, name: &str) -> Option<Extern> {
        self.linker.get(&mut self.store, SYMBOL_MODULE, name)
    }

    /// Recorded name-section name for a parameter position of an export.
    pub(crate) fn param_name(&self, export: &str, position: u32) -> Option<&str> {
        self.param_names
            .get(export)
            .and_then(|names| names.get(&position))
            .map(String::as_str)
    }

    pub(crate) fn store(&self) -> &Store<()> {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut Store<()> {
        &mut self.store
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("recorded_exports", &self.param_names.len())
            .finish()
    }
}
