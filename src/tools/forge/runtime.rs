//! Wasmtime engine configuration for tool execution.

use std::time::Duration;

use wasmtime::{Config, Engine, OptLevel};

use crate::tools::forge::error::ForgeError;

/// How often the background ticker advances the engine epoch.
const EPOCH_TICK: Duration = Duration::from_millis(10);

/// Resource limits for a single tool call.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Fuel budget per call (CPU metering).
    pub fuel: u64,
    /// Wall-clock budget per call.
    pub timeout: Duration,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            fuel: 10_000_000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ResourceLimits {
    /// Small budgets for tests: runaway code traps fast.
    pub fn for_testing() -> Self {
        Self {
            fuel: 1_000_000,
            timeout: Duration::from_secs(2),
        }
    }
}

/// The wasmtime engine wrapper shared by materialization and invocation.
///
/// Fuel consumption is the primary CPU budget; epoch interruption is the
/// backup timeout mechanism, advanced by a background ticker thread that
/// exits once the engine is dropped.
pub struct ForgeRuntime {
    engine: Engine,
    limits: ResourceLimits,
}

impl ForgeRuntime {
    pub fn new(limits: ResourceLimits) -> Result<Self, ForgeError> {
        Self::with_opt_level(limits, OptLevel::Speed)
    }

    /// Fast-compiling engine with small budgets, for tests.
    pub fn for_testing() -> Self {
        // OptLevel::None compiles fastest; engine creation with a default
        // config cannot fail in practice, but the error path stays typed.
        Self::with_opt_level(ResourceLimits::for_testing(), OptLevel::None)
            .unwrap_or_else(|e| panic!("test engine construction failed: {e}"))
    }

    fn with_opt_level(limits: ResourceLimits, opt_level: OptLevel) -> Result<Self, ForgeError> {
        let mut config = Config::new();
        config.consume_fuel(true);
        config.epoch_interruption(true);
        config.wasm_threads(false);
        config.cranelift_opt_level(opt_level);
        config.debug_info(false);

        let engine =
            Engine::new(&config).map_err(|e| ForgeError::Engine(format!("{e:#}")))?;

        spawn_epoch_ticker(&engine)?;

        Ok(Self { engine, limits })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Epoch deadline applied to each call, in ticks beyond the current
    /// epoch. Slightly above the wall-clock budget so the wall-clock timeout
    /// fires first and the epoch trap only bounds abandoned calls.
    pub(crate) fn deadline_ticks(&self) -> u64 {
        self.limits.timeout.as_millis() as u64 / EPOCH_TICK.as_millis() as u64 + 2
    }
}

impl std::fmt::Debug for ForgeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeRuntime")
            .field("limits", &self.limits)
            .finish()
    }
}

/// Advance the engine epoch on a fixed cadence.
///
/// The thread holds only a weak engine handle and exits when the engine is
/// gone, so runtimes created in tests do not accumulate threads.
fn spawn_epoch_ticker(engine: &Engine) -> Result<(), ForgeError> {
    let weak = engine.weak();
    std::thread::Builder::new()
        .name("toolforge-epoch".to_string())
        .spawn(move || {
            while let Some(engine) = weak.upgrade() {
                engine.increment_epoch();
                drop(engine);
                std::thread::sleep(EPOCH_TICK);
            }
        })
        .map_err(|e| ForgeError::Engine(format!("failed to spawn epoch ticker: {e}")))?;
    Ok(())
}
