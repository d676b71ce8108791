//! Code materialization: source body to live symbols.
//!
//! Source bodies are generated text and often arrive wrapped in markdown
//! code fences; normalization strips them tolerantly (their absence is not
//! an error). The normalized text is compiled as a WebAssembly module (text
//! or binary) and instantiated against the shared namespace, which publishes
//! its exports for resolution and for import by later descriptors.

use wasmtime::{Engine, Module};

use crate::tools::forge::error::ForgeError;
use crate::tools::forge::namespace::Namespace;

/// Fence openers stripped from generated source bodies, most specific first.
const FENCE_OPENERS: [&str; 3] = ["```wat", "```wasm", "```"];

/// Closing fence marker.
const FENCE: &str = "```";

/// Materialize one source body into the namespace.
///
/// Any failure (parse, validation, instantiation) abandons this descriptor
/// only; symbols published by earlier materializations are untouched. A
/// module that traps in its start function may already have had side
/// effects on its own state, but its exports are never published.
pub(crate) fn materialize(
    namespace: &mut Namespace,
    engine: &Engine,
    name: &str,
    source: &str,
) -> Result<(), ForgeError> {
    let normalized = normalize(source);

    let binary = wat::parse_bytes(normalized.as_bytes()).map_err(|e| {
        ForgeError::Materialization {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;

    let module =
        Module::from_binary(engine, &binary).map_err(|e| ForgeError::Materialization {
            name: name.to_string(),
            reason: format!("{e:#}"),
        })?;

    namespace.instantiate_and_publish(name, &module, &binary)
}

/// Strip an optional leading fence opener and trailing fence.
pub(crate) fn normalize(source: &str) -> &str {
    let mut text = source.trim();
    for opener in FENCE_OPENERS {
        if let Some(rest) = text.strip_prefix(opener) {
            text = rest;
            break;
        }
    }
    text.strip_suffix(FENCE).unwrap_or(text).trim()
}
