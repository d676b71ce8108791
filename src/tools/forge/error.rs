//! Registration-side error taxonomy.

/// Error while materializing or resolving one descriptor.
///
/// These are recovered per descriptor during registration: the offending
/// descriptor is dropped and the batch continues. Startup never fails
/// because of one bad source body.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// The source body failed to parse, validate, or instantiate.
    #[error("tool {name} failed to materialize: {reason}")]
    Materialization { name: String, reason: String },

    /// Materialization succeeded but the namespace holds no symbol with the
    /// declared name.
    #[error("no symbol named {name} in the execution namespace")]
    SymbolNotFound { name: String },

    /// The declared name resolved to something that is not a function.
    #[error("symbol {name} is not invocable")]
    NotInvocable { name: String },

    /// The function uses a value type that cannot be bound from JSON
    /// arguments (reference types, vectors).
    #[error("tool {name} has an unsupported {position} type: {ty}")]
    UnsupportedType {
        name: String,
        position: &'static str,
        ty: String,
    },

    /// The descriptor's explicit parameter list does not match the function.
    #[error("tool {name} declares {declared} parameters but its function takes {actual}")]
    SignatureMismatch {
        name: String,
        declared: usize,
        actual: usize,
    },

    /// Engine construction or configuration failure.
    #[error("engine error: {0}")]
    Engine(String),
}
