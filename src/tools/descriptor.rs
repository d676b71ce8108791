//! Tool descriptor store.
//!
//! The registry file is an ordered JSON array of descriptors. Order matters:
//! descriptors are materialized strictly in file order, and because the
//! execution namespace is shared, a later tool may use symbols defined by an
//! earlier one.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Declarative description of one tool to be registered.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name. The source body must define a symbol with this name.
    pub name: String,

    /// Free-text description shown to remote callers.
    #[serde(default)]
    pub description: String,

    /// Source text defining the tool: a WebAssembly text module, optionally
    /// wrapped in markdown code fences left over from generation.
    pub script_content: String,

    /// Optional explicit parameter declarations. When present these override
    /// the names reflected from the compiled module; the parameter count must
    /// still match the function.
    #[serde(default)]
    pub params: Option<Vec<DeclaredParam>>,
}

/// Explicitly declared parameter of a tool.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclaredParam {
    pub name: String,

    /// Optional parameters may be omitted by callers and default to zero.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Error loading the registry file.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("registry file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed registry file {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load the ordered descriptor sequence from a registry file.
///
/// Duplicate names are allowed and preserved: registration applies them in
/// order and the later one wins, matching the namespace contract.
pub async fn load_descriptors(path: &Path) -> Result<Vec<ToolDescriptor>, DescriptorError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DescriptorError::NotFound(path.to_path_buf())
        } else {
            DescriptorError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let descriptors: Vec<ToolDescriptor> =
        serde_json::from_slice(&bytes).map_err(|source| DescriptorError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        path = %path.display(),
        count = descriptors.len(),
        "Loaded tool descriptors"
    );

    Ok(descriptors)
}
