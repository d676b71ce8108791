//! Symbol resolution: declared name to callable handle plus signature.
//!
//! Resolution reads the namespace, never writes it. The declared name may
//! have been published by this descriptor's own module or by any earlier
//! one — the lookup does not care, matching the shared-scope contract.

use wasmtime::{Extern, Func};

use crate::tools::descriptor::ToolDescriptor;
use crate::tools::forge::error::ForgeError;
use crate::tools::forge::namespace::Namespace;
use crate::tools::tool::{ToolParam, ToolSignature, WasmType};

/// Resolve a descriptor's declared name against the namespace.
///
/// Parameter names come from the descriptor's explicit `params` list when
/// present (count-checked against the function), otherwise from name-section
/// reflection with a positional `argN` fallback.
pub(crate) fn resolve(
    namespace: &mut Namespace,
    descriptor: &ToolDescriptor,
) -> Result<(Func, ToolSignature), ForgeError> {
    let name = &descriptor.name;

    let item = namespace
        .lookup(name)
        .ok_or_else(|| ForgeError::SymbolNotFound { name: name.clone() })?;

    let func = match item {
        Extern::Func(func) => func,
        _ => return Err(ForgeError::NotInvocable { name: name.clone() }),
    };

    let ty = func.ty(namespace.store());

    let param_types = convert_types(name, "parameter", ty.params())?;
    let results = convert_types(name, "result", ty.results())?;

    let params = match &descriptor.params {
        Some(declared) => {
            if declared.len() != param_types.len() {
                return Err(ForgeError::SignatureMismatch {
                    name: name.clone(),
                    declared: declared.len(),
                    actual: param_types.len(),
                });
            }
            declared
                .iter()
                .zip(param_types)
                .map(|(decl, ty)| ToolParam {
                    name: decl.name.clone(),
                    ty,
                    required: decl.required,
                })
                .collect()
        }
        None => param_types
            .into_iter()
            .enumerate()
            .map(|(position, ty)| ToolParam {
                name: namespace
                    .param_name(name, position as u32)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("arg{position}")),
                ty,
                required: true,
            })
            .collect(),
    };

    Ok((func, ToolSignature { params, results }))
}

fn convert_types(
    name: &str,
    position: &'static str,
    types: impl Iterator<Item = wasmtime::ValType>,
) -> Result<Vec<WasmType>, ForgeError> {
    types
        .map(|ty| {
            WasmType::from_val_type(&ty).ok_or_else(|| ForgeError::UnsupportedType {
                name: name.to_string(),
                position,
                ty: ty.to_string(),
            })
        })
        .collect()
}
