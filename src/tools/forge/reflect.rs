//! Name-section reflection for exported functions.
//!
//! The text-format frontend records `$`-prefixed identifiers in the "name"
//! custom section; the local-names subsection covers function parameters
//! (locals 0..n). This is the only signature information a source body
//! carries, so it is what gets advertised to remote callers. Modules
//! compiled without identifiers simply have no entry here and fall back to
//! positional parameter names.

use std::collections::HashMap;

use wasmparser::{BinaryReader, ExternalKind, Name, NameSectionReader, Parser, Payload};

/// Parameter names per exported function, keyed by export name and then by
/// parameter position.
pub(crate) type ExportParamNames = HashMap<String, HashMap<u32, String>>;

/// Extract local names for every function export of a wasm binary.
///
/// Imported and locally defined functions share one index space, so export
/// indices can be matched directly against local-name entries.
pub(crate) fn export_param_names(
    binary: &[u8],
) -> Result<ExportParamNames, wasmparser::BinaryReaderError> {
    let mut exported_funcs: Vec<(String, u32)> = Vec::new();
    let mut local_names: HashMap<u32, HashMap<u32, String>> = HashMap::new();

    for payload in Parser::new(0).parse_all(binary) {
        match payload? {
            Payload::ExportSection(section) => {
                for export in section {
                    let export = export?;
                    if export.kind == ExternalKind::Func {
                        exported_funcs.push((export.name.to_string(), export.index));
                    }
                }
            }
            Payload::CustomSection(section) if section.name() == "name" => {
                let reader = BinaryReader::new(section.data(), section.data_offset());
                for subsection in NameSectionReader::new(reader) {
                    let Name::Local(map) = subsection? else {
                        continue;
                    };
                    for entry in map {
                        let entry = entry?;
                        let mut by_position = HashMap::new();
                        for naming in entry.names {
                            let naming = naming?;
                            by_position.insert(naming.index, naming.name.to_string());
                        }
                        local_names.insert(entry.index, by_position);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(exported_funcs
        .into_iter()
        .filter_map(|(name, index)| local_names.get(&index).map(|names| (name, names.clone())))
        .collect())
}
