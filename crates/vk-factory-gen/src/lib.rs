// crates/vk-factory-gen/src/lib.rs

#![doc = "Generates C++ struct factories with `pNext` chain support from the Vulkan registry."]
#![doc = ""]
#![doc = "A run parses `vk.xml` with `vk-registry`, selects the structs required by the"]
#![doc = "configured core versions and extensions, orders them so that nested structs"]
#![doc = "come first, maps every member onto a C++ type and renders a header, a source"]
#![doc = "file and a googletest suite for the configured target."]
#![doc = ""]
#![doc = "- `run_from_file`: Parse, generate and write in one call."]
#![doc = "- `generate`: Render a target in memory from an already parsed registry."]

// --- Crate Modules ---

pub mod codegen;
pub mod config;
mod error;
pub mod remap;
pub mod sequencer;
pub mod targets;

// --- Public API Re-exports ---

pub use config::{ExtensionPolicy, GeneratorConfig, InclusionPolicy, Selection};
pub use error::GenError;
pub use targets::{create_target, GenerateTarget, GeneratedFiles, TARGETS};

use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use vk_registry::{load_registry_from_str, Registry};

/// Renders the configured target without touching the file system.
///
/// # Errors
/// Returns a `GenError` for an unknown target, an invalid inclusion policy,
/// or a struct member that cannot be represented.
pub fn generate(registry: &Registry, config: &GeneratorConfig) -> Result<GeneratedFiles, GenError> {
    let target = create_target(&config.target, registry, config)?;
    GeneratedFiles::render(target.as_ref())
}

/// Parses `xml_content`, renders the configured target and writes its files
/// into `config.output_dir`.
///
/// Nothing is written unless parsing and rendering succeeded completely.
/// Returns the paths of the written files.
pub fn run(xml_content: &str, config: &GeneratorConfig) -> Result<Vec<PathBuf>, GenError> {
    // 1. Build the type model.
    let registry = load_registry_from_str(xml_content)?;
    info!(
        "[vk-factory-gen] Parsed registry: {} types, {} extensions",
        registry.types.len(),
        registry.extensions.len()
    );

    // 2. Render every file in memory.
    let files = generate(&registry, config)?;

    // 3. Emit.
    files.write_to(&config.output_dir)
}

/// Reads the registry from `registry_path` and calls [`run`].
pub fn run_from_file(
    registry_path: &Path,
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>, GenError> {
    let xml_content =
        fs::read_to_string(registry_path).map_err(|e| GenError::io(registry_path, e))?;
    run(&xml_content, config)
}
