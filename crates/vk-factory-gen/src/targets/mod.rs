// crates/vk-factory-gen/src/targets/mod.rs

//! Named generation targets.
//!
//! A target produces three C++ files: a header, its implementation and a
//! googletest suite. Everything is rendered in memory; files are only
//! written once every part rendered successfully.

mod handle_remapper;
mod struct_factories;

pub use handle_remapper::HandleRemapper;
pub use struct_factories::StructFactories;

use crate::config::GeneratorConfig;
use crate::error::GenError;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use vk_registry::Registry;

/// The names accepted by [`create_target`].
pub const TARGETS: &[&str] = &[handle_remapper::NAME, struct_factories::NAME];

/// A code generator producing one header, source and test file.
pub trait GenerateTarget {
    /// The target name, also the stem of the emitted file names.
    fn name(&self) -> &'static str;

    fn header(&self) -> Result<String, GenError>;

    fn source(&self) -> Result<String, GenError>;

    fn tests(&self) -> Result<String, GenError>;
}

/// Builds the target registered under `name`.
pub fn create_target<'a>(
    name: &str,
    registry: &'a Registry,
    config: &'a GeneratorConfig,
) -> Result<Box<dyn GenerateTarget + 'a>, GenError> {
    match name {
        handle_remapper::NAME => Ok(Box::new(HandleRemapper::new(registry, config))),
        struct_factories::NAME => Ok(Box::new(StructFactories::new(registry, config)?)),
        other => Err(GenError::UnknownTarget(other.to_string())),
    }
}

// --- Output ---

/// The rendered text of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub target: String,
    pub header: String,
    pub source: String,
    pub tests: String,
}

impl GeneratedFiles {
    /// Renders all three files of `target`.
    pub fn render(target: &dyn GenerateTarget) -> Result<Self, GenError> {
        Ok(GeneratedFiles {
            target: target.name().to_string(),
            header: target.header()?,
            source: target.source()?,
            tests: target.tests()?,
        })
    }

    /// `(file name, contents)` in emission order.
    pub fn files(&self) -> [(String, &str); 3] {
        [
            (format!("{}.h", self.target), self.header.as_str()),
            (format!("{}.cc", self.target), self.source.as_str()),
            (format!("{}_tests.cc", self.target), self.tests.as_str()),
        ]
    }

    /// Writes the files into `dir`, creating it when missing.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, GenError> {
        fs::create_dir_all(dir).map_err(|e| GenError::io(dir, e))?;
        let mut written = Vec::with_capacity(3);
        for (file_name, contents) in self.files() {
            let path = dir.join(file_name);
            fs::write(&path, contents).map_err(|e| GenError::io(&path, e))?;
            info!("[emit] Wrote {} ({} bytes)", path.display(), contents.len());
            written.push(path);
        }
        Ok(written)
    }
}

/// Opens `namespace` for every `::`-separated component.
pub(crate) fn open_namespace(namespace: &str) -> String {
    namespace
        .split("::")
        .map(|part| format!("namespace {} {{\n", part))
        .collect()
}

pub(crate) fn close_namespace(namespace: &str) -> String {
    namespace
        .split("::")
        .collect::<Vec<_>>()
        .iter()
        .rev()
        .map(|part| format!("}}  // namespace {}\n", part))
        .collect()
}
