// crates/vk-factory-gen/src/error.rs

use std::fmt;
use std::io;
use std::path::PathBuf;
use vk_registry::RegistryError;

/// Errors that abort a generation run.
///
/// The generator has no degraded mode: any of these means no output files
/// were written by the failing run.
#[derive(Debug)]
pub enum GenError {
    /// The registry document could not be parsed or validated.
    Registry(RegistryError),

    /// Reading the registry or writing an output file failed.
    Io { path: PathBuf, source: io::Error },

    /// The JSON configuration could not be deserialized.
    Config(serde_json::Error),

    /// No generation target is registered under this name.
    UnknownTarget(String),

    /// A configured core version is not declared by the registry.
    UnknownVersion(String),

    /// A configured extension is not supported by the registry.
    UnknownExtension(String),

    /// A member type shape the remapper has no C++ representation for.
    UnmappableType { member: String, type_name: String },

    /// A default value was requested that cannot be expressed safely.
    UnsupportedDefault { member: String, reason: &'static str },

    /// A selected struct depends on a struct listed in `excluded_structs`.
    ExcludedDependency { name: String, dependency: String },

    /// Writing into an in-memory output buffer failed.
    Fmt(fmt::Error),
}

impl GenError {
    /// Wraps an I/O error together with the path it occurred on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<RegistryError> for GenError {
    fn from(e: RegistryError) -> Self {
        GenError::Registry(e)
    }
}

impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        GenError::Config(e)
    }
}

impl From<fmt::Error> for GenError {
    fn from(e: fmt::Error) -> Self {
        GenError::Fmt(e)
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "Registry error: {}", e),
            Self::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Self::Config(e) => write!(f, "Invalid generator configuration: {}", e),
            Self::UnknownTarget(name) => write!(f, "Unknown generation target: {}", name),
            Self::UnknownVersion(name) => write!(f, "Unknown core version: {}", name),
            Self::UnknownExtension(name) => write!(f, "Unknown or unsupported extension: {}", name),
            Self::UnmappableType { member, type_name } => {
                write!(f, "Cannot map type {:?} of member {}", type_name, member)
            }
            Self::UnsupportedDefault { member, reason } => {
                write!(f, "Unsupported default value for {}: {}", member, reason)
            }
            Self::ExcludedDependency { name, dependency } => write!(
                f,
                "Struct {} depends on excluded struct {}",
                name, dependency
            ),
            Self::Fmt(e) => write!(f, "Formatting error: {}", e),
        }
    }
}

impl std::error::Error for GenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Config(e) => Some(e),
            Self::Fmt(e) => Some(e),
            _ => None,
        }
    }
}
