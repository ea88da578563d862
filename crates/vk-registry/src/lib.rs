// crates/vk-registry/src/lib.rs

#![no_std]
#![doc = "Parses the Vulkan XML API registry (`vk.xml`) into a typed model."]
#![doc = ""]
#![doc = "This `no_std + alloc` library turns the registry into name-keyed maps of"]
#![doc = "handles, structs, enums, bitmasks, function pointers, commands, core"]
#![doc = "versions and extensions, with enum extensions merged and every"]
#![doc = "cross reference validated."]
#![doc = ""]
#![doc = "- `load_registry_from_str`: Parsing a complete registry document."]
#![doc = "- `lexical`: Type-string canonicalization and enum value decoding."]

extern crate alloc;

// --- Crate Modules ---

mod error;
pub mod lexical;
mod model;
mod parser;
mod resolver;
pub mod types;

// --- Public API Re-exports ---

pub use error::RegistryError;
pub use parser::load_registry_from_str;
pub use types::{
    Alias, ArraySize, Bitmask, Command, CommandParam, CoreVersion, Define, Enum, EnumField,
    EnumFieldAlias, Extension, Feature, FeatureKind, FunctionPointer, Handle, Registry, Struct,
    StructMember, Union, VulkanType, CHAIN_LINK_MEMBER,
};
