// crates/vk-registry/src/model/mod.rs

//! Internal `serde` data structures that map directly to the registry's XML dialect.
//!
//! These structs mirror `vk.xml` element for element and are deserialized via
//! `quick-xml`. Mixed content (text interleaved with `<type>`/`<name>` tags) is
//! captured as ordered fragment lists so the resolver can reassemble it in
//! document order. They are not intended for direct public use.

#![allow(clippy::pedantic)] // XML dialect naming conventions differ from Rust

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

pub mod commands;
pub mod enums;
pub mod features;
pub mod formats;
pub mod spirv;
pub mod types;

// Re-export key components for internal use
pub use commands::CommandsXml;
pub use enums::{EnumXml, EnumsXml};
pub use features::{ExtensionsXml, FeatureXml, RequireXml};
pub use formats::FormatsXml;
pub use spirv::{SpirvCapabilitiesXml, SpirvExtensionsXml};
pub use types::{Fragment, TypeContent, TypeXml, TypesXml};

/// The root `<registry>` element.
///
/// Sections the generator has no use for (`<tags>`, `<sync>`, `<videocodecs>`)
/// are skipped by the deserializer.
#[derive(Debug, Deserialize, Default)]
#[serde(rename = "registry")]
pub struct RegistryXml {
    #[serde(rename = "platforms", default)]
    pub platforms: Option<PlatformsXml>,

    #[serde(rename = "types", default)]
    pub types: Option<TypesXml>,

    /// `<enums>` blocks are interleaved with `<comment>` elements.
    #[serde(rename = "enums", default)]
    pub enums: Vec<EnumsXml>,

    #[serde(rename = "commands", default)]
    pub commands: Option<CommandsXml>,

    /// One `<feature>` per core version, interleaved with other sections.
    #[serde(rename = "feature", default)]
    pub features: Vec<FeatureXml>,

    #[serde(rename = "extensions", default)]
    pub extensions: Option<ExtensionsXml>,

    #[serde(rename = "formats", default)]
    pub formats: Option<FormatsXml>,

    #[serde(rename = "spirvextensions", default)]
    pub spirv_extensions: Option<SpirvExtensionsXml>,

    #[serde(rename = "spirvcapabilities", default)]
    pub spirv_capabilities: Option<SpirvCapabilitiesXml>,
}

/// `<platforms>`
#[derive(Debug, Deserialize, Default)]
pub struct PlatformsXml {
    #[serde(rename = "platform", default)]
    pub platform: Vec<PlatformXml>,
}

/// `<platform name="xlib" protect="VK_USE_PLATFORM_XLIB_KHR" comment="..."/>`
#[derive(Debug, Deserialize)]
pub struct PlatformXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@protect", default)]
    pub protect: Option<String>,
}
