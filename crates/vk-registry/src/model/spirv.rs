// crates/vk-registry/src/model/spirv.rs

//! Contains model structs for `<spirvextensions>` and `<spirvcapabilities>`.

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<spirvextensions>`
#[derive(Debug, Deserialize, Default)]
pub struct SpirvExtensionsXml {
    #[serde(rename = "spirvextension", default)]
    pub extension: Vec<SpirvEntryXml>,
}

/// `<spirvcapabilities>`
#[derive(Debug, Deserialize, Default)]
pub struct SpirvCapabilitiesXml {
    #[serde(rename = "spirvcapability", default)]
    pub capability: Vec<SpirvEntryXml>,
}

/// A `<spirvextension>` or `<spirvcapability>` with its `<enable>` children.
#[derive(Debug, Deserialize, Default)]
pub struct SpirvEntryXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "enable", default)]
    pub enable: Vec<EnableXml>,
}

/// An `<enable>` element. Exactly one of `@version`, `@extension`, `@struct`
/// or `@property` identifies what enables the SPIR-V entry.
#[derive(Debug, Deserialize, Default)]
pub struct EnableXml {
    #[serde(rename = "@version", default)]
    pub version: Option<String>,

    #[serde(rename = "@extension", default)]
    pub extension: Option<String>,

    #[serde(rename = "@struct", default)]
    pub struct_name: Option<String>,

    #[serde(rename = "@feature", default)]
    pub feature: Option<String>,

    #[serde(rename = "@property", default)]
    pub property: Option<String>,

    #[serde(rename = "@member", default)]
    pub member: Option<String>,

    #[serde(rename = "@value", default)]
    pub value: Option<String>,

    #[serde(rename = "@requires", default)]
    pub requires: Option<String>,
}
