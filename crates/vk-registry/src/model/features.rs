// crates/vk-registry/src/model/features.rs

//! Contains model structs for `<feature>` (core version) and `<extensions>` blocks.

use super::enums::EnumXml;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<feature api="vulkan" name="VK_VERSION_1_0" number="1.0">`
#[derive(Debug, Deserialize, Default)]
pub struct FeatureXml {
    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@number", default)]
    pub number: Option<String>,

    /// `<remove>` blocks are not modelled.
    #[serde(rename = "require", default)]
    pub require: Vec<RequireXml>,
}

/// `<extensions>`
#[derive(Debug, Deserialize, Default)]
pub struct ExtensionsXml {
    #[serde(rename = "extension", default)]
    pub extension: Vec<ExtensionXml>,
}

/// `<extension name="VK_KHR_surface" number="1" type="instance" supported="vulkan,vulkansc">`
#[derive(Debug, Deserialize, Default)]
pub struct ExtensionXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@number", default)]
    pub number: Option<String>,

    #[serde(rename = "@type", default)]
    pub kind: Option<String>,

    #[serde(rename = "@supported", default)]
    pub supported: Option<String>,

    #[serde(rename = "@platform", default)]
    pub platform: Option<String>,

    #[serde(rename = "@promotedto", default)]
    pub promotedto: Option<String>,

    #[serde(rename = "@deprecatedby", default)]
    pub deprecatedby: Option<String>,

    #[serde(rename = "@depends", default)]
    pub depends: Option<String>,

    /// Older registries list dependencies in `@requires`.
    #[serde(rename = "@requires", default)]
    pub requires: Option<String>,

    #[serde(rename = "require", default)]
    pub require: Vec<RequireXml>,
}

/// A `<require>` block of a feature or extension.
#[derive(Debug, Deserialize, Default)]
pub struct RequireXml {
    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "@depends", default)]
    pub depends: Option<String>,

    /// Older registries use `@feature` / `@extension` instead of `@depends`.
    #[serde(rename = "@feature", default)]
    pub feature: Option<String>,

    #[serde(rename = "@extension", default)]
    pub extension: Option<String>,

    #[serde(rename = "$value", default)]
    pub entries: Vec<RequireEntry>,
}

/// One required entity.
#[derive(Debug, Deserialize)]
pub enum RequireEntry {
    #[serde(rename = "type")]
    Type(NamedRefXml),
    #[serde(rename = "enum")]
    Enum(EnumXml),
    #[serde(rename = "command")]
    Command(NamedRefXml),
    #[serde(rename = "feature")]
    Feature(NamedRefXml),
    #[serde(rename = "comment")]
    Comment(String),
}

/// `<type name="..."/>`, `<command name="..."/>` or `<feature name="..." struct="..."/>`.
#[derive(Debug, Deserialize, Default)]
pub struct NamedRefXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,
}
