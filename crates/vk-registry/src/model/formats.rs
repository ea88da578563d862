// crates/vk-registry/src/model/formats.rs

//! Contains model structs for the `<formats>` section.

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<formats>`
#[derive(Debug, Deserialize, Default)]
pub struct FormatsXml {
    #[serde(rename = "format", default)]
    pub format: Vec<FormatXml>,
}

/// `<format name="VK_FORMAT_R8_UNORM" class="8-bit" blockSize="1" texelsPerBlock="1">`
#[derive(Debug, Deserialize, Default)]
pub struct FormatXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@class", default)]
    pub class: Option<String>,

    #[serde(rename = "@blockSize", default)]
    pub block_size: Option<String>,

    #[serde(rename = "@texelsPerBlock", default)]
    pub texels_per_block: Option<String>,

    #[serde(rename = "@packed", default)]
    pub packed: Option<String>,

    #[serde(rename = "@chroma", default)]
    pub chroma: Option<String>,

    #[serde(rename = "component", default)]
    pub component: Vec<ComponentXml>,

    #[serde(rename = "plane", default)]
    pub plane: Vec<PlaneXml>,

    #[serde(rename = "spirvimageformat", default)]
    pub spirv_image_format: Option<SpirvImageFormatXml>,
}

/// `<component name="R" bits="8" numericFormat="UNORM" planeIndex="0"/>`
#[derive(Debug, Deserialize, Default)]
pub struct ComponentXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    /// A bit count, or `compressed`.
    #[serde(rename = "@bits", default)]
    pub bits: Option<String>,

    #[serde(rename = "@numericFormat", default)]
    pub numeric_format: Option<String>,

    #[serde(rename = "@planeIndex", default)]
    pub plane_index: Option<String>,
}

/// `<plane index="0" widthDivisor="1" heightDivisor="1" compatible="VK_FORMAT_R8_UNORM"/>`
#[derive(Debug, Deserialize, Default)]
pub struct PlaneXml {
    #[serde(rename = "@index", default)]
    pub index: Option<String>,

    #[serde(rename = "@widthDivisor", default)]
    pub width_divisor: Option<String>,

    #[serde(rename = "@heightDivisor", default)]
    pub height_divisor: Option<String>,

    #[serde(rename = "@compatible", default)]
    pub compatible: Option<String>,
}

/// `<spirvimageformat name="R8"/>`
#[derive(Debug, Deserialize, Default)]
pub struct SpirvImageFormatXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
}
