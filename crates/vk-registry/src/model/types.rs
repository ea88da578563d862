// crates/vk-registry/src/model/types.rs

//! Contains model structs for the `<types>` section.

use super::commands::{ParamXml, ProtoXml};
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<types>`
#[derive(Debug, Deserialize, Default)]
pub struct TypesXml {
    /// `<type>` elements, interleaved with `<comment>` elements.
    #[serde(rename = "type", default)]
    pub types: Vec<TypeXml>,
}

/// A `<type>` element of any category.
///
/// Structural detail lives partly in attributes (`@name`, `@alias`) and partly
/// in mixed content, e.g.
/// `<type category="handle"><type>VK_DEFINE_HANDLE</type>(<name>VkQueue</name>)</type>`.
#[derive(Debug, Deserialize, Default)]
pub struct TypeXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@category", default)]
    pub category: Option<String>,

    #[serde(rename = "@alias", default)]
    pub alias: Option<String>,

    #[serde(rename = "@requires", default)]
    pub requires: Option<String>,

    /// Newer registries name a bitmask's enum with `@bitvalues` instead of `@requires`.
    #[serde(rename = "@bitvalues", default)]
    pub bitvalues: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "@parent", default)]
    pub parent: Option<String>,

    #[serde(rename = "@objtypeenum", default)]
    pub objtypeenum: Option<String>,

    #[serde(rename = "@structextends", default)]
    pub structextends: Option<String>,

    #[serde(rename = "@returnedonly", default)]
    pub returnedonly: Option<String>,

    /// Ordered mixed content.
    #[serde(rename = "$value", default)]
    pub content: Vec<TypeContent>,
}

/// The mixed content that may appear directly inside a `<type>` element.
#[derive(Debug, Deserialize)]
pub enum TypeContent {
    #[serde(rename = "$text")]
    Text(String),
    #[serde(rename = "type")]
    Type(String),
    #[serde(rename = "name")]
    Name(String),
    #[serde(rename = "member")]
    Member(MemberXml),
    #[serde(rename = "comment")]
    Comment(String),
    #[serde(rename = "proto")]
    Proto(ProtoXml),
    #[serde(rename = "param")]
    Param(ParamXml),
}

/// A fragment of a declaration: `const <type>char</type>* <name>pName</name>[<enum>N</enum>]`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub enum Fragment {
    #[serde(rename = "$text")]
    Text(String),
    #[serde(rename = "type")]
    Type(String),
    #[serde(rename = "name")]
    Name(String),
    #[serde(rename = "enum")]
    Enum(String),
    #[serde(rename = "comment")]
    Comment(String),
}

/// A `<member>` of a struct or union.
#[derive(Debug, Deserialize, Default)]
pub struct MemberXml {
    #[serde(rename = "@optional", default)]
    pub optional: Option<String>,

    #[serde(rename = "@len", default)]
    pub len: Option<String>,

    #[serde(rename = "@values", default)]
    pub values: Option<String>,

    #[serde(rename = "@noautovalidity", default)]
    pub noautovalidity: Option<String>,

    #[serde(rename = "@selection", default)]
    pub selection: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "$value", default)]
    pub content: Vec<Fragment>,
}
