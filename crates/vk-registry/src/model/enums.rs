// crates/vk-registry/src/model/enums.rs

//! Contains model structs for `<enums>` blocks and the `<enum>` elements shared
//! with `<require>` blocks.

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<enums name="VkImageLayout" type="enum">` or the `API Constants` block.
#[derive(Debug, Deserialize, Default)]
pub struct EnumsXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    /// `enum`, `bitmask` or `constants`.
    #[serde(rename = "@type", default)]
    pub kind: Option<String>,

    #[serde(rename = "@bitwidth", default)]
    pub bitwidth: Option<String>,

    /// `<enum>` fields, interleaved with `<comment>` and `<unused>` elements.
    #[serde(rename = "enum", default)]
    pub values: Vec<EnumXml>,
}

/// An `<enum>` element.
///
/// Inside `<enums>` it is a field (`@value` | `@bitpos` | `@alias`). Inside a
/// `<require>` block it may additionally extend another enum (`@extends` with
/// `@offset`/`@extnumber`/`@dir`) or declare a constant.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EnumXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@value", default)]
    pub value: Option<String>,

    #[serde(rename = "@bitpos", default)]
    pub bitpos: Option<String>,

    #[serde(rename = "@alias", default)]
    pub alias: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "@extends", default)]
    pub extends: Option<String>,

    #[serde(rename = "@extnumber", default)]
    pub extnumber: Option<String>,

    #[serde(rename = "@offset", default)]
    pub offset: Option<String>,

    /// `dir="-"` negates an offset-encoded value.
    #[serde(rename = "@dir", default)]
    pub dir: Option<String>,
}
