// crates/vk-registry/src/model/commands.rs

//! Contains model structs for the `<commands>` section.

use super::types::Fragment;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// `<commands>`
#[derive(Debug, Deserialize, Default)]
pub struct CommandsXml {
    #[serde(rename = "command", default)]
    pub command: Vec<CommandXml>,
}

/// A `<command>`, either a full declaration or
/// `<command name="vkResetQueryPoolEXT" alias="vkResetQueryPool"/>`.
#[derive(Debug, Deserialize, Default)]
pub struct CommandXml {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,

    #[serde(rename = "@alias", default)]
    pub alias: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "@successcodes", default)]
    pub successcodes: Option<String>,

    #[serde(rename = "@errorcodes", default)]
    pub errorcodes: Option<String>,

    #[serde(rename = "@queues", default)]
    pub queues: Option<String>,

    #[serde(rename = "@cmdbufferlevel", default)]
    pub cmdbufferlevel: Option<String>,

    #[serde(rename = "@renderpass", default)]
    pub renderpass: Option<String>,

    #[serde(rename = "proto", default)]
    pub proto: Option<ProtoXml>,

    /// Parameters in declaration order. `<implicitexternsyncparams>` is skipped.
    #[serde(rename = "param", default)]
    pub param: Vec<ParamXml>,
}

/// `<proto><type>VkResult</type> <name>vkCreateInstance</name></proto>`
#[derive(Debug, Deserialize, Default)]
pub struct ProtoXml {
    #[serde(rename = "$value", default)]
    pub content: Vec<Fragment>,
}

/// `<param optional="true" len="count">const <type>T</type>* <name>pT</name></param>`
#[derive(Debug, Deserialize, Default)]
pub struct ParamXml {
    #[serde(rename = "@optional", default)]
    pub optional: Option<String>,

    #[serde(rename = "@externsync", default)]
    pub externsync: Option<String>,

    #[serde(rename = "@len", default)]
    pub len: Option<String>,

    #[serde(rename = "@api", default)]
    pub api: Option<String>,

    #[serde(rename = "$value", default)]
    pub content: Vec<Fragment>,
}
