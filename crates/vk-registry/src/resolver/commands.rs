// crates/vk-registry/src/resolver/commands.rs

use super::utils::{first_is_true, insert_unique, list, required, supports_vulkan, Declaration};
use crate::error::RegistryError;
use crate::lexical::split_list;
use crate::model::commands::{CommandXml, ParamXml};
use crate::model::CommandsXml;
use crate::types::{Alias, Command, CommandParam, ExternSync, Registry};
use alloc::string::ToString;
use alloc::vec::Vec;

/// Resolves `<commands>` into `registry.commands` and `registry.command_aliases`.
pub(super) fn resolve_commands(
    xml: &CommandsXml,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for command in xml.command.iter().filter(|c| supports_vulkan(c.api.as_deref())) {
        if let Some(target) = &command.alias {
            let name = required(&command.name, "name", "command alias")?.to_string();
            insert_unique(
                &mut registry.command_aliases,
                "command",
                name.clone(),
                Alias {
                    name,
                    target: target.clone(),
                },
            )?;
            continue;
        }

        let resolved = resolve_command(command)?;
        insert_unique(
            &mut registry.commands,
            "command",
            resolved.name.clone(),
            resolved,
        )?;
    }
    Ok(())
}

/// ```xml
/// <command successcodes="VK_SUCCESS" errorcodes="VK_ERROR_OUT_OF_HOST_MEMORY">
///     <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
///     <param>const <type>VkInstanceCreateInfo</type>* <name>pCreateInfo</name></param>
/// </command>
/// ```
fn resolve_command(command: &CommandXml) -> Result<Command, RegistryError> {
    let proto = command
        .proto
        .as_ref()
        .ok_or_else(|| RegistryError::MissingElement {
            element: "proto",
            context: command.name.clone().unwrap_or_else(|| "command".to_string()),
        })?;
    let decl = Declaration::from_fragments(&proto.content);
    let name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: "command proto".to_string(),
    })?;
    let return_type = decl
        .type_string()
        .ok_or_else(|| RegistryError::MissingElement {
            element: "type",
            context: name.clone(),
        })?;

    let params = command
        .param
        .iter()
        .filter(|p| supports_vulkan(p.api.as_deref()))
        .map(|p| resolve_param(p, &name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command {
        return_type,
        params,
        success_codes: list(&command.successcodes),
        error_codes: list(&command.errorcodes),
        queues: list(&command.queues),
        command_buffer_levels: list(&command.cmdbufferlevel),
        renderpass: command.renderpass.clone(),
        name,
    })
}

fn resolve_param(param: &ParamXml, command: &str) -> Result<CommandParam, RegistryError> {
    let decl = Declaration::from_fragments(&param.content);
    let name = decl.name.clone().ok_or_else(|| RegistryError::MissingElement {
        element: "name",
        context: command.to_string(),
    })?;
    let type_name = decl
        .type_string()
        .ok_or_else(|| RegistryError::MissingElement {
            element: "type",
            context: alloc::format!("{}({})", command, name),
        })?;

    // `externsync="true"` covers the whole parameter; anything else names members.
    let extern_sync = param.externsync.as_deref().map(|e| match e {
        "true" => ExternSync::Parameter,
        members => ExternSync::Members(members.to_string()),
    });

    // The `null-terminated` marker on char arrays carries no length information.
    let len = param.len.as_deref().and_then(|l| {
        let parts: Vec<&str> = split_list(l)
            .into_iter()
            .filter(|p| *p != "null-terminated")
            .collect();
        (!parts.is_empty()).then(|| parts.join(","))
    });

    Ok(CommandParam {
        type_name,
        name,
        optional: first_is_true(&param.optional),
        extern_sync,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::commands::ProtoXml;
    use crate::model::Fragment;
    use alloc::vec;

    fn param(fragments: Vec<Fragment>) -> ParamXml {
        ParamXml {
            content: fragments,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_command_with_const_pointer_param() {
        let command = CommandXml {
            successcodes: Some("VK_SUCCESS".to_string()),
            errorcodes: Some("VK_ERROR_OUT_OF_HOST_MEMORY,VK_ERROR_INITIALIZATION_FAILED".to_string()),
            proto: Some(ProtoXml {
                content: vec![
                    Fragment::Type("VkResult".to_string()),
                    Fragment::Text(" ".to_string()),
                    Fragment::Name("vkCreateInstance".to_string()),
                ],
            }),
            param: vec![
                param(vec![
                    Fragment::Text("const ".to_string()),
                    Fragment::Type("VkInstanceCreateInfo".to_string()),
                    Fragment::Text("* ".to_string()),
                    Fragment::Name("pCreateInfo".to_string()),
                ]),
                ParamXml {
                    len: Some("null-terminated".to_string()),
                    externsync: Some("true".to_string()),
                    ..param(vec![
                        Fragment::Type("VkInstance".to_string()),
                        Fragment::Text("* ".to_string()),
                        Fragment::Name("pInstance".to_string()),
                    ])
                },
            ],
            ..Default::default()
        };

        let resolved = resolve_command(&command).unwrap();
        assert_eq!(resolved.name, "vkCreateInstance");
        assert_eq!(resolved.return_type, "VkResult");
        assert_eq!(resolved.error_codes.len(), 2);
        assert_eq!(resolved.params[0].type_name, "const VkInstanceCreateInfo*");
        assert_eq!(resolved.params[1].len, None);
        assert_eq!(resolved.params[1].extern_sync, Some(ExternSync::Parameter));
    }

    #[test]
    fn test_command_without_proto() {
        let command = CommandXml {
            name: Some("vkBroken".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_command(&command),
            Err(RegistryError::MissingElement { element: "proto", .. })
        ));
    }
}
