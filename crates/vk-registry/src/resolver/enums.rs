// crates/vk-registry/src/resolver/enums.rs

//! Resolves `<enums>` blocks into enums (fields and field aliases) and the
//! `API Constants` block into defines.

use super::utils::{insert_unique, parse_u32, required, supports_vulkan};
use crate::error::RegistryError;
use crate::lexical::{self, EnumValue};
use crate::model::{EnumXml, EnumsXml};
use crate::types::{Define, Enum, EnumField, EnumFieldAlias, Registry, VulkanType};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use log::debug;

/// The sentinel container name the dialect uses for a flat list of constants.
const API_CONSTANTS: &str = "API Constants";

pub(super) fn resolve_enums(
    blocks: &[EnumsXml],
    declared_enums: &BTreeSet<String>,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for block in blocks {
        let name = required(&block.name, "name", "enums")?;

        if name == API_CONSTANTS || block.kind.as_deref() == Some("constants") {
            resolve_constants(block, registry)?;
            continue;
        }

        let resolved = resolve_enum(name, block)?;
        insert_unique(
            &mut registry.types,
            "type",
            resolved.name.clone(),
            VulkanType::Enum(resolved),
        )?;
    }

    // Enum types declared in <types> but never given an <enums> block
    // (reserved flag bits) still exist as empty enums.
    for name in declared_enums {
        if !registry.types.contains_key(name) {
            debug!("[resolver] Enum {} has no <enums> block, adding it empty", name);
            registry.types.insert(
                name.clone(),
                VulkanType::Enum(Enum {
                    name: name.clone(),
                    ..Default::default()
                }),
            );
        }
    }
    Ok(())
}

/// `<enum type="uint32_t" value="256" name="VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"/>`
/// or `<enum name="VK_LUID_SIZE_KHR" alias="VK_LUID_SIZE"/>`.
fn resolve_constants(block: &EnumsXml, registry: &mut Registry) -> Result<(), RegistryError> {
    for constant in block.values.iter().filter(|c| supports_vulkan(c.api.as_deref())) {
        let name = required(&constant.name, "name", API_CONSTANTS)?.to_string();
        let value = constant
            .value
            .clone()
            .or_else(|| constant.alias.clone())
            .ok_or_else(|| RegistryError::MissingAttribute {
                attribute: "value",
                context: name.clone(),
            })?;
        let define = Define {
            name: name.clone(),
            signature: None,
            value,
            extension: false,
        };
        insert_unique(&mut registry.types, "type", name, VulkanType::Define(define))?;
    }
    Ok(())
}

fn resolve_enum(name: &str, block: &EnumsXml) -> Result<Enum, RegistryError> {
    let bitmask = match block.kind.as_deref() {
        Some("enum") => false,
        Some("bitmask") => true,
        other => {
            return Err(RegistryError::UnknownEnumsType {
                name: name.to_string(),
                kind: other.unwrap_or_default().to_string(),
            });
        }
    };
    let bit64 = match block.bitwidth.as_deref() {
        None | Some("32") => false,
        Some("64") => true,
        Some(other) => {
            return Err(RegistryError::UnsupportedBitWidth {
                name: name.to_string(),
                bitwidth: other.to_string(),
            });
        }
    };

    let mut resolved = Enum {
        name: name.to_string(),
        bitmask,
        bit64,
        ..Default::default()
    };

    for field in block.values.iter().filter(|f| supports_vulkan(f.api.as_deref())) {
        let field_name = required(&field.name, "name", name)?.to_string();

        let declared = [&field.value, &field.bitpos, &field.alias]
            .iter()
            .filter(|a| a.is_some())
            .count();
        if declared > 1 {
            return Err(RegistryError::InvalidElement {
                element: field_name,
                reason: "enum field declares more than one of value, bitpos and alias",
            });
        }

        if let Some(target) = &field.alias {
            add_alias(
                &mut resolved,
                EnumFieldAlias {
                    name: field_name,
                    target: target.clone(),
                    extension: false,
                },
            )?;
            continue;
        }

        let value = field_value(field, &field_name, bit64)?;
        add_field(
            &mut resolved,
            EnumField {
                name: field_name,
                value: value.value,
                representation: value.representation,
                extension: false,
            },
        )?;
    }

    Ok(resolved)
}

/// Decodes a field declared inside its own `<enums>` block.
fn field_value(field: &EnumXml, name: &str, bit64: bool) -> Result<EnumValue, RegistryError> {
    if let Some(literal) = &field.value {
        return lexical::enum_value_from_literal(literal);
    }
    if let Some(bitpos) = &field.bitpos {
        return lexical::enum_value_from_bitpos(parse_u32("bitpos", bitpos)?, bit64);
    }
    Err(RegistryError::MissingAttribute {
        attribute: "value|bitpos|alias",
        context: name.to_string(),
    })
}

/// Appends a field. Re-declaring an identical field is a no-op; a conflicting
/// value or a clash with an alias name is an error.
pub(super) fn add_field(target: &mut Enum, field: EnumField) -> Result<(), RegistryError> {
    if target.aliases.contains_key(&field.name) {
        return Err(RegistryError::EnumAliasCollision {
            enum_name: target.name.clone(),
            name: field.name,
        });
    }
    if let Some(existing) = target.field(&field.name) {
        if existing.value == field.value {
            return Ok(());
        }
        return Err(RegistryError::ConflictingEnumValue {
            enum_name: target.name.clone(),
            field: field.name,
            existing: existing.value,
            new: field.value,
        });
    }
    target.fields.push(field);
    Ok(())
}

/// Records a field alias. Re-declaring the same alias is a no-op.
pub(super) fn add_alias(target: &mut Enum, alias: EnumFieldAlias) -> Result<(), RegistryError> {
    if target.field(&alias.name).is_some() {
        return Err(RegistryError::EnumAliasCollision {
            enum_name: target.name.clone(),
            name: alias.name,
        });
    }
    match target.aliases.get(&alias.name) {
        Some(existing) if existing.target == alias.target => Ok(()),
        Some(_) => Err(RegistryError::DuplicateName {
            category: "enum field alias",
            name: alias.name,
        }),
        None => {
            target.aliases.insert(alias.name.clone(), alias);
            Ok(())
        }
    }
}
