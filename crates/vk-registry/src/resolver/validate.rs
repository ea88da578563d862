// crates/vk-registry/src/resolver/validate.rs

//! Final pass over the resolved registry: every reference must name a
//! declared entity after at most one alias hop.

use crate::error::RegistryError;
use crate::lexical::plain_typename;
use crate::types::{ArraySize, Feature, FeatureKind, Registry, StructMember, VulkanType};
use alloc::format;
use alloc::string::ToString;

pub(super) fn validate(registry: &Registry) -> Result<(), RegistryError> {
    for ty in registry.types.values() {
        validate_type(registry, ty)?;
    }

    for alias in registry.command_aliases.values() {
        if !registry.commands.contains_key(&alias.target)
            && !registry.command_aliases.contains_key(&alias.target)
        {
            return Err(unresolved(&alias.target, &alias.name));
        }
    }
    for command in registry.commands.values() {
        expect_type(registry, &command.return_type, &command.name)?;
        for param in &command.params {
            expect_type(
                registry,
                &param.type_name,
                &format!("{}({})", command.name, param.name),
            )?;
        }
    }

    for version in registry.core_versions.values() {
        for feature in version.features.values() {
            validate_feature(registry, feature, &version.name)?;
        }
    }
    for extension in registry.extensions.values() {
        for feature in extension.features() {
            validate_feature(registry, feature, &extension.name)?;
        }
    }
    Ok(())
}

fn validate_type(registry: &Registry, ty: &VulkanType) -> Result<(), RegistryError> {
    match ty {
        VulkanType::HandleAlias(alias)
        | VulkanType::StructAlias(alias)
        | VulkanType::EnumAlias(alias)
        | VulkanType::BitmaskAlias(alias) => match registry.get(&alias.target) {
            None => Err(unresolved(&alias.target, &alias.name)),
            Some(target) if target.is_alias() => Err(RegistryError::AliasChain {
                alias: alias.name.clone(),
                target: alias.target.clone(),
            }),
            Some(_) => Ok(()),
        },
        VulkanType::Struct(s) => s
            .members
            .iter()
            .try_for_each(|m| validate_member(registry, m, &s.name)),
        VulkanType::Union(u) => u
            .members
            .iter()
            .try_for_each(|m| validate_member(registry, m, &u.name)),
        VulkanType::FunctionPointer(f) => {
            expect_type(registry, &f.return_type, &f.name)?;
            f.arguments
                .iter()
                .try_for_each(|a| expect_type(registry, &a.type_name, &f.name))
        }
        VulkanType::Bitmask(b) => {
            expect_type(registry, &b.base_type, &b.name)?;
            match &b.field_enum {
                Some(field_enum) => expect_type(registry, field_enum, &b.name),
                None => Ok(()),
            }
        }
        VulkanType::Enum(e) => {
            for alias in e.aliases.values() {
                if e.resolve_alias(&alias.target).is_none() {
                    return Err(unresolved(&alias.target, &format!("{}::{}", e.name, alias.name)));
                }
            }
            Ok(())
        }
        VulkanType::Handle(h) => match &h.parent {
            // `parent` may list several handles.
            Some(parents) => crate::lexical::split_list(parents)
                .into_iter()
                .try_for_each(|p| expect_type(registry, p, &h.name)),
            None => Ok(()),
        },
        VulkanType::Define(_) | VulkanType::BaseType(_) | VulkanType::External(_) => Ok(()),
    }
}

fn validate_member(
    registry: &Registry,
    member: &StructMember,
    owner: &str,
) -> Result<(), RegistryError> {
    let context = format!("{}::{}", owner, member.name);
    expect_type(registry, &member.type_name, &context)?;
    for size in &member.array_sizes {
        if let ArraySize::Constant(constant) = size {
            if !matches!(registry.get(constant), Some(VulkanType::Define(_))) {
                return Err(unresolved(constant, &context));
            }
        }
    }
    Ok(())
}

fn validate_feature(
    registry: &Registry,
    feature: &Feature,
    owner: &str,
) -> Result<(), RegistryError> {
    let known = match feature.kind {
        FeatureKind::Type => {
            registry.types.contains_key(&feature.name)
                || registry.includes.contains_key(&feature.name)
        }
        FeatureKind::Command => {
            registry.commands.contains_key(&feature.name)
                || registry.command_aliases.contains_key(&feature.name)
        }
        // Enum contributions were checked during reconciliation; device
        // feature names refer to struct members, not registry entities.
        FeatureKind::Enum | FeatureKind::Feature => true,
    };
    if known {
        Ok(())
    } else {
        Err(unresolved(&feature.name, owner))
    }
}

/// Checks that the plain typename of `type_name` (without `const`, `struct`
/// or pointer stars) is a declared type.
fn expect_type(registry: &Registry, type_name: &str, referenced_by: &str) -> Result<(), RegistryError> {
    let plain = plain_typename(type_name);
    if registry.resolve(&plain).is_some() {
        Ok(())
    } else {
        Err(unresolved(&plain, referenced_by))
    }
}

fn unresolved(name: &str, referenced_by: &str) -> RegistryError {
    RegistryError::UnresolvedReference {
        name: name.to_string(),
        referenced_by: referenced_by.to_string(),
    }
}
