// crates/vk-registry/src/resolver/features.rs

//! Resolves `<feature>` and `<extensions>` blocks, and reconciles the enum
//! fields they contribute into their base enums.

use super::enums::{add_alias, add_field};
use super::utils::{insert_unique, non_empty, parse_u32, required, supports_vulkan};
use crate::error::RegistryError;
use crate::lexical::{self, split_list};
use crate::model::features::{RequireEntry, RequireXml};
use crate::model::{EnumXml, ExtensionsXml, FeatureXml};
use crate::types::{
    CoreVersion, Define, EnumExtension, EnumField, EnumFieldAlias, EnumValueSource, Extension,
    Feature, FeatureKind, Registry, Requirement, VulkanType,
};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{debug, trace};

// --- Pass 1: Core versions and extensions ---

pub(super) fn resolve_core_versions(
    features: &[FeatureXml],
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for feature in features {
        let name = required(&feature.name, "name", "feature")?.to_string();
        if !supports_vulkan(feature.api.as_deref()) {
            debug!(
                "[resolver] Skipping feature {} for api {:?}",
                name, feature.api
            );
            continue;
        }
        let number = required(&feature.number, "number", &name)?.to_string();

        let mut features = BTreeMap::new();
        for require in feature
            .require
            .iter()
            .filter(|r| supports_vulkan(r.api.as_deref()))
        {
            features.append(&mut resolve_requirement(require, &name)?.features);
        }

        insert_unique(
            &mut registry.core_versions,
            "feature",
            name.clone(),
            CoreVersion {
                name,
                number,
                features,
            },
        )?;
    }
    Ok(())
}

pub(super) fn resolve_extensions(
    xml: &ExtensionsXml,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for extension in &xml.extension {
        let name = required(&extension.name, "name", "extension")?.to_string();
        let supported = extension.supported.as_deref().unwrap_or_default();
        if !split_list(supported).contains(&"vulkan") {
            // Applications must not use disabled extensions.
            debug!(
                "[resolver] Skipping extension {} (supported=\"{}\")",
                name, supported
            );
            continue;
        }

        let number = parse_u32("number", required(&extension.number, "number", &name)?)?;
        let requirements = extension
            .require
            .iter()
            .filter(|r| supports_vulkan(r.api.as_deref()))
            .map(|r| resolve_requirement(r, &name))
            .collect::<Result<Vec<_>, _>>()?;

        insert_unique(
            &mut registry.extensions,
            "extension",
            name.clone(),
            Extension {
                number,
                kind: extension.kind.clone(),
                platform: extension.platform.clone(),
                promoted_to: non_empty(&extension.promotedto),
                deprecated_by: non_empty(&extension.deprecatedby),
                depends: non_empty(&extension.depends).or_else(|| non_empty(&extension.requires)),
                requirements,
                name,
            },
        )?;
    }
    Ok(())
}

/// Parses a `<require>` block of a version or extension.
fn resolve_requirement(require: &RequireXml, owner: &str) -> Result<Requirement, RegistryError> {
    let mut features = BTreeMap::new();

    for entry in &require.entries {
        let feature = match entry {
            RequireEntry::Comment(_) => continue,
            RequireEntry::Enum(e) => {
                if !supports_vulkan(e.api.as_deref()) {
                    continue;
                }
                resolve_enum_feature(e, owner)?
            }
            RequireEntry::Type(r) | RequireEntry::Command(r) | RequireEntry::Feature(r) => {
                if !supports_vulkan(r.api.as_deref()) {
                    continue;
                }
                let kind = match entry {
                    RequireEntry::Type(_) => FeatureKind::Type,
                    RequireEntry::Command(_) => FeatureKind::Command,
                    _ => FeatureKind::Feature,
                };
                Feature {
                    name: required(&r.name, "name", owner)?.to_string(),
                    kind,
                    enum_extension: None,
                }
            }
        };
        features.insert(feature.name.clone(), feature);
    }

    // Older registries split `@depends` into `@feature` and `@extension`.
    let depends = require.depends.clone().or_else(|| {
        let parts: Vec<&str> = [&require.feature, &require.extension]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.join("+"))
    });

    Ok(Requirement { depends, features })
}

/// Classifies a required `<enum>`: an extension of another enum (field or
/// alias), a new constant, or a plain reference.
fn resolve_enum_feature(e: &EnumXml, owner: &str) -> Result<Feature, RegistryError> {
    let name = required(&e.name, "name", owner)?.to_string();

    let enum_extension = match &e.extends {
        Some(extends) => Some(match (&e.alias, &e.value, &e.bitpos, &e.offset) {
            (Some(alias), ..) => EnumExtension::FieldAlias {
                extends: extends.clone(),
                alias: alias.clone(),
            },
            (None, Some(value), ..) => EnumExtension::Field {
                extends: extends.clone(),
                source: EnumValueSource::Value(value.clone()),
            },
            (None, None, Some(bitpos), _) => EnumExtension::Field {
                extends: extends.clone(),
                source: EnumValueSource::BitPos(parse_u32("bitpos", bitpos)?),
            },
            (None, None, None, Some(offset)) => EnumExtension::Field {
                extends: extends.clone(),
                source: EnumValueSource::Offset {
                    extnumber: e
                        .extnumber
                        .as_deref()
                        .map(|n| parse_u32("extnumber", n))
                        .transpose()?,
                    offset: parse_u32("offset", offset)?,
                    negative: e.dir.as_deref() == Some("-"),
                },
            },
            (None, None, None, None) => {
                return Err(RegistryError::MissingAttribute {
                    attribute: "value|bitpos|offset|alias",
                    context: alloc::format!("{} in {}", name, owner),
                });
            }
        }),
        None => e
            .value
            .clone()
            .or_else(|| e.alias.clone())
            .map(|value| EnumExtension::Constant { value }),
    };

    Ok(Feature {
        name,
        kind: FeatureKind::Enum,
        enum_extension,
    })
}

// --- Pass 2: Enum extension reconciliation ---

/// One enum contribution waiting to be applied.
struct Contribution {
    /// The version or extension declaring it.
    origin: String,
    /// The enclosing extension's number; `None` inside a core version.
    extension_number: Option<u32>,
    name: String,
    extension: EnumExtension,
}

/// Walks every core version, then every extension, inserting the enum fields
/// and aliases they contribute into their target enums. Constants become
/// defines.
///
/// Contributions may target enums declared anywhere in the document, so
/// this runs after the whole model is built.
pub(super) fn reconcile_enum_extensions(registry: &mut Registry) -> Result<(), RegistryError> {
    let mut pending = Vec::new();

    for version in registry.core_versions.values() {
        collect(&mut pending, &version.name, None, version.features.values());
    }
    for extension in registry.extensions.values() {
        collect(
            &mut pending,
            &extension.name,
            Some(extension.number),
            extension.features(),
        );
    }

    for contribution in pending {
        apply(registry, contribution)?;
    }
    Ok(())
}

fn collect<'a>(
    pending: &mut Vec<Contribution>,
    origin: &str,
    extension_number: Option<u32>,
    features: impl Iterator<Item = &'a Feature>,
) {
    for feature in features {
        if let Some(extension) = &feature.enum_extension {
            pending.push(Contribution {
                origin: origin.to_string(),
                extension_number,
                name: feature.name.clone(),
                extension: extension.clone(),
            });
        }
    }
}

fn apply(registry: &mut Registry, contribution: Contribution) -> Result<(), RegistryError> {
    let Contribution {
        origin,
        extension_number,
        name,
        extension,
    } = contribution;

    let extends = match extension {
        EnumExtension::Constant { value } => return add_constant(registry, name, value),
        EnumExtension::Field { ref extends, .. } | EnumExtension::FieldAlias { ref extends, .. } => {
            extends.clone()
        }
    };

    // Follow a single alias hop to the canonical enum.
    let canonical = match registry.types.get(&extends) {
        Some(VulkanType::EnumAlias(alias)) => alias.target.clone(),
        _ => extends.clone(),
    };
    let Some(VulkanType::Enum(target)) = registry.types.get_mut(&canonical) else {
        return Err(RegistryError::UnresolvedReference {
            name: extends,
            referenced_by: alloc::format!("{} in {}", name, origin),
        });
    };

    match extension {
        EnumExtension::Field { source, .. } => {
            let value = match source {
                EnumValueSource::Value(literal) => lexical::enum_value_from_literal(&literal)?,
                EnumValueSource::BitPos(bitpos) => {
                    lexical::enum_value_from_bitpos(bitpos, target.bit64)?
                }
                EnumValueSource::Offset {
                    extnumber,
                    offset,
                    negative,
                } => {
                    let extnumber = extnumber.or(extension_number).ok_or_else(|| {
                        RegistryError::MissingAttribute {
                            attribute: "extnumber",
                            context: alloc::format!("{} in {}", name, origin),
                        }
                    })?;
                    lexical::enum_value_from_offset(extnumber, offset, negative)?
                }
            };
            trace!(
                "[resolver] {} adds {}::{} = {}",
                origin, target.name, name, value.representation
            );
            add_field(
                target,
                EnumField {
                    name,
                    value: value.value,
                    representation: value.representation,
                    extension: true,
                },
            )
        }
        EnumExtension::FieldAlias { alias, .. } => add_alias(
            target,
            EnumFieldAlias {
                name,
                target: alias,
                extension: true,
            },
        ),
        EnumExtension::Constant { .. } => Ok(()),
    }
}

/// Adds an extension constant; an identical re-declaration is a no-op.
fn add_constant(registry: &mut Registry, name: String, value: String) -> Result<(), RegistryError> {
    match registry.types.get(&name) {
        Some(VulkanType::Define(existing)) if existing.value == value => Ok(()),
        Some(_) => Err(RegistryError::DuplicateName {
            category: "constant",
            name,
        }),
        None => {
            registry.types.insert(
                name.clone(),
                VulkanType::Define(Define {
                    name,
                    signature: None,
                    value,
                    extension: true,
                }),
            );
            Ok(())
        }
    }
}
