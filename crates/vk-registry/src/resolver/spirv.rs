// crates/vk-registry/src/resolver/spirv.rs

use super::utils::{insert_unique, required};
use crate::error::RegistryError;
use crate::model::spirv::{EnableXml, SpirvEntryXml};
use crate::model::{SpirvCapabilitiesXml, SpirvExtensionsXml};
use crate::types::{
    Registry, SpirvCapability, SpirvExtension, SpirvFeatureEnable, SpirvPropertyEnable,
};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// What a single `<enable>` element switches on.
enum Enable {
    Version(String),
    Extension(String),
    Feature(SpirvFeatureEnable),
    Property(SpirvPropertyEnable),
}

pub(super) fn resolve_spirv_extensions(
    xml: &SpirvExtensionsXml,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for entry in &xml.extension {
        let name = required(&entry.name, "name", "spirvextension")?.to_string();
        let mut extension = SpirvExtension {
            name: name.clone(),
            versions: Vec::new(),
            extensions: Vec::new(),
        };
        for enable in resolve_enables(entry, &name)? {
            match enable {
                Enable::Version(v) => extension.versions.push(v),
                Enable::Extension(e) => extension.extensions.push(e),
                Enable::Feature(_) | Enable::Property(_) => {
                    return Err(RegistryError::InvalidElement {
                        element: name,
                        reason: "spirvextension may only be enabled by a version or extension",
                    });
                }
            }
        }
        insert_unique(
            &mut registry.spirv.extensions,
            "spirvextension",
            name,
            extension,
        )?;
    }
    Ok(())
}

pub(super) fn resolve_spirv_capabilities(
    xml: &SpirvCapabilitiesXml,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for entry in &xml.capability {
        let name = required(&entry.name, "name", "spirvcapability")?.to_string();
        let mut capability = SpirvCapability {
            name: name.clone(),
            versions: Vec::new(),
            extensions: Vec::new(),
            features: Vec::new(),
            properties: Vec::new(),
        };
        for enable in resolve_enables(entry, &name)? {
            match enable {
                Enable::Version(v) => capability.versions.push(v),
                Enable::Extension(e) => capability.extensions.push(e),
                Enable::Feature(f) => capability.features.push(f),
                Enable::Property(p) => capability.properties.push(p),
            }
        }
        insert_unique(
            &mut registry.spirv.capabilities,
            "spirvcapability",
            name,
            capability,
        )?;
    }
    Ok(())
}

fn resolve_enables(entry: &SpirvEntryXml, owner: &str) -> Result<Vec<Enable>, RegistryError> {
    entry.enable.iter().map(|e| resolve_enable(e, owner)).collect()
}

fn resolve_enable(enable: &EnableXml, owner: &str) -> Result<Enable, RegistryError> {
    if let Some(version) = &enable.version {
        return Ok(Enable::Version(version.clone()));
    }
    if let Some(extension) = &enable.extension {
        return Ok(Enable::Extension(extension.clone()));
    }
    if let Some(struct_name) = &enable.struct_name {
        return Ok(Enable::Feature(SpirvFeatureEnable {
            struct_name: struct_name.clone(),
            feature: required(&enable.feature, "feature", owner)?.to_string(),
            requires: enable.requires.clone(),
        }));
    }
    if let Some(property) = &enable.property {
        return Ok(Enable::Property(SpirvPropertyEnable {
            property: property.clone(),
            member: required(&enable.member, "member", owner)?.to_string(),
            value: required(&enable.value, "value", owner)?.to_string(),
            requires: enable.requires.clone(),
        }));
    }
    Err(RegistryError::InvalidElement {
        element: owner.to_string(),
        reason: "enable names none of version, extension, struct or property",
    })
}
