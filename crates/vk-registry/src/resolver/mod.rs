// crates/vk-registry/src/resolver/mod.rs

//! Business logic turning the raw `model` structs into the public `types` model.
//!
//! Resolution runs in three passes:
//! 1. every section is resolved on its own (types, enums, commands,
//!    core versions, extensions, formats, SPIR-V metadata);
//! 2. enum fields and aliases contributed by versions and extensions are
//!    merged into their base enums;
//! 3. every cross reference is validated.

mod commands;
mod enums;
mod features;
mod formats;
mod spirv;
mod types;
mod utils;
mod validate;

use crate::error::RegistryError;
use crate::model::{PlatformsXml, RegistryXml};
use crate::types::{Platform, Registry};
use alloc::collections::BTreeSet;
use alloc::string::ToString;
use log::debug;

/// Resolves a deserialized `<registry>` into a reconciled, validated [`Registry`].
pub(crate) fn resolve_registry(xml: RegistryXml) -> Result<Registry, RegistryError> {
    let mut registry = Registry::default();

    // --- Pass 1: Sections ---
    if let Some(platforms) = &xml.platforms {
        resolve_platforms(platforms, &mut registry)?;
    }

    let declared_enums = match &xml.types {
        Some(types) => types::resolve_types(types, &mut registry)?,
        None => BTreeSet::new(),
    };
    enums::resolve_enums(&xml.enums, &declared_enums, &mut registry)?;

    if let Some(commands) = &xml.commands {
        commands::resolve_commands(commands, &mut registry)?;
    }
    features::resolve_core_versions(&xml.features, &mut registry)?;
    if let Some(extensions) = &xml.extensions {
        features::resolve_extensions(extensions, &mut registry)?;
    }
    if let Some(formats) = &xml.formats {
        formats::resolve_formats(formats, &mut registry)?;
    }
    if let Some(extensions) = &xml.spirv_extensions {
        spirv::resolve_spirv_extensions(extensions, &mut registry)?;
    }
    if let Some(capabilities) = &xml.spirv_capabilities {
        spirv::resolve_spirv_capabilities(capabilities, &mut registry)?;
    }

    // --- Pass 2: Enum extensions ---
    features::reconcile_enum_extensions(&mut registry)?;

    // --- Pass 3: Validation ---
    validate::validate(&registry)?;

    debug!(
        "[resolver] Resolved {} types, {} commands, {} versions, {} extensions",
        registry.types.len(),
        registry.commands.len(),
        registry.core_versions.len(),
        registry.extensions.len()
    );
    Ok(registry)
}

fn resolve_platforms(xml: &PlatformsXml, registry: &mut Registry) -> Result<(), RegistryError> {
    for platform in &xml.platform {
        let protect = utils::required(&platform.protect, "protect", &platform.name)?;
        utils::insert_unique(
            &mut registry.platforms,
            "platform",
            platform.name.clone(),
            Platform {
                name: platform.name.clone(),
                protect: protect.to_string(),
            },
        )?;
    }
    Ok(())
}
