// crates/vk-registry/src/resolver/formats.rs

use super::utils::{insert_unique, parse_u32, required};
use crate::error::RegistryError;
use crate::model::formats::{ComponentXml, FormatXml, PlaneXml};
use crate::model::FormatsXml;
use crate::types::{FormatComponent, FormatPlane, ImageFormat, Registry};
use alloc::string::ToString;
use alloc::vec::Vec;

/// Resolves `<formats>` into `registry.image_formats`.
pub(super) fn resolve_formats(
    xml: &FormatsXml,
    registry: &mut Registry,
) -> Result<(), RegistryError> {
    for format in &xml.format {
        let resolved = resolve_format(format)?;
        insert_unique(
            &mut registry.image_formats,
            "format",
            resolved.name.clone(),
            resolved,
        )?;
    }
    Ok(())
}

fn resolve_format(format: &FormatXml) -> Result<ImageFormat, RegistryError> {
    let name = required(&format.name, "name", "format")?.to_string();

    let components = format
        .component
        .iter()
        .map(|c| resolve_component(c, &name))
        .collect::<Result<Vec<_>, _>>()?;
    let planes = format
        .plane
        .iter()
        .map(|p| resolve_plane(p, &name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImageFormat {
        class: required(&format.class, "class", &name)?.to_string(),
        block_size: parse_u32("blockSize", required(&format.block_size, "blockSize", &name)?)?,
        texels_per_block: parse_u32(
            "texelsPerBlock",
            required(&format.texels_per_block, "texelsPerBlock", &name)?,
        )?,
        packed: format
            .packed
            .as_deref()
            .map(|p| parse_u32("packed", p))
            .transpose()?,
        chroma: format.chroma.clone(),
        spirv_format: format
            .spirv_image_format
            .as_ref()
            .and_then(|s| s.name.clone()),
        components,
        planes,
        name,
    })
}

fn resolve_component(component: &ComponentXml, format: &str) -> Result<FormatComponent, RegistryError> {
    // Block-compressed formats carry `bits="compressed"`.
    let bits = match required(&component.bits, "bits", format)? {
        "compressed" => None,
        bits => Some(parse_u32("bits", bits)?),
    };
    Ok(FormatComponent {
        name: required(&component.name, "name", format)?.to_string(),
        bits,
        numeric_format: required(&component.numeric_format, "numericFormat", format)?.to_string(),
        plane_index: component
            .plane_index
            .as_deref()
            .map(|i| parse_u32("planeIndex", i))
            .transpose()?,
    })
}

fn resolve_plane(plane: &PlaneXml, format: &str) -> Result<FormatPlane, RegistryError> {
    Ok(FormatPlane {
        index: parse_u32("index", required(&plane.index, "index", format)?)?,
        width_divisor: parse_u32(
            "widthDivisor",
            required(&plane.width_divisor, "widthDivisor", format)?,
        )?,
        height_divisor: parse_u32(
            "heightDivisor",
            required(&plane.height_divisor, "heightDivisor", format)?,
        )?,
        compatible: required(&plane.compatible, "compatible", format)?.to_string(),
    })
}
