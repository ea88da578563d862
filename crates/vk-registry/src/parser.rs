// crates/vk-registry/src/parser.rs

use crate::error::RegistryError;
use crate::model::RegistryXml;
use crate::resolver;
use crate::types::Registry;
use log::debug;

/// Parses a Vulkan registry (`vk.xml`) string slice into the type model.
///
/// Elements restricted to other APIs (`api="vulkansc"`) and extensions that
/// are not supported for Vulkan are left out of the model. Enum fields
/// contributed by core versions and extensions are merged into their base
/// enums before the model is returned.
///
/// # Arguments
/// * `xml_content` - A string slice containing the full registry document.
///
/// # Errors
/// Returns a `RegistryError` if the document is not well-formed XML, an
/// element violates the registry dialect, or a reference cannot be resolved.
pub fn load_registry_from_str(xml_content: &str) -> Result<Registry, RegistryError> {
    // 1. Deserialize the raw XML string into our internal model.
    let xml: RegistryXml = quick_xml::de::from_str(xml_content)?;
    debug!(
        "[parser] Deserialized registry with {} <enums> blocks and {} features",
        xml.enums.len(),
        xml.features.len()
    );

    // 2. Resolve, reconcile and validate.
    resolver::resolve_registry(xml)
}
