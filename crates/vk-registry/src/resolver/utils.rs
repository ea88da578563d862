// crates/vk-registry/src/resolver/utils.rs

//! Utility functions for the resolver.

use crate::error::RegistryError;
use crate::lexical::{self, split_list};
use crate::model::{Fragment, TypeContent};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Whether an element's `@api` list includes Vulkan. Elements without the
/// attribute apply to every API.
pub(super) fn supports_vulkan(api: Option<&str>) -> bool {
    api.is_none_or(|list| split_list(list).contains(&"vulkan"))
}

/// Returns a mandatory attribute or a `MissingAttribute` error naming `context`.
pub(super) fn required<'a>(
    value: &'a Option<String>,
    attribute: &'static str,
    context: &str,
) -> Result<&'a str, RegistryError> {
    value
        .as_deref()
        .ok_or_else(|| RegistryError::MissingAttribute {
            attribute,
            context: context.to_string(),
        })
}

/// Parses an unsigned attribute, accepting decimal or `0x` hex.
pub(super) fn parse_u32(attribute: &'static str, value: &str) -> Result<u32, RegistryError> {
    let trimmed = value.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|_| RegistryError::InvalidAttributeFormat {
        attribute,
        value: value.to_string(),
    })
}

/// `Some("true")` -> `true`; any other value or absence -> `false`.
pub(super) fn is_true(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

/// The first entry of a list attribute such as `optional="true,false"` is `true`.
pub(super) fn first_is_true(value: &Option<String>) -> bool {
    value
        .as_deref()
        .and_then(|v| split_list(v).first().copied())
        == Some("true")
}

/// Splits an optional list attribute into owned names.
pub(super) fn list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .map(|v| split_list(v).into_iter().map(String::from).collect())
        .unwrap_or_default()
}

/// Treats an empty attribute the same as a missing one.
pub(super) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Inserts `value` under `name`, failing if the name is already taken.
pub(super) fn insert_unique<V>(
    map: &mut BTreeMap<String, V>,
    category: &'static str,
    name: String,
    value: V,
) -> Result<(), RegistryError> {
    if map.contains_key(&name) {
        return Err(RegistryError::DuplicateName { category, name });
    }
    map.insert(name, value);
    Ok(())
}

// --- Mixed-content declarations ---

/// A declaration reassembled from text→`<type>`→tail→`<name>`→tail fragments.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Declaration {
    /// Text before `<type>` (`const`, `struct`, `typedef`).
    pub prefix: String,
    /// Text of `<type>`.
    pub base: Option<String>,
    /// Text between `<type>` and `<name>` (pointer stars, `const`).
    pub tail: String,
    /// Text of `<name>`.
    pub name: Option<String>,
    /// Everything after `<name>` (`[<enum>N</enum>]`, `:24`, `;`).
    pub suffix: String,
}

impl Declaration {
    pub(super) fn from_fragments(fragments: &[Fragment]) -> Self {
        let mut decl = Declaration::default();
        for fragment in fragments {
            let text = match fragment {
                Fragment::Comment(_) => continue,
                Fragment::Type(t) if decl.base.is_none() && decl.name.is_none() => {
                    decl.base = Some(t.trim().to_string());
                    continue;
                }
                Fragment::Name(n) if decl.name.is_none() => {
                    decl.name = Some(n.trim().to_string());
                    continue;
                }
                Fragment::Text(t) | Fragment::Type(t) | Fragment::Name(t) | Fragment::Enum(t) => t,
            };
            let target = if decl.name.is_some() {
                &mut decl.suffix
            } else if decl.base.is_some() {
                &mut decl.tail
            } else {
                &mut decl.prefix
            };
            target.push_str(text);
        }
        decl
    }

    /// The canonical type string: prefix, base and tail in document order.
    pub(super) fn type_string(&self) -> Option<String> {
        self.base
            .as_deref()
            .map(|base| lexical::assemble_type(&self.prefix, base, &self.tail))
    }
}

/// Extracts the plain fragments from a `<type>` element's content, dropping
/// nested `<member>`, `<proto>` and `<param>` elements.
pub(super) fn fragments_of(content: &[TypeContent]) -> Vec<Fragment> {
    content
        .iter()
        .filter_map(|c| match c {
            TypeContent::Text(t) => Some(Fragment::Text(t.clone())),
            TypeContent::Type(t) => Some(Fragment::Type(t.clone())),
            TypeContent::Name(n) => Some(Fragment::Name(n.clone())),
            TypeContent::Comment(c) => Some(Fragment::Comment(c.clone())),
            TypeContent::Member(_) | TypeContent::Proto(_) | TypeContent::Param(_) => None,
        })
        .collect()
}

/// Concatenates every text fragment of an element.
pub(super) fn all_text(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .filter_map(|f| match f {
            Fragment::Comment(_) => None,
            Fragment::Text(t) | Fragment::Type(t) | Fragment::Name(t) | Fragment::Enum(t) => {
                Some(t.as_str())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn text(s: &str) -> Fragment {
        Fragment::Text(s.to_string())
    }

    #[test]
    fn test_supports_vulkan() {
        assert!(supports_vulkan(None));
        assert!(supports_vulkan(Some("vulkan")));
        assert!(supports_vulkan(Some("vulkansc,vulkan")));
        assert!(!supports_vulkan(Some("vulkansc")));
    }

    #[test]
    fn test_declaration_splits_fragments() {
        // const <type>char</type>* const* <name>ppEnabledLayerNames</name>
        let fragments = vec![
            text("const "),
            Fragment::Type("char".to_string()),
            text("* const*      "),
            Fragment::Name("ppEnabledLayerNames".to_string()),
        ];
        let decl = Declaration::from_fragments(&fragments);
        assert_eq!(decl.name.as_deref(), Some("ppEnabledLayerNames"));
        assert_eq!(decl.type_string().as_deref(), Some("const char* const*"));
        assert!(decl.suffix.is_empty());
    }

    #[test]
    fn test_declaration_collects_array_suffix() {
        // <type>char</type> <name>deviceName</name>[<enum>VK_MAX_PHYSICAL_DEVICE_NAME_SIZE</enum>]
        let fragments = vec![
            Fragment::Type("char".to_string()),
            text(" "),
            Fragment::Name("deviceName".to_string()),
            text("["),
            Fragment::Enum("VK_MAX_PHYSICAL_DEVICE_NAME_SIZE".to_string()),
            text("]"),
            Fragment::Comment("ignored".to_string()),
        ];
        let decl = Declaration::from_fragments(&fragments);
        assert_eq!(decl.suffix, "[VK_MAX_PHYSICAL_DEVICE_NAME_SIZE]");
        assert_eq!(decl.type_string().as_deref(), Some("char"));
    }

    #[test]
    fn test_parse_u32_accepts_hex() {
        assert_eq!(parse_u32("number", "42").unwrap(), 42);
        assert_eq!(parse_u32("number", "0x10").unwrap(), 16);
        assert!(parse_u32("number", "x").is_err());
    }

    #[test]
    fn test_insert_unique_rejects_duplicates() {
        let mut map = BTreeMap::new();
        insert_unique(&mut map, "struct", "VkFoo".to_string(), 1).unwrap();
        let err = insert_unique(&mut map, "struct", "VkFoo".to_string(), 2).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { category: "struct", .. }));
    }
}
