// crates/vk-registry/tests/robustness.rs

//! Integration tests focused on error handling and edge cases.
//!
//! These tests ensure the parser reports structural errors for documents that
//! violate the registry dialect (unknown categories, bad bit positions, alias
//! chains, dangling references, conflicting enum values) without panicking.

use vk_registry::{RegistryError, load_registry_from_str};

/// A minimal valid registry used as a base for creating corrupted test cases.
const MINIMAL_VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
    <types>
        <type requires="vk_platform" name="void"/>
        <type requires="vk_platform" name="uint32_t"/>
        <type category="basetype">typedef <type>uint32_t</type> <name>VkFlags</name>;</type>
        <type name="VkStructureType" category="enum"/>
        <type category="struct" name="VkThing">
            <member values="VK_STRUCTURE_TYPE_THING"><type>VkStructureType</type> <name>sType</name></member>
            <member optional="true">const <type>void</type>* <name>pNext</name></member>
            <member><type>uint32_t</type> <name>count</name></member>
        </type>
        <!-- EXTRA_TYPES -->
    </types>
    <enums name="VkStructureType" type="enum">
        <enum value="0" name="VK_STRUCTURE_TYPE_THING"/>
    </enums>
    <!-- EXTRA_ENUMS -->
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <type name="VkThing"/>
            <!-- EXTRA_REQUIRE -->
        </require>
    </feature>
    <extensions>
        <!-- EXTRA_EXTENSIONS -->
    </extensions>
</registry>
"#;

/// Helper to build a registry with extra content spliced into the template.
fn registry_with(types: &str, enums: &str, require: &str, extensions: &str) -> String {
    MINIMAL_VALID_XML
        .replace("<!-- EXTRA_TYPES -->", types)
        .replace("<!-- EXTRA_ENUMS -->", enums)
        .replace("<!-- EXTRA_REQUIRE -->", require)
        .replace("<!-- EXTRA_EXTENSIONS -->", extensions)
}

fn parse(xml: &str) -> Result<vk_registry::Registry, RegistryError> {
    let _ = env_logger::builder().is_test(true).try_init();
    load_registry_from_str(xml)
}

#[test]
fn test_minimal_template_is_valid() {
    let registry = parse(MINIMAL_VALID_XML).expect("Template should parse");
    assert!(registry.struct_named("VkThing").is_some());
}

#[test]
fn test_malformed_xml() {
    let xml = MINIMAL_VALID_XML.replace("</types>", "");
    assert!(matches!(parse(&xml), Err(RegistryError::XmlParsing(_))));
}

#[test]
fn test_unknown_type_category() {
    let xml = registry_with(
        r#"<type category="template" name="VkTemplate"/>"#,
        "",
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::UnknownCategory { category, .. }) if category == "template"
    ));
}

#[test]
fn test_bitpos_out_of_range_for_32_bit_enum() {
    let xml = registry_with(
        r#"<type name="VkThingFlagBits" category="enum"/>"#,
        r#"<enums name="VkThingFlagBits" type="bitmask">
            <enum bitpos="32" name="VK_THING_TOO_HIGH_BIT"/>
        </enums>"#,
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::InvalidAttributeFormat { attribute: "bitpos", .. })
    ));
}

#[test]
fn test_unsupported_bitwidth() {
    let xml = registry_with(
        r#"<type name="VkThingFlagBits" category="enum"/>"#,
        r#"<enums name="VkThingFlagBits" type="bitmask" bitwidth="16"/>"#,
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::UnsupportedBitWidth { .. })
    ));
}

#[test]
fn test_enum_field_with_value_and_bitpos() {
    let xml = registry_with(
        r#"<type name="VkThingFlagBits" category="enum"/>"#,
        r#"<enums name="VkThingFlagBits" type="bitmask">
            <enum value="1" bitpos="0" name="VK_THING_AMBIGUOUS_BIT"/>
        </enums>"#,
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::InvalidElement { .. })
    ));
}

#[test]
fn test_alias_chain_is_rejected() {
    let xml = registry_with(
        r#"<type category="struct" name="VkThingKHR" alias="VkThing"/>
        <type category="struct" name="VkThingEXT" alias="VkThingKHR"/>"#,
        "",
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::AliasChain { alias, target }) if alias == "VkThingEXT" && target == "VkThingKHR"
    ));
}

#[test]
fn test_unresolved_member_type() {
    let xml = registry_with(
        r#"<type category="struct" name="VkOther">
            <member><type>VkUndeclared</type> <name>value</name></member>
        </type>"#,
        "",
        "",
        "",
    );
    match parse(&xml) {
        Err(RegistryError::UnresolvedReference {
            name,
            referenced_by,
        }) => {
            assert_eq!(name, "VkUndeclared");
            assert_eq!(referenced_by, "VkOther::value");
        }
        other => panic!("Expected UnresolvedReference, got {:?}", other),
    }
}

#[test]
fn test_unresolved_required_type() {
    let xml = registry_with("", "", r#"<type name="VkMissing"/>"#, "");
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::UnresolvedReference { name, .. }) if name == "VkMissing"
    ));
}

#[test]
fn test_duplicate_struct() {
    let xml = registry_with(
        r#"<type category="struct" name="VkThing">
            <member><type>uint32_t</type> <name>other</name></member>
        </type>"#,
        "",
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::DuplicateName { name, .. }) if name == "VkThing"
    ));
}

#[test]
fn test_unknown_handle_definer() {
    let xml = registry_with(
        r#"<type category="handle"><type>VK_DEFINE_OPAQUE</type>(<name>VkWidget</name>)</type>"#,
        "",
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::InvalidElement { element, .. }) if element == "VkWidget"
    ));
}

#[test]
fn test_function_pointer_with_double_pointer_argument() {
    let xml = registry_with(
        r#"<type category="funcpointer">typedef void (VKAPI_PTR *<name>PFN_vkBad</name>)(
    <type>void</type>**                                      ppData);</type>"#,
        "",
        "",
        "",
    );
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::InvalidElement { .. })
    ));
}

#[test]
fn test_conflicting_enum_values_across_extensions() {
    let extensions = r#"
        <extension name="VK_KHR_first" number="2" supported="vulkan">
            <require>
                <enum offset="0" extends="VkStructureType" extnumber="5" name="VK_STRUCTURE_TYPE_SHARED"/>
            </require>
        </extension>
        <extension name="VK_KHR_second" number="3" supported="vulkan">
            <require>
                <enum offset="1" extends="VkStructureType" extnumber="5" name="VK_STRUCTURE_TYPE_SHARED"/>
            </require>
        </extension>"#;
    let xml = registry_with("", "", "", extensions);
    assert!(matches!(
        parse(&xml),
        Err(RegistryError::ConflictingEnumValue {
            existing: 1_000_004_000,
            new: 1_000_004_001,
            ..
        })
    ));
}

#[test]
fn test_identical_enum_redeclaration_is_idempotent() {
    let extensions = r#"
        <extension name="VK_KHR_first" number="2" supported="vulkan">
            <require>
                <enum offset="0" extends="VkStructureType" extnumber="5" name="VK_STRUCTURE_TYPE_SHARED"/>
            </require>
        </extension>
        <extension name="VK_KHR_second" number="3" supported="vulkan">
            <require>
                <enum offset="0" extends="VkStructureType" extnumber="5" name="VK_STRUCTURE_TYPE_SHARED"/>
            </require>
        </extension>"#;
    let registry = parse(&registry_with("", "", "", extensions)).unwrap();
    let structure_type = registry.enum_named("VkStructureType").unwrap();
    assert_eq!(structure_type.fields.len(), 2);
}

#[test]
fn test_enum_alias_colliding_with_field() {
    let extensions = r#"
        <extension name="VK_KHR_first" number="2" supported="vulkan">
            <require>
                <enum extends="VkStructureType" name="VK_STRUCTURE_TYPE_THING" alias="VK_STRUCTURE_TYPE_THING"/>
            </require>
        </extension>"#;
    assert!(matches!(
        parse(&registry_with("", "", "", extensions)),
        Err(RegistryError::EnumAliasCollision { .. })
    ));
}

#[test]
fn test_offset_without_extnumber_in_core_version() {
    let require =
        r#"<enum offset="0" extends="VkStructureType" name="VK_STRUCTURE_TYPE_ORPHAN"/>"#;
    assert!(matches!(
        parse(&registry_with("", "", require, "")),
        Err(RegistryError::MissingAttribute {
            attribute: "extnumber",
            ..
        })
    ));
}

#[test]
fn test_extension_without_number() {
    let extensions = r#"<extension name="VK_KHR_numberless" supported="vulkan"/>"#;
    assert!(matches!(
        parse(&registry_with("", "", "", extensions)),
        Err(RegistryError::MissingAttribute {
            attribute: "number",
            ..
        })
    ));
}

#[test]
fn test_disabled_extension_with_dangling_references_is_ignored() {
    let extensions = r#"
        <extension name="VK_NV_unused" number="99" supported="disabled">
            <require>
                <enum offset="0" extends="VkNotAnEnum" name="VK_NOT_A_FIELD"/>
                <type name="VkNotAType"/>
            </require>
        </extension>"#;
    let registry = parse(&registry_with("", "", "", extensions)).unwrap();
    assert!(registry.extensions.is_empty());
}
