// crates/vk-factory-gen/src/remap.rs

//! Maps registry member types onto the C++ types a factory stores.
//!
//! A type string is split into atoms (identifiers plus one `*` per pointer
//! level), `const`/`struct` noise is dropped and the remaining shape decides
//! the mapping. The same [`TargetType`] feeds the stored field, the setter
//! argument and the getter return type, so the three can never disagree.

use crate::codegen::factory_name;
use crate::error::GenError;
use vk_registry::lexical::type_atoms;
use vk_registry::{ArraySize, Registry, StructMember, VulkanType, CHAIN_LINK_MEMBER};

// --- Target Types ---

/// How a member is stored, defaulted and materialized by its factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// C scalars and registry base types, copied by value.
    Scalar,
    /// Platform types the registry only names (`Window`), copied by value.
    Opaque,
    Handle,
    Enum,
    Bitmask,
    FunctionPointer,
    /// A C union, stored raw and zero-filled by default.
    Union,
    /// A struct value, stored as that struct's factory.
    NestedFactory,
    /// `char*`
    String,
    /// `char**`
    StringArray,
    /// A pointer to non-struct elements.
    Vector,
    /// A pointer to struct elements, stored as factories.
    FactoryVector,
    /// A double pointer to non-`char`, non-`void` elements.
    NestedVector { factories: bool },
    /// `void*` or a pointer to an opaque platform type, kept raw.
    UntypedPointer,
    /// `void**` or a double pointer to an opaque platform type, kept raw.
    UntypedDoublePointer,
    /// The `pNext` extension chain.
    ChainLink,
    /// A fixed-size C array (`float[3][4]`).
    StaticArray { factories: bool },
}

/// The C++ representation of one struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetType {
    /// The C++ type stored in the factory (`std::vector<uint32_t>`).
    pub expr: String,
    pub class: TypeClass,
    /// The referenced type: the struct name for factory classes, the element
    /// type for containers and the type itself otherwise.
    pub base: String,
}

impl TargetType {
    fn new(expr: impl Into<String>, class: TypeClass, base: &str) -> Self {
        TargetType {
            expr: expr.into(),
            class,
            base: base.to_string(),
        }
    }

    /// Whether accessors pass the value by const reference.
    pub fn by_reference(&self) -> bool {
        matches!(
            self.class,
            TypeClass::String
                | TypeClass::StringArray
                | TypeClass::Vector
                | TypeClass::FactoryVector
                | TypeClass::NestedVector { .. }
                | TypeClass::NestedFactory
                | TypeClass::StaticArray { .. }
        )
    }

    /// The type used by both the setter argument and the getter return value.
    pub fn accessor_type(&self) -> String {
        if self.by_reference() {
            format!("const {}&", self.expr)
        } else {
            self.expr.clone()
        }
    }
}

// --- Remapping ---

/// Read-only lookup state for the remapper.
#[derive(Debug, Clone, Copy)]
pub struct RemapContext<'a> {
    pub registry: &'a Registry,
}

impl<'a> RemapContext<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        RemapContext { registry }
    }

    fn classify(&self, name: &str) -> Option<TypeClass> {
        let class = match self.registry.resolve(name)? {
            VulkanType::Struct(_) => TypeClass::NestedFactory,
            VulkanType::Union(_) => TypeClass::Union,
            VulkanType::Handle(_) => TypeClass::Handle,
            VulkanType::Enum(_) => TypeClass::Enum,
            VulkanType::Bitmask(_) => TypeClass::Bitmask,
            VulkanType::FunctionPointer(_) => TypeClass::FunctionPointer,
            VulkanType::BaseType(b) if b.base.is_some() => TypeClass::Scalar,
            VulkanType::BaseType(_) => TypeClass::Opaque,
            VulkanType::External(e) if e.c_type => TypeClass::Scalar,
            VulkanType::External(_) => TypeClass::Opaque,
            _ => return None,
        };
        Some(class)
    }

    /// The canonical struct name behind a struct or struct alias.
    fn canonical_struct(&self, name: &str) -> Option<&'a str> {
        self.registry.struct_named(name).map(|s| s.name.as_str())
    }
}

/// Maps a member type onto its C++ representation.
///
/// A member named `pNext` always maps to the shared chain link, whatever its
/// declared type. Any other shape without a mapping is an
/// [`GenError::UnmappableType`] carrying the literal type string.
pub fn remap(
    member_type: &str,
    member_name: &str,
    array_sizes: &[ArraySize],
    ctx: &RemapContext<'_>,
) -> Result<TargetType, GenError> {
    if member_name == CHAIN_LINK_MEMBER {
        return Ok(TargetType::new(
            "std::shared_ptr<ChainLink>",
            TypeClass::ChainLink,
            "ChainLink",
        ));
    }

    let unmappable = || GenError::UnmappableType {
        member: member_name.to_string(),
        type_name: member_type.to_string(),
    };
    let atoms: Vec<&str> = type_atoms(member_type)
        .into_iter()
        .filter(|atom| *atom != "const" && *atom != "struct")
        .collect();
    let mapped = match atoms.as_slice() {
        [base] => remap_value(base, ctx),
        [base, "*"] => remap_pointer(base, ctx),
        [base, "*", "*"] => remap_double_pointer(base, ctx),
        _ => None,
    }
    .ok_or_else(unmappable)?;

    if array_sizes.is_empty() {
        return Ok(mapped);
    }

    // Only value types can be array elements; `char*[4]` has no representation.
    let factories = match mapped.class {
        TypeClass::NestedFactory => true,
        TypeClass::Scalar
        | TypeClass::Opaque
        | TypeClass::Handle
        | TypeClass::Enum
        | TypeClass::Bitmask
        | TypeClass::FunctionPointer
        | TypeClass::Union => false,
        _ => return Err(unmappable()),
    };
    let expr = array_sizes.iter().rev().fold(mapped.expr, |inner, size| {
        format!("std::array<{}, {}>", inner, array_extent(size))
    });
    Ok(TargetType {
        expr,
        class: TypeClass::StaticArray { factories },
        base: mapped.base,
    })
}

/// Remaps a struct member, naming the owning struct in errors.
pub fn remap_member(
    owner: &str,
    member: &StructMember,
    ctx: &RemapContext<'_>,
) -> Result<TargetType, GenError> {
    remap(&member.type_name, &member.name, &member.array_sizes, ctx).map_err(|e| match e {
        GenError::UnmappableType { member, type_name } => GenError::UnmappableType {
            member: format!("{}::{}", owner, member),
            type_name,
        },
        other => other,
    })
}

/// The C++ expression for one static array dimension.
pub fn array_extent(size: &ArraySize) -> String {
    match size {
        ArraySize::Literal(n) => n.to_string(),
        ArraySize::Constant(name) => name.clone(),
    }
}

fn remap_value(base: &str, ctx: &RemapContext<'_>) -> Option<TargetType> {
    if base == "void" {
        return None;
    }
    let class = ctx.classify(base)?;
    if class == TypeClass::NestedFactory {
        let s = ctx.canonical_struct(base)?;
        return Some(TargetType::new(factory_name(s), class, s));
    }
    Some(TargetType::new(base, class, base))
}

fn remap_pointer(base: &str, ctx: &RemapContext<'_>) -> Option<TargetType> {
    match base {
        "char" => return Some(TargetType::new("std::string", TypeClass::String, base)),
        "void" => return Some(TargetType::new("void*", TypeClass::UntypedPointer, base)),
        _ => {}
    }
    match ctx.classify(base)? {
        TypeClass::NestedFactory => {
            let s = ctx.canonical_struct(base)?;
            Some(TargetType::new(
                format!("std::vector<{}>", factory_name(s)),
                TypeClass::FactoryVector,
                s,
            ))
        }
        TypeClass::Opaque => Some(TargetType::new(
            format!("{}*", base),
            TypeClass::UntypedPointer,
            base,
        )),
        _ => Some(TargetType::new(
            format!("std::vector<{}>", base),
            TypeClass::Vector,
            base,
        )),
    }
}

fn remap_double_pointer(base: &str, ctx: &RemapContext<'_>) -> Option<TargetType> {
    match base {
        "char" => {
            return Some(TargetType::new(
                "std::vector<std::string>",
                TypeClass::StringArray,
                base,
            ));
        }
        "void" => {
            return Some(TargetType::new(
                "void**",
                TypeClass::UntypedDoublePointer,
                base,
            ));
        }
        _ => {}
    }
    match ctx.classify(base)? {
        TypeClass::NestedFactory => {
            let s = ctx.canonical_struct(base)?;
            Some(TargetType::new(
                format!("std::vector<std::vector<{}>>", factory_name(s)),
                TypeClass::NestedVector { factories: true },
                s,
            ))
        }
        TypeClass::Opaque => Some(TargetType::new(
            format!("{}**", base),
            TypeClass::UntypedDoublePointer,
            base,
        )),
        _ => Some(TargetType::new(
            format!("std::vector<std::vector<{}>>", base),
            TypeClass::NestedVector { factories: false },
            base,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_registry::load_registry_from_str;

    const REGISTRY: &str = r#"<registry>
        <platforms><platform name="xlib" protect="VK_USE_PLATFORM_XLIB_KHR"/></platforms>
        <types>
            <type name="X11/Xlib.h" category="include">#include &lt;X11/Xlib.h&gt;</type>
            <type requires="vk_platform" name="void"/>
            <type requires="vk_platform" name="char"/>
            <type requires="vk_platform" name="float"/>
            <type requires="vk_platform" name="uint32_t"/>
            <type requires="X11/Xlib.h" name="Display"/>
            <type category="basetype">typedef <type>uint32_t</type> <name>VkFlags</name>;</type>
            <type category="basetype">struct <name>ANativeWindow</name>;</type>
            <type category="bitmask">typedef <type>VkFlags</type> <name>VkThingFlags</name>;</type>
            <type category="handle"><type>VK_DEFINE_HANDLE</type>(<name>VkDevice</name>)</type>
            <type name="VkThingMode" category="enum"/>
            <type category="funcpointer">typedef void (VKAPI_PTR *<name>PFN_vkVoidFunction</name>)(void);</type>
            <type category="struct" name="VkExtent2D">
                <member><type>uint32_t</type> <name>width</name></member>
            </type>
            <type category="struct" name="VkExtent2DKHR" alias="VkExtent2D"/>
            <type category="union" name="VkClearColorValue">
                <member><type>float</type> <name>float32</name>[4]</member>
            </type>
        </types>
        <enums name="VkThingMode" type="enum">
            <enum value="0" name="VK_THING_MODE_DEFAULT"/>
        </enums>
    </registry>"#;

    fn check(registry: &Registry, ty: &str, name: &str, sizes: &[ArraySize]) -> TargetType {
        remap(ty, name, sizes, &RemapContext::new(registry)).unwrap()
    }

    #[test]
    fn test_chain_link_ignores_declared_type() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        for declared in ["const void*", "void*", "const struct VkBaseInStructure*"] {
            let mapped = check(&registry, declared, "pNext", &[]);
            assert_eq!(mapped.class, TypeClass::ChainLink);
            assert_eq!(mapped.expr, "std::shared_ptr<ChainLink>");
        }
    }

    #[test]
    fn test_single_token_shapes() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let cases = [
            ("uint32_t", TypeClass::Scalar, "uint32_t"),
            ("VkFlags", TypeClass::Scalar, "VkFlags"),
            ("VkThingFlags", TypeClass::Bitmask, "VkThingFlags"),
            ("VkThingMode", TypeClass::Enum, "VkThingMode"),
            ("VkDevice", TypeClass::Handle, "VkDevice"),
            ("PFN_vkVoidFunction", TypeClass::FunctionPointer, "PFN_vkVoidFunction"),
            ("VkClearColorValue", TypeClass::Union, "VkClearColorValue"),
            ("VkExtent2D", TypeClass::NestedFactory, "VkExtent2DFactory"),
            ("VkExtent2DKHR", TypeClass::NestedFactory, "VkExtent2DFactory"),
        ];
        for (ty, class, expr) in cases {
            let mapped = check(&registry, ty, "value", &[]);
            assert_eq!((mapped.class, mapped.expr.as_str()), (class, expr), "{}", ty);
        }
    }

    #[test]
    fn test_pointer_shapes() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let cases = [
            ("const char*", TypeClass::String, "std::string"),
            ("void*", TypeClass::UntypedPointer, "void*"),
            ("Display*", TypeClass::UntypedPointer, "Display*"),
            ("struct ANativeWindow*", TypeClass::UntypedPointer, "ANativeWindow*"),
            ("const uint32_t*", TypeClass::Vector, "std::vector<uint32_t>"),
            ("const VkDevice*", TypeClass::Vector, "std::vector<VkDevice>"),
            (
                "const VkExtent2DKHR*",
                TypeClass::FactoryVector,
                "std::vector<VkExtent2DFactory>",
            ),
            ("const char* const*", TypeClass::StringArray, "std::vector<std::string>"),
            ("void**", TypeClass::UntypedDoublePointer, "void**"),
            (
                "const float* const*",
                TypeClass::NestedVector { factories: false },
                "std::vector<std::vector<float>>",
            ),
            (
                "const VkExtent2D* const*",
                TypeClass::NestedVector { factories: true },
                "std::vector<std::vector<VkExtent2DFactory>>",
            ),
        ];
        for (ty, class, expr) in cases {
            let mapped = check(&registry, ty, "pValue", &[]);
            assert_eq!((mapped.class, mapped.expr.as_str()), (class, expr), "{}", ty);
        }
    }

    #[test]
    fn test_static_arrays_nest_outermost_first() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let sizes = [ArraySize::Literal(3), ArraySize::Literal(4)];
        let mapped = check(&registry, "float", "matrix", &sizes);
        assert_eq!(mapped.expr, "std::array<std::array<float, 4>, 3>");
        assert_eq!(mapped.class, TypeClass::StaticArray { factories: false });

        let sizes = [ArraySize::Constant("VK_UUID_SIZE".to_string())];
        let mapped = check(&registry, "VkExtent2D", "extents", &sizes);
        assert_eq!(mapped.expr, "std::array<VkExtent2DFactory, VK_UUID_SIZE>");
        assert_eq!(mapped.class, TypeClass::StaticArray { factories: true });
        assert_eq!(mapped.base, "VkExtent2D");
    }

    #[test]
    fn test_accessor_type_is_derived_from_stored_type() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let by_value = check(&registry, "VkDevice", "device", &[]);
        assert_eq!(by_value.accessor_type(), "VkDevice");
        let by_ref = check(&registry, "const uint32_t*", "pIndices", &[]);
        assert_eq!(by_ref.accessor_type(), "const std::vector<uint32_t>&");
        let link = check(&registry, "const void*", "pNext", &[]);
        assert_eq!(link.accessor_type(), link.expr);
    }

    #[test]
    fn test_unmappable_shapes_are_errors() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let ctx = RemapContext::new(&registry);
        for ty in ["void***", "void", "VkUnknown", "const VkUnknown*"] {
            match remap(ty, "value", &[], &ctx) {
                Err(GenError::UnmappableType { type_name, .. }) => assert_eq!(type_name, ty),
                other => panic!("Expected UnmappableType for {}, got {:?}", ty, other),
            }
        }
        assert!(remap("const char*", "names", &[ArraySize::Literal(2)], &ctx).is_err());
    }

    #[test]
    fn test_remap_member_names_owner() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let member = StructMember {
            type_name: "void***".to_string(),
            name: "pppData".to_string(),
            array_sizes: Vec::new(),
            expected_value: None,
            len: None,
            null_terminated: false,
            no_auto_validity: false,
            optional: false,
            bitfield_width: None,
            selection: None,
        };
        let err = remap_member("VkThing", &member, &RemapContext::new(&registry)).unwrap_err();
        assert!(matches!(
            err,
            GenError::UnmappableType { member, .. } if member == "VkThing::pppData"
        ));
    }
}
