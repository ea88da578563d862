// crates/vk-registry/src/types.rs

//! Public, ergonomic data structures for a parsed Vulkan registry.
//!
//! Every mapping is a `BTreeMap` keyed by the entity name, so iterating the
//! model is deterministic and generators built on top of it are reproducible.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

// --- Root Registry ---

/// A fully parsed, reconciled and validated registry.
///
/// Built once by [`crate::load_registry_from_str`] and read-only afterwards.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Registry {
    /// `<platforms>`: platform name -> protecting preprocessor guard.
    pub platforms: BTreeMap<String, Platform>,
    /// `<type category="include">` entries.
    pub includes: BTreeMap<String, Include>,
    /// Every named type, constant and macro.
    pub types: BTreeMap<String, VulkanType>,
    pub commands: BTreeMap<String, Command>,
    pub command_aliases: BTreeMap<String, Alias>,
    /// `<feature>` blocks, keyed by version name (`VK_VERSION_1_0`).
    pub core_versions: BTreeMap<String, CoreVersion>,
    /// Supported extensions; disabled ones are not part of the model.
    pub extensions: BTreeMap<String, Extension>,
    pub image_formats: BTreeMap<String, ImageFormat>,
    pub spirv: SpirvMetadata,
}

impl Registry {
    /// Looks up any type by name without alias resolution.
    pub fn get(&self, name: &str) -> Option<&VulkanType> {
        self.types.get(name)
    }

    /// Looks up a type and follows at most one alias hop to its canonical entity.
    pub fn resolve(&self, name: &str) -> Option<&VulkanType> {
        match self.types.get(name)? {
            ty if ty.is_alias() => ty.alias_target().and_then(|t| self.types.get(t)),
            ty => Some(ty),
        }
    }

    /// Iterates all canonical structs in name order.
    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.types.values().filter_map(|ty| match ty {
            VulkanType::Struct(s) => Some(s),
            _ => None,
        })
    }

    /// Returns the struct named `name`, following a struct alias.
    pub fn struct_named(&self, name: &str) -> Option<&Struct> {
        match self.resolve(name)? {
            VulkanType::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the enum named `name`, following an enum alias.
    pub fn enum_named(&self, name: &str) -> Option<&Enum> {
        match self.resolve(name)? {
            VulkanType::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the handle named `name`, following a handle alias.
    pub fn handle_named(&self, name: &str) -> Option<&Handle> {
        match self.resolve(name)? {
            VulkanType::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Iterates all canonical handles in name order.
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.types.values().filter_map(|ty| match ty {
            VulkanType::Handle(h) => Some(h),
            _ => None,
        })
    }

    /// Iterates the structs that list `base` in their `structextends`.
    pub fn extending_structs<'a>(&'a self, base: &'a str) -> impl Iterator<Item = &'a Struct> {
        self.structs()
            .filter(move |s| s.extends.iter().any(|e| e == base))
    }
}

// --- Type Variants ---

/// The closed set of entity kinds the registry declares.
#[derive(Debug, Clone, PartialEq)]
pub enum VulkanType {
    Handle(Handle),
    HandleAlias(Alias),
    Struct(Struct),
    StructAlias(Alias),
    Union(Union),
    Enum(Enum),
    EnumAlias(Alias),
    Bitmask(Bitmask),
    BitmaskAlias(Alias),
    FunctionPointer(FunctionPointer),
    Define(Define),
    BaseType(BaseType),
    External(ExternalType),
}

impl VulkanType {
    pub fn name(&self) -> &str {
        match self {
            VulkanType::Handle(h) => &h.name,
            VulkanType::Struct(s) => &s.name,
            VulkanType::Union(u) => &u.name,
            VulkanType::Enum(e) => &e.name,
            VulkanType::Bitmask(b) => &b.name,
            VulkanType::FunctionPointer(f) => &f.name,
            VulkanType::Define(d) => &d.name,
            VulkanType::BaseType(b) => &b.name,
            VulkanType::External(e) => &e.name,
            VulkanType::HandleAlias(a)
            | VulkanType::StructAlias(a)
            | VulkanType::EnumAlias(a)
            | VulkanType::BitmaskAlias(a) => &a.name,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.alias_target().is_some()
    }

    /// The aliased name, for the `*Alias` variants.
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            VulkanType::HandleAlias(a)
            | VulkanType::StructAlias(a)
            | VulkanType::EnumAlias(a)
            | VulkanType::BitmaskAlias(a) => Some(&a.target),
            _ => None,
        }
    }

    /// A short label for error messages and logs.
    pub fn category(&self) -> &'static str {
        match self {
            VulkanType::Handle(_) | VulkanType::HandleAlias(_) => "handle",
            VulkanType::Struct(_) | VulkanType::StructAlias(_) => "struct",
            VulkanType::Union(_) => "union",
            VulkanType::Enum(_) | VulkanType::EnumAlias(_) => "enum",
            VulkanType::Bitmask(_) | VulkanType::BitmaskAlias(_) => "bitmask",
            VulkanType::FunctionPointer(_) => "funcpointer",
            VulkanType::Define(_) => "define",
            VulkanType::BaseType(_) => "basetype",
            VulkanType::External(_) => "external",
        }
    }
}

/// An alias of a canonical entity. Aliases never carry structure of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub target: String,
}

// --- Handles ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    pub name: String,
    /// `VK_DEFINE_HANDLE` handles are dispatchable pointers;
    /// `VK_DEFINE_NON_DISPATCHABLE_HANDLE` handles are 64-bit values.
    pub dispatchable: bool,
    pub parent: Option<String>,
    /// `@objtypeenum`
    pub object_type: Option<String>,
}

// --- Structs and Unions ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Struct {
    pub name: String,
    /// Members in declaration (layout) order.
    pub members: Vec<StructMember>,
    /// `@structextends`: structs this one may be chained onto.
    pub extends: Vec<String>,
    pub returned_only: bool,
}

impl Struct {
    pub fn member(&self, name: &str) -> Option<&StructMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Whether the struct carries the `pNext` extension chain pointer.
    pub fn has_chain_link(&self) -> bool {
        self.members.iter().any(|m| m.name == CHAIN_LINK_MEMBER)
    }
}

/// The name of the extension chain pointer member.
pub const CHAIN_LINK_MEMBER: &str = "pNext";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub name: String,
    pub members: Vec<StructMember>,
    pub returned_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    /// Canonical type string, e.g. `"const char* const*"`.
    pub type_name: String,
    pub name: String,
    /// Static array dimensions, outermost first.
    pub array_sizes: Vec<ArraySize>,
    /// `@values`: the value a discriminator member must hold (`sType`).
    pub expected_value: Option<String>,
    /// `@len` without the `null-terminated` marker.
    pub len: Option<String>,
    pub null_terminated: bool,
    pub no_auto_validity: bool,
    pub optional: bool,
    /// C bit-field width (`uint32_t x:24`).
    pub bitfield_width: Option<u32>,
    /// `@selection`: the union discriminator value selecting this member.
    pub selection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySize {
    Literal(u32),
    /// A reference to an API constant (`VK_UUID_SIZE`).
    Constant(String),
}

// --- Enums and Bitmasks ---

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enum {
    pub name: String,
    /// Primary fields in declaration order, extension fields appended.
    pub fields: Vec<EnumField>,
    /// Field aliases, kept apart so they never perturb field order.
    pub aliases: BTreeMap<String, EnumFieldAlias>,
    pub bitmask: bool,
    /// Declared with `bitwidth="64"`.
    pub bit64: bool,
}

impl Enum {
    pub fn field(&self, name: &str) -> Option<&EnumField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Follows alias links until a primary field is reached.
    pub fn resolve_alias(&self, name: &str) -> Option<&EnumField> {
        let mut current = name;
        // Bounded by the alias count so a cyclic alias set cannot loop forever.
        for _ in 0..=self.aliases.len() {
            if let Some(field) = self.field(current) {
                return Some(field);
            }
            current = &self.aliases.get(current)?.target;
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumField {
    pub name: String,
    pub value: i64,
    /// The literal form to emit: `"0x00000010"`, `"1000122004"`, `"-4"`.
    pub representation: String,
    /// Contributed by a `<feature>` or `<extension>` rather than the enum itself.
    pub extension: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumFieldAlias {
    pub name: String,
    pub target: String,
    pub extension: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmask {
    pub name: String,
    /// `VkFlags` or `VkFlags64`.
    pub base_type: String,
    /// `@requires` / `@bitvalues`: the enum holding the bit definitions.
    pub field_enum: Option<String>,
}

// --- Function Pointers ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPointer {
    pub name: String,
    pub return_type: String,
    pub arguments: Vec<FunctionArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArgument {
    pub type_name: String,
    pub name: String,
}

// --- Constants, Base and External Types ---

/// A named constant, preprocessor macro or extension constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    /// `VK_MAKE_VERSION(major, minor, patch)` for function-like macros.
    pub signature: Option<String>,
    pub value: String,
    pub extension: bool,
}

/// A `typedef` of another type, or an opaque forward declaration when `base` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseType {
    pub name: String,
    pub base: Option<String>,
}

/// A C or platform type the registry only names (`uint32_t`, `Display`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalType {
    pub name: String,
    /// `@requires`: the header providing it.
    pub header: Option<String>,
    /// Provided by the C standard headers rather than a platform SDK.
    pub c_type: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub name: String,
    pub directive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub name: String,
    pub protect: String,
}

// --- Commands ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub return_type: String,
    pub params: Vec<CommandParam>,
    pub success_codes: Vec<String>,
    pub error_codes: Vec<String>,
    pub queues: Vec<String>,
    pub command_buffer_levels: Vec<String>,
    /// `@renderpass`: `inside`, `outside` or `both`.
    pub renderpass: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParam {
    pub type_name: String,
    pub name: String,
    pub optional: bool,
    pub extern_sync: Option<ExternSync>,
    pub len: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternSync {
    /// The whole parameter must be externally synchronized.
    Parameter,
    /// Only the named members (`pBindInfo[].buffer`) must be.
    Members(String),
}

// --- Versions and Extensions ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreVersion {
    pub name: String,
    /// `@number`, e.g. `"1.0"`.
    pub number: String,
    pub features: BTreeMap<String, Feature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
    pub enum_extension: Option<EnumExtension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Type,
    Enum,
    Command,
    /// A `<feature struct="..." name="..."/>` device feature requirement.
    Feature,
}

/// How a required `<enum>` adds to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumExtension {
    /// A new field of the enum `extends`.
    Field {
        extends: String,
        source: EnumValueSource,
    },
    /// A new alias of an existing field of `extends`.
    FieldAlias { extends: String, alias: String },
    /// A standalone constant such as `VK_KHR_SURFACE_SPEC_VERSION`.
    Constant { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValueSource {
    Value(String),
    BitPos(u32),
    /// `extnumber` is `None` when the element leaves it to the enclosing extension.
    Offset {
        extnumber: Option<u32>,
        offset: u32,
        negative: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub number: u32,
    /// `instance` or `device`.
    pub kind: Option<String>,
    pub platform: Option<String>,
    pub promoted_to: Option<String>,
    pub deprecated_by: Option<String>,
    /// `@depends` (or the older `@requires` list).
    pub depends: Option<String>,
    pub requirements: Vec<Requirement>,
}

impl Extension {
    /// All features of all requirement blocks.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.requirements.iter().flat_map(|r| r.features.values())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Requirement {
    pub depends: Option<String>,
    pub features: BTreeMap<String, Feature>,
}

// --- Image Formats ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFormat {
    pub name: String,
    pub class: String,
    pub block_size: u32,
    pub texels_per_block: u32,
    pub packed: Option<u32>,
    pub chroma: Option<String>,
    pub spirv_format: Option<String>,
    pub components: Vec<FormatComponent>,
    pub planes: Vec<FormatPlane>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatComponent {
    pub name: String,
    /// `None` for compressed formats.
    pub bits: Option<u32>,
    pub numeric_format: String,
    pub plane_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPlane {
    pub index: u32,
    pub width_divisor: u32,
    pub height_divisor: u32,
    pub compatible: String,
}

// --- SPIR-V Metadata ---

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpirvMetadata {
    pub extensions: BTreeMap<String, SpirvExtension>,
    pub capabilities: BTreeMap<String, SpirvCapability>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirvExtension {
    pub name: String,
    pub versions: Vec<String>,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirvCapability {
    pub name: String,
    pub versions: Vec<String>,
    pub extensions: Vec<String>,
    pub features: Vec<SpirvFeatureEnable>,
    pub properties: Vec<SpirvPropertyEnable>,
}

/// `<enable struct="..." feature="..." requires="..."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirvFeatureEnable {
    pub struct_name: String,
    pub feature: String,
    pub requires: Option<String>,
}

/// `<enable property="..." member="..." value="..." requires="..."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpirvPropertyEnable {
    pub property: String,
    pub member: String,
    pub value: String,
    pub requires: Option<String>,
}
