// crates/vk-factory-gen/src/targets/struct_factories.rs

//! The `struct_factories` target.
//!
//! Every selected struct `VkFoo` gets a `VkFooFactory` class that owns its
//! member values (strings, vectors and nested factories instead of raw
//! pointers), exposes `set`/`get` accessors and materializes the wire struct
//! with `Generate(Sidecar)`. Dynamically sized data is copied into the
//! `Sidecar` arena, so the wire struct stays valid as long as the arena does.
//! `pNext` holds any factory through the abstract `ChainLink` interface.

use super::{close_namespace, open_namespace, GenerateTarget};
use crate::codegen::{
    factory_name, field_name, generated_header, getter_name, protect, setter_name, Argument,
    ClassDefinition, Method,
};
use crate::config::{GeneratorConfig, InclusionPolicy};
use crate::error::GenError;
use crate::remap::{array_extent, remap_member, RemapContext, TargetType, TypeClass};
use crate::sequencer::sequence;
use log::{debug, info};
use std::fmt::Write;
use vk_registry::{Registry, Struct, StructMember, CHAIN_LINK_MEMBER};

pub const NAME: &str = "struct_factories";

/// Declarations shared by every factory: the arena and the chain interface.
const PRELUDE: &str = r#"// Rounds `size` up to a multiple of the pointer width.
inline size_t AlignToPointer(size_t size) {
  return (size + sizeof(void*) - 1) / sizeof(void*) * sizeof(void*);
}

// Owns every allocation made while materializing a struct and its extension
// chain. Subordinate views share the backing blocks of the view they were
// created from, so pointers written into materialized structs stay valid
// while any view is alive.
class Sidecar {
  using Blocks = std::vector<std::unique_ptr<unsigned char[]>>;

 public:
  Sidecar() : blocks_(std::make_shared<Blocks>()) {}

  Sidecar Subordinate() const { return Sidecar(blocks_); }

  size_t BlockCount() const { return blocks_->size(); }

  template <typename T>
  T* Allocate(size_t count) {
    if (count == 0) return nullptr;
    std::unique_ptr<unsigned char[]> block(new unsigned char[sizeof(T) * count]);
    T* items = reinterpret_cast<T*>(block.get());
    for (size_t i = 0; i < count; ++i) new (items + i) T();
    blocks_->push_back(std::move(block));
    return items;
  }

  template <typename T>
  T* CopyArray(const std::vector<T>& values) {
    T* items = Allocate<T>(values.size());
    for (size_t i = 0; i < values.size(); ++i) items[i] = values[i];
    return items;
  }

  char* CopyString(const std::string& value) {
    char* text = Allocate<char>(value.size() + 1);
    std::memcpy(text, value.c_str(), value.size() + 1);
    return text;
  }

  const char** CopyStringArray(const std::vector<std::string>& values) {
    const char** items = Allocate<const char*>(values.size());
    for (size_t i = 0; i < values.size(); ++i) items[i] = CopyString(values[i]);
    return items;
  }

  template <typename T>
  T** CopyNestedArray(const std::vector<std::vector<T>>& values) {
    T** rows = Allocate<T*>(values.size());
    for (size_t i = 0; i < values.size(); ++i) rows[i] = CopyArray(values[i]);
    return rows;
  }

 private:
  explicit Sidecar(std::shared_ptr<Blocks> blocks) : blocks_(std::move(blocks)) {}

  std::shared_ptr<Blocks> blocks_;
};

// A factory that can be attached to a pNext chain.
class ChainLink {
 public:
  virtual ~ChainLink() = default;

  // Size of the wire struct this factory materializes.
  virtual size_t Size() const = 0;

  // Combined pointer-aligned size of the links attached behind this one.
  virtual size_t ChainSize() const = 0;

  // Pointer-aligned size of this link plus everything attached behind it.
  size_t ChainLinkSize() const { return AlignToPointer(Size()) + ChainSize(); }

  // Materializes the wire struct into `sidecar` and returns its address.
  virtual void* GenerateChainLink(Sidecar sidecar) const = 0;
};
"#;

/// One struct ready for emission.
#[derive(Debug)]
struct FactoryPlan<'a> {
    source: &'a Struct,
    members: Vec<(&'a StructMember, TargetType)>,
    /// Platform guards; empty for unconditionally compiled structs.
    guards: Vec<String>,
}

impl FactoryPlan<'_> {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn factory(&self) -> String {
        factory_name(&self.source.name)
    }
}

/// Generates one factory class per selected struct, in dependency order.
pub struct StructFactories<'a> {
    registry: &'a Registry,
    config: &'a GeneratorConfig,
    plans: Vec<FactoryPlan<'a>>,
}

impl<'a> StructFactories<'a> {
    /// Selects, orders and remaps the structs to generate.
    ///
    /// # Errors
    /// Configuration errors from the inclusion policy and
    /// [`GenError::UnmappableType`] for any member without a C++ mapping.
    pub fn new(registry: &'a Registry, config: &'a GeneratorConfig) -> Result<Self, GenError> {
        let selection = InclusionPolicy::new(registry, config).select()?;
        let ctx = RemapContext::new(registry);

        let mut plans = Vec::with_capacity(selection.structs.len());
        for name in sequence(registry, &selection.structs) {
            let Some(source) = registry.struct_named(&name) else {
                continue;
            };
            let members = source
                .members
                .iter()
                .map(|m| Ok((m, remap_member(&source.name, m, &ctx)?)))
                .collect::<Result<Vec<_>, GenError>>()?;
            plans.push(FactoryPlan {
                source,
                members,
                guards: selection
                    .guards
                    .get(&name)
                    .map(|g| g.iter().cloned().collect())
                    .unwrap_or_default(),
            });
        }
        info!("[{}] Planned {} factories", NAME, plans.len());
        Ok(StructFactories {
            registry,
            config,
            plans,
        })
    }

    /// The struct names in emission order.
    pub fn factories(&self) -> Vec<&str> {
        self.plans.iter().map(FactoryPlan::name).collect()
    }

    fn plan(&self, name: &str) -> Option<&FactoryPlan<'a>> {
        self.plans.iter().find(|p| p.name() == name)
    }

    fn class(&self, plan: &FactoryPlan<'_>) -> Result<ClassDefinition, GenError> {
        let factory = plan.factory();
        let mut class = ClassDefinition::new(factory.as_str());
        class.bases.push("ChainLink".to_string());

        let mut defaults = String::new();
        for (member, target) in &plan.members {
            if let Some(statement) = default_statement(plan.name(), member, target)? {
                writeln!(defaults, "{}", statement)?;
            }
        }
        class.methods.push(Method::new(factory.as_str(), "").body(defaults));

        for (member, target) in &plan.members {
            let field = field_name(&member.name);
            class.methods.push(
                Method::new(setter_name(&member.name), "void")
                    .arg(target.accessor_type(), "value")
                    .body(format!("{} = value;\n", field)),
            );
            class.methods.push(
                Method::new(getter_name(&member.name), target.accessor_type())
                    .constant()
                    .body(format!("return {};\n", field)),
            );
            class
                .private_fields
                .push(Argument::new(target.expr.as_str(), field));
        }

        class.methods.push(
            Method::new("Size", "size_t")
                .constant()
                .overriding()
                .body(format!("return sizeof({});\n", plan.name())),
        );
        let chain_size = if plan.source.has_chain_link() {
            let link = field_name(CHAIN_LINK_MEMBER);
            format!("return {0} ? {0}->ChainLinkSize() : 0;\n", link)
        } else {
            "return 0;\n".to_string()
        };
        class.methods.push(
            Method::new("ChainSize", "size_t")
                .constant()
                .overriding()
                .body(chain_size),
        );

        let mut generate = String::new();
        writeln!(generate, "{} out;", plan.name())?;
        writeln!(generate, "std::memset(&out, 0, sizeof(out));")?;
        for (member, target) in &plan.members {
            generate.push_str(&generate_statement(member, target));
        }
        writeln!(generate, "return out;")?;
        class.methods.push(
            Method::new("Generate", plan.name())
                .arg("Sidecar", "sidecar")
                .constant()
                .body(generate),
        );
        class.methods.push(
            Method::new("GenerateChainLink", "void*")
                .arg("Sidecar", "sidecar")
                .constant()
                .overriding()
                .body(format!(
                    "{0}* link = sidecar.Allocate<{0}>(1);\n\
                     *link = Generate(sidecar.Subordinate());\n\
                     return link;\n",
                    plan.name()
                )),
        );
        Ok(class)
    }

    /// The two links attached by the chain materialization test of `plan`:
    /// selected structs that extend `plan` and carry their own chain link.
    /// With a single such struct, two instances of it form the chain.
    fn chain_test_links(&self, plan: &FactoryPlan<'_>) -> Option<[&FactoryPlan<'a>; 2]> {
        if !plan.source.has_chain_link() {
            return None;
        }
        let mut links = self
            .registry
            .extending_structs(plan.name())
            .filter(|s| s.has_chain_link())
            .filter_map(|s| self.plan(&s.name));
        let first = links.next()?;
        let second = links.next().unwrap_or(first);
        Some([first, second])
    }
}

// --- Member Statements ---

/// The constructor statement giving `member` its default value, if any.
fn default_statement(
    owner: &str,
    member: &StructMember,
    target: &TargetType,
) -> Result<Option<String>, GenError> {
    let field = field_name(&member.name);
    let unsupported = |reason| GenError::UnsupportedDefault {
        member: format!("{}::{}", owner, member.name),
        reason,
    };

    if let Some(expected) = &member.expected_value {
        return match target.class {
            TypeClass::Scalar | TypeClass::Enum | TypeClass::Bitmask | TypeClass::Handle => {
                Ok(Some(format!("{} = {};", field, expected)))
            }
            TypeClass::Union => Err(unsupported("a union can only be zero-filled")),
            _ => Err(unsupported("only value members can hold an expected value")),
        };
    }

    let statement = match target.class {
        TypeClass::Scalar => format!("{} = 0;", field),
        TypeClass::Handle => format!("{} = VK_NULL_HANDLE;", field),
        TypeClass::Enum | TypeClass::Bitmask => {
            format!("{} = static_cast<{}>(0);", field, target.expr)
        }
        TypeClass::FunctionPointer | TypeClass::UntypedPointer | TypeClass::UntypedDoublePointer => {
            format!("{} = nullptr;", field)
        }
        TypeClass::Opaque | TypeClass::StaticArray { factories: false } => {
            format!("{} = {{}};", field)
        }
        TypeClass::Union => format!("std::memset(&{0}, 0, sizeof({0}));", field),
        // Owning members start out empty through their own constructors.
        TypeClass::NestedFactory
        | TypeClass::StaticArray { factories: true }
        | TypeClass::String
        | TypeClass::StringArray
        | TypeClass::Vector
        | TypeClass::FactoryVector
        | TypeClass::NestedVector { .. }
        | TypeClass::ChainLink => return Ok(None),
    };
    Ok(Some(statement))
}

/// The `Generate` statements writing `member` into the wire struct `out`.
fn generate_statement(member: &StructMember, target: &TargetType) -> String {
    let name = &member.name;
    let field = field_name(name);
    match target.class {
        TypeClass::Scalar
        | TypeClass::Opaque
        | TypeClass::Handle
        | TypeClass::Enum
        | TypeClass::Bitmask
        | TypeClass::FunctionPointer
        | TypeClass::Union
        | TypeClass::UntypedPointer
        | TypeClass::UntypedDoublePointer => format!("out.{} = {};\n", name, field),
        TypeClass::String if member.optional => format!(
            "out.{0} = {1}.empty() ? nullptr : sidecar.CopyString({1});\n",
            name, field
        ),
        TypeClass::String => format!("out.{} = sidecar.CopyString({});\n", name, field),
        TypeClass::StringArray => format!("out.{} = sidecar.CopyStringArray({});\n", name, field),
        TypeClass::Vector => format!("out.{} = sidecar.CopyArray({});\n", name, field),
        TypeClass::NestedVector { factories: false } => {
            format!("out.{} = sidecar.CopyNestedArray({});\n", name, field)
        }
        TypeClass::NestedVector { factories: true } => format!(
            "{{\n  \
               auto** rows = sidecar.Allocate<{base}*>({field}.size());\n  \
               for (size_t i = 0; i < {field}.size(); ++i) {{\n    \
                 auto* row = sidecar.Allocate<{base}>({field}[i].size());\n    \
                 for (size_t j = 0; j < {field}[i].size(); ++j) {{\n      \
                   row[j] = {field}[i][j].Generate(sidecar.Subordinate());\n    \
                 }}\n    \
                 rows[i] = row;\n  \
               }}\n  \
               out.{name} = rows;\n\
             }}\n",
            base = target.base
        ),
        TypeClass::FactoryVector => format!(
            "{{\n  \
               auto* items = sidecar.Allocate<{base}>({field}.size());\n  \
               for (size_t i = 0; i < {field}.size(); ++i) {{\n    \
                 items[i] = {field}[i].Generate(sidecar.Subordinate());\n  \
               }}\n  \
               out.{name} = items;\n\
             }}\n",
            base = target.base
        ),
        TypeClass::NestedFactory => {
            format!("out.{} = {}.Generate(sidecar.Subordinate());\n", name, field)
        }
        TypeClass::StaticArray { factories: false } => format!(
            "std::memcpy(out.{0}, {1}.data(), sizeof(out.{0}));\n",
            name, field
        ),
        TypeClass::StaticArray { factories: true } => {
            let mut loops = String::new();
            let mut index = String::new();
            for (depth, size) in member.array_sizes.iter().enumerate() {
                let pad = "  ".repeat(depth);
                loops.push_str(&format!(
                    "{pad}for (size_t i{depth} = 0; i{depth} < {extent}; ++i{depth}) {{\n",
                    extent = array_extent(size)
                ));
                index.push_str(&format!("[i{}]", depth));
            }
            let depth = member.array_sizes.len();
            loops.push_str(&format!(
                "{}out.{}{} = {}{}.Generate(sidecar.Subordinate());\n",
                "  ".repeat(depth),
                name,
                index,
                field,
                index
            ));
            for level in (0..depth).rev() {
                loops.push_str(&format!("{}}}\n", "  ".repeat(level)));
            }
            loops
        }
        TypeClass::ChainLink => format!(
            "out.{0} = {1} ? static_cast<decltype(out.{0})>({1}->GenerateChainLink(sidecar.Subordinate())) : nullptr;\n",
            name, field
        ),
    }
}

// --- Files ---

impl GenerateTarget for StructFactories<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn header(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#pragma once")?;
        writeln!(out)?;
        for include in [
            "array", "cstddef", "cstdint", "cstring", "memory", "new", "string", "vector",
        ] {
            writeln!(out, "#include <{}>", include)?;
        }
        writeln!(out)?;
        writeln!(out, "#include <vulkan/vulkan.h>")?;
        writeln!(out)?;
        out.push_str(&open_namespace(&self.config.namespace));
        writeln!(out)?;
        out.push_str(PRELUDE);
        writeln!(out)?;
        for plan in &self.plans {
            writeln!(out, "class {};", plan.factory())?;
        }
        for plan in &self.plans {
            writeln!(out)?;
            let class = self.class(plan)?.declaration()?;
            out.push_str(&protect(&class, &plan.guards));
        }
        writeln!(out)?;
        out.push_str(&close_namespace(&self.config.namespace));
        debug!("[{}] Rendered header ({} bytes)", NAME, out.len());
        Ok(out)
    }

    fn source(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#include \"{}.h\"", NAME)?;
        writeln!(out)?;
        out.push_str(&open_namespace(&self.config.namespace));
        for plan in &self.plans {
            writeln!(out)?;
            let definitions = self.class(plan)?.definitions();
            out.push_str(&protect(&definitions, &plan.guards));
        }
        writeln!(out)?;
        out.push_str(&close_namespace(&self.config.namespace));
        debug!("[{}] Rendered source ({} bytes)", NAME, out.len());
        Ok(out)
    }

    fn tests(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#include \"{}.h\"", NAME)?;
        writeln!(out)?;
        writeln!(out, "#include <memory>")?;
        writeln!(out)?;
        writeln!(out, "#include <gtest/gtest.h>")?;
        writeln!(out)?;
        writeln!(out, "using namespace {};", self.config.namespace)?;

        for plan in &self.plans {
            writeln!(out)?;
            out.push_str(&protect(&defaults_test(plan)?, &plan.guards));
            if let Some(links) = self.chain_test_links(plan) {
                writeln!(out)?;
                let [first, second] = links;
                let mut test = protect(&chain_test(plan, links)?, &first.guards);
                if second.name() != first.name() {
                    test = protect(&test, &second.guards);
                }
                out.push_str(&protect(&test, &plan.guards));
            }
        }

        writeln!(out)?;
        writeln!(out, "int main(int argc, char** argv) {{")?;
        writeln!(out, "  ::testing::InitGoogleTest(&argc, argv);")?;
        writeln!(out, "  return RUN_ALL_TESTS();")?;
        writeln!(out, "}}")?;
        Ok(out)
    }
}

/// Checks defaults, sizes and an empty materialization of one factory.
fn defaults_test(plan: &FactoryPlan<'_>) -> Result<String, GenError> {
    let mut out = String::new();
    writeln!(out, "TEST({}, DefaultsAndSize) {{", plan.factory())?;
    writeln!(out, "  {} factory;", plan.factory())?;
    writeln!(out, "  EXPECT_EQ(factory.Size(), sizeof({}));", plan.name())?;
    writeln!(out, "  EXPECT_EQ(factory.ChainSize(), 0u);")?;
    for (member, _) in &plan.members {
        if let Some(expected) = &member.expected_value {
            writeln!(
                out,
                "  EXPECT_EQ(factory.{}(), {});",
                getter_name(&member.name),
                expected
            )?;
        }
    }
    writeln!(out, "  Sidecar sidecar;")?;
    writeln!(out, "  {} out = factory.Generate(sidecar);", plan.name())?;
    for (member, target) in &plan.members {
        if target.class == TypeClass::ChainLink {
            writeln!(out, "  EXPECT_EQ(out.{}, nullptr);", member.name)?;
        }
        if let Some(expected) = &member.expected_value {
            writeln!(out, "  EXPECT_EQ(out.{}, {});", member.name, expected)?;
        }
    }
    writeln!(out, "}}")?;
    Ok(out)
}

/// Attaches a chain of two links to `plan` and checks that each
/// materialized link points at the next one.
fn chain_test(plan: &FactoryPlan<'_>, links: [&FactoryPlan<'_>; 2]) -> Result<String, GenError> {
    let [first, second] = links;
    let set_link = setter_name(CHAIN_LINK_MEMBER);
    let mut out = String::new();
    writeln!(out, "TEST({}, ChainMaterialization) {{", plan.factory())?;
    writeln!(out, "  {} factory;", plan.factory())?;
    writeln!(out, "  auto first = std::make_shared<{}>();", first.factory())?;
    writeln!(out, "  auto second = std::make_shared<{}>();", second.factory())?;
    writeln!(out, "  first->{}(second);", set_link)?;
    writeln!(out, "  factory.{}(first);", set_link)?;
    writeln!(
        out,
        "  EXPECT_EQ(factory.ChainSize(), AlignToPointer(sizeof({})) + AlignToPointer(sizeof({})));",
        first.name(),
        second.name()
    )?;
    writeln!(out, "  Sidecar sidecar;")?;
    writeln!(out, "  {} out = factory.Generate(sidecar);", plan.name())?;
    // Links are allocated through subordinate views of `sidecar`.
    writeln!(out, "  EXPECT_GE(sidecar.BlockCount(), 2u);")?;
    writeln!(out, "  ASSERT_NE(out.{}, nullptr);", CHAIN_LINK_MEMBER)?;
    writeln!(
        out,
        "  const auto* next = static_cast<const {}*>(out.{});",
        first.name(),
        CHAIN_LINK_MEMBER
    )?;
    expected_values(&mut out, "next", first)?;
    writeln!(out, "  ASSERT_NE(next->{}, nullptr);", CHAIN_LINK_MEMBER)?;
    writeln!(
        out,
        "  const auto* last = static_cast<const {}*>(next->{});",
        second.name(),
        CHAIN_LINK_MEMBER
    )?;
    expected_values(&mut out, "last", second)?;
    writeln!(out, "  EXPECT_EQ(last->{}, nullptr);", CHAIN_LINK_MEMBER)?;
    writeln!(out, "}}")?;
    Ok(out)
}

/// Checks the expected member values of the link behind `pointer`.
fn expected_values(out: &mut String, pointer: &str, link: &FactoryPlan<'_>) -> Result<(), GenError> {
    for (member, _) in &link.members {
        if let Some(expected) = &member.expected_value {
            writeln!(out, "  EXPECT_EQ({}->{}, {});", pointer, member.name, expected)?;
        }
    }
    Ok(())
}
