// crates/vk-factory-gen/src/targets/handle_remapper.rs

//! The `handle_remapper` target: a class translating handles recorded at
//! capture time into the handles created during replay.
//!
//! Dispatchable handles are unique objects, so registering one twice is an
//! error. Non-dispatchable handles may legally be returned more than once by
//! the driver; they are reference counted and only a conflicting replay
//! value is rejected.

use super::{close_namespace, open_namespace, GenerateTarget};
use crate::codegen::{
    exception_declaration, generated_header, lower_first, upper_first, Argument, ClassDefinition,
    Method,
};
use crate::config::GeneratorConfig;
use crate::error::GenError;
use std::fmt::Write;
use vk_registry::{Handle, Registry};

pub const NAME: &str = "handle_remapper";

const CLASS: &str = "HandleRemapper";
const HANDLE_TYPE: &str = "VulkanHandle";

const INTERNAL_CONSISTENCY: &str = "InternalConsistencyException";
const COLLISION: &str = "HandleCollisionException";
const REDEFINITION: &str = "HandleRedefinitionException";
const UNKNOWN_REMOVAL: &str = "UnknownHandleRemovalException";
const UNKNOWN_REMAP: &str = "UnknownHandleRemapException";

// --- Naming ---

fn add_name(handle: &str) -> String {
    format!("Add{}Handle", upper_first(handle))
}

fn remove_name(handle: &str) -> String {
    format!("Remove{}Handle", upper_first(handle))
}

fn remap_name(handle: &str) -> String {
    format!("Remap{}Handle", upper_first(handle))
}

fn handles_field(handle: &str) -> String {
    format!("{}Handles_", lower_first(handle))
}

fn counts_field(handle: &str) -> String {
    format!("{}RefCounts_", lower_first(handle))
}

// --- Accessor Bodies ---

/// The bookkeeping scheme of one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleKind {
    Dispatchable,
    /// Reference counted.
    NonDispatchable,
}

impl HandleKind {
    fn of(handle: &Handle) -> Self {
        if handle.dispatchable {
            HandleKind::Dispatchable
        } else {
            HandleKind::NonDispatchable
        }
    }

    fn add_body(self, handle: &str) -> String {
        let map = handles_field(handle);
        let counts = counts_field(handle);
        match self {
            HandleKind::Dispatchable => format!(
                "if ({map}.count(captureHandle) != 0) throw {COLLISION}();\n\
                 {map}[captureHandle] = replayHandle;\n"
            ),
            HandleKind::NonDispatchable => format!(
                "auto handle = {map}.find(captureHandle);\n\
                 auto count = {counts}.find(captureHandle);\n\
                 if (handle == {map}.end()) {{\n  \
                   if (count != {counts}.end()) throw {INTERNAL_CONSISTENCY}();\n  \
                   {map}.emplace(captureHandle, replayHandle);\n  \
                   {counts}.emplace(captureHandle, 1);\n  \
                   return;\n\
                 }}\n\
                 if (count == {counts}.end() || count->second == 0) throw {INTERNAL_CONSISTENCY}();\n\
                 if (handle->second != replayHandle) throw {REDEFINITION}();\n\
                 ++count->second;\n"
            ),
        }
    }

    fn remove_body(self, handle: &str) -> String {
        let map = handles_field(handle);
        let counts = counts_field(handle);
        match self {
            HandleKind::Dispatchable => format!(
                "if ({map}.erase(captureHandle) == 0) throw {UNKNOWN_REMOVAL}();\n"
            ),
            HandleKind::NonDispatchable => format!(
                "auto handle = {map}.find(captureHandle);\n\
                 auto count = {counts}.find(captureHandle);\n\
                 if (handle == {map}.end() || count == {counts}.end()) throw {UNKNOWN_REMOVAL}();\n\
                 if (count->second == 0) throw {INTERNAL_CONSISTENCY}();\n\
                 if (--count->second == 0) {{\n  \
                   {map}.erase(handle);\n  \
                   {counts}.erase(count);\n\
                 }}\n"
            ),
        }
    }

    fn remap_body(self, handle: &str) -> String {
        let map = handles_field(handle);
        let counts = counts_field(handle);
        let lookup = format!(
            "auto handle = {map}.find(captureHandle);\n\
             if (handle == {map}.end()) throw {UNKNOWN_REMAP}();\n"
        );
        match self {
            HandleKind::Dispatchable => format!("{lookup}return handle->second;\n"),
            HandleKind::NonDispatchable => format!(
                "{lookup}auto count = {counts}.find(captureHandle);\n\
                 if (count == {counts}.end() || count->second == 0) throw {INTERNAL_CONSISTENCY}();\n\
                 return handle->second;\n"
            ),
        }
    }
}

// --- Target ---

/// Generates `HandleRemapper` for every canonical handle of the registry.
pub struct HandleRemapper<'a> {
    registry: &'a Registry,
    config: &'a GeneratorConfig,
}

impl<'a> HandleRemapper<'a> {
    pub fn new(registry: &'a Registry, config: &'a GeneratorConfig) -> Self {
        HandleRemapper { registry, config }
    }

    fn class(&self) -> ClassDefinition {
        let mut class = ClassDefinition::new(CLASS);
        class.public_declarations = vec![
            format!("{}() = default;\n", CLASS),
            format!("{0}(const {0}&) = delete;\n", CLASS),
            format!("{0}& operator=(const {0}&) = delete;\n\n", CLASS),
            exception_declaration(INTERNAL_CONSISTENCY, "std::exception"),
            exception_declaration(COLLISION, "std::exception"),
            exception_declaration(REDEFINITION, COLLISION),
            exception_declaration(UNKNOWN_REMOVAL, "std::exception"),
            exception_declaration(UNKNOWN_REMAP, "std::exception"),
            "\n".to_string(),
        ];

        for handle in self.registry.handles() {
            let kind = HandleKind::of(handle);
            class.methods.push(
                Method::new(add_name(&handle.name), "void")
                    .arg(HANDLE_TYPE, "captureHandle")
                    .arg(HANDLE_TYPE, "replayHandle")
                    .body(kind.add_body(&handle.name)),
            );
            class.methods.push(
                Method::new(remove_name(&handle.name), "void")
                    .arg(HANDLE_TYPE, "captureHandle")
                    .body(kind.remove_body(&handle.name)),
            );
            class.methods.push(
                Method::new(remap_name(&handle.name), HANDLE_TYPE)
                    .arg(HANDLE_TYPE, "captureHandle")
                    .constant()
                    .body(kind.remap_body(&handle.name)),
            );

            class.private_fields.push(Argument::new(
                format!("std::map<{0}, {0}>", HANDLE_TYPE),
                handles_field(&handle.name),
            ));
            if kind == HandleKind::NonDispatchable {
                class.private_fields.push(Argument::new(
                    format!("std::map<{}, uint32_t>", HANDLE_TYPE),
                    counts_field(&handle.name),
                ));
            }
        }
        class
    }
}

impl GenerateTarget for HandleRemapper<'_> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn header(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#pragma once")?;
        writeln!(out)?;
        writeln!(out, "#include <cstdint>")?;
        writeln!(out, "#include <exception>")?;
        writeln!(out, "#include <map>")?;
        writeln!(out)?;
        out.push_str(&open_namespace(&self.config.namespace));
        writeln!(out)?;
        writeln!(out, "using {} = uint64_t;", HANDLE_TYPE)?;
        writeln!(out)?;
        out.push_str(&self.class().declaration()?);
        writeln!(out)?;
        out.push_str(&close_namespace(&self.config.namespace));
        Ok(out)
    }

    fn source(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#include \"{}.h\"", NAME)?;
        writeln!(out)?;
        out.push_str(&open_namespace(&self.config.namespace));
        writeln!(out)?;
        out.push_str(&self.class().definitions());
        writeln!(out)?;
        out.push_str(&close_namespace(&self.config.namespace));
        Ok(out)
    }

    fn tests(&self) -> Result<String, GenError> {
        let mut out = generated_header(NAME);
        writeln!(out)?;
        writeln!(out, "#include \"{}.h\"", NAME)?;
        writeln!(out)?;
        writeln!(out, "#include <gtest/gtest.h>")?;
        writeln!(out)?;
        writeln!(out, "using namespace {};", self.config.namespace)?;

        for handle in self.registry.handles() {
            let name = &handle.name;
            let (add, remove, remap) = (add_name(name), remove_name(name), remap_name(name));
            write!(
                out,
                "\nTEST({CLASS}, {name}BasicRemap) {{\n  \
                   {CLASS} mapper;\n  \
                   EXPECT_THROW(mapper.{remap}(1234), {CLASS}::{UNKNOWN_REMAP});\n  \
                   EXPECT_NO_THROW(mapper.{add}(1234, 5678));\n  \
                   EXPECT_EQ(mapper.{remap}(1234), 5678u);\n  \
                   EXPECT_NO_THROW(mapper.{remove}(1234));\n  \
                   EXPECT_THROW(mapper.{remap}(1234), {CLASS}::{UNKNOWN_REMAP});\n\
                 }}\n\
                 \n\
                 TEST({CLASS}, {name}UnknownRemap) {{\n  \
                   {CLASS} mapper;\n  \
                   EXPECT_NO_THROW(mapper.{add}(1234, 5678));\n  \
                   EXPECT_THROW(mapper.{remap}(5678), {CLASS}::{UNKNOWN_REMAP});\n  \
                   EXPECT_THROW(mapper.{remove}(5678), {CLASS}::{UNKNOWN_REMOVAL});\n\
                 }}\n"
            )?;
            match HandleKind::of(handle) {
                HandleKind::Dispatchable => write!(
                    out,
                    "\nTEST({CLASS}, {name}RedefinitionCollides) {{\n  \
                       {CLASS} mapper;\n  \
                       EXPECT_NO_THROW(mapper.{add}(1234, 5678));\n  \
                       EXPECT_THROW(mapper.{add}(1234, 5678), {CLASS}::{COLLISION});\n  \
                       EXPECT_THROW(mapper.{add}(1234, 8765), {CLASS}::{COLLISION});\n  \
                       EXPECT_EQ(mapper.{remap}(1234), 5678u);\n  \
                       EXPECT_NO_THROW(mapper.{remove}(1234));\n  \
                       EXPECT_THROW(mapper.{remove}(1234), {CLASS}::{UNKNOWN_REMOVAL});\n  \
                       EXPECT_THROW(mapper.{remap}(1234), {CLASS}::{UNKNOWN_REMAP});\n\
                     }}\n"
                )?,
                HandleKind::NonDispatchable => write!(
                    out,
                    "\nTEST({CLASS}, {name}RedefinitionIsCounted) {{\n  \
                       {CLASS} mapper;\n  \
                       EXPECT_NO_THROW(mapper.{add}(1234, 5678));\n  \
                       EXPECT_NO_THROW(mapper.{add}(1234, 5678));\n  \
                       EXPECT_THROW(mapper.{add}(1234, 8765), {CLASS}::{REDEFINITION});\n  \
                       EXPECT_THROW(mapper.{add}(1234, 8765), {CLASS}::{COLLISION});\n  \
                       EXPECT_NO_THROW(mapper.{remove}(1234));\n  \
                       EXPECT_EQ(mapper.{remap}(1234), 5678u);\n  \
                       EXPECT_NO_THROW(mapper.{remove}(1234));\n  \
                       EXPECT_THROW(mapper.{remap}(1234), {CLASS}::{UNKNOWN_REMAP});\n  \
                       EXPECT_THROW(mapper.{remove}(1234), {CLASS}::{UNKNOWN_REMOVAL});\n\
                     }}\n"
                )?,
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

#[cfg(test)]
mod tests {
    use super::*;
    use vk_registry::load_registry_from_str;

    const REGISTRY: &str = r#"<registry><types>
        <type category="handle"><type>VK_DEFINE_HANDLE</type>(<name>VkInstance</name>)</type>
        <type category="handle" parent="VkInstance"><type>VK_DEFINE_NON_DISPATCHABLE_HANDLE</type>(<name>VkSurfaceKHR</name>)</type>
        <type category="handle" name="VkSurfaceEXT" alias="VkSurfaceKHR"/>
    </types></registry>"#;

    #[test]
    fn test_accessor_names() {
        assert_eq!(add_name("VkBuffer"), "AddVkBufferHandle");
        assert_eq!(remove_name("VkBuffer"), "RemoveVkBufferHandle");
        assert_eq!(remap_name("VkBuffer"), "RemapVkBufferHandle");
        assert_eq!(handles_field("VkBuffer"), "vkBufferHandles_");
        assert_eq!(counts_field("VkBuffer"), "vkBufferRefCounts_");
    }

    #[test]
    fn test_only_non_dispatchable_handles_are_counted() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let config = GeneratorConfig::default();
        let header = HandleRemapper::new(&registry, &config).header().unwrap();

        assert!(header.contains("std::map<VulkanHandle, VulkanHandle> vkInstanceHandles_;"));
        assert!(!header.contains("vkInstanceRefCounts_"));
        assert!(header.contains("std::map<VulkanHandle, uint32_t> vkSurfaceKHRRefCounts_;"));
        assert!(header.contains(
            "class HandleRedefinitionException : public HandleCollisionException {};"
        ));
        // Aliases share the canonical handle's accessors.
        assert!(!header.contains("VkSurfaceEXT"));
    }

    #[test]
    fn test_accessor_bodies_follow_handle_kind() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let config = GeneratorConfig::default();
        let source = HandleRemapper::new(&registry, &config).source().unwrap();

        assert!(source.contains(
            "void HandleRemapper::AddVkInstanceHandle(VulkanHandle captureHandle, VulkanHandle replayHandle) {\n  if (vkInstanceHandles_.count(captureHandle) != 0) throw HandleCollisionException();"
        ));
        assert!(source.contains("if (handle->second != replayHandle) throw HandleRedefinitionException();"));
        assert!(source.contains("VulkanHandle HandleRemapper::RemapVkSurfaceKHRHandle(VulkanHandle captureHandle) const {"));
        assert!(source.contains("namespace vk_factories {"));
    }

    #[test]
    fn test_generated_tests_cover_each_handle() {
        let registry = load_registry_from_str(REGISTRY).unwrap();
        let config = GeneratorConfig::default();
        let tests = HandleRemapper::new(&registry, &config).tests().unwrap();

        assert!(tests.contains("TEST(HandleRemapper, VkInstanceBasicRemap)"));
        assert!(tests.contains("TEST(HandleRemapper, VkInstanceRedefinitionCollides)"));
        assert!(tests.contains("TEST(HandleRemapper, VkSurfaceKHRRedefinitionIsCounted)"));
        assert!(tests.contains("RUN_ALL_TESTS()"));
    }
}
