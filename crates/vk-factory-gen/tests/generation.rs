// crates/vk-factory-gen/tests/generation.rs

//! End-to-end tests running the generator over the reduced registry shared
//! with `vk-registry`.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use vk_factory_gen::codegen::{field_name, getter_name, setter_name};
use vk_factory_gen::remap::{remap_member, RemapContext, TypeClass};
use vk_factory_gen::sequencer::{sequence, struct_dependencies};
use vk_factory_gen::{
    generate, run, run_from_file, GenError, GeneratorConfig, InclusionPolicy, TARGETS,
};
use vk_registry::{load_registry_from_str, Registry};

/// Helper to locate the registry fixture of the sibling crate.
fn registry_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../vk-registry/tests/data/mini_vk.xml")
}

fn config_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(file_name)
}

fn load_registry() -> (String, Registry) {
    let _ = env_logger::builder().is_test(true).try_init();
    let xml = fs::read_to_string(registry_path()).expect("Failed to read fixture");
    let registry = load_registry_from_str(&xml).expect("Fixture should parse");
    (xml, registry)
}

fn all_extensions_config() -> GeneratorConfig {
    GeneratorConfig::from_json_file(&config_path("all_extensions.json"))
        .expect("Config fixture should load")
}

#[test]
fn test_core_structs_are_sequenced_dependencies_first() {
    let (_, registry) = load_registry();
    let config = GeneratorConfig::default();

    // 1. Select the structs of VK_VERSION_1_0 (and their dependencies).
    let selection = InclusionPolicy::new(&registry, &config).select().unwrap();

    // 2. Sequence: roots in name order, each after its dependencies.
    let order = sequence(&registry, &selection.structs);
    assert_eq!(
        order,
        vec![
            "VkAllocationCallbacks",
            "VkApplicationInfo",
            "VkBufferCreateInfo",
            "VkExtent3D",
            "VkOffset3D",
            "VkImageRegion",
            "VkInstanceCreateInfo",
            "VkPhysicalDeviceProperties",
        ]
    );

    // 3. Sequencing is idempotent.
    assert_eq!(order, sequence(&registry, &selection.structs));
}

#[test]
fn test_every_dependency_precedes_its_dependent() {
    let (_, registry) = load_registry();
    let all: BTreeSet<String> = registry.structs().map(|s| s.name.clone()).collect();
    let order = sequence(&registry, &all);
    assert_eq!(order.len(), all.len());

    let position = |name: &str| order.iter().position(|n| n == name).unwrap();
    for s in registry.structs() {
        for dependency in struct_dependencies(&registry, s) {
            assert!(
                position(dependency) < position(&s.name),
                "{} must precede {}",
                dependency,
                s.name
            );
        }
    }
}

#[test]
fn test_every_fixture_member_is_mappable() {
    let (_, registry) = load_registry();
    let ctx = RemapContext::new(&registry);
    for s in registry.structs() {
        for member in &s.members {
            let mapped = remap_member(&s.name, member, &ctx);
            assert!(mapped.is_ok(), "{}::{} -> {:?}", s.name, member.name, mapped);
        }
    }
}

#[test]
fn test_pnext_member_maps_to_chain_link() {
    let (_, registry) = load_registry();
    let info = registry.struct_named("VkApplicationInfo").unwrap();
    let pnext = info.member("pNext").unwrap();
    assert_eq!(pnext.type_name, "const void*");

    let mapped = remap_member(&info.name, pnext, &RemapContext::new(&registry)).unwrap();
    assert_eq!(mapped.class, TypeClass::ChainLink);
    assert_eq!(mapped.expr, "std::shared_ptr<ChainLink>");
}

#[test]
fn test_struct_factories_materialize_owned_members() {
    let (_, registry) = load_registry();
    let files = generate(&registry, &GeneratorConfig::default()).unwrap();
    assert_eq!(files.target, "struct_factories");

    // Header: prelude, forward declarations, then classes in sequence order.
    let header = &files.header;
    assert!(header.contains("class Sidecar {"));
    assert!(header.contains("class ChainLink {"));
    assert!(header.contains("class VkInstanceCreateInfoFactory;\n"));
    let offset = header.find("class VkOffset3DFactory : public ChainLink").unwrap();
    let region = header.find("class VkImageRegionFactory : public ChainLink").unwrap();
    assert!(offset < region);
    assert!(header.contains("  std::array<VkOffset3DFactory, 2> srcOffsets_;\n"));
    assert!(header.contains("  std::array<char, VK_MAX_PHYSICAL_DEVICE_NAME_SIZE> deviceName_;\n"));
    assert!(header.contains("  std::vector<std::string> ppEnabledLayerNames_;\n"));
    assert!(header.contains("  std::vector<VkApplicationInfoFactory> pApplicationInfo_;\n"));

    // Source: defaults and materialization.
    let source = &files.source;
    assert!(source.contains("  sType_ = VK_STRUCTURE_TYPE_INSTANCE_CREATE_INFO;\n"));
    assert!(source.contains("  flags_ = static_cast<VkInstanceCreateFlags>(0);\n"));
    assert!(source.contains("  pfnAllocation_ = nullptr;\n"));
    assert!(source.contains("  size_ = 0;\n"));
    assert!(source.contains(
        "  out.ppEnabledLayerNames = sidecar.CopyStringArray(ppEnabledLayerNames_);\n"
    ));
    assert!(source.contains(
        "  out.pQueueFamilyIndices = sidecar.CopyArray(pQueueFamilyIndices_);\n"
    ));
    assert!(source.contains("  out.extent = extent_.Generate(sidecar.Subordinate());\n"));
    assert!(source.contains(
        "  std::memcpy(out.pipelineCacheUUID, pipelineCacheUUID_.data(), sizeof(out.pipelineCacheUUID));\n"
    ));
}

#[test]
fn test_field_setter_and_getter_share_one_type() {
    let (_, registry) = load_registry();
    let config = all_extensions_config();
    let header = generate(&registry, &config).unwrap().header;
    let selection = InclusionPolicy::new(&registry, &config).select().unwrap();
    let ctx = RemapContext::new(&registry);

    for name in &selection.structs {
        let s = registry.struct_named(name).unwrap();
        for member in &s.members {
            let target = remap_member(&s.name, member, &ctx).unwrap();
            let accessor = target.accessor_type();
            for declaration in [
                format!("  void {}({} value);\n", setter_name(&member.name), accessor),
                format!("  {} {}() const;\n", accessor, getter_name(&member.name)),
                format!("  {} {};\n", target.expr, field_name(&member.name)),
            ] {
                assert!(
                    header.contains(&declaration),
                    "{}::{} is missing `{}`",
                    s.name,
                    member.name,
                    declaration.trim()
                );
            }
        }
    }
}

#[test]
fn test_chain_materialization_is_generated_and_tested() {
    let (_, registry) = load_registry();
    let mut config = all_extensions_config();
    config.output_dir = PathBuf::from("unused");
    let files = generate(&registry, &config).unwrap();

    assert!(files.header.contains("namespace vk {\nnamespace factories {\n"));
    assert!(files.source.contains(
        "void* VkExternalMemoryBufferCreateInfoFactory::GenerateChainLink(Sidecar sidecar) const {\n\
         \x20 VkExternalMemoryBufferCreateInfo* link = sidecar.Allocate<VkExternalMemoryBufferCreateInfo>(1);\n\
         \x20 *link = Generate(sidecar.Subordinate());\n\
         \x20 return link;\n\
         }\n"
    ));

    let tests = &files.tests;
    assert!(tests.contains("TEST(VkBufferCreateInfoFactory, ChainMaterialization) {"));
    // Both extending structs are chained, in name order.
    assert!(tests.contains(
        "  auto first = std::make_shared<VkExternalMemoryBufferCreateInfoFactory>();\n\
         \x20 auto second = std::make_shared<VkMemoryBarrier2Factory>();\n\
         \x20 first->setPNext(second);\n\
         \x20 factory.setPNext(first);\n"
    ));
    assert!(tests.contains(
        "  EXPECT_EQ(factory.ChainSize(), AlignToPointer(sizeof(VkExternalMemoryBufferCreateInfo)) + AlignToPointer(sizeof(VkMemoryBarrier2)));\n"
    ));
    assert!(tests.contains("  ASSERT_NE(out.pNext, nullptr);\n"));
    assert!(tests.contains(
        "  EXPECT_EQ(next->sType, VK_STRUCTURE_TYPE_EXTERNAL_MEMORY_BUFFER_CREATE_INFO);\n"
    ));
    assert!(tests.contains("  ASSERT_NE(next->pNext, nullptr);\n"));
    assert!(tests.contains("  EXPECT_EQ(last->sType, VK_STRUCTURE_TYPE_MEMORY_BARRIER_2);\n"));
    assert!(tests.contains("  EXPECT_EQ(last->pNext, nullptr);\n"));
    // VK_EXT_debug_report is excluded, so VkInstanceCreateInfo has no known link.
    assert!(!tests.contains("TEST(VkInstanceCreateInfoFactory, ChainMaterialization)"));
    assert!(!files.header.contains("VkDebugReportCallbackCreateInfoEXTFactory"));
}

#[test]
fn test_platform_structs_are_guarded() {
    let (_, registry) = load_registry();
    let files = generate(&registry, &all_extensions_config()).unwrap();

    assert!(files.header.contains(
        "#ifdef VK_USE_PLATFORM_XLIB_KHR\nclass VkXlibSurfaceCreateInfoKHRFactory : public ChainLink {"
    ));
    assert!(files.source.contains("  out.dpy = dpy_;\n"));
    assert!(files.source.contains("  window_ = {};\n"));
    assert!(files.tests.contains("#endif  // VK_USE_PLATFORM_XLIB_KHR\n"));
    // Core structs stay unguarded.
    assert!(files.header.contains(
        "\nclass VkMemoryBarrier2Factory : public ChainLink {"
    ));
}

#[test]
fn test_output_is_reproducible() {
    let (_, registry) = load_registry();
    let config = all_extensions_config();
    for target in TARGETS {
        let config = GeneratorConfig {
            target: target.to_string(),
            ..config.clone()
        };
        let first = generate(&registry, &config).unwrap();
        let second = generate(&registry, &config).unwrap();
        assert_eq!(first, second, "target {}", target);
    }
}

#[test]
fn test_handle_remapper_covers_vulkan_handles() {
    let (_, registry) = load_registry();
    let config = GeneratorConfig {
        target: "handle_remapper".to_string(),
        ..Default::default()
    };
    let files = generate(&registry, &config).unwrap();
    assert!(files.header.contains("void AddVkInstanceHandle(VulkanHandle captureHandle, VulkanHandle replayHandle);"));
    assert!(files.header.contains("std::map<VulkanHandle, uint32_t> vkBufferRefCounts_;"));
    assert!(!files.header.contains("vkDeviceRefCounts_"));
    // The vulkansc-only handle is not part of the model.
    assert!(!files.header.contains("VkSafetyOnlyHandle"));
    assert!(files.tests.contains("TEST(HandleRemapper, VkBufferRedefinitionIsCounted)"));
}

#[test]
fn test_run_writes_all_files() {
    let (xml, registry) = load_registry();
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig {
        output_dir: dir.path().join("out"),
        ..Default::default()
    };

    let written = run_from_file(&registry_path(), &config).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["struct_factories.h", "struct_factories.cc", "struct_factories_tests.cc"]
    );

    let expected = generate(&registry, &config).unwrap();
    let header = fs::read_to_string(dir.path().join("out/struct_factories.h")).unwrap();
    assert_eq!(header, expected.header);

    // Running again over the same input produces identical files.
    run(&xml, &config).unwrap();
    let again = fs::read_to_string(dir.path().join("out/struct_factories.h")).unwrap();
    assert_eq!(header, again);
}

#[test]
fn test_failed_run_writes_nothing() {
    let (xml, _) = load_registry();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let config = GeneratorConfig {
        target: "vulkan_layer".to_string(),
        output_dir: out.clone(),
        ..Default::default()
    };
    assert!(matches!(run(&xml, &config), Err(GenError::UnknownTarget(_))));
    assert!(!out.exists());

    let config = GeneratorConfig {
        api_versions: vec!["VK_VERSION_2_0".to_string()],
        output_dir: out.clone(),
        ..Default::default()
    };
    assert!(matches!(run(&xml, &config), Err(GenError::UnknownVersion(_))));
    assert!(!out.exists());

    let broken = xml.replace("</types>", "");
    assert!(matches!(run(&broken, &config), Err(GenError::Registry(_))));
    assert!(!out.exists());
}

#[test]
fn test_missing_registry_file_is_an_io_error() {
    let config = GeneratorConfig::default();
    let missing = config_path("no_such_registry.xml");
    match run_from_file(&missing, &config) {
        Err(GenError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("Expected Io error, got {:?}", other),
    }
}
