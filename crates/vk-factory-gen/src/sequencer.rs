// crates/vk-factory-gen/src/sequencer.rs

//! Orders structs so that every struct is emitted after the structs its
//! members reference.
//!
//! The order is a depth-first post-order: roots are taken in ascending name
//! order and the dependencies of a struct in member declaration order, so the
//! result only depends on the registry contents.

use std::collections::BTreeSet;
use vk_registry::lexical::plain_typename;
use vk_registry::{Registry, Struct, CHAIN_LINK_MEMBER};

/// Canonical names of the structs `s` references through its members, in
/// member order and without duplicates.
///
/// Self references and the `pNext` chain link are not dependencies.
pub fn struct_dependencies<'a>(registry: &'a Registry, s: &Struct) -> Vec<&'a str> {
    let mut dependencies: Vec<&'a str> = Vec::new();
    for member in s.members.iter().filter(|m| m.name != CHAIN_LINK_MEMBER) {
        let Some(target) = registry.struct_named(&plain_typename(&member.type_name)) else {
            continue;
        };
        if target.name != s.name && !dependencies.contains(&target.name.as_str()) {
            dependencies.push(&target.name);
        }
    }
    dependencies
}

/// Sequences the `selected` structs in dependency order.
///
/// Dependencies outside `selected` are not emitted. Names that do not denote
/// a canonical struct are ignored.
pub fn sequence(registry: &Registry, selected: &BTreeSet<String>) -> Vec<String> {
    let mut visited = BTreeSet::new();
    let mut order = Vec::with_capacity(selected.len());
    for name in selected {
        visit(registry, selected, name, &mut visited, &mut order);
    }
    order
}

fn visit(
    registry: &Registry,
    selected: &BTreeSet<String>,
    name: &str,
    visited: &mut BTreeSet<String>,
    order: &mut Vec<String>,
) {
    let Some(s) = registry.struct_named(name) else {
        return;
    };
    // Marked on entry so reference cycles terminate.
    if !visited.insert(s.name.clone()) {
        return;
    }
    for dependency in struct_dependencies(registry, s) {
        if selected.contains(dependency) {
            visit(registry, selected, dependency, visited, order);
        }
    }
    order.push(s.name.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use vk_registry::load_registry_from_str;

    fn registry(structs: &str) -> Registry {
        let xml = format!(
            r#"<registry><types>
                <type requires="vk_platform" name="uint32_t"/>
                {}
            </types></registry>"#,
            structs
        );
        load_registry_from_str(&xml).unwrap()
    }

    fn all(registry: &Registry) -> BTreeSet<String> {
        registry.structs().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_pointer_dependency_comes_first() {
        let registry = registry(
            r#"<type category="struct" name="A">
                <member>const <type>B</type>* <name>pB</name></member>
            </type>
            <type category="struct" name="B">
                <member><type>uint32_t</type> <name>value</name></member>
            </type>"#,
        );
        assert_eq!(sequence(&registry, &all(&registry)), vec!["B", "A"]);
    }

    #[test]
    fn test_self_reference_is_not_a_dependency() {
        let registry = registry(
            r#"<type category="struct" name="Node">
                <member>const <type>Node</type>* <name>pChild</name></member>
            </type>"#,
        );
        let s = registry.struct_named("Node").unwrap();
        assert!(struct_dependencies(&registry, s).is_empty());
        assert_eq!(sequence(&registry, &all(&registry)), vec!["Node"]);
    }

    #[test]
    fn test_aliases_resolve_and_components_are_covered() {
        let registry = registry(
            r#"<type category="struct" name="Outer">
                <member><type>InnerKHR</type> <name>inner</name></member>
                <member><type>Inner</type> <name>again</name></member>
            </type>
            <type category="struct" name="Inner">
                <member><type>uint32_t</type> <name>value</name></member>
            </type>
            <type category="struct" name="InnerKHR" alias="Inner"/>
            <type category="struct" name="Alone">
                <member><type>uint32_t</type> <name>value</name></member>
            </type>"#,
        );
        let outer = registry.struct_named("Outer").unwrap();
        assert_eq!(struct_dependencies(&registry, outer), vec!["Inner"]);

        let order = sequence(&registry, &all(&registry));
        assert_eq!(order, vec!["Alone", "Inner", "Outer"]);
        assert_eq!(order, sequence(&registry, &all(&registry)));

        // An alias in the selection emits its canonical struct once.
        let selected = BTreeSet::from(["Inner".to_string(), "InnerKHR".to_string()]);
        assert_eq!(sequence(&registry, &selected), vec!["Inner"]);
    }

    #[test]
    fn test_unselected_dependencies_are_skipped() {
        let registry = registry(
            r#"<type category="struct" name="A">
                <member><type>B</type> <name>b</name></member>
            </type>
            <type category="struct" name="B">
                <member><type>uint32_t</type> <name>value</name></member>
            </type>"#,
        );
        let selected = BTreeSet::from(["A".to_string()]);
        assert_eq!(sequence(&registry, &selected), vec!["A"]);
    }
}
