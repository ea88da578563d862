// crates/vk-factory-gen/src/config.rs

//! Generator configuration and the struct inclusion policy derived from it.

use crate::error::GenError;
use crate::sequencer::struct_dependencies;
use log::debug;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use vk_registry::{Extension, FeatureKind, Registry};

/// Selects every extension supported by the registry when listed in
/// [`ExtensionPolicy::include`].
pub const ALL_EXTENSIONS: &str = "*";

// --- Configuration ---

/// A generation run, as loaded from a JSON file.
///
/// Every field is optional; missing fields take the values of
/// [`GeneratorConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// The named generation target (`struct_factories`, `handle_remapper`).
    pub target: String,
    /// Directory receiving `<target>.h`, `<target>.cc` and `<target>_tests.cc`.
    pub output_dir: PathBuf,
    /// C++ namespace wrapping the generated code.
    pub namespace: String,
    /// Core versions whose required structs are generated.
    pub api_versions: Vec<String>,
    pub extensions: ExtensionPolicy,
    /// Marker structs never generated.
    pub excluded_structs: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            target: "struct_factories".to_string(),
            output_dir: PathBuf::from("generated"),
            namespace: "vk_factories".to_string(),
            api_versions: vec!["VK_VERSION_1_0".to_string()],
            extensions: ExtensionPolicy::default(),
            excluded_structs: vec![
                "VkBaseInStructure".to_string(),
                "VkBaseOutStructure".to_string(),
            ],
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GenError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, GenError> {
        let json = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::from_json_str(&json)
    }
}

/// Which extensions contribute structs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionPolicy {
    /// Extension names, or [`ALL_EXTENSIONS`].
    pub include: Vec<String>,
    /// Extension names removed from the included set.
    pub exclude: Vec<String>,
    /// Drops every extension tied to a window-system platform.
    pub exclude_platform_extensions: bool,
}

// --- Struct Selection ---

/// The structs a run generates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Canonical struct names.
    pub structs: BTreeSet<String>,
    /// Preprocessor guards of structs that are only reachable through
    /// platform extensions. A struct reached from several platforms carries
    /// all of their guards.
    pub guards: BTreeMap<String, BTreeSet<String>>,
}

/// Applies a [`GeneratorConfig`] to a registry.
#[derive(Debug, Clone, Copy)]
pub struct InclusionPolicy<'a> {
    registry: &'a Registry,
    config: &'a GeneratorConfig,
}

impl<'a> InclusionPolicy<'a> {
    pub fn new(registry: &'a Registry, config: &'a GeneratorConfig) -> Self {
        InclusionPolicy { registry, config }
    }

    /// The included extensions in name order.
    pub fn extensions(&self) -> Result<Vec<&'a Extension>, GenError> {
        let policy = &self.config.extensions;
        for name in &policy.exclude {
            if !self.registry.extensions.contains_key(name) {
                return Err(GenError::UnknownExtension(name.clone()));
            }
        }

        let mut candidates: BTreeMap<&str, &'a Extension> = BTreeMap::new();
        if policy.include.iter().any(|name| name == ALL_EXTENSIONS) {
            candidates.extend(self.registry.extensions.iter().map(|(k, v)| (k.as_str(), v)));
        } else {
            for name in &policy.include {
                let extension = self
                    .registry
                    .extensions
                    .get(name)
                    .ok_or_else(|| GenError::UnknownExtension(name.clone()))?;
                candidates.insert(extension.name.as_str(), extension);
            }
        }

        let mut included = Vec::with_capacity(candidates.len());
        for (name, extension) in candidates {
            if policy.exclude.iter().any(|e| e == name) {
                debug!("[config] Extension {} excluded by configuration", name);
            } else if policy.exclude_platform_extensions && extension.platform.is_some() {
                debug!("[config] Platform extension {} excluded", name);
            } else {
                included.push(extension);
            }
        }
        Ok(included)
    }

    /// Selects the structs required by the configured versions and
    /// extensions, closed over member dependencies.
    ///
    /// # Errors
    /// Unknown version or extension names, or a selected struct depending
    /// on one of the `excluded_structs`.
    pub fn select(&self) -> Result<Selection, GenError> {
        let excluded: BTreeSet<&str> = self
            .config
            .excluded_structs
            .iter()
            .map(|name| match self.registry.struct_named(name) {
                Some(s) => s.name.as_str(),
                None => name.as_str(),
            })
            .collect();

        // Root struct -> guards of the platform extensions requiring it;
        // `None` once any unguarded source requires it.
        let mut roots: BTreeMap<&'a str, Option<BTreeSet<&'a str>>> = BTreeMap::new();
        for version in &self.config.api_versions {
            let core = self
                .registry
                .core_versions
                .get(version)
                .ok_or_else(|| GenError::UnknownVersion(version.clone()))?;
            for feature in core.features.values() {
                if feature.kind == FeatureKind::Type {
                    if let Some(s) = self.registry.struct_named(&feature.name) {
                        roots.insert(s.name.as_str(), None);
                    }
                }
            }
        }
        for extension in self.extensions()? {
            let guard = extension
                .platform
                .as_deref()
                .and_then(|p| self.registry.platforms.get(p))
                .map(|p| p.protect.as_str());
            for feature in extension.features() {
                if feature.kind != FeatureKind::Type {
                    continue;
                }
                let Some(s) = self.registry.struct_named(&feature.name) else {
                    continue;
                };
                let entry = roots
                    .entry(s.name.as_str())
                    .or_insert_with(|| Some(BTreeSet::new()));
                match guard {
                    Some(guard) => {
                        if let Some(guards) = entry {
                            guards.insert(guard);
                        }
                    }
                    None => *entry = None,
                }
            }
        }
        roots.retain(|name, _| {
            let keep = !excluded.contains(name);
            if !keep {
                debug!("[config] Struct {} excluded by configuration", name);
            }
            keep
        });

        // Unguarded structs first, so a dependency shared with core code is
        // never hidden behind a platform guard.
        let mut selection = Selection::default();
        let open: Vec<&'a str> = roots
            .iter()
            .filter(|(_, guards)| guards.is_none())
            .map(|(name, _)| *name)
            .collect();
        self.close_over(open, None, &excluded, &mut selection)?;
        for (name, guards) in &roots {
            for guard in guards.iter().flatten() {
                self.close_over(vec![*name], Some(*guard), &excluded, &mut selection)?;
            }
        }

        debug!(
            "[config] Selected {} structs ({} guarded)",
            selection.structs.len(),
            selection.guards.len()
        );
        Ok(selection)
    }

    /// Adds `pending` and everything it depends on to `selection`.
    ///
    /// With a guard, structs already selected without one are left alone and
    /// every other reached struct collects the guard, so a dependency shared
    /// by several platforms is compiled whenever any of them is.
    fn close_over(
        &self,
        mut pending: Vec<&'a str>,
        guard: Option<&str>,
        excluded: &BTreeSet<&str>,
        selection: &mut Selection,
    ) -> Result<(), GenError> {
        let mut seen: BTreeSet<&'a str> = BTreeSet::new();
        while let Some(name) = pending.pop() {
            if !seen.insert(name) {
                continue;
            }
            let newly_selected = selection.structs.insert(name.to_string());
            match guard {
                Some(guard) => {
                    if !newly_selected && !selection.guards.contains_key(name) {
                        continue;
                    }
                    selection
                        .guards
                        .entry(name.to_string())
                        .or_default()
                        .insert(guard.to_string());
                }
                None if !newly_selected => continue,
                None => {}
            }
            let Some(s) = self.registry.struct_named(name) else {
                continue;
            };
            for dependency in struct_dependencies(self.registry, s) {
                if excluded.contains(dependency) {
                    return Err(GenError::ExcludedDependency {
                        name: s.name.clone(),
                        dependency: dependency.to_string(),
                    });
                }
                pending.push(dependency);
            }
        }
        Ok(())
    }
}
