//! # Dependency Resolver
//!
//! Turns a user's module selection into a [`ResolvedStack`]: the
//! conflict-free, dependency-complete, deterministically ordered list of
//! modules the generator will apply.
//!
//! ## Process
//!
//! 1. **Lookup**: every selected name is checked against the registry; all
//!    misses are collected into one `UnknownModules` error, each with a
//!    did-you-mean suggestion.
//! 2. **Transitive expansion**: `requires` entries (module names or
//!    capabilities) are expanded to a fixed point, recording for each added
//!    module which module pulled it in; every requirement still unsatisfiable
//!    at the fixed point is collected into one error.
//! 3. **Conflict detection**: declared `conflicts-with` (treated as
//!    symmetric) and duplicate providers of a singleton capability; every
//!    conflicting pair is collected.
//! 4. **Cycle detection**: over `requires` edges restricted to the working
//!    set; the error names every module on the cycle.
//! 5. **Ordering**: Kahn's algorithm with deterministic tie-breaks (higher
//!    priority first, then category precedence, then name) so any
//!    permutation of the same selection yields the identical sequence.
//! 6. **Compatibility warnings**: advisory only, resolution still succeeds.
//!
//! `resolve` is a pure function of (selection set, registry): no ambient
//! state, no effect of prior calls.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::error::{ConflictPair, Error, MissingRequirement, Result, UnknownName, Warning};
use crate::module::{Category, ModuleDefinition};
use crate::registry::Registry;
use crate::suggestions::find_similar;

/// One module in a resolved stack, with expansion provenance.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub module: ModuleDefinition,
    /// `None` for directly selected modules; `Some(name)` when this module
    /// was added because `name` requires it.
    pub added_by: Option<String>,
}

/// The ordered, conflict-free, dependency-complete result of a resolution.
///
/// Created fresh per call and never mutated afterwards.
#[derive(Debug)]
pub struct ResolvedStack {
    /// Modules in application order (dependencies before dependents).
    pub modules: Vec<ResolvedModule>,
    /// Non-fatal advisories collected during resolution.
    pub warnings: Vec<Warning>,
}

impl ResolvedStack {
    /// Module names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.module.name.as_str()).collect()
    }

    /// Iterate the ordered definitions.
    pub fn ordered_modules(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.iter().map(|m| &m.module)
    }
}

/// Resolve a selection against a registry.
///
/// See the module docs for the full contract. The input order of `selected`
/// is irrelevant; duplicates are ignored.
pub fn resolve(selected: &[String], registry: &Registry) -> Result<ResolvedStack> {
    let selection: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

    check_known(&selection, registry)?;
    let working = expand(&selection, registry)?;
    check_conflicts(&working, registry)?;
    let edges = require_edges(&working, registry);
    check_cycles(&working, &edges)?;
    let ordered = kahn_order(&working, &edges, registry);
    let warnings = compatibility_warnings(&working, registry);

    debug!("resolved {:?} -> {:?}", selection, ordered);

    let modules = ordered
        .into_iter()
        .map(|name| ResolvedModule {
            module: registry.get(&name).cloned().expect("ordered name is in registry"),
            added_by: working.get(name.as_str()).cloned().flatten(),
        })
        .collect();

    Ok(ResolvedStack { modules, warnings })
}

/// Collect every unknown selected name before failing.
fn check_known(selection: &BTreeSet<&str>, registry: &Registry) -> Result<()> {
    let unknown: Vec<UnknownName> = selection
        .iter()
        .filter(|&&name| registry.get(name).is_none())
        .map(|&name| UnknownName {
            name: name.to_string(),
            suggestion: find_similar(name, registry.names()).map(str::to_string),
        })
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::UnknownModules { names: unknown })
    }
}

/// Expand `requires` entries to a fixed point.
///
/// Returns the working set as name -> provenance (`None` = directly
/// selected). Unsatisfiable and ambiguous requirements never abort a pass:
/// as long as something is still addable the expansion continues, since a
/// later addition may provide the missing capability. Only once the set
/// stops growing are the leftovers reported, all of them in one
/// `MissingRequirements` error. Iteration is over sorted names so both the
/// expansion and the error contents are deterministic.
fn expand(
    selection: &BTreeSet<&str>,
    registry: &Registry,
) -> Result<BTreeMap<String, Option<String>>> {
    let mut working: BTreeMap<String, Option<String>> = selection
        .iter()
        .map(|name| (name.to_string(), None))
        .collect();

    loop {
        let mut additions: Vec<(String, String)> = Vec::new();
        let mut missing: Vec<MissingRequirement> = Vec::new();

        for (name, _) in working.iter() {
            let module = registry.get(name).expect("working set names are registered");
            for requirement in &module.requires {
                if satisfied(requirement, &working, registry) {
                    continue;
                }
                if let Some(dep) = registry.get(requirement) {
                    additions.push((dep.name.clone(), name.clone()));
                    continue;
                }
                // Capability requirement with no satisfying module in the
                // working set: addable only when the provider is unambiguous.
                let providers = registry.by_capability(requirement);
                match providers.len() {
                    0 => missing.push(MissingRequirement {
                        requirement: requirement.clone(),
                        needed_by: name.clone(),
                        hint: None,
                    }),
                    1 => additions.push((providers[0].name.clone(), name.clone())),
                    _ => missing.push(MissingRequirement {
                        requirement: requirement.clone(),
                        needed_by: name.clone(),
                        hint: Some(format!(
                            "select one of the modules providing it: {}",
                            providers
                                .iter()
                                .map(|p| p.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        )),
                    }),
                }
            }
        }

        if !additions.is_empty() {
            for (name, added_by) in additions {
                working.entry(name).or_insert(Some(added_by));
            }
            continue;
        }
        if !missing.is_empty() {
            return Err(Error::MissingRequirements { requirements: missing });
        }
        return Ok(working);
    }
}

/// Whether a `requires` entry is already satisfied by the working set.
fn satisfied(
    requirement: &str,
    working: &BTreeMap<String, Option<String>>,
    registry: &Registry,
) -> bool {
    if working.contains_key(requirement) {
        return true;
    }
    working.keys().any(|name| {
        registry
            .get(name)
            .is_some_and(|m| m.provides_capability(requirement))
    })
}

/// Collect every conflicting pair in the working set.
fn check_conflicts(
    working: &BTreeMap<String, Option<String>>,
    registry: &Registry,
) -> Result<()> {
    let names: Vec<&str> = working.keys().map(String::as_str).collect();
    let mut pairs: Vec<ConflictPair> = Vec::new();

    for (i, a_name) in names.iter().enumerate() {
        let a = registry.get(a_name).expect("working set names are registered");
        for b_name in &names[i + 1..] {
            let b = registry.get(b_name).expect("working set names are registered");

            // Declared conflicts are symmetric even when only one side
            // declares them.
            if a.conflicts_with.contains(b.name.as_str())
                || b.conflicts_with.contains(a.name.as_str())
            {
                pairs.push(ConflictPair {
                    a: a.name.clone(),
                    b: b.name.clone(),
                    reason: "declared conflict".to_string(),
                });
                continue;
            }

            if let Some(capability) = shared_singleton(a, b) {
                pairs.push(ConflictPair {
                    a: a.name.clone(),
                    b: b.name.clone(),
                    reason: format!("both provide singleton capability '{}'", capability),
                });
            }
        }
    }

    if pairs.is_empty() {
        Ok(())
    } else {
        Err(Error::Conflicts { pairs })
    }
}

/// The singleton capability two modules both provide, if any.
fn shared_singleton(a: &ModuleDefinition, b: &ModuleDefinition) -> Option<String> {
    for category in [
        Category::FrontendFramework,
        Category::BackendService,
        Category::AuthProvider,
    ] {
        let capability = category
            .singleton_capability()
            .expect("listed categories are singleton");
        if a.provides_capability(capability) && b.provides_capability(capability) {
            return Some(capability.to_string());
        }
    }
    None
}

/// Dependency edges within the working set: `module -> modules it requires`.
///
/// A capability requirement contributes an edge to every in-set provider, so
/// the dependent orders after all of them.
fn require_edges(
    working: &BTreeMap<String, Option<String>>,
    registry: &Registry,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut edges: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in working.keys() {
        let module = registry.get(name).expect("working set names are registered");
        let deps = edges.entry(name.clone()).or_default();
        for requirement in &module.requires {
            if working.contains_key(requirement) {
                deps.insert(requirement.clone());
                continue;
            }
            for other in working.keys() {
                if other == name {
                    continue;
                }
                let candidate = registry.get(other).expect("working set names are registered");
                if candidate.provides_capability(requirement) {
                    deps.insert(other.clone());
                }
            }
        }
    }
    edges
}

/// Depth-first cycle check over the requirement edges.
///
/// On failure the error names every module on the cycle, with the entry
/// point repeated at the end.
fn check_cycles(
    working: &BTreeMap<String, Option<String>>,
    edges: &BTreeMap<String, BTreeSet<String>>,
) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(
        node: &str,
        edges: &BTreeMap<String, BTreeSet<String>>,
        marks: &mut HashMap<String, Mark>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        marks.insert(node.to_string(), Mark::InProgress);
        path.push(node.to_string());

        if let Some(deps) = edges.get(node) {
            for dep in deps {
                match marks.get(dep.as_str()).copied().unwrap_or(Mark::Unvisited) {
                    Mark::InProgress => {
                        let start = path
                            .iter()
                            .position(|n| n == dep)
                            .expect("in-progress node is on the path");
                        let mut cycle: Vec<String> = path[start..].to_vec();
                        cycle.push(dep.clone());
                        return Some(cycle);
                    }
                    Mark::Unvisited => {
                        if let Some(cycle) = visit(dep, edges, marks, path) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
        }

        path.pop();
        marks.insert(node.to_string(), Mark::Done);
        None
    }

    let mut marks: HashMap<String, Mark> = HashMap::new();
    for node in working.keys() {
        if marks.get(node.as_str()).copied().unwrap_or(Mark::Unvisited) == Mark::Unvisited {
            let mut path = Vec::new();
            if let Some(cycle) = visit(node, edges, &mut marks, &mut path) {
                return Err(Error::CircularDependency { cycle });
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm with deterministic tie-breaks among ready modules:
/// higher priority first, then category precedence, then name.
fn kahn_order(
    working: &BTreeMap<String, Option<String>>,
    edges: &BTreeMap<String, BTreeSet<String>>,
    registry: &Registry,
) -> Vec<String> {
    let mut indegree: BTreeMap<&str, usize> = working
        .keys()
        .map(|name| (name.as_str(), edges.get(name).map_or(0, |d| d.len())))
        .collect();
    // Reverse adjacency: dependency -> dependents.
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, deps) in edges {
        for dep in deps {
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
        }
    }

    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(working.len());

    while !ready.is_empty() {
        // Sort so the best candidate ends up last, then pop it.
        ready.sort_by(|&a, &b| {
            let ma = registry.get(a).expect("working set names are registered");
            let mb = registry.get(b).expect("working set names are registered");
            mb.priority
                .cmp(&ma.priority)
                .then(ma.category.precedence().cmp(&mb.category.precedence()))
                .then(ma.name.cmp(&mb.name))
                .reverse()
        });
        let next = ready.pop().expect("ready set is non-empty");
        order.push(next.to_string());

        if let Some(deps) = dependents.get(next) {
            for &dependent in deps {
                let deg = indegree.get_mut(dependent).expect("dependent is in working set");
                *deg -= 1;
                if *deg == 0 {
                    ready.push(dependent);
                }
            }
        }
    }

    debug_assert_eq!(order.len(), working.len(), "cycles were ruled out earlier");
    order
}

/// Advisory pairings: a UI library without a frontend framework, an auth
/// provider without a backend service.
fn compatibility_warnings(
    working: &BTreeMap<String, Option<String>>,
    registry: &Registry,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let categories: BTreeSet<Category> = working
        .keys()
        .filter_map(|name| registry.get(name).map(|m| m.category))
        .collect();

    if categories.contains(&Category::UiLibrary)
        && !categories.contains(&Category::FrontendFramework)
    {
        warnings.push(Warning::Compatibility {
            message: "a UI library is selected but no frontend framework is in the stack"
                .to_string(),
        });
    }
    if categories.contains(&Category::AuthProvider)
        && !categories.contains(&Category::BackendService)
    {
        warnings.push(Warning::Compatibility {
            message: "an auth provider usually pairs with a backend service; none is in the stack"
                .to_string(),
        });
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{FileTemplate, LifecycleHooks};
    use std::collections::BTreeMap as Map;
    use std::path::PathBuf;

    fn module(name: &str, category: Category) -> ModuleDefinition {
        ModuleDefinition {
            name: name.to_string(),
            version: semver::Version::new(1, 0, 0),
            category,
            provides: BTreeSet::new(),
            requires: BTreeSet::new(),
            conflicts_with: BTreeSet::new(),
            priority: 0,
            manifest_dependencies: Map::new(),
            templates: Vec::<FileTemplate>::new(),
            hooks: LifecycleHooks::default(),
            origin: PathBuf::from(format!("{name}/module.yaml")),
        }
    }

    fn with_requires(mut m: ModuleDefinition, requires: &[&str]) -> ModuleDefinition {
        m.requires = requires.iter().map(|s| s.to_string()).collect();
        m
    }

    fn with_conflicts(mut m: ModuleDefinition, conflicts: &[&str]) -> ModuleDefinition {
        m.conflicts_with = conflicts.iter().map(|s| s.to_string()).collect();
        m
    }

    fn selection(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_names_collected_with_suggestions() {
        let registry = Registry::from_definitions(vec![module("react", Category::FrontendFramework)]);
        let err = resolve(&selection(&["reactt", "zorp"]), &registry).unwrap_err();
        match err {
            Error::UnknownModules { names } => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].name, "reactt");
                assert_eq!(names[0].suggestion.as_deref(), Some("react"));
                assert_eq!(names[1].suggestion, None);
            }
            other => panic!("expected UnknownModules, got {other:?}"),
        }
    }

    #[test]
    fn test_transitive_closure_in_dependency_order() {
        // A requires B, B requires C => resolve({A}) yields [C, B, A].
        let registry = Registry::from_definitions(vec![
            with_requires(module("a", Category::Other), &["b"]),
            with_requires(module("b", Category::Other), &["c"]),
            module("c", Category::Other),
        ]);
        let stack = resolve(&selection(&["a"]), &registry).unwrap();
        assert_eq!(stack.names(), vec!["c", "b", "a"]);

        // Provenance records why each module was added.
        assert_eq!(stack.modules[0].added_by.as_deref(), Some("b"));
        assert_eq!(stack.modules[1].added_by.as_deref(), Some("a"));
        assert_eq!(stack.modules[2].added_by, None);
    }

    #[test]
    fn test_capability_requirement_satisfied_by_selected_provider() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            module("frame-b", Category::FrontendFramework),
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
        ]);
        let stack = resolve(&selection(&["ui-kit", "frame-a"]), &registry).unwrap();
        assert_eq!(stack.names(), vec!["frame-a", "ui-kit"]);
    }

    #[test]
    fn test_capability_requirement_ambiguous_without_selection() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            module("frame-b", Category::FrontendFramework),
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
        ]);
        let err = resolve(&selection(&["ui-kit"]), &registry).unwrap_err();
        match err {
            Error::MissingRequirements { requirements } => {
                assert_eq!(requirements.len(), 1);
                assert_eq!(requirements[0].requirement, "frontend-framework");
                assert_eq!(requirements[0].needed_by, "ui-kit");
                let hint = requirements[0].hint.as_deref().unwrap();
                assert!(hint.contains("frame-a"));
                assert!(hint.contains("frame-b"));
            }
            other => panic!("expected MissingRequirements, got {other:?}"),
        }
    }

    #[test]
    fn test_capability_requirement_unique_provider_added() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
        ]);
        let stack = resolve(&selection(&["ui-kit"]), &registry).unwrap();
        assert_eq!(stack.names(), vec!["frame-a", "ui-kit"]);
        assert_eq!(stack.modules[0].added_by.as_deref(), Some("ui-kit"));
    }

    #[test]
    fn test_capability_requirement_absent_provider() {
        let registry = Registry::from_definitions(vec![with_requires(
            module("ui-kit", Category::UiLibrary),
            &["frontend-framework"],
        )]);
        let err = resolve(&selection(&["ui-kit"]), &registry).unwrap_err();
        assert!(matches!(err, Error::MissingRequirements { .. }));
    }

    #[test]
    fn test_all_missing_requirements_collected() {
        // Two independent holes in one selection; both must be reported.
        let registry = Registry::from_definitions(vec![
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
            with_requires(module("auth0", Category::AuthProvider), &["backend-service"]),
        ]);
        let err = resolve(&selection(&["auth0", "ui-kit"]), &registry).unwrap_err();
        match err {
            Error::MissingRequirements { requirements } => {
                assert_eq!(requirements.len(), 2);
                let needed: Vec<&str> = requirements
                    .iter()
                    .map(|m| m.requirement.as_str())
                    .collect();
                assert!(needed.contains(&"backend-service"));
                assert!(needed.contains(&"frontend-framework"));
            }
            other => panic!("expected MissingRequirements, got {other:?}"),
        }
    }

    #[test]
    fn test_requirement_satisfied_by_later_expansion_is_not_missing() {
        // The capability hole closes once expansion pulls in the provider,
        // so resolution must succeed rather than report it.
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
            with_requires(module("starter", Category::Other), &["ui-kit"]),
        ]);
        let stack = resolve(&selection(&["starter"]), &registry).unwrap();
        assert_eq!(stack.names(), vec!["frame-a", "ui-kit", "starter"]);
    }

    #[test]
    fn test_declared_conflict_is_symmetric() {
        // Only A declares the conflict; resolving {A, B} must still fail.
        let registry = Registry::from_definitions(vec![
            with_conflicts(module("a", Category::Other), &["b"]),
            module("b", Category::Other),
        ]);
        let err = resolve(&selection(&["b", "a"]), &registry).unwrap_err();
        match err {
            Error::Conflicts { pairs } => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].reason, "declared conflict");
            }
            other => panic!("expected Conflicts, got {other:?}"),
        }
    }

    #[test]
    fn test_singleton_capability_conflict() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            module("frame-b", Category::FrontendFramework),
        ]);
        let err = resolve(&selection(&["frame-a", "frame-b"]), &registry).unwrap_err();
        match err {
            Error::Conflicts { pairs } => {
                assert_eq!(pairs.len(), 1);
                assert_eq!(pairs[0].a, "frame-a");
                assert_eq!(pairs[0].b, "frame-b");
                assert!(pairs[0].reason.contains("frontend-framework"));
            }
            other => panic!("expected Conflicts, got {other:?}"),
        }
    }

    #[test]
    fn test_all_conflicts_collected() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            module("frame-b", Category::FrontendFramework),
            with_conflicts(module("x", Category::Other), &["y"]),
            module("y", Category::Other),
        ]);
        let err = resolve(&selection(&["frame-a", "frame-b", "x", "y"]), &registry).unwrap_err();
        match err {
            Error::Conflicts { pairs } => assert_eq!(pairs.len(), 2),
            other => panic!("expected Conflicts, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_rejection_names_members() {
        let registry = Registry::from_definitions(vec![
            with_requires(module("a", Category::Other), &["b"]),
            with_requires(module("b", Category::Other), &["a"]),
        ]);
        let err = resolve(&selection(&["a", "b"]), &registry).unwrap_err();
        match err {
            Error::CircularDependency { cycle } => {
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
                assert_eq!(cycle.first(), cycle.last());
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic_under_permutation() {
        let registry = Registry::from_definitions(vec![
            module("frame-a", Category::FrontendFramework),
            with_requires(module("ui-kit", Category::UiLibrary), &["frontend-framework"]),
            with_requires(module("api", Category::BackendService), &[]),
            module("extras", Category::Other),
        ]);
        let base = resolve(&selection(&["ui-kit", "frame-a", "api", "extras"]), &registry)
            .unwrap()
            .names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        for permutation in [
            vec!["extras", "api", "frame-a", "ui-kit"],
            vec!["api", "ui-kit", "extras", "frame-a"],
            vec!["frame-a", "extras", "ui-kit", "api"],
        ] {
            let names: Vec<String> = resolve(&selection(&permutation), &registry)
                .unwrap()
                .names()
                .iter()
                .map(|s| s.to_string())
                .collect();
            assert_eq!(names, base);
        }
    }

    #[test]
    fn test_tie_breaks_priority_then_category_then_name() {
        let mut high = module("zzz-high", Category::Other);
        high.priority = 10;
        let registry = Registry::from_definitions(vec![
            high,
            module("frame-a", Category::FrontendFramework),
            module("aaa-other", Category::Other),
        ]);
        let stack = resolve(&selection(&["aaa-other", "frame-a", "zzz-high"]), &registry).unwrap();
        // Priority 10 beats everything; then frontend framework precedes
        // `other`; names break the final tie.
        assert_eq!(stack.names(), vec!["zzz-high", "frame-a", "aaa-other"]);
    }

    #[test]
    fn test_ui_library_without_framework_warns_but_succeeds() {
        let registry = Registry::from_definitions(vec![module("ui-kit", Category::UiLibrary)]);
        let stack = resolve(&selection(&["ui-kit"]), &registry).unwrap();
        assert_eq!(stack.warnings.len(), 1);
        assert!(matches!(stack.warnings[0], Warning::Compatibility { .. }));
    }

    #[test]
    fn test_auth_without_backend_warns() {
        let registry = Registry::from_definitions(vec![module("auth0", Category::AuthProvider)]);
        let stack = resolve(&selection(&["auth0"]), &registry).unwrap();
        assert!(stack
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::Compatibility { .. })));
    }

    #[test]
    fn test_duplicate_selection_entries_ignored() {
        let registry = Registry::from_definitions(vec![module("a", Category::Other)]);
        let stack = resolve(&selection(&["a", "a", "a"]), &registry).unwrap();
        assert_eq!(stack.names(), vec!["a"]);
    }
}
