//! Dependency graph over the packages of a workspace.
use std::collections::{BTreeMap, BTreeSet};

use crate::{error::PlannerError, result::Result};

/// A package and the names of the workspace packages it depends on.
#[derive(Debug, Clone)]
pub struct DependencyNode<P> {
    pub value: P,
    pub deps: Vec<String>,
}

/// Packages keyed by name. Edges only point at packages present in the
/// graph; external dependencies are dropped when the graph is built.
#[derive(Debug, Clone)]
pub struct DependencyGraph<P> {
    nodes: BTreeMap<String, DependencyNode<P>>,
}

impl<P> Default for DependencyGraph<P> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<P> DependencyGraph<P> {
    /// Builds the graph from `(name, package, dependency names)` triples.
    /// A later package with the same name replaces an earlier one.
    pub fn build(packages: Vec<(String, P, Vec<String>)>) -> Self {
        let names: BTreeSet<String> =
            packages.iter().map(|(name, _, _)| name.clone()).collect();

        let nodes = packages
            .into_iter()
            .map(|(name, value, deps)| {
                let mut deps: Vec<String> = deps
                    .into_iter()
                    .filter(|dep| names.contains(dep) && *dep != name)
                    .collect();
                deps.sort();
                deps.dedup();
                (name, DependencyNode { value, deps })
            })
            .collect();

        Self { nodes }
    }

    pub fn get(&self, name: &str) -> Option<&DependencyNode<P>> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DependencyNode<P>)> {
        self.nodes.iter()
    }

    /// Maps every package to the packages that depend on it.
    pub fn dependents(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut inverted: BTreeMap<&str, Vec<&str>> = self
            .nodes
            .keys()
            .map(|name| (name.as_str(), vec![]))
            .collect();

        for (name, node) in &self.nodes {
            for dep in &node.deps {
                if let Some(dependents) = inverted.get_mut(dep.as_str()) {
                    dependents.push(name.as_str());
                }
            }
        }

        inverted
    }

    /// Returns `seeds` plus every package depending on them, directly or
    /// transitively, sorted by name.
    ///
    /// Fails with [`PlannerError::UnknownComponent`] when a seed is not in
    /// the graph and with [`PlannerError::DependencyCycle`] when the walk
    /// runs into a cycle.
    pub fn with_dependents(&self, seeds: &[String]) -> Result<Vec<&P>> {
        let dependents = self.dependents();
        let mut visited: BTreeSet<&str> = BTreeSet::new();

        for seed in seeds {
            let mut path = vec![];
            visit_post_order(&dependents, seed, &mut visited, &mut path)?;
        }

        Ok(visited
            .into_iter()
            .filter_map(|name| self.nodes.get(name).map(|node| &node.value))
            .collect())
    }
}

fn visit_post_order<'a>(
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    name: &str,
    visited: &mut BTreeSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<()> {
    let Some((&key, next)) = graph.get_key_value(name) else {
        return Err(PlannerError::UnknownComponent(name.to_string()));
    };

    if path.contains(&key) {
        let cycle = path
            .iter()
            .chain(std::iter::once(&key))
            .copied()
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(PlannerError::DependencyCycle(cycle));
    }

    if visited.contains(key) {
        return Ok(());
    }

    path.push(key);
    for dependent in next {
        visit_post_order(graph, dependent, visited, path)?;
    }
    path.pop();

    visited.insert(key);
    Ok(())
}
