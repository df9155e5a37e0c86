//! Dependency graph resolver
//!
//! Attributes vulnerabilities found in transitive dependencies to the root
//! packages that pulled them in. Results live in a table addressed by package
//! index; the package list itself is never mutated.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::domain::{DependencyGraph, Package, PackageIndex, RawVulnerability, ScaError};

/// Resolution of one root package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootResolution {
    pub index: PackageIndex,
    /// Transitively reachable packages that carry vulnerabilities, in index order.
    ///
    /// `None` for clean roots: no direct vulnerabilities and no vulnerable
    /// dependencies.
    pub vulnerable_dependencies: Option<Vec<PackageIndex>>,
}

/// Per-index resolution table for one scan unit
#[derive(Debug, Clone)]
pub struct DependencyResolution<'a> {
    pub roots: Vec<RootResolution>,
    /// Vulnerable packages that are neither roots nor reachable from one
    pub orphans: Vec<PackageIndex>,
    cves: Vec<Vec<&'a RawVulnerability>>,
}

impl<'a> DependencyResolution<'a> {
    /// Vulnerabilities attached to the package at `index`
    pub fn cves_of(&self, index: PackageIndex) -> &[&'a RawVulnerability] {
        self.cves.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_vulnerable(&self, index: PackageIndex) -> bool {
        !self.cves_of(index).is_empty()
    }

    pub fn root(&self, index: PackageIndex) -> Option<&RootResolution> {
        self.roots.iter().find(|r| r.index == index)
    }
}

/// Group vulnerabilities by `name@version`, preserving input order
pub fn vulnerabilities_by_alias(
    vulnerabilities: &[RawVulnerability],
) -> HashMap<String, Vec<&RawVulnerability>> {
    let mut by_alias: HashMap<String, Vec<&RawVulnerability>> = HashMap::new();
    for vulnerability in vulnerabilities {
        by_alias
            .entry(vulnerability.package_alias())
            .or_default()
            .push(vulnerability);
    }
    by_alias
}

/// Resolve roots and their vulnerable transitive dependencies.
///
/// Without a graph, or with a graph that has no adjacency entries at all,
/// every package is a root and no rollup happens. Otherwise only packages
/// flagged `root` are roots, each walked depth-first with its own visited set.
pub fn resolve_dependencies<'a>(
    packages: &[Package],
    graph: Option<&DependencyGraph>,
    vulnerabilities: &'a [RawVulnerability],
) -> Result<DependencyResolution<'a>, ScaError> {
    if let Some(graph) = graph
        && graph.package_count() != packages.len()
    {
        return Err(ScaError::GraphSizeMismatch {
            graph: graph.package_count(),
            packages: packages.len(),
        });
    }

    let by_alias = vulnerabilities_by_alias(vulnerabilities);
    let cves: Vec<Vec<&RawVulnerability>> = packages
        .iter()
        .map(|p| by_alias.get(&p.alias()).cloned().unwrap_or_default())
        .collect();

    let walk_graph = graph.filter(|g| !g.is_empty());

    let mut roots = Vec::new();
    let mut covered: BTreeSet<PackageIndex> = BTreeSet::new();

    for (index, package) in packages.iter().enumerate() {
        let is_root = walk_graph.is_none() || package.root;
        if !is_root {
            continue;
        }

        let dependencies: Vec<PackageIndex> = match walk_graph {
            Some(g) => g
                .reachable_from(index)
                .into_iter()
                .filter(|&dep| !cves[dep].is_empty())
                .collect(),
            None => Vec::new(),
        };

        let vulnerable_dependencies = if !cves[index].is_empty() || !dependencies.is_empty() {
            Some(dependencies)
        } else {
            None
        };

        covered.insert(index);
        if let Some(deps) = &vulnerable_dependencies {
            covered.extend(deps.iter().copied());
            debug!(
                root = %package.alias(),
                direct = cves[index].len(),
                vulnerable_dependencies = deps.len(),
                "Resolved root package"
            );
        }

        roots.push(RootResolution {
            index,
            vulnerable_dependencies,
        });
    }

    let orphans: Vec<PackageIndex> = (0..packages.len())
        .filter(|i| !cves[*i].is_empty() && !covered.contains(i))
        .collect();
    for &orphan in &orphans {
        debug!(
            package = %packages[orphan].alias(),
            "Vulnerable package is not reachable from any root"
        );
    }

    Ok(DependencyResolution {
        roots,
        orphans,
        cves,
    })
}
