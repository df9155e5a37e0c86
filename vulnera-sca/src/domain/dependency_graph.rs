//! Dependency graph data structures
//!
//! Scanners describe dependencies as an adjacency map keyed by package index
//! (as a decimal string) into the scan's package list. This module validates
//! that map into an index-addressed graph and provides cycle-safe traversal.

use std::collections::{BTreeSet, HashMap};

use super::errors::ScaError;

/// Position of a package in the scan's package list
pub type PackageIndex = usize;

/// Raw adjacency map as delivered by the dependency-tree scanner
pub type RawDependencyMap = HashMap<String, Vec<PackageIndex>>;

/// Index-addressed dependency graph over a package list.
///
/// A package without an adjacency entry is a leaf. The graph may contain
/// cycles; traversal never assumes a DAG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    adjacency: HashMap<PackageIndex, Vec<PackageIndex>>,
    package_count: usize,
}

impl DependencyGraph {
    /// Create a graph with no edges over `package_count` packages
    pub fn new(package_count: usize) -> Self {
        Self {
            adjacency: HashMap::new(),
            package_count,
        }
    }

    /// Validate a raw adjacency map against the package list length.
    ///
    /// Keys must be decimal package indices and every index (key or target)
    /// must address a package; anything else is a contract violation by the
    /// upstream scan data.
    pub fn from_raw(raw: &RawDependencyMap, package_count: usize) -> Result<Self, ScaError> {
        let mut graph = Self::new(package_count);

        for (key, targets) in raw {
            let from: PackageIndex = key
                .trim()
                .parse()
                .map_err(|_| ScaError::InvalidGraphKey(key.clone()))?;
            graph.check_index(from)?;
            for &to in targets {
                graph.check_index(to)?;
            }
            graph.adjacency.insert(from, targets.clone());
        }

        Ok(graph)
    }

    /// Add a dependency edge
    pub fn add_edge(&mut self, from: PackageIndex, to: PackageIndex) -> Result<(), ScaError> {
        self.check_index(from)?;
        self.check_index(to)?;
        self.adjacency.entry(from).or_default().push(to);
        Ok(())
    }

    fn check_index(&self, index: PackageIndex) -> Result<(), ScaError> {
        if index >= self.package_count {
            return Err(ScaError::PackageIndexOutOfRange {
                index,
                len: self.package_count,
            });
        }
        Ok(())
    }

    /// Direct dependencies of a package, in input order
    pub fn dependencies_of(&self, index: PackageIndex) -> &[PackageIndex] {
        self.adjacency
            .get(&index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when the scanner reported no adjacency entries at all
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn package_count(&self) -> usize {
        self.package_count
    }

    pub fn dependency_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Every package transitively reachable from `root`, excluding `root` itself.
    ///
    /// Depth-first over the adjacency lists in input order with an explicit
    /// stack and a visited set scoped to this call, so each index is visited at
    /// most once and cycles terminate.
    pub fn reachable_from(&self, root: PackageIndex) -> BTreeSet<PackageIndex> {
        let mut visited = BTreeSet::new();
        let mut to_visit: Vec<PackageIndex> =
            self.dependencies_of(root).iter().rev().copied().collect();

        while let Some(current) = to_visit.pop() {
            if current == root || !visited.insert(current) {
                continue;
            }
            for &dep in self.dependencies_of(current).iter().rev() {
                if dep != root && !visited.contains(&dep) {
                    to_visit.push(dep);
                }
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(edges: &[(&str, &[usize])]) -> RawDependencyMap {
        edges
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_dependency_graph_new() {
        let graph = DependencyGraph::new(3);
        assert_eq!(graph.package_count(), 3);
        assert_eq!(graph.dependency_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.dependencies_of(1).is_empty());
    }

    #[test]
    fn test_from_raw_valid() {
        let graph = DependencyGraph::from_raw(&raw(&[("0", &[1, 2]), ("1", &[2])]), 3).unwrap();
        assert_eq!(graph.dependency_count(), 3);
        assert_eq!(graph.dependencies_of(0), &[1, 2]);
        assert!(!graph.is_empty());

        // A key with no targets still counts as scanned data
        let leaf_only = DependencyGraph::from_raw(&raw(&[("0", &[])]), 1).unwrap();
        assert!(!leaf_only.is_empty());
    }

    #[test]
    fn test_from_raw_rejects_bad_key() {
        let err = DependencyGraph::from_raw(&raw(&[("root", &[0])]), 1).unwrap_err();
        assert!(matches!(err, ScaError::InvalidGraphKey(k) if k == "root"));
    }

    #[test]
    fn test_from_raw_rejects_out_of_range() {
        let err = DependencyGraph::from_raw(&raw(&[("0", &[5])]), 2).unwrap_err();
        assert!(matches!(
            err,
            ScaError::PackageIndexOutOfRange { index: 5, len: 2 }
        ));

        let err = DependencyGraph::from_raw(&raw(&[("7", &[])]), 2).unwrap_err();
        assert!(matches!(
            err,
            ScaError::PackageIndexOutOfRange { index: 7, len: 2 }
        ));
    }

    #[test]
    fn test_reachable_from_chain() {
        // 0 -> 1 -> 2
        let graph = DependencyGraph::from_raw(&raw(&[("0", &[1]), ("1", &[2])]), 3).unwrap();
        let reachable = graph.reachable_from(0);
        assert_eq!(reachable.into_iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(graph.reachable_from(2).is_empty());
    }

    #[test]
    fn test_reachable_from_cycle_terminates() {
        // 0 -> 1 -> 2 -> 0, and 2 -> 2
        let graph =
            DependencyGraph::from_raw(&raw(&[("0", &[1]), ("1", &[2]), ("2", &[0, 2])]), 3)
                .unwrap();
        let reachable = graph.reachable_from(0);
        assert_eq!(reachable.into_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_diamond_dependencies_visited_once() {
        // A -> B -> D
        // A -> C -> D
        let graph =
            DependencyGraph::from_raw(&raw(&[("0", &[1, 2]), ("1", &[3]), ("2", &[3])]), 4)
                .unwrap();
        let reachable = graph.reachable_from(0);
        assert_eq!(reachable.len(), 3);
        assert!(reachable.contains(&3));
    }

    #[test]
    fn test_disconnected_components() {
        // A -> B
        // C -> D
        let graph = DependencyGraph::from_raw(&raw(&[("0", &[1]), ("2", &[3])]), 4).unwrap();
        assert_eq!(graph.reachable_from(0).into_iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(graph.reachable_from(2).into_iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_deep_dependency_chain() {
        // p0 -> p1 -> ... -> p9999
        let count = 10_000;
        let mut graph = DependencyGraph::new(count);
        for i in 0..count - 1 {
            graph.add_edge(i, i + 1).unwrap();
        }

        let reachable = graph.reachable_from(0);
        assert_eq!(reachable.len(), count - 1);
        assert!(!reachable.contains(&0));
    }

    #[test]
    fn test_add_edge_out_of_range() {
        let mut graph = DependencyGraph::new(2);
        assert!(graph.add_edge(0, 1).is_ok());
        assert!(graph.add_edge(0, 2).is_err());
    }
}
