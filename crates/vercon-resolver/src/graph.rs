//! Dependency graph construction and the reverse-dependency lookup.
//!
//! This is the driver side of the engine: it owns the graph, derives the
//! ordered constraint edges for a target package, and snapshots the
//! depth/parent table the conflict explainer reads.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction;
use vercon_core::scenario::Scenario;
use vercon_util::errors::VerconError;

use crate::state::{DependencyKind, Directness, PackageState};
use crate::version::{Version, VersionId, VersionRange};

/// Depth and immediate referrers of one graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseEntry {
    /// Edges from the resolution root.
    pub depth: usize,
    /// Empty only for the root.
    pub parents: BTreeSet<VersionId>,
}

/// Read-only lookup from a node to its depth and immediate parents.
#[derive(Debug, Clone, Default)]
pub struct ReverseDepends {
    entries: BTreeMap<VersionId, ReverseEntry>,
}

impl ReverseDepends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: VersionId, depth: usize, parents: BTreeSet<VersionId>) {
        self.entries.insert(id, ReverseEntry { depth, parents });
    }

    pub fn get(&self, id: &VersionId) -> Option<&ReverseEntry> {
        self.entries.get(id)
    }

    /// Like [`ReverseDepends::get`], but a missing node is an internal error
    /// reported under `tag`.
    pub fn lookup(&self, id: &VersionId, tag: u32) -> Result<&ReverseEntry, VerconError> {
        self.entries
            .get(id)
            .ok_or_else(|| VerconError::internal(tag, format!("{id} is not in the reverse-dependency table")))
    }

    pub fn contains(&self, id: &VersionId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A version range one node requires of another package.
#[derive(Debug, Clone)]
struct Requirement {
    from: NodeIndex,
    package: String,
    range: VersionRange,
    test: bool,
}

/// Package-version nodes and the requirements between them, backed by petgraph.
///
/// At most one version per package is a node: the version currently chosen in
/// this resolution attempt. Requirements on packages without a node are kept
/// so their constraints can still be folded.
pub struct DependencyGraph {
    graph: DiGraph<VersionId, VersionRange>,
    /// Lookup from package name to its node.
    index: HashMap<String, NodeIndex>,
    requirements: Vec<Requirement>,
    pub root: Option<NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            requirements: Vec::new(),
            root: None,
        }
    }

    /// Build the graph described by a scenario file.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, VerconError> {
        let mut graph = Self::new();
        let mut nodes = Vec::with_capacity(scenario.nodes.len());
        for entry in &scenario.nodes {
            let version = Version::parse(&entry.version)?;
            nodes.push(graph.add_node(VersionId::new(&entry.name, version)));
        }
        for (entry, &idx) in scenario.nodes.iter().zip(&nodes) {
            for req in &entry.requires {
                let range = VersionRange::parse(&req.range)?;
                graph.require(idx, &req.package, range, req.test);
            }
        }
        let root = graph.find(&scenario.root).ok_or_else(|| VerconError::Scenario {
            message: format!("root package `{}` has no node", scenario.root),
        })?;
        graph.set_root(root);
        Ok(graph)
    }

    /// Add or retrieve the node for a package. If the package already has a
    /// node, returns it unchanged.
    pub fn add_node(&mut self, id: VersionId) -> NodeIndex {
        if let Some(&idx) = self.index.get(&id.name) {
            return idx;
        }
        let name = id.name.clone();
        let idx = self.graph.add_node(id);
        self.index.insert(name.clone(), idx);

        let pending: Vec<(NodeIndex, VersionRange)> = self
            .requirements
            .iter()
            .filter(|r| r.package == name)
            .map(|r| (r.from, r.range))
            .collect();
        for (from, range) in pending {
            self.link(from, idx, range);
        }
        idx
    }

    /// Set the root node of the graph (the project itself).
    pub fn set_root(&mut self, idx: NodeIndex) {
        self.root = Some(idx);
    }

    /// Record that `from` requires `package` within `range`.
    pub fn require(&mut self, from: NodeIndex, package: &str, range: VersionRange, test: bool) {
        self.requirements.push(Requirement {
            from,
            package: package.to_string(),
            range,
            test,
        });
        if let Some(&to) = self.index.get(package) {
            self.link(from, to, range);
        }
    }

    fn link(&mut self, from: NodeIndex, to: NodeIndex, range: VersionRange) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, range);
        }
    }

    /// Look up the node of a package.
    pub fn find(&self, package: &str) -> Option<NodeIndex> {
        self.index.get(package).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &VersionId {
        &self.graph[idx]
    }

    /// Reverse dependencies (who depends on this node).
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect()
    }

    fn reachable(&self) -> HashSet<NodeIndex> {
        let mut out = HashSet::new();
        if let Some(root) = self.root {
            let mut bfs = Bfs::new(&self.graph, root);
            while let Some(idx) = bfs.next(&self.graph) {
                out.insert(idx);
            }
        }
        out
    }

    /// Every range imposed on `package` by a node reachable from the root, in
    /// the order the requirements were recorded.
    pub fn constraints_on(&self, package: &str) -> Vec<(VersionId, VersionRange)> {
        let reachable = self.reachable();
        self.requirements
            .iter()
            .filter(|r| r.package == package)
            .filter(|r| {
                let live = reachable.contains(&r.from);
                if !live {
                    tracing::debug!(
                        "ignoring requirement on {package} from unreachable {}",
                        self.graph[r.from]
                    );
                }
                live
            })
            .map(|r| (self.graph[r.from].clone(), r.range))
            .collect()
    }

    /// Bookkeeping for a package before any version is chosen for it.
    ///
    /// A package is direct when the root requires it, and a test dependency
    /// when every reachable requirement on it is test-only.
    pub fn initial_state(&self, package: &str, locked: Option<Version>) -> PackageState {
        let reachable = self.reachable();
        let mut directness = Directness::Indirect;
        let mut kind = DependencyKind::Test;
        for req in self
            .requirements
            .iter()
            .filter(|r| r.package == package && reachable.contains(&r.from))
        {
            if Some(req.from) == self.root {
                directness = Directness::Direct;
            }
            if !req.test {
                kind = DependencyKind::Normal;
            }
        }
        PackageState::unsolved(kind, directness, locked)
    }

    /// Snapshot BFS depth from the root and the reachable immediate parents
    /// of every reachable node.
    pub fn reverse_depends(&self) -> ReverseDepends {
        let mut table = ReverseDepends::new();
        let Some(root) = self.root else {
            return table;
        };

        let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
        let mut queue = VecDeque::from([root]);
        depth.insert(root, 0);
        while let Some(idx) = queue.pop_front() {
            let d = depth[&idx];
            for child in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if !depth.contains_key(&child) {
                    depth.insert(child, d + 1);
                    queue.push_back(child);
                }
            }
        }

        for idx in self.graph.node_indices() {
            let Some(&d) = depth.get(&idx) else {
                tracing::warn!("{} is unreachable from the root", self.graph[idx]);
                continue;
            };
            let parents = if idx == root {
                BTreeSet::new()
            } else {
                self.dependents_of(idx)
                    .into_iter()
                    .filter(|p| depth.contains_key(p))
                    .map(|p| self.graph[p].clone())
                    .collect()
            };
            table.insert(self.graph[idx].clone(), d, parents);
        }
        table
    }

    /// Find a path from root to the node of `package`.
    pub fn find_path(&self, package: &str) -> Option<Vec<&VersionId>> {
        let root = self.root?;
        let target = self.find(package)?;
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(root, target, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for edge in self.graph.edges(current) {
            if self.dfs_path(edge.target(), target, path, visited) {
                return true;
            }
        }
        path.pop();
        false
    }

    /// Number of nodes (excluding root).
    pub fn len(&self) -> usize {
        let total = self.graph.node_count();
        if self.root.is_some() {
            total.saturating_sub(1)
        } else {
            total
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
