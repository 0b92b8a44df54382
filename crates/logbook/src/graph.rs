//! Dependency graph operations using petgraph.
//!
//! Readiness is a plain set computation over the reconstructed issues: an
//! open issue is ready when none of its dependencies is an open issue.
//! Dependencies on closed or unknown issues do not block.
//!
//! [`DependencyGraph`] is the display-oriented view built for the diagram
//! renderer. Its node set is the issues chosen for display, and it has one
//! edge `dependency -> dependent` for every dependency whose target is also
//! displayed. Edges pointing outside the display set are dropped from the
//! graph but remain on the issue itself.

use crate::domain::{Issue, IssueId};
use crate::reconstruct::IssueMap;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// IDs of every open issue.
#[must_use]
pub fn open_ids(issues: &IssueMap) -> HashSet<&IssueId> {
    issues
        .values()
        .filter(|issue| issue.is_open())
        .map(|issue| &issue.id)
        .collect()
}

/// The dependencies of `issue` that are open issues, in ID order.
#[must_use]
pub fn open_blockers<'a>(issue: &'a Issue, issues: &IssueMap) -> Vec<&'a IssueId> {
    issue
        .depends_on
        .iter()
        .filter(|dep| issues.get(*dep).is_some_and(Issue::is_open))
        .collect()
}

/// Whether `issue` is open with no open dependency.
#[must_use]
pub fn is_ready(issue: &Issue, issues: &IssueMap) -> bool {
    issue.is_open() && open_blockers(issue, issues).is_empty()
}

/// Every ready issue, in ID order.
#[must_use]
pub fn ready_issues(issues: &IssueMap) -> Vec<&Issue> {
    let open = open_ids(issues);
    issues
        .values()
        .filter(|issue| issue.is_open() && issue.depends_on.iter().all(|dep| !open.contains(dep)))
        .collect()
}

/// Every open issue with at least one open dependency, in ID order.
#[must_use]
pub fn blocked_issues(issues: &IssueMap) -> Vec<&Issue> {
    issues
        .values()
        .filter(|issue| issue.is_open() && !open_blockers(issue, issues).is_empty())
        .collect()
}

/// Which issues a diagram shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplaySet {
    /// Open issues only
    #[default]
    Open,

    /// Every issue
    All,
}

/// Display state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Open, no open dependency
    Ready,

    /// Open, at least one open dependency
    Blocked,

    /// Closed
    Closed,
}

/// Depth assignment produced by [`DependencyGraph::levels`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels {
    /// Depth of every displayed issue
    pub depths: BTreeMap<IssueId, usize>,

    /// Displayed issues grouped by depth, each group in ID order
    pub buckets: BTreeMap<usize, Vec<IssueId>>,

    /// Issues that could not be leveled because they sit on or behind a
    /// cycle. They all share the final depth.
    pub unresolved: Vec<IssueId>,
}

impl Levels {
    /// Depth of the bucket holding unresolved issues, if any.
    #[must_use]
    pub fn unresolved_depth(&self) -> Option<usize> {
        self.unresolved
            .first()
            .and_then(|id| self.depths.get(id).copied())
    }
}

/// Display-oriented dependency graph over a chosen set of issues.
pub struct DependencyGraph<'a> {
    issues: &'a IssueMap,
    graph: DiGraph<IssueId, ()>,
    node_map: HashMap<IssueId, NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph over the issues selected by `display`.
    ///
    /// Nodes are inserted in ID order. For each displayed issue, an edge
    /// `dependency -> issue` is added for every dependency that is also
    /// displayed.
    #[must_use]
    pub fn build(issues: &'a IssueMap, display: DisplaySet) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for issue in issues.values() {
            if display == DisplaySet::All || issue.is_open() {
                let node = graph.add_node(issue.id.clone());
                node_map.insert(issue.id.clone(), node);
            }
        }

        for issue in issues.values() {
            let Some(&to) = node_map.get(&issue.id) else {
                continue;
            };
            for dep in &issue.depends_on {
                if let Some(&from) = node_map.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self {
            issues,
            graph,
            node_map,
        }
    }

    /// Whether nothing is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of displayed issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Every issue, displayed or not.
    #[must_use]
    pub fn issues(&self) -> &'a IssueMap {
        self.issues
    }

    /// Whether `id` is displayed.
    #[must_use]
    pub fn contains(&self, id: &IssueId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Displayed issues in ID order.
    pub fn displayed(&self) -> impl Iterator<Item = &'a Issue> + '_ {
        self.issues
            .values()
            .filter(|issue| self.node_map.contains_key(&issue.id))
    }

    /// Displayed edges as `(dependency, dependent)` pairs, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(&IssueId, &IssueId)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(from, to)| (&self.graph[from], &self.graph[to]))
            .collect();
        edges.sort();
        edges
    }

    /// Display state of `issue`.
    #[must_use]
    pub fn node_state(&self, issue: &Issue) -> NodeState {
        if !issue.is_open() {
            NodeState::Closed
        } else if is_ready(issue, self.issues) {
            NodeState::Ready
        } else {
            NodeState::Blocked
        }
    }

    /// Assign every displayed issue a depth.
    ///
    /// Each pass assigns the current depth to every still-unassigned issue
    /// with no displayed dependency among the unassigned, then advances the
    /// depth. Passes are capped at one more than the number of displayed
    /// issues; whatever remains after that (members of a cycle and issues
    /// downstream of one) is placed together at the final depth. Always
    /// terminates, and every displayed issue receives exactly one depth.
    #[must_use]
    pub fn levels(&self) -> Levels {
        let mut remaining: BTreeSet<NodeIndex> = self.graph.node_indices().collect();
        let mut levels = Levels::default();
        let mut depth = 0;
        let mut budget = remaining.len() + 1;

        while !remaining.is_empty() && budget > 0 {
            budget -= 1;
            let at_depth: Vec<NodeIndex> = remaining
                .iter()
                .copied()
                .filter(|&node| {
                    self.graph
                        .neighbors_directed(node, Direction::Incoming)
                        .all(|dep| !remaining.contains(&dep))
                })
                .collect();
            for node in at_depth {
                remaining.remove(&node);
                self.assign(&mut levels, node, depth);
            }
            depth += 1;
        }

        for node in remaining {
            self.assign(&mut levels, node, depth);
            levels.unresolved.push(self.graph[node].clone());
        }
        levels.unresolved.sort();
        for bucket in levels.buckets.values_mut() {
            bucket.sort();
        }
        levels
    }

    fn assign(&self, levels: &mut Levels, node: NodeIndex, depth: usize) {
        let id = self.graph[node].clone();
        levels.depths.insert(id.clone(), depth);
        levels.buckets.entry(depth).or_default().push(id);
    }

    /// Dependency cycles among displayed issues.
    ///
    /// Each cycle is a strongly connected component with more than one
    /// member, or a single issue that depends on itself. Members are in ID
    /// order and cycles are sorted by their first member.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<IssueId>> {
        let mut cycles: Vec<Vec<IssueId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|component| {
                let mut ids: Vec<IssueId> =
                    component.into_iter().map(|n| self.graph[n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}
