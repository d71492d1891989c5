//! Workspace dependency graph validation.
//!
//! Builds a directed graph over manifest names from every internal
//! dependency, then reports dependencies that point at no manifest and
//! cycles between manifests. External dependencies never enter the graph.
//!
//! Traversal works on node indices. Names are only used to build the graph
//! and to label errors. Nodes are added in name order, so node indices, DFS
//! order and therefore the reported cycles are stable across runs.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::core::dependency::Dependency;
use crate::core::error::{ErrorKind, ManifestError};
use crate::core::workspace::ManifestMap;

/// A workspace-level dependency problem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Error)]
pub enum GraphError {
    #[error("`{from}` depends on `{to}`, which is not in the workspace")]
    MissingDependency { from: String, to: String },

    #[error("circular dependency: {}", format_cycle(cycle))]
    CircularDependency { cycle: Vec<String> },

    #[error("`{from}` declares an internal dependency without a name")]
    MalformedDependency { from: String, index: usize },
}

impl GraphError {
    /// Stable numeric code (200, 201 or 202).
    pub fn code(&self) -> u32 {
        self.kind().code()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            GraphError::MissingDependency { .. } => ErrorKind::MissingDependency,
            GraphError::CircularDependency { .. } => ErrorKind::CircularDependency,
            GraphError::MalformedDependency { .. } => ErrorKind::MalformedDependency,
        }
    }

    /// The manifest an error sorts under: the declaring manifest, or the
    /// first name of a (canonical) cycle.
    pub fn primary(&self) -> &str {
        match self {
            GraphError::MissingDependency { from, .. }
            | GraphError::MalformedDependency { from, .. } => from,
            GraphError::CircularDependency { cycle } => {
                cycle.first().map(String::as_str).unwrap_or_default()
            }
        }
    }

    /// Every manifest this error is reported against.
    pub fn involved(&self) -> Vec<&str> {
        match self {
            GraphError::MissingDependency { from, .. }
            | GraphError::MalformedDependency { from, .. } => vec![from.as_str()],
            GraphError::CircularDependency { cycle } => cycle.iter().map(String::as_str).collect(),
        }
    }

    /// Report ordering: primary manifest, code, then the remaining fields.
    pub fn report_order(&self, other: &Self) -> Ordering {
        self.primary()
            .cmp(other.primary())
            .then_with(|| self.code().cmp(&other.code()))
            .then_with(|| self.cmp(other))
    }

    /// Convert into a report error.
    pub fn to_manifest_error(&self) -> ManifestError {
        let err = ManifestError::new(self.kind(), self.to_string());

        match self {
            GraphError::MissingDependency { from, to } => err
                .with_field("dependencies")
                .with_developer_message(format!(
                    "`{}` lists internal dependency `{}` but no manifest named `{}` was loaded",
                    from, to, to
                ))
                .with_help(format!(
                    "Add a manifest named `{}` to the workspace, fix the dependency name, \
                     or declare it with an external type",
                    to
                )),
            GraphError::CircularDependency { cycle } => err
                .with_field("dependencies")
                .with_developer_message(format!("cycle: {}", format_cycle(cycle)))
                .with_help("Break the cycle by removing or restructuring dependencies"),
            GraphError::MalformedDependency { index, .. } => err
                .with_field(format!("dependencies[{}].name", index))
                .with_developer_message(format!("dependency #{} has an empty name", index))
                .with_help("Give the dependency a name or remove it"),
        }
    }
}

/// Render a cycle as `a -> b -> c -> a`.
pub fn format_cycle(cycle: &[String]) -> String {
    match cycle.first() {
        Some(first) => {
            let mut parts: Vec<&str> = cycle.iter().map(String::as_str).collect();
            parts.push(first);
            parts.join(" -> ")
        }
        None => String::new(),
    }
}

/// An internal dependency declaration, seen from the declaring manifest.
#[derive(Debug, Clone, Copy)]
pub struct DependencyEdge<'a> {
    pub from: &'a str,
    pub to: &'a str,
    /// Position in the declaring manifest's `dependencies` array
    pub index: usize,
    pub dependency: &'a Dependency,
}

/// Every internal dependency declared in `map`, in manifest then declaration order.
pub fn internal_edges<'a, S: AsRef<str>>(
    map: &'a ManifestMap,
    internal_types: &'a [S],
) -> impl Iterator<Item = DependencyEdge<'a>> + 'a {
    map.iter().flat_map(move |(name, entry)| {
        entry
            .record
            .dependencies
            .iter()
            .enumerate()
            .filter(move |(_, dep)| dep.is_internal(internal_types))
            .map(move |(index, dep)| DependencyEdge {
                from: name,
                to: dep.name.as_str(),
                index,
                dependency: dep,
            })
    })
}

/// DFS state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

/// Directed graph of internal dependencies between workspace manifests.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Manifest graph; an edge `a -> b` means `a` depends on `b`
    graph: DiGraph<String, ()>,

    /// Map from manifest name to node index
    name_to_node: HashMap<String, NodeIndex>,

    /// Internal dependencies that could not become edges
    dangling: Vec<GraphError>,
}

impl DependencyGraph {
    /// Build the graph for a fully loaded workspace.
    pub fn build<S: AsRef<str>>(map: &ManifestMap, internal_types: &[S]) -> Self {
        let mut graph = DiGraph::new();
        let mut name_to_node = HashMap::new();

        for name in map.names() {
            let node = graph.add_node(name.to_string());
            name_to_node.insert(name.to_string(), node);
        }

        let mut dangling = Vec::new();

        for edge in internal_edges(map, internal_types) {
            if edge.to.trim().is_empty() {
                tracing::debug!(
                    "`{}` has an unnamed internal dependency at index {}",
                    edge.from,
                    edge.index
                );
                dangling.push(GraphError::MalformedDependency {
                    from: edge.from.to_string(),
                    index: edge.index,
                });
                continue;
            }

            match (name_to_node.get(edge.from), name_to_node.get(edge.to)) {
                (Some(&from), Some(&to)) => {
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, ());
                    }
                }
                _ => dangling.push(GraphError::MissingDependency {
                    from: edge.from.to_string(),
                    to: edge.to.to_string(),
                }),
            }
        }

        DependencyGraph {
            graph,
            name_to_node,
            dangling,
        }
    }

    /// Get the number of manifests.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of distinct internal edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct internal dependencies of a manifest, in name order.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        match self.name_to_node.get(name) {
            Some(&node) => self
                .successors(node)
                .into_iter()
                .map(|n| self.graph[n].as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// All edges as `(dependent, dependency)` pairs, in name order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .node_indices()
            .flat_map(|node| {
                self.successors(node)
                    .into_iter()
                    .map(move |succ| (self.graph[node].as_str(), self.graph[succ].as_str()))
            })
            .collect()
    }

    /// Missing and malformed internal dependencies found while building.
    pub fn dangling(&self) -> &[GraphError] {
        &self.dangling
    }

    /// Find cycles with a three-colour depth-first search.
    ///
    /// Every back edge closes one cycle: the DFS stack from the edge's target
    /// up to the current node. A self-dependency is a one-node cycle. Cycles
    /// are rotated to start at their smallest name and deduplicated, so a
    /// rotation of an already reported cycle is never reported twice.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let count = self.graph.node_count();
        let mut marks = vec![Mark::Unvisited; count];
        let mut stack_pos: Vec<Option<usize>> = vec![None; count];
        let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

        for start in self.graph.node_indices() {
            if marks[start.index()] != Mark::Unvisited {
                continue;
            }

            let mut stack = Vec::new();
            self.enter(start, &mut stack, &mut marks, &mut stack_pos);

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let node = frame.node;
                let next = frame.successors.get(frame.cursor).copied();
                frame.cursor += 1;

                let Some(target) = next else {
                    marks[node.index()] = Mark::Done;
                    stack_pos[node.index()] = None;
                    stack.pop();
                    continue;
                };

                match marks[target.index()] {
                    Mark::Unvisited => self.enter(target, &mut stack, &mut marks, &mut stack_pos),
                    Mark::InProgress => {
                        if let Some(pos) = stack_pos[target.index()] {
                            let cycle: Vec<String> = stack[pos..]
                                .iter()
                                .map(|f| self.graph[f.node].clone())
                                .collect();
                            found.insert(canonical_cycle(cycle));
                        }
                    }
                    Mark::Done => {}
                }
            }
        }

        found.into_iter().collect()
    }

    fn enter(
        &self,
        node: NodeIndex,
        stack: &mut Vec<Frame>,
        marks: &mut [Mark],
        stack_pos: &mut [Option<usize>],
    ) {
        marks[node.index()] = Mark::InProgress;
        stack_pos[node.index()] = Some(stack.len());
        stack.push(Frame {
            node,
            successors: self.successors(node),
            cursor: 0,
        });
    }

    /// Successors in ascending index (= name) order.
    fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut succ: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        succ.sort();
        succ
    }
}

/// Rotate a cycle so it starts at its lexicographically smallest name.
fn canonical_cycle(mut cycle: Vec<String>) -> Vec<String> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle.rotate_left(pivot);
    cycle
}

/// Validate the dependency graph of a fully loaded workspace.
///
/// Must only run once every discovered manifest is in `map`: a partial map
/// produces spurious missing-dependency errors. The result is sorted by
/// [`GraphError::report_order`] and free of duplicates.
pub fn validate_graph<S: AsRef<str>>(map: &ManifestMap, internal_types: &[S]) -> Vec<GraphError> {
    let graph = DependencyGraph::build(map, internal_types);

    let mut errors = graph.dangling().to_vec();
    errors.extend(
        graph
            .find_cycles()
            .into_iter()
            .map(|cycle| GraphError::CircularDependency { cycle }),
    );

    errors.sort_by(|a, b| a.report_order(b));
    errors.dedup();

    tracing::debug!(
        "Dependency graph: {} manifest(s), {} edge(s), {} problem(s)",
        graph.node_count(),
        graph.edge_count(),
        errors.len()
    );

    errors
}
