use crate::error::GraphError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Why one file depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// A declares `module { source = "./dir" }` and B lives under `dir`
    ModuleSource,

    /// A references `var.x` and B declares `variable "x"`
    VariableDeclaration,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ModuleSource => "module source",
            Self::VariableDeclaration => "variable",
        })
    }
}

/// How a resolved module directory is matched against file paths.
///
/// `Prefix` is a plain string-prefix test: `network` also matches
/// `network-v2/main.tf`. `Segment` requires whole path segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleMatch {
    #[default]
    Prefix,
    Segment,
}

impl ModuleMatch {
    #[must_use]
    pub fn matches(self, target_dir: &str, path: &str) -> bool {
        match self {
            Self::Prefix => path.starts_with(target_dir),
            Self::Segment => {
                path != target_dir
                    && tfagent_protocol::path_filters::path_prefix_matches(target_dir, path)
            }
        }
    }
}

impl FromStr for ModuleMatch {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "segment" => Ok(Self::Segment),
            other => Err(GraphError::InvalidMatchMode(other.to_string())),
        }
    }
}

impl fmt::Display for ModuleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prefix => "prefix",
            Self::Segment => "segment",
        })
    }
}

/// Node in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Corpus-relative path
    pub path: String,
}

/// Edge in the dependency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub relationship: RelationshipType,
}

/// Directed `path -> [paths it references]` graph.
///
/// Parallel edges are kept (the same reference may be recorded more than
/// once) and cycles are allowed; readers deduplicate.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Directed graph (file -> file it depends on)
    pub graph: DiGraph<FileNode, DependencyEdge>,

    /// Path -> NodeIndex mapping for fast lookup
    pub path_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node for `path`
    pub fn add_file(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.path_index.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(FileNode {
            path: path.to_string(),
        });
        self.path_index.insert(path.to_string(), idx);
        idx
    }

    /// Record `from -> to`. Nodes are created on demand, so `to` may be a
    /// path that is not part of any corpus.
    pub fn add_dependency(&mut self, from: &str, to: &str, relationship: RelationshipType) {
        let from_idx = self.add_file(from);
        let to_idx = self.add_file(to);
        self.graph
            .add_edge(from_idx, to_idx, DependencyEdge { relationship });
    }

    #[must_use]
    pub fn find_node(&self, path: &str) -> Option<NodeIndex> {
        self.path_index.get(path).copied()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.path_index.contains_key(path)
    }

    #[must_use]
    pub fn path(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|node| node.path.as_str())
    }

    /// Direct dependencies of `path` in insertion order, duplicates included.
    /// Unknown paths have no dependencies.
    #[must_use]
    pub fn dependencies(&self, path: &str) -> Vec<&str> {
        self.dependency_edges(path)
            .into_iter()
            .map(|(target, _)| target)
            .collect()
    }

    /// Direct dependencies with the relationship that produced each edge.
    #[must_use]
    pub fn dependency_edges(&self, path: &str) -> Vec<(&str, RelationshipType)> {
        let Some(idx) = self.find_node(path) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .filter_map(|e| {
                self.path(e.target())
                    .map(|target| (target, e.weight().relationship))
            })
            .collect()
    }

    /// Plain adjacency view (`path -> ordered dependencies`), one entry per node.
    #[must_use]
    pub fn adjacency(&self) -> BTreeMap<String, Vec<String>> {
        self.graph
            .node_weights()
            .map(|node| {
                let deps = self
                    .dependencies(&node.path)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (node.path.clone(), deps)
            })
            .collect()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
