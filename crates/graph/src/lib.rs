//! # tfagent Graph
//!
//! Textual dependency graph between Terraform files.
//!
//! ## Architecture
//!
//! ```text
//! Corpus (path -> content)
//!     │
//!     ├──> Graph Builder (regex extraction)
//!     │      ├─ module "x" { source = "./..." }  -> ModuleSource edges
//!     │      └─ var.name -> variable "name"      -> VariableDeclaration edges
//!     │
//!     └──> Dependency Graph (petgraph)
//!            ├─ Nodes: file paths
//!            ├─ Edges: references (duplicates allowed, cycles allowed)
//!            └─ Cycle-safe transitive traversal
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::{extract_module_sources, extract_variable_references, GraphBuilder};
pub use error::{GraphError, Result};
pub use types::{DependencyEdge, DependencyGraph, FileNode, ModuleMatch, RelationshipType};
