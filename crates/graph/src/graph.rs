use crate::error::{GraphError, Result};
use crate::types::DependencyGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

impl DependencyGraph {
    /// Every file reachable from `path` (direct and indirect), in discovery
    /// order, without duplicates and without `path` itself.
    pub fn transitive_dependencies(&self, path: &str) -> Result<Vec<&str>> {
        if !self.contains(path) {
            return Err(GraphError::NodeNotFound(path.to_string()));
        }
        let reachable = self.reachable_from([path]);
        Ok(reachable.into_iter().filter(|p| *p != path).collect())
    }

    /// Files reachable from any of `starts`, excluding the starts themselves.
    ///
    /// A single visited set is shared across all starts, so each node is
    /// expanded at most once and cyclic graphs terminate. Unknown start
    /// paths are ignored.
    pub fn reachable_from<'a, I>(&self, starts: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let start_nodes: Vec<NodeIndex> = starts
            .into_iter()
            .filter_map(|path| self.find_node(path))
            .collect();
        let start_set: HashSet<NodeIndex> = start_nodes.iter().copied().collect();

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut reported: HashSet<NodeIndex> = HashSet::new();
        let mut result = Vec::new();

        for start in start_nodes {
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                if !visited.insert(current) {
                    continue;
                }

                let mut targets: Vec<_> = self.graph.edges(current).collect();
                targets.sort_by_key(|e| e.id());
                let targets: Vec<NodeIndex> = targets.into_iter().map(|e| e.target()).collect();

                for &target in &targets {
                    if !start_set.contains(&target) && reported.insert(target) {
                        if let Some(path) = self.path(target) {
                            result.push(path);
                        }
                    }
                }
                // Pushed in reverse so the first-recorded dependency is expanded first.
                for &target in targets.iter().rev() {
                    if !visited.contains(&target) {
                        stack.push(target);
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{DependencyGraph, RelationshipType};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn chain(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (from, to) in edges {
            graph.add_dependency(from, to, RelationshipType::VariableDeclaration);
        }
        graph
    }

    #[test]
    fn follows_indirect_dependencies() {
        let graph = chain(&[("a.tf", "b.tf"), ("b.tf", "c.tf"), ("x.tf", "y.tf")]);

        assert_eq!(graph.transitive_dependencies("a.tf").unwrap(), vec!["b.tf", "c.tf"]);
        assert!(graph.transitive_dependencies("c.tf").unwrap().is_empty());
    }

    #[test]
    fn terminates_on_cycles() {
        let graph = chain(&[("a.tf", "b.tf"), ("b.tf", "a.tf"), ("b.tf", "c.tf"), ("c.tf", "c.tf")]);

        let deps = graph.transitive_dependencies("a.tf").unwrap();
        assert_eq!(deps, vec!["b.tf", "c.tf"]);
    }

    #[test]
    fn duplicate_edges_are_reported_once() {
        let graph = chain(&[("a.tf", "b.tf"), ("a.tf", "b.tf"), ("a.tf", "b.tf")]);

        assert_eq!(graph.transitive_dependencies("a.tf").unwrap(), vec!["b.tf"]);
    }

    #[test]
    fn unknown_start_is_an_error_for_single_lookups() {
        let graph = chain(&[("a.tf", "b.tf")]);

        assert!(graph.transitive_dependencies("z.tf").is_err());
        assert!(graph.reachable_from(["z.tf"]).is_empty());
    }

    #[test]
    fn multi_start_closure_skips_starts() {
        let graph = chain(&[("a.tf", "b.tf"), ("b.tf", "c.tf"), ("d.tf", "c.tf")]);

        let reachable = graph.reachable_from(["a.tf", "b.tf", "d.tf"]);
        assert_eq!(reachable, vec!["c.tf"]);
    }

    proptest! {
        #[test]
        fn closure_terminates_and_never_repeats(
            edges in proptest::collection::vec((0usize..8, 0usize..8), 0..40),
            start in 0usize..8,
        ) {
            let mut graph = DependencyGraph::new();
            for i in 0..8 {
                graph.add_file(&format!("f{i}.tf"));
            }
            for (from, to) in &edges {
                graph.add_dependency(
                    &format!("f{from}.tf"),
                    &format!("f{to}.tf"),
                    RelationshipType::ModuleSource,
                );
            }

            let start_path = format!("f{start}.tf");
            let deps = graph.transitive_dependencies(&start_path).unwrap();

            let unique: std::collections::HashSet<_> = deps.iter().collect();
            prop_assert_eq!(unique.len(), deps.len());
            prop_assert!(deps.len() < 8);
            prop_assert!(!deps.contains(&start_path.as_str()));
        }
    }
}
