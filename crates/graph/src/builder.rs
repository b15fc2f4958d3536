use crate::types::{DependencyGraph, ModuleMatch, RelationshipType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tfagent_protocol::path_filters::resolve_from;
use tfagent_protocol::{Corpus, RunContext};

static MODULE_SOURCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"module\s+["']([\w-]+)["']\s*\{[^}]*source\s*=\s*["']([\w./-]+)["']"#)
        .expect("module source pattern is valid")
});

static VARIABLE_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var\.([a-zA-Z0-9_-]+)").expect("variable pattern is valid"));

/// Module `source` values declared in `content`, in order of appearance.
#[must_use]
pub fn extract_module_sources(content: &str) -> Vec<String> {
    MODULE_SOURCE_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(2).map(|m| m.as_str().to_string()))
        .collect()
}

/// Unique identifiers referenced as `var.<name>`.
#[must_use]
pub fn extract_variable_references(content: &str) -> BTreeSet<String> {
    VARIABLE_REF_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

fn is_local_source(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../")
}

/// Build a [`DependencyGraph`] from textual cross-references in a corpus
pub struct GraphBuilder {
    module_match: ModuleMatch,
    ctx: RunContext,
}

impl GraphBuilder {
    pub fn new(ctx: RunContext) -> Self {
        Self {
            module_match: ModuleMatch::default(),
            ctx,
        }
    }

    #[must_use]
    pub fn with_module_match(mut self, module_match: ModuleMatch) -> Self {
        self.module_match = module_match;
        self
    }

    /// Build the graph. Every corpus file gets a node, even without edges.
    pub fn build(&self, corpus: &Corpus) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for path in corpus.paths() {
            graph.add_file(path);
        }

        for (file_path, content) in corpus.iter() {
            // Phase 1: module sources resolved to directories
            for source in extract_module_sources(content) {
                if !is_local_source(&source) {
                    continue;
                }
                let target_dir = resolve_from(file_path, &source);

                for other in corpus.paths() {
                    if other == file_path || !self.module_match.matches(&target_dir, other) {
                        continue;
                    }
                    graph.add_dependency(file_path, other, RelationshipType::ModuleSource);
                    log::debug!("[{}] Added dependency: {file_path} -> {other}", self.ctx);
                }
            }

            // Phase 2: variable usages resolved to declarations
            for var_name in extract_variable_references(content) {
                let declaration = format!("variable \"{var_name}\"");
                for (other, other_content) in corpus.iter() {
                    if other == file_path || !other_content.contains(&declaration) {
                        continue;
                    }
                    graph.add_dependency(file_path, other, RelationshipType::VariableDeclaration);
                    log::debug!(
                        "[{}] Added variable dependency: {file_path} -> {other}",
                        self.ctx
                    );
                }
            }
        }

        log::info!(
            "[{}] Built dependency graph: {} files, {} edges ({} module matching)",
            self.ctx,
            graph.node_count(),
            graph.edge_count(),
            self.module_match
        );

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn builder() -> GraphBuilder {
        GraphBuilder::new(RunContext::with_id("test"))
    }

    #[test]
    fn extracts_module_sources_with_either_quote_style() {
        let content = r#"
module "vpc" {
  source = "./modules/vpc"
  cidr   = var.cidr
}

module 'db' {
  source = '../shared/db'
}

module "registry" {
  source  = "terraform-aws-modules/vpc/aws"
}
"#;
        assert_eq!(
            extract_module_sources(content),
            vec!["./modules/vpc", "../shared/db", "terraform-aws-modules/vpc/aws"]
        );
    }

    #[test]
    fn extracts_unique_variable_references() {
        let refs = extract_variable_references("a = var.region\nb = var.region\nc = var.vpc-id");
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec!["region".to_string(), "vpc-id".to_string()]
        );
    }

    #[test]
    fn relative_module_source_links_to_directory_files() {
        let corpus: Corpus = [
            ("app/main.tf", "module \"net\" {\n  source = \"../network\"\n}"),
            ("network/main.tf", "resource \"aws_vpc\" \"this\" {}"),
            ("network/outputs.tf", "output \"id\" {}"),
            ("other/main.tf", ""),
        ]
        .into_iter()
        .collect();

        let graph = builder().build(&corpus);

        assert_eq!(
            graph.dependencies("app/main.tf"),
            vec!["network/main.tf", "network/outputs.tf"]
        );
        assert!(graph.dependencies("other/main.tf").is_empty());
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn registry_sources_are_not_followed() {
        let corpus: Corpus = [
            ("main.tf", "module \"vpc\" { source = \"terraform-aws-modules/vpc/aws\" }"),
            ("terraform-aws-modules/vpc/aws/main.tf", ""),
        ]
        .into_iter()
        .collect();

        let graph = builder().build(&corpus);
        assert!(graph.dependencies("main.tf").is_empty());
    }

    #[test]
    fn prefix_mode_over_matches_sibling_directories() {
        let corpus: Corpus = [
            ("main.tf", "module \"n\" { source = \"./network\" }"),
            ("network/main.tf", ""),
            ("network-v2/main.tf", ""),
        ]
        .into_iter()
        .collect();

        let prefix = builder().build(&corpus);
        assert_eq!(
            prefix.dependencies("main.tf"),
            vec!["network-v2/main.tf", "network/main.tf"]
        );

        let segment = builder()
            .with_module_match(ModuleMatch::Segment)
            .build(&corpus);
        assert_eq!(segment.dependencies("main.tf"), vec!["network/main.tf"]);
    }

    #[test]
    fn variable_usage_links_to_declaring_file() {
        let corpus: Corpus = [
            ("main.tf", "provider \"aws\" { region = var.region }"),
            ("variables.tf", "variable \"region\" {\n  default = \"eu-west-1\"\n}"),
            ("unrelated.tf", "variable \"zone\" {}"),
        ]
        .into_iter()
        .collect();

        let graph = builder().build(&corpus);
        assert_eq!(graph.dependencies("main.tf"), vec!["variables.tf"]);
        assert!(graph.dependencies("variables.tf").is_empty());
    }

    #[test]
    fn mutual_references_form_a_cycle_without_self_edges() {
        let corpus: Corpus = [
            ("a.tf", "variable \"a\" {}\nx = var.b\ny = var.a"),
            ("b.tf", "variable \"b\" {}\nz = var.a"),
        ]
        .into_iter()
        .collect();

        let graph = builder().build(&corpus);
        assert_eq!(graph.dependencies("a.tf"), vec!["b.tf"]);
        assert_eq!(graph.dependencies("b.tf"), vec!["a.tf"]);
        assert_eq!(graph.transitive_dependencies("a.tf").unwrap(), vec!["b.tf"]);
    }
}
