use crate::config::AgentConfig;
use crate::repo::RepoSource;
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tfagent_backend::{GenerationBackend, PromptBuilder};
use tfagent_graph::{DependencyGraph, GraphBuilder, ModuleMatch, RelationshipType};
use tfagent_indexer::{CorpusLoader, ResultSink, ScanOptions};
use tfagent_protocol::{EnhancementOutcome, RunContext};
use tfagent_reconcile::Reconciler;
use tfagent_search::{extract_keywords, RelevanceSelector, SelectionStage, SelectorConfig};

/// One file chosen for the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub path: String,
    /// `None` when the whole corpus was used as a fallback
    pub stage: Option<SelectionStage>,
}

/// One graph edge, with the reference that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyLink {
    pub from: String,
    pub to: String,
    pub relationship: RelationshipType,
}

/// Everything decided before the backend is called
#[derive(Debug, Clone, Serialize)]
pub struct SelectionPlan {
    pub keywords: Vec<String>,
    pub corpus_files: usize,
    pub whole_corpus_fallback: bool,
    pub selected: Vec<SelectedFile>,
    /// Dependency graph, `file -> dependencies`
    pub adjacency: BTreeMap<String, Vec<String>>,
    /// Distinct edges, ordered by source file
    pub links: Vec<DependencyLink>,
    #[serde(skip)]
    contents: BTreeMap<String, String>,
}

impl SelectionPlan {
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contents.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }
}

/// Runs one change request end to end:
/// load -> graph -> select -> generate -> reconcile -> write
pub struct Enhancer {
    ctx: RunContext,
    module_match: ModuleMatch,
    selector: SelectorConfig,
    scan: ScanOptions,
    output_dir: Option<PathBuf>,
}

impl Enhancer {
    pub fn new(config: &AgentConfig, ctx: RunContext) -> Self {
        Self {
            ctx,
            module_match: config.module_match,
            selector: config.selector_config(),
            scan: config.scan_options(),
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Acquire the corpus, run the pipeline, and always release the checkout
    pub async fn enhance(
        &self,
        source: &RepoSource,
        prompt: &str,
        backend: &dyn GenerationBackend,
    ) -> Result<EnhancementOutcome> {
        let checkout = source.checkout(self.ctx.clone()).await?;
        let result = self.enhance_dir(checkout.root(), prompt, backend).await;
        checkout.cleanup().await;
        result
    }

    /// Selection only; the backend is never contacted
    pub async fn dry_run(&self, source: &RepoSource, prompt: &str) -> Result<SelectionPlan> {
        let checkout = source.checkout(self.ctx.clone()).await?;
        let result = self.plan(checkout.root(), prompt);
        checkout.cleanup().await;
        result
    }

    pub fn plan(&self, root: &Path, prompt: &str) -> Result<SelectionPlan> {
        let loader = CorpusLoader::with_options(root, self.scan.clone(), self.ctx.clone());
        let (corpus, stats) = loader
            .load()
            .with_context(|| format!("Failed to load Terraform files from {}", root.display()))?;
        if !stats.errors.is_empty() {
            log::warn!(
                "[{}] {} files could not be read",
                self.ctx,
                stats.errors.len()
            );
        }

        let graph = GraphBuilder::new(self.ctx.clone())
            .with_module_match(self.module_match)
            .build(&corpus);
        let relevant = RelevanceSelector::with_config(self.selector.clone(), self.ctx.clone())
            .select(&corpus, &graph, prompt);

        let whole_corpus_fallback = relevant.is_empty();
        let (selected, contents) = if whole_corpus_fallback {
            log::warn!("[{}] No relevant files found. Using all Terraform files.", self.ctx);
            let selected = corpus
                .paths()
                .map(|path| SelectedFile {
                    path: path.to_string(),
                    stage: None,
                })
                .collect();
            (selected, corpus.as_map().clone())
        } else {
            let selected = relevant
                .paths()
                .map(|path| SelectedFile {
                    path: path.to_string(),
                    stage: relevant.stage(path),
                })
                .collect();
            (selected, relevant.into_files())
        };

        Ok(SelectionPlan {
            keywords: extract_keywords(prompt).iter().map(str::to_string).collect(),
            corpus_files: corpus.len(),
            whole_corpus_fallback,
            selected,
            adjacency: graph.adjacency(),
            links: links(&graph),
            contents,
        })
    }

    /// Pipeline against an already available corpus root
    pub async fn enhance_dir(
        &self,
        root: &Path,
        prompt: &str,
        backend: &dyn GenerationBackend,
    ) -> Result<EnhancementOutcome> {
        let plan = self.plan(root, prompt)?;
        log::info!(
            "[{}] Sending {} files to {} for enhancement",
            self.ctx,
            plan.selected.len(),
            backend.provider()
        );

        let rendered = PromptBuilder::new(prompt).render(plan.files());
        let reply = match backend.generate(&rendered.system, &rendered.user).await {
            Ok(reply) => reply,
            Err(err) => {
                log::error!("[{}] Error calling {} API: {err}", self.ctx, backend.provider());
                return Ok(EnhancementOutcome::BackendUnavailable {
                    reason: err.to_string(),
                });
            }
        };

        let reconciliation = Reconciler::new(self.ctx.clone()).reconcile(&reply);
        if !reconciliation.is_parsed() {
            return Ok(EnhancementOutcome::Unparseable);
        }
        let files = reconciliation.files;

        if let Some(output_dir) = &self.output_dir {
            ResultSink::new(output_dir, self.ctx.clone())
                .write(&files)
                .with_context(|| format!("Failed to save results to {}", output_dir.display()))?;
        }

        Ok(EnhancementOutcome::Modified { files })
    }
}

fn links(graph: &DependencyGraph) -> Vec<DependencyLink> {
    let mut links = Vec::new();
    for from in graph.adjacency().into_keys() {
        for (to, relationship) in graph.dependency_edges(&from) {
            let link = DependencyLink {
                from: from.clone(),
                to: to.to_string(),
                relationship,
            };
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}
