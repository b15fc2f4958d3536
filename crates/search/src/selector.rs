use crate::keywords::{domain_keywords, extract_keywords, KeywordSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tfagent_graph::DependencyGraph;
use tfagent_protocol::{Corpus, RunContext};

/// Selection phase that first added a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStage {
    /// A prompt keyword occurs in the file content or path
    Keyword,

    /// Network augmentation keyword match
    Domain,

    /// Reachable through the dependency graph from a selected file
    Dependency,

    /// Added by the minimum-coverage fallback
    Coverage,
}

impl fmt::Display for SelectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Keyword => "keyword",
            Self::Domain => "domain",
            Self::Dependency => "dependency",
            Self::Coverage => "coverage",
        })
    }
}

/// Files chosen for a prompt, with the stage that chose each.
///
/// Only grows: a path, once inserted, keeps its content and stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelevantFileSet {
    files: BTreeMap<String, String>,
    stages: BTreeMap<String, SelectionStage>,
}

impl RelevantFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless present. Returns whether the path was new.
    pub fn insert(&mut self, path: &str, content: &str, stage: SelectionStage) -> bool {
        if self.files.contains_key(path) {
            return false;
        }
        self.files.insert(path.to_string(), content.to_string());
        self.stages.insert(path.to_string(), stage);
        true
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    #[must_use]
    pub fn stage(&self, path: &str) -> Option<SelectionStage> {
        self.stages.get(path).copied()
    }

    #[must_use]
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn into_files(self) -> BTreeMap<String, String> {
        self.files
    }
}

/// Tunables for the coverage fallback
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Below this many files, important files are added
    pub min_files: usize,

    /// Path suffixes that mark a file as important
    pub important_files: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_files: 3,
            important_files: vec![
                "main.tf".to_string(),
                "variables.tf".to_string(),
                "outputs.tf".to_string(),
            ],
        }
    }
}

/// Keyword + dependency based file selection
pub struct RelevanceSelector {
    config: SelectorConfig,
    ctx: RunContext,
}

impl RelevanceSelector {
    pub fn new(ctx: RunContext) -> Self {
        Self::with_config(SelectorConfig::default(), ctx)
    }

    pub fn with_config(config: SelectorConfig, ctx: RunContext) -> Self {
        Self { config, ctx }
    }

    /// Select the files relevant to `prompt`.
    ///
    /// Stages run in order and only add files. The result may still be empty;
    /// falling back to the whole corpus is the caller's decision.
    pub fn select(&self, corpus: &Corpus, graph: &DependencyGraph, prompt: &str) -> RelevantFileSet {
        let mut relevant = RelevantFileSet::new();

        let keywords = extract_keywords(prompt);
        log::info!(
            "[{}] Extracted keywords from prompt: {:?}",
            self.ctx,
            keywords.iter().collect::<Vec<_>>()
        );

        self.match_keywords(corpus, &keywords, SelectionStage::Keyword, &mut relevant);

        if let Some(extra) = domain_keywords(prompt) {
            let extra = KeywordSet::from_terms(extra);
            self.match_keywords(corpus, &extra, SelectionStage::Domain, &mut relevant);
        }

        self.add_dependencies(corpus, graph, &mut relevant);

        if relevant.len() < self.config.min_files {
            self.add_important_files(corpus, &mut relevant);
        }

        log::info!(
            "[{}] Found {} relevant files for prompt",
            self.ctx,
            relevant.len()
        );
        relevant
    }

    fn match_keywords(
        &self,
        corpus: &Corpus,
        keywords: &KeywordSet,
        stage: SelectionStage,
        relevant: &mut RelevantFileSet,
    ) {
        if keywords.is_empty() {
            return;
        }
        for (path, content) in corpus.iter() {
            if relevant.contains(path) {
                continue;
            }
            if keywords.any_in(&content.to_lowercase()) || keywords.any_in(&path.to_lowercase()) {
                relevant.insert(path, content, stage);
                log::debug!("[{}] Found relevant file ({stage:?}): {path}", self.ctx);
            }
        }
    }

    fn add_dependencies(&self, corpus: &Corpus, graph: &DependencyGraph, relevant: &mut RelevantFileSet) {
        let selected: Vec<String> = relevant.paths().map(str::to_string).collect();
        for dep in graph.reachable_from(selected.iter().map(String::as_str)) {
            // Dangling targets (not in the corpus) are skipped.
            let Some(content) = corpus.get(dep) else {
                continue;
            };
            if relevant.insert(dep, content, SelectionStage::Dependency) {
                log::debug!("[{}] Added dependency file: {dep}", self.ctx);
            }
        }
    }

    fn add_important_files(&self, corpus: &Corpus, relevant: &mut RelevantFileSet) {
        for (path, content) in corpus.iter() {
            let important = self
                .config
                .important_files
                .iter()
                .any(|suffix| path.ends_with(suffix.as_str()));
            if important && relevant.insert(path, content, SelectionStage::Coverage) {
                log::debug!("[{}] Added important file: {path}", self.ctx);
            }
        }
    }
}
