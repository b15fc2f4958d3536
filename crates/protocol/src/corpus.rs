use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One loaded infrastructure file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the corpus root, always `/`-separated
    pub path: String,

    /// Full file text
    pub content: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// In-memory snapshot of every loaded file for one run (`path -> content`).
///
/// Immutable once built; every later stage borrows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    files: BTreeMap<String, String>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file. Used by the loader while the corpus is built.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
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

    /// Borrow the whole mapping.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.files
    }
}

impl From<BTreeMap<String, String>> for Corpus {
    fn from(files: BTreeMap<String, String>) -> Self {
        Self { files }
    }
}

impl<P: Into<String>, C: Into<String>> FromIterator<(P, C)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(p, c)| (p.into(), c.into()))
                .collect(),
        }
    }
}

impl FromIterator<FileRecord> for Corpus {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        iter.into_iter().map(|r| (r.path, r.content)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn corpus_is_keyed_by_path() {
        let corpus: Corpus = [("main.tf", "a"), ("variables.tf", "b"), ("main.tf", "c")]
            .into_iter()
            .collect();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("main.tf"), Some("c"));
        assert!(corpus.contains("variables.tf"));
        assert!(!corpus.contains("outputs.tf"));
        assert_eq!(corpus.paths().collect::<Vec<_>>(), vec!["main.tf", "variables.tf"]);
    }
}
