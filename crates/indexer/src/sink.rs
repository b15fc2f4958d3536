use crate::error::{IndexerError, Result};
use std::path::{Component, Path, PathBuf};
use tfagent_protocol::{ModificationResult, RunContext};

/// Writes reconciled files under an output directory.
pub struct ResultSink {
    root: PathBuf,
    ctx: RunContext,
}

impl ResultSink {
    pub fn new(root: impl AsRef<Path>, ctx: RunContext) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ctx,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every entry to `root/path`, creating intermediate directories.
    ///
    /// Returns the written file paths. Absolute paths and paths containing
    /// `..` are rejected before anything is written.
    pub fn write(&self, files: &ModificationResult) -> Result<Vec<PathBuf>> {
        let targets = files
            .iter()
            .map(|(rel, content)| Ok((safe_join(&self.root, rel)?, content)))
            .collect::<Result<Vec<_>>>()?;

        std::fs::create_dir_all(&self.root)?;

        let mut written = Vec::with_capacity(targets.len());
        for (target, content) in targets {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, content)?;
            written.push(target);
        }

        log::info!(
            "[{}] Saved {} modified files to {}",
            self.ctx,
            written.len(),
            self.root.display()
        );
        Ok(written)
    }
}

fn safe_join(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    let mut has_component = false;
    for component in rel_path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(IndexerError::UnsafeOutputPath(rel.to_string()));
            }
            Component::CurDir => {}
            Component::Normal(_) => has_component = true,
        }
    }
    if !has_component {
        return Err(IndexerError::UnsafeOutputPath(rel.to_string()));
    }
    Ok(root.join(rel_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_nested_files() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("output");
        let mut files = ModificationResult::new();
        files.insert("modules/vpc/main.tf".to_string(), "vpc".to_string());
        files.insert("main.tf".to_string(), "root".to_string());

        let written = ResultSink::new(&out, RunContext::with_id("t"))
            .write(&files)
            .unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(out.join("modules/vpc/main.tf")).unwrap(),
            "vpc"
        );
        assert_eq!(std::fs::read_to_string(out.join("main.tf")).unwrap(), "root");
    }

    #[test]
    fn rejects_escaping_paths_before_writing() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("output");
        let mut files = ModificationResult::new();
        files.insert("a.tf".to_string(), "a".to_string());
        files.insert("../evil.tf".to_string(), "x".to_string());

        let err = ResultSink::new(&out, RunContext::with_id("t"))
            .write(&files)
            .unwrap_err();

        assert!(matches!(err, IndexerError::UnsafeOutputPath(_)));
        assert!(!out.join("a.tf").exists());
    }
}
