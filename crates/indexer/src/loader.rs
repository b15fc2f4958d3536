use crate::error::{IndexerError, Result};
use crate::scanner::{FileScanner, ScanOptions};
use crate::stats::LoadStats;
use std::path::Path;
use tfagent_protocol::{Corpus, FileRecord, RunContext};

/// Reads every Terraform file under a root into a [`Corpus`].
///
/// Reading is best-effort: a file that cannot be read (permissions, invalid
/// UTF-8) is skipped with a warning and recorded in [`LoadStats::errors`].
pub struct CorpusLoader {
    scanner: FileScanner,
    ctx: RunContext,
}

impl CorpusLoader {
    pub fn new(root: impl AsRef<Path>, ctx: RunContext) -> Self {
        Self::with_options(root, ScanOptions::default(), ctx)
    }

    pub fn with_options(root: impl AsRef<Path>, options: ScanOptions, ctx: RunContext) -> Self {
        Self {
            scanner: FileScanner::with_options(root, options, ctx.clone()),
            ctx,
        }
    }

    pub fn load(&self) -> Result<(Corpus, LoadStats)> {
        let root = self.scanner.root();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(root.display().to_string()));
        }

        let mut records = Vec::new();
        let mut stats = LoadStats::new();

        for path in self.scanner.scan() {
            let Some(relative) = self.scanner.relative_path(&path) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    log::debug!("[{}] Loaded file: {relative}", self.ctx);
                    stats.add_file(content.len());
                    records.push(FileRecord::new(relative, content));
                }
                Err(e) => {
                    log::warn!("[{}] Error reading file {}: {e}", self.ctx, path.display());
                    stats.add_error(format!("{relative}: {e}"));
                }
            }
        }

        let corpus: Corpus = records.into_iter().collect();
        log::info!(
            "[{}] Loaded {} Terraform files from {} ({} skipped)",
            self.ctx,
            stats.files,
            root.display(),
            stats.skipped
        );
        Ok((corpus, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_relative_paths_and_contents() {
        let temp = tempdir().unwrap();
        let app = temp.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(temp.path().join("variables.tf"), "variable \"region\" {}").unwrap();
        fs::write(app.join("main.tf"), "module \"net\" { source = \"../network\" }").unwrap();

        let (corpus, stats) = CorpusLoader::new(temp.path(), RunContext::with_id("t"))
            .load()
            .unwrap();

        assert_eq!(
            corpus.paths().collect::<Vec<_>>(),
            vec!["app/main.tf", "variables.tf"]
        );
        assert_eq!(corpus.get("variables.tf"), Some("variable \"region\" {}"));
        assert_eq!(stats.files, 2);
        assert!(stats.errors.is_empty());
    }

    #[test]
    fn unreadable_files_are_skipped_not_fatal() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.tf"), "ok").unwrap();
        fs::write(temp.path().join("binary.tf"), [0xff_u8, 0xfe, 0x00, 0x80]).unwrap();

        let (corpus, stats) = CorpusLoader::new(temp.path(), RunContext::with_id("t"))
            .load()
            .unwrap();

        assert_eq!(corpus.len(), 1);
        assert!(corpus.contains("main.tf"));
        assert_eq!(stats.skipped, 1);
        assert!(stats.errors[0].starts_with("binary.tf"));
    }

    #[test]
    fn scan_options_filter_the_corpus() {
        let temp = tempdir().unwrap();
        for dir in ["modules/vpc", "modules/legacy", "envs/prod"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
            fs::write(temp.path().join(dir).join("main.tf"), dir).unwrap();
        }

        let options = ScanOptions {
            include_paths: vec!["./modules/".to_string()],
            exclude_paths: vec!["modules/legacy".to_string()],
        };
        let (corpus, _) = CorpusLoader::with_options(temp.path(), options, RunContext::with_id("t"))
            .load()
            .unwrap();

        assert_eq!(corpus.paths().collect::<Vec<_>>(), vec!["modules/vpc/main.tf"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope");

        let err = CorpusLoader::new(&missing, RunContext::with_id("t"))
            .load()
            .unwrap_err();

        assert!(matches!(err, IndexerError::InvalidPath(_)));
    }
}
