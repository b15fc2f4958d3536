use ignore::{DirEntry, WalkBuilder};
use std::path::{Component, Path, PathBuf};
use tfagent_protocol::path_filters::path_allowed;
use tfagent_protocol::RunContext;

/// Scanner options beyond the fixed extension filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Only keep files under these root-relative prefixes (empty = everything)
    pub include_paths: Vec<String>,

    /// Drop files under these root-relative prefixes
    pub exclude_paths: Vec<String>,
}

/// Scanner for finding Terraform files under a root
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
    ctx: RunContext,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, ctx: RunContext) -> Self {
        Self::with_options(root, ScanOptions::default(), ctx)
    }

    pub fn with_options(root: impl AsRef<Path>, options: ScanOptions, ctx: RunContext) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
            ctx,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Terraform files under the root, sorted by path.
    ///
    /// Honours `.gitignore`, skips hidden entries, cache scopes and files
    /// over the size cap.
    pub fn scan(&self) -> Vec<PathBuf> {
        let root = self.root.clone();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .filter_entry(move |entry| !in_ignored_scope(entry.path(), &root))
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(|result| match result {
                Ok(entry) => self.accept(&entry),
                Err(err) => {
                    log::warn!("[{}] Failed to read entry: {err}", self.ctx);
                    None
                }
            })
            .collect();

        files.sort();
        log::info!("[{}] Found {} Terraform files", self.ctx, files.len());
        files
    }

    fn accept(&self, entry: &DirEntry) -> Option<PathBuf> {
        if !entry.file_type()?.is_file() || !is_terraform_file(entry.path()) {
            return None;
        }
        let path = entry.path();

        let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
        if size > MAX_FILE_SIZE_BYTES {
            log::debug!(
                "[{}] Skipping {} ({size} bytes exceeds {MAX_FILE_SIZE_BYTES})",
                self.ctx,
                path.display()
            );
            return None;
        }

        let rel = self.relative_path(path)?;
        if !path_allowed(&rel, &self.options.include_paths, &self.options.exclude_paths) {
            log::debug!("[{}] Skipping filtered file {rel}", self.ctx);
            return None;
        }
        Some(path.to_path_buf())
    }

    /// Root-relative, `/`-separated path used as the corpus key
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("/"))
    }
}

fn is_terraform_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c)))
}

/// True when any component below `root` names a VCS or cache directory
fn in_ignored_scope(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => {
            let lowered = name.to_string_lossy().to_lowercase();
            IGNORED_SCOPES.contains(&lowered.as_str())
        }
        _ => false,
    })
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS
    ".git",
    ".hg",
    ".svn",
    // provider/module caches
    ".terraform",
    ".terragrunt-cache",
    "node_modules",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

const SUPPORTED_EXTENSIONS: &[&str] = &["tf"];

#[cfg(test)]
mod tests {
    use super::{FileScanner, ScanOptions};
    use tfagent_protocol::RunContext;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keeps_only_terraform_sources() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.tf"), b"resource \"x\" \"y\" {}").unwrap();
        fs::write(temp.path().join("terraform.tfvars"), b"region = \"eu\"").unwrap();
        fs::write(temp.path().join("README.md"), b"# infra").unwrap();

        let scanner = FileScanner::new(temp.path(), RunContext::with_id("t"));
        let files = scanner.scan();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.tf"));
    }

    #[test]
    fn skips_provider_cache_directories() {
        let temp = tempdir().unwrap();
        let cache = temp.path().join(".terraform").join("modules").join("vpc");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("main.tf"), b"module cache").unwrap();
        fs::write(temp.path().join("main.tf"), b"").unwrap();

        let scanner = FileScanner::new(temp.path(), RunContext::with_id("t"));
        let files = scanner.scan();

        assert!(files
            .iter()
            .all(|p| !p.to_string_lossy().contains(".terraform")));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("modules").join("vpc");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("main.tf"), b"").unwrap();

        let scanner = FileScanner::new(temp.path(), RunContext::with_id("t"));
        let files = scanner.scan();
        let rel = scanner.relative_path(&files[0]).unwrap();

        assert_eq!(rel, "modules/vpc/main.tf");
    }

    #[test]
    fn exclude_prefixes_are_honoured() {
        let temp = tempdir().unwrap();
        let legacy = temp.path().join("legacy");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("main.tf"), b"").unwrap();
        fs::write(temp.path().join("main.tf"), b"").unwrap();

        let scanner = FileScanner::with_options(
            temp.path(),
            ScanOptions {
                include_paths: Vec::new(),
                exclude_paths: vec!["legacy".to_string()],
            },
            RunContext::with_id("t"),
        );
        let files = scanner.scan();

        assert_eq!(files.len(), 1);
        assert_eq!(scanner.relative_path(&files[0]).unwrap(), "main.tf");
    }
}
