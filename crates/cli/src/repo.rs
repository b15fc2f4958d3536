use anyhow::{bail, Context as AnyhowContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tfagent_protocol::RunContext;

/// Delay before a temporary checkout is removed
pub const CLEANUP_GRACE: Duration = Duration::from_secs(1);

const DEFAULT_BRANCH: &str = "main";
const GITHUB_PREFIX: &str = "https://github.com";

static GITHUB_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://github\.com/([^/]+/[^/]+)(?:/tree/([^/]+)(?:/(.+))?)?")
        .expect("GitHub URL pattern is valid")
});

/// A GitHub location, possibly pointing at a branch and a nested folder
#[derive(Clone, PartialEq, Eq)]
pub struct RepoUrl {
    /// `owner/repo`, when the URL could be parsed
    pub repo_name: Option<String>,
    pub clone_url: String,
    pub branch: String,
    pub nested_path: Option<String>,
    token: Option<String>,
}

impl RepoUrl {
    /// URLs that do not look like `https://github.com/<owner>/<repo>[/tree/<branch>[/<path>]]`
    /// are cloned as given, on the default branch.
    pub fn parse(url: &str, token: Option<&str>, ctx: &RunContext) -> Self {
        let token = token.filter(|t| !t.is_empty()).map(str::to_string);
        match GITHUB_URL_RE.captures(url) {
            Some(caps) => {
                let repo_name = caps[1].to_string();
                let branch = caps
                    .get(2)
                    .map_or(DEFAULT_BRANCH, |m| m.as_str())
                    .to_string();
                let nested_path = caps
                    .get(3)
                    .map(|m| m.as_str().trim_end_matches('/').to_string())
                    .filter(|p| !p.is_empty());
                log::info!(
                    "[{ctx}] Parsed repo: {repo_name}, branch: {branch}, nested path: {}",
                    nested_path.as_deref().unwrap_or("None")
                );
                Self {
                    clone_url: format!("{GITHUB_PREFIX}/{repo_name}"),
                    repo_name: Some(repo_name),
                    branch,
                    nested_path,
                    token,
                }
            }
            None => {
                log::warn!("[{ctx}] Could not parse repository URL: {url}, using as is");
                Self {
                    repo_name: None,
                    clone_url: url.to_string(),
                    branch: DEFAULT_BRANCH.to_string(),
                    nested_path: None,
                    token,
                }
            }
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Clone URL carrying the token, for GitHub URLs when a token was given
    pub fn auth_url(&self) -> String {
        match &self.token {
            Some(token) if self.clone_url.starts_with(GITHUB_PREFIX) => self
                .clone_url
                .replacen(GITHUB_PREFIX, &format!("https://{token}@github.com"), 1),
            _ => self.clone_url.clone(),
        }
    }

    fn redact(&self, text: &str) -> String {
        match &self.token {
            Some(token) => text.replace(token.as_str(), "***"),
            None => text.to_string(),
        }
    }
}

impl fmt::Debug for RepoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoUrl")
            .field("repo_name", &self.repo_name)
            .field("clone_url", &self.clone_url)
            .field("branch", &self.branch)
            .field("nested_path", &self.nested_path)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Where the Terraform corpus comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    Local(PathBuf),
    Remote(RepoUrl),
}

impl RepoSource {
    /// An existing directory is used in place; anything else is treated as a URL
    pub fn from_arg(arg: &str, token: Option<&str>, ctx: &RunContext) -> Self {
        let path = Path::new(arg);
        if path.is_dir() {
            Self::Local(path.to_path_buf())
        } else {
            Self::Remote(RepoUrl::parse(arg, token, ctx))
        }
    }

    pub async fn checkout(&self, ctx: RunContext) -> Result<RepoCheckout> {
        match self {
            Self::Local(path) => Ok(RepoCheckout::local(path, ctx)),
            Self::Remote(url) => RepoCheckout::clone_remote(url, ctx).await,
        }
    }
}

/// Corpus root for one run, owning the temporary clone when there is one
pub struct RepoCheckout {
    root: PathBuf,
    temp: Option<TempDir>,
    ctx: RunContext,
}

impl RepoCheckout {
    pub fn local(path: impl AsRef<Path>, ctx: RunContext) -> Self {
        Self {
            root: path.as_ref().to_path_buf(),
            temp: None,
            ctx,
        }
    }

    pub async fn clone_remote(url: &RepoUrl, ctx: RunContext) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("tfagent-")
            .tempdir()
            .context("Failed to create temporary directory")?;
        let dest = temp.path().join("repo");
        let checkout = Self {
            root: dest.clone(),
            temp: Some(temp),
            ctx,
        };
        log::info!(
            "[{}] Cloning {} to {}",
            checkout.ctx,
            url.clone_url,
            dest.display()
        );

        let root = match clone_with_fallback(url, &dest, &checkout.ctx).await {
            Ok(()) => nested_root(url, &dest, &checkout.ctx),
            Err(err) => Err(err),
        };

        match root {
            Ok(root) => Ok(Self { root, ..checkout }),
            Err(err) => {
                log::error!("[{}] Failed to clone repository: {err:#}", checkout.ctx);
                checkout.cleanup().await;
                Err(err)
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Remove the temporary clone, if any. Failures are logged, not returned.
    pub async fn cleanup(self) {
        let Some(temp) = self.temp else {
            return;
        };
        log::info!(
            "[{}] Cleaning up temporary directory: {}",
            self.ctx,
            temp.path().display()
        );
        tokio::time::sleep(CLEANUP_GRACE).await;
        if let Err(err) = temp.close() {
            log::warn!("[{}] Failed to remove temporary directory: {err}", self.ctx);
        }
    }
}

async fn clone_with_fallback(url: &RepoUrl, dest: &Path, ctx: &RunContext) -> Result<()> {
    let first = git_clone(&url.auth_url(), &url.branch, dest).await;
    let Err(stderr) = first else {
        log::info!("[{ctx}] Repository cloned successfully");
        return Ok(());
    };

    let auth_failed = stderr.to_lowercase().contains("authentication failed");
    if url.has_token() && !auth_failed {
        bail!("git clone failed: {}", url.redact(&stderr));
    }

    log::info!("[{ctx}] Trying to clone without authentication (public repository)");
    if dest.exists() {
        std::fs::remove_dir_all(dest)
            .with_context(|| format!("Failed to reset {}", dest.display()))?;
    }
    match git_clone(&url.clone_url, &url.branch, dest).await {
        Ok(()) => {
            log::info!("[{ctx}] Repository cloned successfully as public repository");
            Ok(())
        }
        Err(stderr) => bail!("git clone failed: {}", url.redact(&stderr)),
    }
}

/// Runs `git clone`; `Err` carries stderr
async fn git_clone(url: &str, branch: &str, dest: &Path) -> std::result::Result<(), String> {
    let output = tokio::process::Command::new("git")
        .arg("clone")
        .arg("--branch")
        .arg(branch)
        .arg(url)
        .arg(dest)
        .output()
        .await
        .map_err(|err| format!("failed to run git: {err}"))?;
    if output.status.success() {
        return Ok(());
    }
    Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
}

fn nested_root(url: &RepoUrl, dest: &Path, ctx: &RunContext) -> Result<PathBuf> {
    let Some(nested) = &url.nested_path else {
        return Ok(dest.to_path_buf());
    };
    let nested_dir = dest.join(nested);
    if !nested_dir.is_dir() {
        bail!("Nested directory not found: {nested}");
    }
    log::info!("[{ctx}] Using nested directory: {nested}");
    Ok(nested_dir)
}
