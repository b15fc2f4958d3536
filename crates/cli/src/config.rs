use anyhow::{anyhow, bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tfagent_backend::{BackendSettings, Provider, DEFAULT_MAX_TOKENS};
use tfagent_graph::ModuleMatch;
use tfagent_indexer::ScanOptions;
use tfagent_protocol::RunContext;
use tfagent_search::SelectorConfig;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Run configuration, read from an optional JSON/TOML file and then
/// overridden by command-line flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    pub provider: Provider,
    /// `null` disables writing results
    pub output_dir: Option<PathBuf>,
    pub github_token: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub module_match: ModuleMatch,
    pub min_files: usize,
    /// Only load files under these repository-relative prefixes
    pub include_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: Provider::default(),
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            github_token: None,
            model: None,
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            module_match: ModuleMatch::default(),
            min_files: SelectorConfig::default().min_files,
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
        }
    }
}

impl AgentConfig {
    /// Load `path` when given. A path that does not exist yields the defaults.
    pub fn load_optional(path: Option<&Path>, ctx: &RunContext) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                log::debug!("[{ctx}] Loading config from {}", path.display());
                Self::load(path)
            }
            Some(path) => {
                log::warn!(
                    "[{ctx}] Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            parse_toml(&bytes)
        } else {
            parse_json_or_toml(&bytes)
        };
        config.with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn validate(&self, dry_run: bool) -> Result<()> {
        if !dry_run && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            bail!("API key is required. Provide it via --api-key or in the configuration file.");
        }
        if self.max_tokens == 0 {
            bail!("max_tokens must be greater than zero");
        }
        if let Some(base_url) = &self.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                bail!("base_url must start with http:// or https:// (got {base_url})");
            }
        }
        Ok(())
    }

    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig {
            min_files: self.min_files,
            ..SelectorConfig::default()
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include_paths: self.include_paths.clone(),
            exclude_paths: self.exclude_paths.clone(),
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        let mut settings = BackendSettings::new(self.api_key.clone().unwrap_or_default())
            .with_max_tokens(self.max_tokens);
        if let Some(model) = &self.model {
            settings = settings.with_model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        settings
    }
}

fn parse_toml(bytes: &[u8]) -> Result<AgentConfig> {
    let text = std::str::from_utf8(bytes).context("Config is not valid UTF-8")?;
    toml::from_str(text).map_err(|err| anyhow!("TOML parse error: {err}"))
}

fn parse_json_or_toml(bytes: &[u8]) -> Result<AgentConfig> {
    match serde_json::from_slice(bytes) {
        Ok(config) => Ok(config),
        Err(json_err) => parse_toml(bytes)
            .map_err(|toml_err| anyhow!("Config is not valid JSON ({json_err}) or TOML ({toml_err})")),
    }
}
