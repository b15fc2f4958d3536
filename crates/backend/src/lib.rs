//! # tfagent Backend
//!
//! Text generation for change requests.
//!
//! - [`PromptBuilder`] renders the system instructions and the user
//!   message carrying the selected files.
//! - [`GenerationBackend`] is the seam to the remote model; [`OpenAiBackend`]
//!   and [`AnthropicBackend`] are the HTTP implementations.
//!
//! ```no_run
//! use tfagent_backend::{backend_for, BackendSettings, GenerationBackend, Provider};
//! use tfagent_protocol::RunContext;
//!
//! # async fn run() -> tfagent_backend::Result<()> {
//! let backend = backend_for(Provider::OpenAi, BackendSettings::new("sk-..."), RunContext::new())?;
//! let reply = backend.generate("system", "user").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod anthropic;
mod error;
mod openai;
mod prompt;
mod provider;

pub use anthropic::AnthropicBackend;
pub use error::{BackendError, Result};
pub use openai::OpenAiBackend;
pub use prompt::{PromptBuilder, RenderedPrompt, SYSTEM_PROMPT};
pub use provider::{BackendSettings, Provider, DEFAULT_MAX_TOKENS};

use async_trait::async_trait;
use tfagent_protocol::RunContext;

/// Remote text generation
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn provider(&self) -> Provider;

    /// Send one system/user exchange and return the raw reply text
    async fn generate(&self, system: &str, user: &str) -> Result<String>;
}

/// Construct the HTTP backend for `provider`
pub fn backend_for(
    provider: Provider,
    settings: BackendSettings,
    ctx: RunContext,
) -> Result<Box<dyn GenerationBackend>> {
    Ok(match provider {
        Provider::OpenAi => Box::new(OpenAiBackend::new(settings, ctx)?),
        Provider::Anthropic => Box::new(AnthropicBackend::new(settings, ctx)?),
    })
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().build()?)
}

async fn read_json(response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}
