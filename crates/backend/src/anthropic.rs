use crate::error::{BackendError, Result};
use crate::provider::{BackendSettings, Provider};
use crate::{http_client, read_json, GenerationBackend};
use async_trait::async_trait;
use serde_json::json;
use tfagent_protocol::RunContext;

const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API backend
pub struct AnthropicBackend {
    client: reqwest::Client,
    settings: BackendSettings,
    ctx: RunContext,
}

impl AnthropicBackend {
    pub fn new(settings: BackendSettings, ctx: RunContext) -> Result<Self> {
        settings.require_api_key()?;
        Ok(Self {
            client: http_client()?,
            settings,
            ctx,
        })
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = self.settings.endpoint(Provider::Anthropic, MESSAGES_PATH);
        let model = self.settings.model_for(Provider::Anthropic);
        log::debug!("[{}] POST {url} (model {model})", self.ctx);

        let body = json!({
            "model": model,
            "system": system,
            "max_tokens": self.settings.max_tokens,
            "messages": [
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let value = read_json(response).await?;

        let content = value
            .get("content")
            .and_then(|v| v.as_array())
            .ok_or_else(|| BackendError::Decode("missing content".to_string()))?;
        content
            .first()
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(BackendError::EmptyReply)
    }
}
