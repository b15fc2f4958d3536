use crate::error::{BackendError, Result};
use crate::provider::{BackendSettings, Provider};
use crate::{http_client, read_json, GenerationBackend};
use async_trait::async_trait;
use serde_json::json;
use tfagent_protocol::RunContext;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Chat completions backend
pub struct OpenAiBackend {
    client: reqwest::Client,
    settings: BackendSettings,
    ctx: RunContext,
}

impl OpenAiBackend {
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
impl GenerationBackend for OpenAiBackend {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn generate(&self, system: &str, user: &str) -> Result<String> {
        let url = self.settings.endpoint(Provider::OpenAi, CHAT_COMPLETIONS_PATH);
        let model = self.settings.model_for(Provider::OpenAi);
        log::debug!("[{}] POST {url} (model {model})", self.ctx);

        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": self.settings.max_tokens,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;
        let value = read_json(response).await?;

        let choices = value
            .get("choices")
            .and_then(|v| v.as_array())
            .ok_or_else(|| BackendError::Decode("missing choices".to_string()))?;
        choices
            .first()
            .and_then(|choice| choice.pointer("/message/content"))
            .and_then(|content| content.as_str())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(BackendError::EmptyReply)
    }
}
