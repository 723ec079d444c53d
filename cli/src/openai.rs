use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::config::OpenAiSettings;
use tastecycle_core::ai::ReplacementPrompt;
use tastecycle_core::openai::{ApiErrorBody, ResponsesRequest, ResponsesResponse};
use tastecycle_core::service::MenuAssistant;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

pub struct OpenAiClient {
    client: reqwest::Client,
    settings: Option<OpenAiSettings>,
    rt: tokio::runtime::Handle,
}

impl OpenAiClient {
    pub fn new(settings: Option<OpenAiSettings>, rt: tokio::runtime::Handle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("tastecycle-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(90))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            settings,
            rt,
        })
    }

    pub async fn suggest_replacements_async(&self, prompt: &ReplacementPrompt) -> Result<String> {
        let Some(settings) = &self.settings else {
            bail!("OpenAI is not configured. Set OPENAI_API_KEY to use AI replacement");
        };
        debug!(model = %settings.model, "requesting menu replacements");

        let resp = self
            .client
            .post(RESPONSES_URL)
            .bearer_auth(&settings.api_key)
            .json(&ResponsesRequest::for_prompt(&settings.model, prompt))
            .send()
            .await
            .context("Failed to reach OpenAI API")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(|_| body.trim().to_string(), |b| b.error.message);
            bail!("OpenAI API returned HTTP {}: {message}", status.as_u16());
        }

        let data: ResponsesResponse = resp
            .json()
            .await
            .context("Failed to parse OpenAI response")?;
        let text = data.output_text();
        debug!(chars = text.len(), "received menu replacements");
        Ok(text)
    }
}

impl MenuAssistant for OpenAiClient {
    fn suggest_replacements(&self, prompt: &ReplacementPrompt) -> Result<String> {
        self.rt.block_on(self.suggest_replacements_async(prompt))
    }
}
