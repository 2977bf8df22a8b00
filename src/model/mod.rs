pub mod auth;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::{AppConfig, Timeouts};
use crate::error::UpstreamError;
use crate::web::models::Message;
use auth::AccessToken;

/// Something that turns a conversation into the assistant's next reply.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, UpstreamError>;
}

/// Shared outbound client with explicit timeouts.
pub fn http_client(timeouts: Timeouts) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}

/// The most recent `window` messages, in original order.
pub fn recent_window(messages: &[Message], window: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(window)..]
}

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    system: &'a str,
    messages: &'a [Message],
}

/// Forwards conversations to the provider's chat completions endpoint.
pub struct ChatForwarder {
    client: Client,
    completions_url: String,
    token: AccessToken,
    system_prompt: String,
    window: usize,
}

impl ChatForwarder {
    pub fn new(
        client: Client,
        completions_url: impl Into<String>,
        token: AccessToken,
        system_prompt: impl Into<String>,
        window: usize,
    ) -> Self {
        Self {
            client,
            completions_url: completions_url.into(),
            token,
            system_prompt: system_prompt.into(),
            window,
        }
    }

    pub fn from_config(client: Client, config: &AppConfig, token: AccessToken) -> Self {
        Self::new(
            client,
            config.completions_url.clone(),
            token,
            config.system_prompt.clone(),
            config.history_window,
        )
    }

    pub async fn forward(&self, messages: &[Message]) -> Result<String, UpstreamError> {
        let recent = recent_window(messages, self.window);
        if recent.len() < messages.len() {
            info!("Dropping {} older messages", messages.len() - recent.len());
        }

        let payload = CompletionPayload {
            system: &self.system_prompt,
            messages: recent,
        };
        debug!("Payload: {:?}", payload);

        let response = self
            .client
            .post(&self.completions_url)
            .query(&[("access_token", self.token.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(UpstreamError::request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await.map_err(UpstreamError::request)?;
        debug!("Response: {}", data);

        if let Some(result) = data.get("result").and_then(Value::as_str) {
            return Ok(result.to_string());
        }

        let code = data.get("error_code").and_then(Value::as_i64);
        let message = data.get("error_msg").and_then(Value::as_str);
        match code {
            Some(code) => Err(UpstreamError::Provider {
                code,
                message: message.unwrap_or_default().to_string(),
            }),
            None => Err(UpstreamError::MissingResult),
        }
    }
}

#[async_trait]
impl ChatCompletion for ChatForwarder {
    async fn complete(&self, messages: &[Message]) -> Result<String, UpstreamError> {
        self.forward(messages).await
    }
}
