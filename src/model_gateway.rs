use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::model::{Message, ModelProvider};
use crate::providers;

/// One outbound chat turn: the prior transcript followed by the new user message.
pub struct ModelGatewayRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGatewayResponse {
    pub content: String,
}

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<ModelGatewayResponse>> + 'a>>;

/// Remote conversational model as seen by the session.
pub trait ModelGateway {
    fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a>;
}

/// Sends chat turns to the provider selected in [`Config`].
pub struct HostModelGateway<'a> {
    client: Client,
    cfg: &'a Config,
}

impl<'a> HostModelGateway<'a> {
    pub fn from_config(cfg: &'a Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.model_timeout_secs))
            .build()
            .context("Failed to initialize HTTP client")?;
        Ok(Self { client, cfg })
    }
}

impl ModelGateway for HostModelGateway<'_> {
    fn chat<'a>(&'a self, request: ModelGatewayRequest) -> ModelGatewayFuture<'a> {
        Box::pin(async move {
            let content = match self.cfg.model_provider {
                ModelProvider::Gemini => {
                    providers::gemini::chat(&self.client, self.cfg, &request.messages).await?
                }
            };
            debug!(
                provider = self.cfg.model_provider.as_str(),
                message_count = request.messages.len(),
                response_len = content.len(),
                "model turn completed"
            );
            Ok(ModelGatewayResponse { content })
        })
    }
}
