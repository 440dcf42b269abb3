use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Config, SafetySettings};
use crate::model::Message;
use crate::providers::http_errors::model_api_request_error;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    safety_settings: Vec<SafetySettingBody>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SafetySettingBody {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn build_request(messages: &[Message], safety: &SafetySettings) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: messages
            .iter()
            .map(|msg| Content {
                role: msg.role.as_str(),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            })
            .collect(),
        safety_settings: safety
            .as_slice()
            .iter()
            .map(|setting| SafetySettingBody {
                category: setting.category.as_str(),
                threshold: setting.threshold.as_str(),
            })
            .collect(),
    }
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: GenerateContentResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "unknown".to_string());
        return Err(anyhow!(
            "Model returned no candidates (block reason: {})",
            reason
        ));
    };

    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if texts.is_empty() {
        return Err(anyhow!(
            "Model response contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ));
    }

    Ok(texts.concat())
}

pub async fn chat(client: &Client, cfg: &Config, messages: &[Message]) -> Result<String> {
    let api_url = generate_content_url(&cfg.model_base_url, &cfg.model);
    let body = build_request(messages, &cfg.safety_settings);
    debug!(
        api_url = %api_url,
        model = %cfg.model,
        message_count = messages.len(),
        "sending gemini generateContent request"
    );

    let response = client
        .post(&api_url)
        .header(API_KEY_HEADER, &cfg.api_key)
        .json(&body)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %cfg.model,
                error = %err,
                "gemini request failed"
            );
            model_api_request_error(err, &api_url, cfg.model_timeout_secs)
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "gemini returned non-success status"
        );
        return Err(anyhow!(
            "Model request failed with status {}: {}",
            status,
            response_body
        ));
    }

    let parsed: GenerateContentResponse = response
        .json()
        .await
        .context("Failed to parse model chat response")?;
    let text = response_text(parsed)?;
    debug!(
        model = %cfg.model,
        response_len = text.len(),
        "received gemini response"
    );
    Ok(text)
}
