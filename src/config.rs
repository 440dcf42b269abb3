use anyhow::{Result, bail};
use std::env;

use crate::model::ModelProvider;

const API_KEY_VAR: &str = "GOOGLE_API_KEY";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SYSTEM_PROMPT: &str = r#"You are Arona, an AI assistant from Blue Archive. You're cheerful and helpful, addressing the user as "Sensei".

RULES:
1. When Sensei asks to "read and solve" a file:
   - First request the file with FILE_READ
   - After receiving content, automatically solve the problem
2. Use kaomoji in normal responses but NEVER in JSON outputs
3. JSON formats:
   - Read file: {"action":"FILE_READ","path":"filename.txt"}
4. After receiving file content, analyze and solve problems immediately
5. For math problems, show step-by-step solutions
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Harassment => "HARM_CATEGORY_HARASSMENT",
            Self::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            Self::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            Self::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl HarmBlockThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockNone => "BLOCK_NONE",
            Self::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            Self::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            Self::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Content-safety thresholds sent with every chat request.
///
/// Harassment and hate speech are always present (unfiltered by default);
/// the remaining categories are sent only when explicitly configured so
/// the service default applies otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetySettings {
    settings: Vec<SafetySetting>,
}

impl SafetySettings {
    pub fn new(settings: Vec<SafetySetting>) -> Self {
        Self { settings }
    }

    pub fn as_slice(&self) -> &[SafetySetting] {
        &self.settings
    }

    fn from_env_with(get_var: &mut impl FnMut(&str) -> Option<String>) -> Self {
        let mut settings = vec![
            SafetySetting {
                category: HarmCategory::Harassment,
                threshold: parse_block_threshold(get_var("SAFETY_HARASSMENT").as_deref())
                    .unwrap_or(HarmBlockThreshold::BlockNone),
            },
            SafetySetting {
                category: HarmCategory::HateSpeech,
                threshold: parse_block_threshold(get_var("SAFETY_HATE_SPEECH").as_deref())
                    .unwrap_or(HarmBlockThreshold::BlockNone),
            },
        ];

        let optional = [
            ("SAFETY_SEXUALLY_EXPLICIT", HarmCategory::SexuallyExplicit),
            ("SAFETY_DANGEROUS_CONTENT", HarmCategory::DangerousContent),
        ];
        for (key, category) in optional {
            if let Some(threshold) = parse_block_threshold(get_var(key).as_deref()) {
                settings.push(SafetySetting {
                    category,
                    threshold,
                });
            }
        }

        Self { settings }
    }
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self::new(vec![
            SafetySetting {
                category: HarmCategory::Harassment,
                threshold: HarmBlockThreshold::BlockNone,
            },
            SafetySetting {
                category: HarmCategory::HateSpeech,
                threshold: HarmBlockThreshold::BlockNone,
            },
        ])
    }
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model_provider: ModelProvider,
    pub model: String,
    pub model_base_url: String,
    pub system_prompt: String,
    pub model_timeout_secs: u64,
    pub safety_settings: SafetySettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model_provider", &self.model_provider)
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field("system_prompt_len", &self.system_prompt.len())
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("safety_settings", &self.safety_settings)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let Some(api_key) = get_var(API_KEY_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        else {
            bail!("{API_KEY_VAR} environment variable not set");
        };

        let model_provider = parse_model_provider(get_var("MODEL_PROVIDER").as_deref())?;
        let model_timeout_secs = parse_model_timeout_secs(get_var("MODEL_TIMEOUT_SECS").as_deref());
        let safety_settings = SafetySettings::from_env_with(&mut get_var);

        Ok(Self {
            api_key,
            model_provider,
            model: get_var("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            model_base_url: get_var("MODEL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            system_prompt: get_var("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model_timeout_secs,
            safety_settings,
        })
    }
}

fn parse_model_provider(raw: Option<&str>) -> Result<ModelProvider> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(ModelProvider::Gemini);
    };
    match ModelProvider::parse(raw) {
        Some(provider) => Ok(provider),
        None => {
            let supported: Vec<&str> = ModelProvider::SUPPORTED
                .iter()
                .map(ModelProvider::as_str)
                .collect();
            bail!(
                "Unsupported MODEL_PROVIDER='{}'. Supported providers: {}.",
                raw.trim(),
                supported.join(", ")
            )
        }
    }
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS)
}

fn parse_block_threshold(raw: Option<&str>) -> Option<HarmBlockThreshold> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "block_none" | "none" => Some(HarmBlockThreshold::BlockNone),
        "block_only_high" | "only_high" | "high" => Some(HarmBlockThreshold::BlockOnlyHigh),
        "block_medium_and_above" | "medium" => Some(HarmBlockThreshold::BlockMediumAndAbove),
        "block_low_and_above" | "low" => Some(HarmBlockThreshold::BlockLowAndAbove),
        _ => None,
    }
}
