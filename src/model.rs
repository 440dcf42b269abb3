#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            content: content.into(),
        }
    }
}

/// Remote chat backends this binary can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
}

impl ModelProvider {
    pub const SUPPORTED: &'static [ModelProvider] = &[ModelProvider::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(wanted))
    }
}

#[cfg(test)]
mod tests {
    use super::ModelProvider;

    #[test]
    fn parse_accepts_known_provider_names_in_any_case() {
        assert_eq!(ModelProvider::parse("gemini"), Some(ModelProvider::Gemini));
        assert_eq!(ModelProvider::parse(" Gemini "), Some(ModelProvider::Gemini));
        assert_eq!(ModelProvider::parse("ollama"), None);
        assert_eq!(ModelProvider::parse(""), None);
    }
}
