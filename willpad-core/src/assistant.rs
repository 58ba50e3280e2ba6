//! # Legal assistant
//!
//! Pass-through to a remote chat-completion service. The service itself is a black box behind
//! [`ChatCompletion`]; this module only owns the configuration sent along with each prompt and the
//! neutral reply used when the call fails. Nothing is retried here, callers decide that.

/// Shown in place of an answer when the service can't be reached.
pub const FALLBACK_REPLY: &str = "抱歉，與AI助理的連線發生問題。請檢查您的網路連線或稍後再試。";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a helpful and empathetic AI legal assistant named 'AI 法律助理'.
Your expertise is in digital inheritance laws, with a specific focus on Taiwan's Civil Code (台灣《民法》).
Your goal is to provide clear, concise, and preliminary advice to users regarding their digital assets and wills.
- When referencing laws, be specific if possible (e.g., \"According to Taiwan's Civil Code, Article...\").
- Keep your responses easy to understand for a non-legal audience.
- ALWAYS include a disclaimer at the end of every response, in traditional Chinese, stating: \"請注意：我是一個AI助理，以上資訊僅供參考，不能取代專業律師的正式法律建議。若需處理具體法律事務，請務必諮詢合格的執業律師。\"
- Do not answer questions outside the scope of digital inheritance, wills, and estate planning. If asked an off-topic question, politely decline and steer the conversation back to your area of expertise.";

/// Everything the service needs besides the prompt. Built once at startup and handed to
/// [`LegalAssistant::new`].
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub system_instruction: String,
}
impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_owned(),
            temperature: 0.5,
            top_p: 0.95,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_owned(),
        }
    }
}
impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keep the key out of logs.
        f.debug_struct("AssistantConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .finish_non_exhaustive()
    }
}

/// One request to the service.
#[derive(Clone, Debug)]
pub struct CompletionRequest<'a> {
    pub config: &'a AssistantConfig,
    pub prompt: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("no api key configured")]
    MissingApiKey,
    #[error("service returned no text")]
    Empty,
    #[error("service error: {0}")]
    Service(String),
}

#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError>;
}

pub struct LegalAssistant {
    config: AssistantConfig,
    service: Box<dyn ChatCompletion>,
}
impl LegalAssistant {
    #[must_use]
    pub fn new(config: AssistantConfig, service: Box<dyn ChatCompletion>) -> Self {
        if config.api_key.is_empty() {
            log::warn!("assistant has no api key, requests will likely fail");
        }
        Self { config, service }
    }
    #[must_use]
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }
    /// Ask a question. Any failure becomes [`FALLBACK_REPLY`].
    pub async fn ask(&self, prompt: &str) -> String {
        let request = CompletionRequest {
            config: &self.config,
            prompt,
        };
        match self.service.complete(request).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                log::error!("assistant call failed: {}", CompletionError::Empty);
                FALLBACK_REPLY.to_owned()
            }
            Err(e) => {
                log::error!("assistant call failed: {e}");
                FALLBACK_REPLY.to_owned()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        AssistantConfig, ChatCompletion, CompletionError, CompletionRequest, LegalAssistant,
        FALLBACK_REPLY,
    };

    /// Echoes the prompt along with the sampling settings it was given.
    struct Echo;
    #[async_trait::async_trait]
    impl ChatCompletion for Echo {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
            if request.config.api_key.is_empty() {
                return Err(CompletionError::MissingApiKey);
            }
            Ok(format!(
                "{}@{}:{}",
                request.prompt, request.config.model, request.config.temperature
            ))
        }
    }
    struct Silent;
    #[async_trait::async_trait]
    impl ChatCompletion for Silent {
        async fn complete(&self, _: CompletionRequest<'_>) -> Result<String, CompletionError> {
            Ok("   ".to_owned())
        }
    }

    #[tokio::test]
    async fn passes_config_through() {
        let config = AssistantConfig {
            api_key: "k".to_owned(),
            ..AssistantConfig::default()
        };
        let assistant = LegalAssistant::new(config, Box::new(Echo));
        assert_eq!(assistant.ask("hi").await, "hi@gemini-2.5-flash:0.5");
    }
    #[tokio::test]
    async fn failures_fall_back() {
        let assistant = LegalAssistant::new(AssistantConfig::default(), Box::new(Echo));
        assert_eq!(assistant.ask("hi").await, FALLBACK_REPLY);

        let assistant = LegalAssistant::new(AssistantConfig::default(), Box::new(Silent));
        assert_eq!(assistant.ask("hi").await, FALLBACK_REPLY);
    }
    #[test]
    fn debug_hides_key() {
        let config = AssistantConfig {
            api_key: "secret".to_owned(),
            ..AssistantConfig::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
