/*!
 * Core translation service implementation.
 *
 * Builds the per-batch prompt, dispatches it to the configured provider,
 * and normalizes the raw response text.
 */

use anyhow::Result;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::providers::lmstudio::{ChatCompletionRequest, ChatMessage, LmStudio};
use crate::providers::mock::{MockProvider, MockRequest};

/// Separator between lines of a translation batch, both in the prompt and
/// in the expected response
pub const BATCH_SEPARATOR: &str = "\n---\n";

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// LM Studio local server (OpenAI-compatible)
    LmStudio {
        /// Client instance
        client: LmStudio,
    },

    /// Scripted mock, for tests
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Main translation service for subtitle batches
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service from configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let provider = match config.provider {
            ConfigTranslationProvider::LMStudio => TranslationProviderImpl::LmStudio {
                client: LmStudio::with_retries(
                    config.endpoint.clone(),
                    config.timeout_secs,
                    config.max_retries,
                    config.backoff_base_ms,
                ),
            },
            ConfigTranslationProvider::Mock => TranslationProviderImpl::Mock {
                client: MockProvider::working(),
            },
        };

        Ok(Self { provider, config })
    }

    /// Create a service around an explicit mock, for tests
    pub fn with_mock(config: TranslationConfig, client: MockProvider) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client },
            config,
        }
    }

    /// Build the per-batch user prompt
    fn build_prompt(&self, batch_text: &str) -> String {
        format!(
            "Context: {}\n\
             Task: Translate the following subtitle lines from {} to {}.\n\
             Requirements:\n\
             - Maintain original tone.\n\
             - Keep output format exactly as it is (one line per subtitle).\n\
             - Do not add explanations or meta-talk.\n\
             \n\
             Subtitles:\n\
             {}",
            self.config.context,
            self.config.source_language,
            self.config.target_language,
            batch_text
        )
    }

    /// Translate one batch of lines, returning the raw separator-joined
    /// response text with code fences stripped
    pub async fn translate_batch_raw(&self, batch: &[String]) -> Result<String, TranslationError> {
        let batch_text = batch.join(BATCH_SEPARATOR);

        let text = match &self.provider {
            TranslationProviderImpl::LmStudio { client } => {
                let request = ChatCompletionRequest::new(
                    self.config.model.clone(),
                    vec![
                        ChatMessage::system("You are a professional subtitle translator."),
                        ChatMessage::user(self.build_prompt(&batch_text)),
                    ],
                )
                .temperature(self.config.temperature);

                let response = client.complete(request).await?;
                LmStudio::extract_text(&response)
            }
            TranslationProviderImpl::Mock { client } => {
                let response = client.complete(MockRequest { text: batch_text }).await?;
                MockProvider::extract_text(&response)
            }
        };

        if text.trim().is_empty() {
            return Err(TranslationError::EmptyResponse);
        }

        Ok(strip_code_fences(&text))
    }

    /// Check that the configured provider is reachable
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        match &self.provider {
            TranslationProviderImpl::LmStudio { client } => Ok(client.test_connection().await?),
            TranslationProviderImpl::Mock { client } => Ok(client.test_connection().await?),
        }
    }
}

/// Remove markdown code-fence wrappers a model may add around its output
fn strip_code_fences(text: &str) -> String {
    text.replace("```", "").trim().to_string()
}
