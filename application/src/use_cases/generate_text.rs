//! Generate-text use case
//!
//! Thin orchestration over the [`TextGenerator`] port: validates the
//! request, delegates, and logs the outcome. The content pipeline calls
//! this once per item it wants generated.

use crate::ports::text_generator::TextGenerator;
use gengate_domain::{GenerationRequest, GenerationResponse, InvokeError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Use case for one-shot text generation.
pub struct GenerateTextUseCase {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateTextUseCase {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Execute a generation request.
    pub async fn execute(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, InvokeError> {
        debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            timeout_ms = request.timeout.as_millis() as u64,
            "executing generation request"
        );

        match self.generator.generate(&request).await {
            Ok(response) => {
                if let Some(usage) = &response.usage {
                    info!(
                        model = %request.model,
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        total_tokens = usage.total_tokens,
                        "generation complete"
                    );
                } else {
                    info!(
                        model = %request.model,
                        chars = response.text.len(),
                        "generation complete (no usage reported)"
                    );
                }
                Ok(response)
            }
            Err(e) => {
                warn!(model = %request.model, error = %e, "generation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gengate_domain::{Model, TokenUsage};

    struct FixedGenerator {
        text: String,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResponse, InvokeError> {
            Ok(GenerationResponse::new(self.text.clone()).with_usage(TokenUsage::new(3, 7)))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResponse, InvokeError> {
            Err(InvokeError::Decode {
                reason: "empty response".into(),
            })
        }
    }

    #[tokio::test]
    async fn execute_returns_adapter_response() {
        let use_case = GenerateTextUseCase::new(Arc::new(FixedGenerator {
            text: "hello".into(),
        }));
        let response = use_case
            .execute(GenerationRequest::new("hi", Model::Gemini25Flash))
            .await
            .unwrap();
        assert_eq!(response.text, "hello");
        assert_eq!(response.usage.unwrap().total_tokens, 10);
    }

    #[tokio::test]
    async fn execute_propagates_errors() {
        let use_case = GenerateTextUseCase::new(Arc::new(FailingGenerator));
        let err = use_case
            .execute(GenerationRequest::new("hi", Model::Gemini25Flash))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Decode { .. }));
    }
}
