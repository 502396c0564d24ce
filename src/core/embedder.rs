use crate::core::{Embedding, EmbeddingDimension, ModelInvoker, Result};
use crate::domain::model::{EmbeddingRequest, EmbeddingResponse};
use crate::utils::error::EmbedError;

pub const DEFAULT_MODEL_ID: &str = "amazon.titan-embed-text-v2:0";

/// Titan V2 accepts up to 50k characters per request.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;

/// Wraps the single remote operation "generate embedding for text".
pub struct TitanEmbedder<I: ModelInvoker> {
    invoker: I,
    model_id: String,
    max_input_chars: usize,
}

impl<I: ModelInvoker> TitanEmbedder<I> {
    pub fn new(invoker: I, model_id: impl Into<String>) -> Self {
        Self {
            invoker,
            model_id: model_id.into(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    pub async fn generate_embedding(
        &self,
        text: &str,
        dimension: EmbeddingDimension,
        normalize: bool,
    ) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(EmbedError::ValidationError {
                message: "Input text cannot be empty".to_string(),
            });
        }

        let input_text = truncate_chars(text, self.max_input_chars);
        if input_text.len() < text.len() {
            tracing::warn!(
                "Input text truncated to {} characters (was {} bytes)",
                self.max_input_chars,
                text.len()
            );
        }

        let request = EmbeddingRequest {
            input_text,
            dimensions: dimension,
            normalize,
        };
        let body = serde_json::to_vec(&request)?;

        tracing::debug!(
            "Invoking {} (dimension={}, normalize={}, {} bytes)",
            self.model_id,
            dimension,
            normalize,
            body.len()
        );
        let raw = self.invoker.invoke(&self.model_id, body).await?;

        let response: EmbeddingResponse = serde_json::from_slice(&raw)?;
        let embedding = Embedding::from_response(response, dimension, normalize)?;

        tracing::debug!(
            "Received {}-dimensional embedding ({:?} input tokens)",
            embedding.vector.len(),
            embedding.token_count
        );
        Ok(embedding)
    }
}

/// 依字元邊界截斷，避免切到 UTF-8 中間
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records request bodies and answers with a vector of the requested size.
    #[derive(Clone, Default)]
    pub(crate) struct MockInvoker {
        pub requests: Arc<Mutex<Vec<serde_json::Value>>>,
        pub override_len: Option<usize>,
    }

    #[async_trait]
    impl ModelInvoker for MockInvoker {
        async fn invoke(&self, _model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
            let request: serde_json::Value = serde_json::from_slice(&body)?;
            let dims = request["dimensions"].as_u64().unwrap_or(1024) as usize;
            let text_len = request["inputText"].as_str().map(str::len).unwrap_or(0);
            self.requests.lock().unwrap().push(request);

            let len = self.override_len.unwrap_or(dims);
            let response = serde_json::json!({
                "embedding": vec![0.25f32; len],
                "inputTextTokenCount": text_len
            });
            Ok(serde_json::to_vec(&response)?)
        }
    }

    #[tokio::test]
    async fn test_generate_embedding_sends_provider_request() {
        let invoker = MockInvoker::default();
        let embedder = TitanEmbedder::new(invoker.clone(), DEFAULT_MODEL_ID);

        let embedding = embedder
            .generate_embedding("What is an embedding?", EmbeddingDimension::D512, true)
            .await
            .unwrap();

        assert_eq!(embedding.vector.len(), 512);
        assert!(embedding.normalized);
        assert_eq!(embedding.token_count, Some(21));

        let requests = invoker.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0],
            serde_json::json!({
                "inputText": "What is an embedding?",
                "dimensions": 512,
                "normalize": true
            })
        );
    }

    #[tokio::test]
    async fn test_generate_embedding_rejects_empty_text() {
        let invoker = MockInvoker::default();
        let embedder = TitanEmbedder::new(invoker.clone(), DEFAULT_MODEL_ID);

        let result = embedder
            .generate_embedding("   ", EmbeddingDimension::D256, true)
            .await;

        assert!(matches!(result, Err(EmbedError::ValidationError { .. })));
        assert!(invoker.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_embedding_detects_dimension_mismatch() {
        let invoker = MockInvoker {
            override_len: Some(1024),
            ..Default::default()
        };
        let embedder = TitanEmbedder::new(invoker, DEFAULT_MODEL_ID);

        let result = embedder
            .generate_embedding("hello", EmbeddingDimension::D256, false)
            .await;

        assert!(matches!(
            result,
            Err(EmbedError::DimensionMismatch {
                expected: 256,
                actual: 1024
            })
        ));
    }

    #[tokio::test]
    async fn test_long_input_is_truncated() {
        let invoker = MockInvoker::default();
        let embedder =
            TitanEmbedder::new(invoker.clone(), DEFAULT_MODEL_ID).with_max_input_chars(4);

        embedder
            .generate_embedding("héllo world", EmbeddingDimension::D256, true)
            .await
            .unwrap();

        let requests = invoker.requests.lock().unwrap();
        assert_eq!(requests[0]["inputText"], "héll");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("", 3), "");
    }
}
