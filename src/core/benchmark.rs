use crate::core::embedder::TitanEmbedder;
use crate::core::{
    EmbeddingDimension, EncodeStats, ModelInvoker, ModelMeta, Result, SentenceEncoder,
};
use crate::utils::error::EmbedError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Adapts [`TitanEmbedder`] to the harness `encode(sentences, batch_size)` convention.
pub struct BenchmarkEncoder<I: ModelInvoker> {
    embedder: TitanEmbedder<I>,
    meta: ModelMeta,
    stats: Mutex<EncodeStats>,
}

impl<I: ModelInvoker> BenchmarkEncoder<I> {
    pub fn new(embedder: TitanEmbedder<I>, dimension: EmbeddingDimension, normalize: bool) -> Self {
        let meta = ModelMeta::from_model_id(embedder.model_id(), dimension, normalize);
        Self {
            embedder,
            meta,
            stats: Mutex::new(EncodeStats::default()),
        }
    }

    fn record(&self, update: impl FnOnce(&mut EncodeStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }
}

#[async_trait]
impl<I: ModelInvoker> SentenceEncoder for BenchmarkEncoder<I> {
    fn model_meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn stats(&self) -> EncodeStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    async fn encode(&self, sentences: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        if batch_size == 0 {
            return Err(EmbedError::ValidationError {
                message: "batch_size must be at least 1".to_string(),
            });
        }

        let dimension = self.meta.dimension;
        let total = sentences.len();
        let mut rows = Vec::with_capacity(total);

        // 服務一次只接受一段文字，batch_size 只用來分段記錄進度
        for (batch_index, batch) in sentences.chunks(batch_size).enumerate() {
            for sentence in batch {
                if sentence.trim().is_empty() {
                    tracing::warn!("Empty sentence at index {}, using zero vector", rows.len());
                    self.record(|s| s.empty_inputs += 1);
                    rows.push(vec![0.0; dimension.as_usize()]);
                    continue;
                }

                let embedding = self
                    .embedder
                    .generate_embedding(sentence, dimension, self.meta.normalize)
                    .await?;

                let truncated = sentence.chars().count() > self.embedder.max_input_chars();
                let tokens = embedding.token_count.unwrap_or(0) as u64;
                self.record(|s| {
                    s.embedded += 1;
                    s.input_tokens += tokens;
                    if truncated {
                        s.truncated_inputs += 1;
                    }
                });
                rows.push(embedding.vector);
            }

            tracing::info!(
                "Encoded batch {} ({}/{} sentences)",
                batch_index + 1,
                rows.len(),
                total
            );
        }

        Ok(rows)
    }
}
