use crate::domain::model::{EmbeddingDimension, EncodeStats, ModelMeta};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn region(&self) -> &str;
    fn profile(&self) -> Option<&str>;
    fn model_id(&self) -> &str;
    fn endpoint_url(&self) -> Option<&str>;
    fn max_attempts(&self) -> u32;
    fn timeout_seconds(&self) -> u64;
    fn dimension(&self) -> EmbeddingDimension;
    fn normalize(&self) -> bool;
}

/// One InvokeModel round trip: raw JSON body in, raw JSON body out.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: ModelInvoker + ?Sized> ModelInvoker for Box<T> {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        (**self).invoke(model_id, body).await
    }
}

/// Calling convention of the benchmark harness: a list of sentences in, one row per sentence out.
#[async_trait]
pub trait SentenceEncoder: Send + Sync {
    fn model_meta(&self) -> &ModelMeta;

    /// Counters accumulated over every `encode` call so far.
    fn stats(&self) -> EncodeStats {
        EncodeStats::default()
    }

    async fn encode(&self, sentences: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>>;
}
