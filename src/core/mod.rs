pub mod benchmark;
pub mod embedder;
pub mod runner;

pub use crate::domain::model::{
    Embedding, EmbeddingDimension, EncodeStats, EncodeSummary, ModelMeta,
};
pub use crate::domain::ports::{ConfigProvider, ModelInvoker, SentenceEncoder, Storage};
pub use crate::utils::error::Result;
