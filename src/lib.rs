pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{build_invoker, http::HttpInvoker, Transport};
#[cfg(feature = "bedrock")]
pub use adapters::bedrock::{BedrockInvoker, BedrockSettings};
pub use config::{cli::LocalStorage, toml_config::EmbedConfig};
pub use crate::core::{
    benchmark::BenchmarkEncoder,
    embedder::TitanEmbedder,
    runner::{EncodeRunner, OutputFormat},
};
pub use domain::model::{Embedding, EmbeddingDimension, EncodeSummary, ModelMeta};
pub use domain::ports::{ModelInvoker, SentenceEncoder, Storage};
pub use utils::error::{EmbedError, Result};
