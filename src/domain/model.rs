use crate::utils::error::{EmbedError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output sizes accepted by Titan Text Embeddings V2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum EmbeddingDimension {
    D256,
    D512,
    #[default]
    D1024,
}

impl EmbeddingDimension {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::D256 => 256,
            Self::D512 => 512,
            Self::D1024 => 1024,
        }
    }

    pub fn as_usize(self) -> usize {
        self.as_u32() as usize
    }
}

impl TryFrom<u32> for EmbeddingDimension {
    type Error = EmbedError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            256 => Ok(Self::D256),
            512 => Ok(Self::D512),
            1024 => Ok(Self::D1024),
            other => Err(EmbedError::InvalidConfigValueError {
                field: "dimension".to_string(),
                value: other.to_string(),
                reason: "Dimension must be one of 256, 512, 1024".to_string(),
            }),
        }
    }
}

impl From<EmbeddingDimension> for u32 {
    fn from(value: EmbeddingDimension) -> Self {
        value.as_u32()
    }
}

impl FromStr for EmbeddingDimension {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .trim()
            .parse()
            .map_err(|_| EmbedError::InvalidConfigValueError {
                field: "dimension".to_string(),
                value: s.to_string(),
                reason: "Dimension must be a number".to_string(),
            })?;
        Self::try_from(value)
    }
}

impl fmt::Display for EmbeddingDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// InvokeModel request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRequest<'a> {
    pub input_text: &'a str,
    pub dimensions: EmbeddingDimension,
    pub normalize: bool,
}

/// InvokeModel response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub dimension: EmbeddingDimension,
    pub normalized: bool,
    pub token_count: Option<u32>,
}

impl Embedding {
    /// 檢查向量長度是否等於請求的維度
    pub fn from_response(
        response: EmbeddingResponse,
        dimension: EmbeddingDimension,
        normalized: bool,
    ) -> Result<Self> {
        if response.embedding.len() != dimension.as_usize() {
            return Err(EmbedError::DimensionMismatch {
                expected: dimension.as_usize(),
                actual: response.embedding.len(),
            });
        }

        Ok(Self {
            vector: response.embedding,
            dimension,
            normalized,
            token_count: response.input_text_token_count,
        })
    }
}

/// Metadata a benchmark harness records next to its scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub name: String,
    pub revision: Option<String>,
    pub dimension: EmbeddingDimension,
    pub normalize: bool,
}

impl ModelMeta {
    pub fn from_model_id(model_id: &str, dimension: EmbeddingDimension, normalize: bool) -> Self {
        // "amazon.titan-embed-text-v2:0" -> name "amazon.titan-embed-text-v2", revision "0"
        let (name, revision) = match model_id.rsplit_once(':') {
            Some((name, rev)) if !rev.is_empty() => (name.to_string(), Some(rev.to_string())),
            _ => (model_id.to_string(), None),
        };
        Self {
            name,
            revision,
            dimension,
            normalize,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EncodeStats {
    pub embedded: usize,
    pub empty_inputs: usize,
    pub truncated_inputs: usize,
    pub input_tokens: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncodeSummary {
    pub model: ModelMeta,
    pub sentences: usize,
    pub embedded: usize,
    pub empty_inputs: usize,
    pub truncated_inputs: usize,
    pub input_tokens: u64,
    pub output_path: String,
    pub generated_at: DateTime<Utc>,
}
