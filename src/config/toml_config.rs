use crate::adapters::Transport;
use crate::core::embedder::{DEFAULT_MAX_INPUT_CHARS, DEFAULT_MODEL_ID};
use crate::core::runner::OutputFormat;
use crate::core::{ConfigProvider, EmbeddingDimension};
use crate::utils::error::{EmbedError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub client: ClientConfig,
    pub embedding: EmbeddingConfig,
    pub encode: EncodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub region: String,
    pub profile: Option<String>,
    pub model_id: String,
    pub endpoint_url: Option<String>,
    pub transport: Transport,
    pub api_key: Option<String>,
    pub max_attempts: u32,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            profile: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            endpoint_url: None,
            transport: Transport::Sdk,
            api_key: None,
            max_attempts: 3,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: EmbeddingDimension,
    pub normalize: bool,
    pub max_input_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: EmbeddingDimension::D1024,
            normalize: true,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    pub batch_size: usize,
    pub format: OutputFormat,
    pub output_dir: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            format: OutputFormat::Jsonl,
            output_dir: "./output".to_string(),
        }
    }
}

impl EmbedConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EmbedError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EmbedError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AWS_BEARER_TOKEN_BEDROCK})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// API key 來源：設定檔優先，其次是 AWS_BEARER_TOKEN_BEDROCK
    pub fn resolve_api_key(&self) -> Option<String> {
        self.client
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty() && !key.starts_with("${"))
            .or_else(|| std::env::var(crate::adapters::http::BEDROCK_API_KEY_ENV).ok())
    }

    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_aws_region("client.region", &self.client.region)?;
        validate_non_empty_string("client.model_id", &self.client.model_id)?;

        if let Some(endpoint_url) = &self.client.endpoint_url {
            validate_url("client.endpoint_url", endpoint_url)?;
        }

        validate_range("client.max_attempts", self.client.max_attempts, 1, 10)?;
        validate_range("client.timeout_seconds", self.client.timeout_seconds, 1, 900)?;

        validate_positive_number("embedding.max_input_chars", self.embedding.max_input_chars, 1)?;
        validate_positive_number("encode.batch_size", self.encode.batch_size, 1)?;
        validate_path("encode.output_dir", &self.encode.output_dir)?;

        if self.client.transport == Transport::Http && self.resolve_api_key().is_none() {
            return Err(EmbedError::MissingConfigError {
                field: "client.api_key".to_string(),
            });
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

impl ConfigProvider for EmbedConfig {
    fn region(&self) -> &str {
        &self.client.region
    }

    fn profile(&self) -> Option<&str> {
        self.client.profile.as_deref()
    }

    fn model_id(&self) -> &str {
        &self.client.model_id
    }

    fn endpoint_url(&self) -> Option<&str> {
        self.client.endpoint_url.as_deref()
    }

    fn max_attempts(&self) -> u32 {
        self.client.max_attempts
    }

    fn timeout_seconds(&self) -> u64 {
        self.client.timeout_seconds
    }

    fn dimension(&self) -> EmbeddingDimension {
        self.embedding.dimension
    }

    fn normalize(&self) -> bool {
        self.embedding.normalize
    }
}

impl Validate for EmbedConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
