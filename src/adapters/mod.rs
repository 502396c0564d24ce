// Adapters layer: concrete transports for the InvokeModel call.

#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod http;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::toml_config::EmbedConfig;
use crate::core::{ConfigProvider, ModelInvoker};
use crate::utils::error::{EmbedError, Result as EmbedResult};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// AWS SDK with the default credential chain.
    #[default]
    Sdk,
    /// Plain HTTPS with a bearer API key.
    Http,
}

impl FromStr for Transport {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sdk" => Ok(Transport::Sdk),
            "http" => Ok(Transport::Http),
            other => Err(EmbedError::InvalidConfigValueError {
                field: "transport".to_string(),
                value: other.to_string(),
                reason: "Transport must be 'sdk' or 'http'".to_string(),
            }),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Sdk => write!(f, "sdk"),
            Transport::Http => write!(f, "http"),
        }
    }
}

/// Builds the transport selected in the configuration.
pub async fn build_invoker(config: &EmbedConfig) -> EmbedResult<Box<dyn ModelInvoker>> {
    let timeout = Duration::from_secs(config.timeout_seconds());

    match config.client.transport {
        Transport::Http => {
            let endpoint = config
                .endpoint_url()
                .map(str::to_string)
                .unwrap_or_else(|| http::HttpInvoker::regional_endpoint(config.region()));
            let api_key = config.resolve_api_key();
            tracing::info!("Using HTTP transport: {}", endpoint);
            let invoker = http::HttpInvoker::new(
                &endpoint,
                api_key.as_deref(),
                timeout,
                config.max_attempts(),
            )?;
            Ok(Box::new(invoker))
        }
        #[cfg(feature = "bedrock")]
        Transport::Sdk => {
            let settings = bedrock::BedrockSettings {
                region: config.region().to_string(),
                profile: config.profile().map(str::to_string),
                endpoint_url: config.endpoint_url().map(str::to_string),
                max_attempts: config.max_attempts(),
                timeout,
            };
            Ok(Box::new(bedrock::BedrockInvoker::from_settings(&settings).await))
        }
        #[cfg(not(feature = "bedrock"))]
        Transport::Sdk => Err(EmbedError::ConfigError {
            message: "SDK transport requires the 'bedrock' feature".to_string(),
        }),
    }
}
