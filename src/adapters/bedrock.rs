use crate::core::{ModelInvoker, Result};
use crate::utils::error::EmbedError;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BedrockSettings {
    pub region: String,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub max_attempts: u32,
    pub timeout: Duration,
}

/// InvokeModel through the AWS SDK: SigV4 signing, credential chain and retries are the SDK's.
#[derive(Debug, Clone)]
pub struct BedrockInvoker {
    client: BedrockClient,
}

impl BedrockInvoker {
    pub fn new(client: BedrockClient) -> Self {
        Self { client }
    }

    pub async fn from_settings(settings: &BedrockSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(settings.max_attempts.max(1)))
            .timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .operation_timeout(settings.timeout)
                    .build(),
            );
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_bedrockruntime::config::Builder::from(&sdk_config);
        if let Some(endpoint_url) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        tracing::info!(
            "Bedrock client ready (region={}, max_attempts={})",
            settings.region,
            settings.max_attempts
        );
        Self::new(BedrockClient::from_conf(builder.build()))
    }
}

fn map_sdk_error(err: SdkError<InvokeModelError>) -> EmbedError {
    tracing::debug!("InvokeModel failed: {}", DisplayErrorContext(&err));

    // 沒有服務端錯誤碼時，用 HTTP 狀態或失敗階段當作簡短說明
    let (status, fallback) = match &err {
        SdkError::ServiceError(ctx) => {
            let status = ctx.raw().status().as_u16();
            (Some(status.to_string()), format!("HTTP {}", status))
        }
        SdkError::DispatchFailure(_) => (None, "could not reach the endpoint".to_string()),
        SdkError::TimeoutError(_) => (None, "request timed out".to_string()),
        SdkError::ResponseError(_) => (None, "unreadable response".to_string()),
        _ => (None, "request failed".to_string()),
    };

    match err.into_service_error() {
        InvokeModelError::ThrottlingException(e) => EmbedError::ThrottlingError {
            message: e.message().unwrap_or("throttled").to_string(),
        },
        InvokeModelError::AccessDeniedException(e) => EmbedError::AuthenticationError {
            message: e.message().unwrap_or("access denied").to_string(),
        },
        err => EmbedError::ServiceError {
            code: err
                .code()
                .map(str::to_string)
                .or(status)
                .unwrap_or_else(|| "Unhandled".to_string()),
            message: err
                .message()
                .or_else(|| err.meta().message())
                .map(str::to_string)
                .unwrap_or(fallback),
        },
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.body.into_inner())
    }
}
