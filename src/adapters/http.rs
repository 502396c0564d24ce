use crate::core::{ModelInvoker, Result};
use crate::utils::error::EmbedError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

pub const BEDROCK_API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// InvokeModel over plain HTTPS with a bearer API key.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: Client,
    base_url: Url,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpInvoker {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| EmbedError::InvalidConfigValueError {
            field: "endpoint_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        match api_key {
            Some(key) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                    EmbedError::ConfigError {
                        message: format!("Invalid API key format: {}", e),
                    }
                })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => tracing::warn!("No API key configured for {}", base_url),
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_attempts: max_attempts.max(1),
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Regional Bedrock runtime endpoint, e.g. `https://bedrock-runtime.us-east-1.amazonaws.com`.
    pub fn regional_endpoint(region: &str) -> String {
        format!("https://bedrock-runtime.{}.amazonaws.com", region)
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    fn invoke_url(&self, model_id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EmbedError::ConfigError {
                message: format!("Endpoint cannot be a base URL: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(["model", model_id, "invoke"]);
        Ok(url)
    }

    async fn invoke_once(&self, url: &Url, body: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(url.clone())
            .body(body.to_vec())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("InvokeModel response status: {}", status);

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let message = response.text().await.unwrap_or_default();
        Err(status_error(status, message))
    }
}

fn status_error(status: StatusCode, body: String) -> EmbedError {
    // Bedrock 錯誤格式為 {"message": "..."}
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    match status {
        StatusCode::TOO_MANY_REQUESTS => EmbedError::ThrottlingError { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EmbedError::AuthenticationError { message }
        }
        _ => EmbedError::ServiceError {
            code: status.as_u16().to_string(),
            message,
        },
    }
}

#[async_trait]
impl ModelInvoker for HttpInvoker {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let url = self.invoke_url(model_id)?;
        let mut attempt = 1;

        loop {
            match self.invoke_once(&url, &body).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "InvokeModel attempt {}/{} failed: {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
