use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use super::Provider;

// @const: Header carrying the API key
const API_KEY_HEADER: &str = "X-Goog-Api-Key";

/// Google Cloud Translation (v2) client
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Source language sent with each request; detected by the service when absent
    source_language: Option<String>,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Texts to translate
    q: &'a [String],
    /// Target language tag
    target: &'a str,
    /// Source language tag
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    /// "text" keeps the service from HTML-escaping its output
    format: &'static str,
}

/// Translate response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub data: TranslateData,
}

#[derive(Debug, Deserialize)]
pub struct TranslateData {
    pub translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    #[serde(default)]
    pub detected_source_language: Option<String>,
}

/// Error body returned by Google APIs
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: String,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            source_language: None,
        }
    }

    /// Create a client from the translation config
    pub fn from_config(config: &TranslationConfig, source_language: &str) -> Self {
        Self::new(config.get_api_key(), config.get_endpoint(), config.timeout_secs)
            .with_source_language(source_language)
    }

    /// Pin the source language instead of letting the service detect it
    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        let source_language = source_language.into();
        self.source_language = (!source_language.is_empty()).then_some(source_language);
        self
    }

    fn api_url(&self) -> Result<Url, ProviderError> {
        let base = format!("{}/language/translate/v2", self.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid endpoint {}: {}", base, e)))
    }

    async fn send(&self, texts: &[String], target_language: &str) -> Result<TranslateResponse, ProviderError> {
        let request = TranslateRequest {
            q: texts,
            target: target_language,
            source: self.source_language.as_deref(),
            format: "text",
        };

        // The key travels in a header so it never shows up in a request URL
        let response = self.client.post(self.api_url()?)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate API error ({}): {}", status, error_text);
            return Err(error_from_response(status.as_u16(), &error_text));
        }

        response.json::<TranslateResponse>().await
            .map_err(|e| ProviderError::ParseError(e.without_url().to_string()))
    }
}

impl std::fmt::Debug for GoogleTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslate")
            .field("endpoint", &self.endpoint)
            .field("source_language", &self.source_language)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate_batch(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.send(texts, target_language).await?;
        if let Some(detected) = response.data.translations.first().and_then(|t| t.detected_source_language.as_deref()) {
            debug!("Detected source language: {}", detected);
        }

        Ok(response.data.translations.into_iter().map(|t| t.translated_text).collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.send(&["test".to_string()], "en").await.map(|_| ())
    }
}

// reqwest errors print the request URL; it is dropped before the message is kept
fn transport_error(error: reqwest::Error) -> ProviderError {
    let connection = error.is_timeout() || error.is_connect();
    let message = error.without_url().to_string();
    if connection {
        ProviderError::ConnectionError(message)
    } else {
        ProviderError::RequestFailed(message)
    }
}

/// Map a failed HTTP response to a provider error
///
/// Google reports exhausted quotas as 403 or 429 with a reason such as
/// `dailyLimitExceeded` or `rateLimitExceeded`.
pub fn error_from_response(status_code: u16, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let reasons: Vec<String> = parsed
        .map(|e| e.error.errors.into_iter().map(|d| d.reason.to_lowercase()).collect())
        .unwrap_or_default();

    let has_reason = |needle: &str| reasons.iter().any(|r| r.contains(needle));

    match status_code {
        401 => ProviderError::AuthenticationError(message),
        403 | 429 if has_reason("ratelimit") => ProviderError::RateLimitExceeded(message),
        403 | 429 if has_reason("quota") || has_reason("limitexceeded") => ProviderError::QuotaExceeded(message),
        429 => ProviderError::RateLimitExceeded(message),
        403 if reasons.iter().any(|r| r == "forbidden" || r == "keyinvalid") => {
            ProviderError::AuthenticationError(message)
        }
        _ => ProviderError::ApiError { status_code, message },
    }
}
