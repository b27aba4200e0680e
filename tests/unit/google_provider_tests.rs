/*!
 * Tests for the Google Translate client that need no network
 */

use yasg::errors::ProviderError;
use yasg::providers::Provider;
use yasg::providers::google::{GoogleTranslate, error_from_response};

fn google_error(code: u16, message: &str, reason: &str) -> String {
    format!(
        r#"{{"error": {{"code": {}, "message": "{}", "errors": [{{"message": "{}", "domain": "usageLimits", "reason": "{}"}}]}}}}"#,
        code, message, message, reason
    )
}

/// Test exhausted quotas map to the quota variant
#[test]
fn test_error_from_response_withDailyLimit_shouldBeQuotaExceeded() {
    let error = error_from_response(403, &google_error(403, "Daily Limit Exceeded", "dailyLimitExceeded"));
    assert_eq!(error, ProviderError::QuotaExceeded("Daily Limit Exceeded".to_string()));
}

/// Test rate limiting maps to the rate limit variant
#[test]
fn test_error_from_response_withRateLimit_shouldBeRateLimitExceeded() {
    let body = google_error(403, "User Rate Limit Exceeded", "userRateLimitExceeded");
    assert!(matches!(error_from_response(403, &body), ProviderError::RateLimitExceeded(_)));

    assert!(matches!(error_from_response(429, "Too Many Requests"), ProviderError::RateLimitExceeded(_)));
}

/// Test authentication failures
#[test]
fn test_error_from_response_withBadKey_shouldBeAuthenticationError() {
    assert!(matches!(
        error_from_response(401, "Unauthorized"),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        error_from_response(403, &google_error(403, "The caller does not have permission", "forbidden")),
        ProviderError::AuthenticationError(_)
    ));
}

/// Test other failures keep their status and message
#[test]
fn test_error_from_response_withServerError_shouldBeApiError() {
    assert_eq!(
        error_from_response(500, "  Internal error \n"),
        ProviderError::ApiError {
            status_code: 500,
            message: "Internal error".to_string(),
        }
    );
}

/// Test an empty batch is answered without a request
#[tokio::test]
async fn test_translate_batch_withNoTexts_shouldReturnEmpty() {
    let provider = GoogleTranslate::new("key", "http://127.0.0.1:1", 1);
    let translations = provider.translate_batch(&[], "zh-CN").await.unwrap();

    assert!(translations.is_empty());
    assert_eq!(provider.name(), "google");
}

/// Test the API key does not appear in debug output
#[test]
fn test_debug_withApiKey_shouldHideKey() {
    let provider = GoogleTranslate::new("secret-key", "https://translation.googleapis.com", 30)
        .with_source_language("ja");
    let debug = format!("{:?}", provider);

    assert!(!debug.contains("secret-key"));
    assert!(debug.contains("ja"));
}
