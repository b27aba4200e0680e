/*!
 * Batch translation processing.
 *
 * Cues are split into contiguous batches that are translated one after the
 * other. Each batch gets a bounded number of attempts with exponential
 * backoff in between; a quota error ends the run without further attempts.
 */

use std::time::Duration;
use log::{debug, info, warn};

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::Provider;
use crate::subtitle_processor::Cue;

/// Default number of cues per request
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Attempts and backoff for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per batch, including the first
    pub max_attempts: u32,
    /// Delay after the first failure; doubled after each further failure
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.retry_count, Duration::from_millis(config.retry_backoff_ms))
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// How a provider failure is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Usage limit reached; retrying cannot help
    QuotaExhausted,
    /// Worth another attempt after a backoff
    Transient,
}

/// Classify a provider failure
pub fn classify_failure(error: &ProviderError) -> FailureKind {
    if error.is_quota_exhausted() {
        FailureKind::QuotaExhausted
    } else {
        FailureKind::Transient
    }
}

/// Translates cues through a provider in sequential batches
pub struct BatchTranslator<'a> {
    /// The provider to translate with
    provider: &'a dyn Provider,

    /// Maximum number of cues per request
    batch_size: usize,

    /// Retry behaviour per batch
    retry: RetryPolicy,
}

impl<'a> BatchTranslator<'a> {
    /// Create a batch translator with default batch size and retries
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::default(),
        }
    }

    /// Create a batch translator from the translation config
    pub fn from_config(provider: &'a dyn Provider, config: &TranslationConfig) -> Self {
        Self::new(provider)
            .with_batch_size(config.batch_size)
            .with_retry_policy(RetryPolicy::from_config(config))
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Translate cue texts, keeping each cue's timing and confidence
    pub async fn translate(&self, cues: &[Cue], target_language: &str) -> Result<Vec<Cue>, TranslationError> {
        self.translate_with_progress(cues, target_language, |_, _| {}).await
    }

    /// Translate cue texts, reporting `(completed_batches, total_batches)` after each batch
    pub async fn translate_with_progress(
        &self,
        cues: &[Cue],
        target_language: &str,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<Vec<Cue>, TranslationError> {
        if cues.is_empty() {
            return Ok(Vec::new());
        }

        let total_batches = cues.len().div_ceil(self.batch_size);
        info!(
            "Translating {} cues to {} in {} batch(es) via {}",
            cues.len(), target_language, total_batches, self.provider.name()
        );

        let mut translated = Vec::with_capacity(cues.len());
        for (batch_index, batch) in cues.chunks(self.batch_size).enumerate() {
            debug!("Translating batch {}/{} ({} cues)", batch_index + 1, total_batches, batch.len());

            let texts: Vec<String> = batch.iter().map(|cue| cue.text.clone()).collect();
            let translations = self.translate_batch_with_retry(batch_index, &texts, target_language).await?;

            translated.extend(
                batch.iter()
                    .zip(translations)
                    .map(|(cue, text)| cue.with_text(text)),
            );
            progress_callback(batch_index + 1, total_batches);
        }

        Ok(translated)
    }

    async fn translate_batch_with_retry(
        &self,
        batch_index: usize,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let result = self.provider
                .translate_batch(texts, target_language)
                .await
                .and_then(|translations| {
                    if translations.len() == texts.len() {
                        Ok(translations)
                    } else {
                        Err(ProviderError::ResponseMismatch {
                            expected: texts.len(),
                            actual: translations.len(),
                        })
                    }
                });

            let error = match result {
                Ok(translations) => return Ok(translations),
                Err(error) => error,
            };

            if classify_failure(&error) == FailureKind::QuotaExhausted {
                return Err(TranslationError::QuotaExceeded {
                    batch_index,
                    attempt: attempt + 1,
                    message: error.to_string(),
                });
            }

            if attempt + 1 >= max_attempts {
                return Err(TranslationError::BatchFailed {
                    batch_index,
                    attempts: attempt + 1,
                    message: error.to_string(),
                });
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                "Translation attempt {} for batch {} failed: {}. Retrying in {:?}...",
                attempt + 1, batch_index + 1, error, delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
