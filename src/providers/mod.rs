/*!
 * Provider implementations for translation services.
 *
 * This module contains client implementations for remote translators:
 * - Google: Google Cloud Translation API (v2)
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the batch translator.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Translate a batch of texts
    ///
    /// # Arguments
    /// * `texts` - The texts to translate
    /// * `target_language` - Target language tag
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, in input order
    async fn translate_batch(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod google;
