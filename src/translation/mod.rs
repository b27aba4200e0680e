/*!
 * Batched translation of finished cues.
 *
 * Cues are sent to a provider in bounded, strictly sequential batches. Each
 * batch is retried with exponential backoff on transient failures, while an
 * exhausted quota aborts the whole run at once.
 *
 * - `batch`: chunking, retries and reassembly of translated cues
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, FailureKind, RetryPolicy, classify_failure};

// Submodules
pub mod batch;
