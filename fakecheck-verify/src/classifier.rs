//! Classifier trait for provider abstraction
//!
//! A classifier turns a piece of text into an [`Analysis`]. The Gemini
//! provider talks to the generative-language API; the mock provider is
//! deterministic and needs no network.

use crate::analysis::Analysis;
use crate::error::VerifyResult;
use async_trait::async_trait;

/// Generic trait for claim classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the credibility of `text`
    ///
    /// # Returns
    ///
    /// * `Ok(Analysis)` - The parsed analysis
    /// * `Err(VerifyError)` - If the provider could not be reached or its
    ///   reply was not an analysis
    async fn classify(&self, text: &str) -> VerifyResult<Analysis>;

    /// Name used in logs and verification records
    fn provider_name(&self) -> &str;
}

/// Remove Markdown code fences a model may wrap around its JSON reply
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
