//! Claim verification for fakecheck
//!
//! A [`Verifier`] validates and rate-limits a submitted text, asks a
//! [`Classifier`] for an [`Analysis`] on the five-level credibility scale and,
//! when the text talks about events after the model's knowledge cutoff,
//! cross-checks the verdict against a [`WebSearch`] provider. Finished
//! verifications can be kept in a [`HistoryStore`].
//!
//! # Example
//!
//! ```ignore
//! use fakecheck_verify::{GeminiProvider, GoogleCustomSearch, Verifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let verifier = Verifier::new(Arc::new(GeminiProvider::from_env()?))
//!         .with_search(Arc::new(GoogleCustomSearch::from_env()?));
//!     let verification = verifier.verify("A vacina altera o DNA humano", None).await?;
//!     println!("{}", verification.analysis.verdict());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod classifier;
pub mod crosscheck;
pub mod error;
pub mod gemini;
pub mod history;
pub mod mock;
pub mod search;
pub mod validation;
pub mod verifier;

pub use analysis::{Analysis, Classification, TemporalLimitation};
pub use classifier::Classifier;
pub use crosscheck::{adjust_with_sources, extract_dates, mentions_recent_events};
pub use error::{VerifyError, VerifyResult};
pub use gemini::GeminiProvider;
pub use history::{FileHistory, HistoryStore, MAX_HISTORY_ENTRIES, MemoryHistory};
pub use mock::{MockClassifier, MockMode, MockSearch, simulated_result};
pub use search::{GoogleCustomSearch, SearchResult, WebSearch, filter_sources};
pub use validation::{
    RateLimiter, ValidationReport, sanitize_input, sanitize_url, validate_text, validate_url,
};
pub use verifier::{Verification, Verifier};
