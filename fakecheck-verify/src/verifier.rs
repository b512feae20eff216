//! The verification pipeline
//!
//! Rate limit, validate, classify and, for claims about recent events,
//! cross-check against web search. A failing classifier never fails the
//! verification: the simulated result takes its place. With a history store
//! attached, every finished verification is recorded.

use crate::analysis::Analysis;
use crate::classifier::Classifier;
use crate::crosscheck::{adjust_with_sources, mentions_recent_events};
use crate::error::{VerifyError, VerifyResult};
use crate::history::HistoryStore;
use crate::mock::simulated_result;
use crate::search::{SearchResult, WebSearch};
use crate::validation::{RateLimiter, validate_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// User id for requests that don't carry one
pub const ANONYMOUS_USER: &str = "anonymous";

/// Characters of the submitted text kept in the record
const TEXT_PREVIEW_CHARS: usize = 200;

const CROSS_CHECK_NOTICE: &str =
    "Análise Gemini complementada e ajustada com base em fontes recentes (Google)";

/// A finished verification, as stored in history and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Milliseconds since the epoch at creation
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Preview of the submitted text
    pub text: String,
    pub analysis: Analysis,
    pub overall_score: f64,
    /// Which classifier produced the analysis
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_data: Option<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl Verification {
    pub fn was_cross_checked(&self) -> bool {
        self.realtime_source.is_some()
    }
}

/// Truncate to the first 200 characters, marking the cut with "..."
pub fn text_preview(text: &str) -> String {
    if text.chars().count() > TEXT_PREVIEW_CHARS {
        format!("{}...", text.chars().take(TEXT_PREVIEW_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

pub struct Verifier {
    classifier: Arc<dyn Classifier>,
    search: Option<Arc<dyn WebSearch>>,
    limiter: Mutex<RateLimiter>,
    history: Option<Mutex<Box<dyn HistoryStore>>>,
}

impl Verifier {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Verifier {
            classifier,
            search: None,
            limiter: Mutex::new(RateLimiter::default()),
            history: None,
        }
    }

    /// Cross-check recent-event claims with this provider
    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Mutex::new(limiter);
        self
    }

    /// Record every finished verification in `store`
    pub fn with_history(mut self, store: impl HistoryStore + 'static) -> Self {
        self.history = Some(Mutex::new(Box::new(store)));
        self
    }

    /// Recorded verifications, newest first; empty without a store
    pub fn history(&self) -> Vec<Verification> {
        match &self.history {
            Some(store) => store.lock().unwrap_or_else(|e| e.into_inner()).list(),
            None => Vec::new(),
        }
    }

    pub fn clear_history(&self) -> VerifyResult<()> {
        match &self.history {
            Some(store) => store.lock().unwrap_or_else(|e| e.into_inner()).clear(),
            None => Ok(()),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.classifier.provider_name()
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Verify `text` on behalf of `user_id`
    ///
    /// # Errors
    ///
    /// * `RateLimited` when the user exceeded the request window
    /// * `InvalidInput` with the validation messages
    ///
    /// Classifier and search failures are logged and absorbed.
    pub async fn verify(&self, text: &str, user_id: Option<&str>) -> VerifyResult<Verification> {
        let user = user_id.unwrap_or(ANONYMOUS_USER);
        self.check_rate_limit(user)?;

        let report = validate_text(text);
        let sanitized = match report.sanitized {
            Some(sanitized) if report.is_valid => sanitized,
            _ => return Err(VerifyError::InvalidInput(report.errors)),
        };

        let mut analysis = match self.classifier.classify(&sanitized).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(
                    "{} failed, using simulated result: {}",
                    self.classifier.provider_name(),
                    e
                );
                simulated_result(&sanitized)
            }
        };

        let mut realtime_source = None;
        let mut realtime_data = None;
        let mut notice = None;

        if let Some(search) = self.search.as_ref().filter(|_| mentions_recent_events(&sanitized)) {
            debug!("Cross-checking with {}", search.provider_name());
            let results = search.search(&sanitized).await.unwrap_or_else(|e| {
                warn!("{} failed: {}", search.provider_name(), e);
                Vec::new()
            });
            analysis = adjust_with_sources(analysis, &results, &sanitized);
            realtime_source = Some(search.provider_name().to_string());
            realtime_data = Some(results);
            notice = Some(CROSS_CHECK_NOTICE.to_string());
        }

        let now = Utc::now();
        info!(
            "Verified text for {}: {} ({:.2})",
            user,
            analysis.verdict(),
            analysis.score
        );

        let verification = Verification {
            id: now.timestamp_millis(),
            timestamp: now,
            text: text_preview(&sanitized),
            overall_score: analysis.score,
            analysis,
            provider: self.classifier.provider_name().to_string(),
            realtime_source,
            realtime_data,
            warnings: report.warnings,
            notice,
        };
        self.record(&verification);
        Ok(verification)
    }

    /// A history write failure is logged; the verification still succeeds
    fn record(&self, verification: &Verification) {
        if let Some(store) = &self.history {
            let mut store = store.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = store.save(verification.clone()) {
                warn!("Failed to save verification {}: {}", verification.id, e);
            }
        }
    }

    fn check_rate_limit(&self, user: &str) -> VerifyResult<()> {
        let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
        limiter.cleanup();
        if limiter.check(user) {
            Ok(())
        } else {
            Err(VerifyError::RateLimited {
                retry_after: limiter.time_until_reset(user),
            })
        }
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("classifier", &self.classifier.provider_name())
            .field(
                "search",
                &self.search.as_ref().map(|search| search.provider_name()),
            )
            .field("history", &self.history.is_some())
            .finish()
    }
}
