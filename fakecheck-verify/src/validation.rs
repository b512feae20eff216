//! Input sanitization, validation and per-user rate limiting
//!
//! Validation messages are Portuguese source phrases so they can be looked
//! up in the [`fakecheck_i18n::PhraseCatalog`].

use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Longest text accepted for analysis, in characters
pub const MAX_TEXT_CHARS: usize = 10_000;
/// Shortest text accepted for analysis, in characters
pub const MIN_TEXT_CHARS: usize = 10;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap());
static JAVASCRIPT_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());
static DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)data:(image/(?:png|jpe?g|gif|webp))?").unwrap());
static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\s*on\w+\s*=\s*["'][^"']*["']"#).unwrap());
static DANGEROUS_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(iframe|object|embed|link|meta|style)\b[^>]*>").unwrap()
});

/// Strip markup that could execute when the text is echoed back
///
/// Removes `<script>` blocks, `javascript:` schemes, non-image `data:` URLs,
/// inline `on*=` handlers and embedding tags, caps the length at
/// [`MAX_TEXT_CHARS`] and trims.
pub fn sanitize_input(text: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(text, "");
    let text = JAVASCRIPT_URL.replace_all(&text, "");
    let text = DATA_URL.replace_all(&text, |caps: &Captures| match caps.get(1) {
        Some(_) => caps[0].to_string(),
        None => String::new(),
    });
    let text = EVENT_HANDLER.replace_all(&text, "");
    let text = DANGEROUS_TAG.replace_all(&text, "");

    let capped: String = text.chars().take(MAX_TEXT_CHARS).collect();
    capped.trim().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// The sanitized text, present only when valid
    pub sanitized: Option<String>,
}

impl ValidationReport {
    fn rejected(error: &str, warnings: Vec<String>) -> Self {
        ValidationReport {
            is_valid: false,
            errors: vec![error.to_string()],
            warnings,
            sanitized: None,
        }
    }
}

/// Check that `text` is worth sending for analysis
pub fn validate_text(text: &str) -> ValidationReport {
    if text.trim().is_empty() {
        return ValidationReport::rejected("Texto é obrigatório", Vec::new());
    }

    let sanitized = sanitize_input(text);
    if sanitized.is_empty() {
        return ValidationReport::rejected("Texto contém apenas conteúdo inválido", Vec::new());
    }

    let length = sanitized.chars().count();
    if length < MIN_TEXT_CHARS {
        return ValidationReport::rejected("Texto deve ter pelo menos 10 caracteres", Vec::new());
    }

    let mut warnings = Vec::new();
    if length < 50 {
        warnings.push("Texto muito curto pode resultar em análise menos precisa".to_string());
    }
    if length > 5_000 {
        warnings.push("Texto muito longo pode demorar mais para ser processado".to_string());
    }

    if !sanitized.chars().any(char::is_alphabetic) {
        return ValidationReport::rejected("Texto deve conter pelo menos algumas letras", warnings);
    }

    ValidationReport {
        is_valid: true,
        errors: Vec::new(),
        warnings,
        sanitized: Some(sanitized),
    }
}

/// Whether `url` parses as an http(s) URL
pub fn validate_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Drop `javascript`, `data` and `vbscript` query parameters; `None` if unparseable
pub fn sanitize_url(url: &str) -> Option<String> {
    const SUSPICIOUS_PARAMS: [&str; 3] = ["javascript", "data", "vbscript"];

    let mut url = reqwest::Url::parse(url).ok()?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(name, _)| !SUSPICIOUS_PARAMS.contains(&name.as_str()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Some(url.to_string())
}

/// Sliding-window request counter keyed by user id
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    requests: HashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        RateLimiter {
            limit,
            window,
            requests: HashMap::new(),
        }
    }

    /// Record a request for `user` if under the limit
    pub fn check(&mut self, user: &str) -> bool {
        self.check_at(user, Instant::now())
    }

    pub fn check_at(&mut self, user: &str, now: Instant) -> bool {
        let window = self.window;
        let requests = self.requests.entry(user.to_string()).or_default();
        requests.retain(|&time| now.saturating_duration_since(time) < window);

        if requests.len() >= self.limit {
            return false;
        }
        requests.push(now);
        true
    }

    /// How long until the oldest request of `user` leaves the window
    pub fn time_until_reset(&self, user: &str) -> Duration {
        self.time_until_reset_at(user, Instant::now())
    }

    pub fn time_until_reset_at(&self, user: &str, now: Instant) -> Duration {
        self.requests
            .get(user)
            .and_then(|requests| requests.iter().min())
            .map(|&oldest| (oldest + self.window).saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Forget requests that left the window and users with none left
    pub fn cleanup(&mut self) {
        self.cleanup_at(Instant::now());
    }

    pub fn cleanup_at(&mut self, now: Instant) {
        let window = self.window;
        self.requests.retain(|_, requests| {
            requests.retain(|&time| now.saturating_duration_since(time) < window);
            !requests.is_empty()
        });
    }

    pub fn tracked_users(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    /// 10 requests per minute
    fn default() -> Self {
        RateLimiter::new(10, Duration::from_secs(60))
    }
}

/// Whole minutes to wait, rounded up
pub fn minutes_until(duration: Duration) -> u64 {
    duration.as_millis().div_ceil(60_000) as u64
}
