//! Web search used to cross-check claims about recent events
//!
//! Results are filtered by domain: news outlets and public institutions are
//! preferred, and when none of those appear, social networks, shops and blog
//! hosts are dropped instead.

use crate::error::{VerifyError, VerifyResult};
use crate::gemini::API_KEY_HEADER;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(title: &str, link: &str, snippet: &str) -> Self {
        SearchResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        }
    }
}

/// Generic trait for web search providers
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> VerifyResult<Vec<SearchResult>>;

    fn provider_name(&self) -> &str;
}

/// Trusted domains, matched as substrings of the lowercased link
pub const WHITELIST: &[&str] = &[
    "g1.globo.com",
    "bbc.com",
    "cnn.com",
    "nytimes.com",
    "folha.uol.com.br",
    "uol.com.br",
    "estadao.com.br",
    "oglobo.globo.com",
    "reuters.com",
    "dw.com",
    "elpais.com",
    "r7.com",
    "terra.com.br",
    "abril.com.br",
    "veja.abril.com.br",
    "saude.gov.br",
    "gov.br",
    "who.int",
    "opas.org.br",
    "un.org",
    "scielo.br",
    "nature.com",
    "science.org",
    "lancet.com",
    "bvsalud.org",
    "fapesp.br",
    "fiocruz.br",
    "inpe.br",
    "ibge.gov.br",
    "agencia.fiocruz.br",
    "agencia.ibge.gov.br",
];

/// Irrelevant sources, matched as substrings of the lowercased link
pub const BLACKLIST: &[&str] = &[
    "instagram.com",
    "facebook.com",
    "tiktok.com",
    "pinterest.com",
    "twitter.com",
    "youtube.com",
    "whatsapp.com",
    "supermercado",
    "loja",
    "mercado",
    "shop",
    "promo",
    "oferta",
    "magazineluiza",
    "americanas",
    "shopee",
    "aliexpress",
    "blogspot.com",
    "wordpress.com",
    "tumblr.com",
    "medium.com",
    "wixsite.com",
    "canva.com",
    "soundcloud.com",
    "vimeo.com",
    "reddit.com",
    "quora.com",
    "ask.fm",
    "curiouscat.me",
    "telegram",
    "snapchat.com",
    "kawai",
    "badoo",
    "tinder",
    "bilibili",
    "weibo",
    "vk.com",
    "ok.ru",
];

/// Keep whitelisted results; when there are none, keep everything not blacklisted
pub fn filter_sources(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let (trusted, others): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|result| link_matches(&result.link, WHITELIST));

    if !trusted.is_empty() {
        return trusted;
    }

    others
        .into_iter()
        .filter(|result| !link_matches(&result.link, BLACKLIST))
        .collect()
}

fn link_matches(link: &str, domains: &[&str]) -> bool {
    let link = link.to_lowercase();
    domains.iter().any(|domain| link.contains(domain))
}

/// Google Custom Search JSON API provider
#[derive(Clone)]
pub struct GoogleCustomSearch {
    api_key: String,
    /// Programmable search engine id
    cx: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleCustomSearch {
    pub fn new(api_key: String, cx: String) -> VerifyResult<Self> {
        if api_key.trim().is_empty() || cx.trim().is_empty() {
            return Err(VerifyError::ConfigError(
                "Search API key and engine id cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| {
                VerifyError::NetworkError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key,
            cx,
            client,
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
        })
    }

    /// Create a provider from `GOOGLE_SEARCH_API_KEY` and `GOOGLE_SEARCH_CX`
    pub fn from_env() -> VerifyResult<Self> {
        let api_key = std::env::var("GOOGLE_SEARCH_API_KEY").map_err(|_| {
            VerifyError::ConfigError(
                "GOOGLE_SEARCH_API_KEY environment variable not set".to_string(),
            )
        })?;
        let cx = std::env::var("GOOGLE_SEARCH_CX").map_err(|_| {
            VerifyError::ConfigError("GOOGLE_SEARCH_CX environment variable not set".to_string())
        })?;

        Self::new(api_key, cx)
    }

    pub fn request_url(&self, query: &str) -> VerifyResult<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("q", query),
                ("cx", self.cx.as_str()),
                ("hl", "pt"),
            ],
        )
        .map_err(|e| VerifyError::ConfigError(format!("Invalid search URL: {}", e)))
    }

    /// Read the `items` array of a response; missing fields become empty strings
    pub fn parse_items(response: &Value) -> Vec<SearchResult> {
        let Some(items) = response["items"].as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| SearchResult {
                title: item["title"].as_str().unwrap_or_default().to_string(),
                link: item["link"].as_str().unwrap_or_default().to_string(),
                snippet: item["snippet"].as_str().unwrap_or_default().to_string(),
            })
            .collect()
    }
}

impl std::fmt::Debug for GoogleCustomSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCustomSearch")
            .field("api_key", &"***")
            .field("cx", &self.cx)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl WebSearch for GoogleCustomSearch {
    /// Search and filter; an error status yields no results rather than an error
    async fn search(&self, query: &str) -> VerifyResult<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(self.request_url(query)?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        if !response.status().is_success() {
            warn!("Search API returned {}", response.status());
            return Ok(Vec::new());
        }

        let json: Value = response.json().await?;
        Ok(filter_sources(Self::parse_items(&json)))
    }

    fn provider_name(&self) -> &str {
        "Google Custom Search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(link: &str) -> SearchResult {
        SearchResult::new("title", link, "snippet")
    }

    #[test]
    fn test_filter_keeps_only_whitelisted() {
        let filtered = filter_sources(vec![
            result("https://www.instagram.com/p/1"),
            result("https://g1.globo.com/saude/noticia.html"),
            result("https://example.org/post"),
            result("https://www.who.int/news"),
        ]);
        let links: Vec<_> = filtered.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(
            links,
            vec!["https://g1.globo.com/saude/noticia.html", "https://www.who.int/news"]
        );
    }

    #[test]
    fn test_filter_falls_back_to_blacklist() {
        let filtered = filter_sources(vec![
            result("https://www.facebook.com/post"),
            result("https://example.org/article"),
            result("https://minhaloja.com.br/promo"),
        ]);
        assert_eq!(filtered, vec![result("https://example.org/article")]);
    }

    #[test]
    fn test_filter_ignores_case() {
        let filtered = filter_sources(vec![result("HTTPS://WWW.REUTERS.COM/world")]);
        assert_eq!(filtered.len(), 1);
        assert!(filter_sources(vec![result("https://YouTube.com/watch")]).is_empty());
    }

    #[test]
    fn test_parse_items() {
        let items = GoogleCustomSearch::parse_items(&json!({
            "items": [
                {"title": "A", "link": "https://bbc.com/a", "snippet": "s"},
                {"title": "B", "link": "https://bbc.com/b"}
            ]
        }));
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].snippet, "");
        assert!(GoogleCustomSearch::parse_items(&json!({"searchInformation": {}})).is_empty());
    }

    #[test]
    fn test_request_url_encodes_query() {
        let provider = GoogleCustomSearch::new("k".to_string(), "engine".to_string()).unwrap();
        let url = provider.request_url("morreu em 2025 & hoje").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "morreu em 2025 & hoje".to_string())));
        assert!(pairs.contains(&("hl".to_string(), "pt".to_string())));
        assert!(pairs.contains(&("cx".to_string(), "engine".to_string())));
        assert!(pairs.iter().all(|(name, _)| name != "key"));
    }

    #[test]
    fn test_new_rejects_empty_config() {
        assert!(GoogleCustomSearch::new("".to_string(), "cx".to_string()).is_err());
        assert!(GoogleCustomSearch::new("key".to_string(), " ".to_string()).is_err());
    }

    #[test]
    fn test_debug_masks_key() {
        let provider = GoogleCustomSearch::new("secret".to_string(), "cx".to_string()).unwrap();
        assert!(!format!("{:?}", provider).contains("secret"));
    }

    #[tokio::test]
    async fn test_empty_query_skips_request() {
        let provider = GoogleCustomSearch::new("k".to_string(), "cx".to_string()).unwrap();
        assert!(provider.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_network_error_hides_key() {
        let mut provider =
            GoogleCustomSearch::new("SEARCHSECRET".to_string(), "cx".to_string()).unwrap();
        provider.base_url = "http://127.0.0.1:1/customsearch/v1".to_string();
        let err = provider.search("hoje").await.unwrap_err();
        assert!(matches!(err, VerifyError::NetworkError(_)));
        assert!(!err.to_string().contains("SEARCHSECRET"));
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test --ignored
    async fn test_real_search() {
        let Ok(provider) = GoogleCustomSearch::from_env() else {
            eprintln!("Skipping: search credentials not set");
            return;
        };
        let results = provider.search("vacina covid 2023").await.unwrap();
        println!("{:?}", results);
    }
}
