//! Offline stand-ins for the classifier and the search provider
//!
//! [`simulated_result`] is also what the verifier falls back to when the real
//! classifier fails, so a verification always produces an analysis.
//!
//! # Example
//!
//! ```ignore
//! use fakecheck_verify::{Classifier, MockClassifier, MockMode};
//!
//! #[tokio::test]
//! async fn test_classify() {
//!     let mock = MockClassifier::new(MockMode::Simulated);
//!     let analysis = mock.classify("A vacina foi aprovada").await.unwrap();
//!     assert!(analysis.score >= 0.15);
//! }
//! ```

use crate::analysis::{Analysis, Classification, TemporalLimitation};
use crate::classifier::Classifier;
use crate::error::{VerifyError, VerifyResult};
use crate::search::{SearchResult, WebSearch};
use async_trait::async_trait;
use std::time::Duration;

/// Deterministic placeholder analysis derived from `text` alone
///
/// The score varies with the text length so different inputs don't all look
/// the same, and up to three long words are quoted back in the findings.
pub fn simulated_result(text: &str) -> Analysis {
    let length = text.chars().count();
    let score = (0.65 + (length % 100) as f64 / 500.0).clamp(0.15, 0.95);
    let percentage = (score * 100.0).round();

    let keywords: Vec<String> = text
        .split(' ')
        .filter(|word| word.chars().count() > 5)
        .take(3)
        .map(|word| word.replace(['.', ',', '!', '?', ';', ':', '\'', '"'], ""))
        .collect();

    let summary = if length > 50 {
        format!("{}...", text.chars().take(50).collect::<String>())
    } else {
        text.to_string()
    };

    let true_hint = match keywords.first() {
        Some(word) => format!("Informações sobre \"{}\" parecem estar corretas", word),
        None => "Parte das afirmações são verificáveis".to_string(),
    };
    let false_hint = match keywords.get(1) {
        Some(word) => format!("Dados sobre \"{}\" precisam de verificação adicional", word),
        None => "Há informações imprecisas no texto".to_string(),
    };
    let focus = if keywords.is_empty() {
        String::new()
    } else {
        format!(
            "Os pontos relacionados a \"{}\" merecem atenção especial.",
            keywords.join(", ")
        )
    };
    let level = if score > 0.5 { "razoável" } else { "baixo" };

    let mentions_recent_years = text.contains("2023") || text.contains("2024");

    Analysis {
        score,
        reliability: Some(score + 0.05),
        classification: Some(Classification::from_score(score)),
        score_explanation: format!(
            "O texto foi analisado e recebeu uma pontuação de {}% com base nos elementos \
             verificáveis presentes no conteúdo.",
            percentage
        ),
        true_elements: vec![
            "Alguns elementos do texto podem ser verificados".to_string(),
            true_hint,
        ],
        false_elements: vec![
            "Algumas afirmações carecem de contexto completo".to_string(),
            false_hint,
        ],
        suspicious_elements: vec![
            "O texto apresenta algumas generalizações".to_string(),
            "Há elementos que podem estar desatualizados".to_string(),
        ],
        reliable_sources: vec![
            "Recomenda-se verificar em fontes oficiais".to_string(),
            "Consulte especialistas no assunto para confirmação".to_string(),
        ],
        misinformation_indicators: vec![
            "Presença de algumas afirmações sem fontes".to_string(),
            "Possível interpretação seletiva de fatos".to_string(),
        ],
        detailed_analysis: format!(
            "O texto analisado \"{}\" apresenta uma mistura de informações que podem ser \
             verificadas e outras que necessitam de mais contexto. {} Recomendamos buscar fontes \
             adicionais e oficiais para confirmar as principais afirmações presentes no conteúdo. \
             A análise indica um nível {} de confiabilidade, sendo importante verificar a origem \
             e o contexto completo das informações antes de compartilhar.",
            summary, focus, level
        ),
        recommendations: vec![
            "Verifique as informações em fontes oficiais".to_string(),
            "Busque o contexto completo das informações apresentadas".to_string(),
            "Compare com outras fontes confiáveis antes de formar opinião".to_string(),
        ],
        temporal_limitation: Some(TemporalLimitation {
            affects_analysis: mentions_recent_years || text.contains("recentemente"),
            unverifiable_elements: if mentions_recent_years {
                vec!["Eventos recentes mencionados no texto".to_string()]
            } else {
                Vec::new()
            },
            verification_suggestions: vec![
                "Consulte fontes oficiais atualizadas".to_string(),
                "Verifique notícias recentes sobre o tema".to_string(),
            ],
        }),
    }
}

/// Mock classification modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return [`simulated_result`] for the text
    Simulated,

    /// Always return the same analysis
    Fixed(Analysis),

    /// Simulate API errors
    Error(String),
}

/// Classifier that needs no API key or network
#[derive(Debug, Clone)]
pub struct MockClassifier {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
}

impl MockClassifier {
    pub fn new(mode: MockMode) -> Self {
        Self { mode, delay_ms: 0 }
    }

    /// Create a MockClassifier with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self { mode, delay_ms }
    }
}

async fn apply_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, text: &str) -> VerifyResult<Analysis> {
        apply_delay(self.delay_ms).await;

        match &self.mode {
            MockMode::Simulated => Ok(simulated_result(text)),
            MockMode::Fixed(analysis) => Ok(analysis.clone()),
            MockMode::Error(msg) => Err(VerifyError::ApiError(msg.clone())),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Classifier"
    }
}

/// Search provider returning canned results
#[derive(Debug, Clone, Default)]
pub struct MockSearch {
    results: Vec<SearchResult>,
    error: Option<String>,
}

impl MockSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        MockSearch {
            results,
            error: None,
        }
    }

    /// A provider whose every search fails with `msg`
    pub fn failing(msg: &str) -> Self {
        MockSearch {
            results: Vec::new(),
            error: Some(msg.to_string()),
        }
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, _query: &str) -> VerifyResult<Vec<SearchResult>> {
        match &self.error {
            Some(msg) => Err(VerifyError::NetworkError(msg.clone())),
            None => Ok(self.results.clone()),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Search"
    }
}
