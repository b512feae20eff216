//! The analysis record returned by the classifier.
//!
//! Field names on the wire follow the JSON shape the model is asked to
//! produce, so they stay in Portuguese; the Rust names are English.

use serde::{Deserialize, Deserializer, Serialize};

/// Five-level credibility scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Comprovadamente Verdadeiro")]
    ProvenTrue,
    #[serde(rename = "Parcialmente Verdadeiro")]
    PartiallyTrue,
    #[serde(rename = "Não Verificável")]
    NotVerifiable,
    #[serde(rename = "Provavelmente Falso")]
    ProbablyFalse,
    #[serde(rename = "Comprovadamente Falso")]
    ProvenFalse,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::ProvenTrue,
        Classification::PartiallyTrue,
        Classification::NotVerifiable,
        Classification::ProbablyFalse,
        Classification::ProvenFalse,
    ];

    /// Bucket a score in `[0, 1]`
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Classification::ProvenTrue
        } else if score > 0.6 {
            Classification::PartiallyTrue
        } else if score > 0.4 {
            Classification::NotVerifiable
        } else if score > 0.2 {
            Classification::ProbablyFalse
        } else {
            Classification::ProvenFalse
        }
    }

    /// Wire label, also the source phrase for translation
    pub fn label(&self) -> &'static str {
        match self {
            Classification::ProvenTrue => "Comprovadamente Verdadeiro",
            Classification::PartiallyTrue => "Parcialmente Verdadeiro",
            Classification::NotVerifiable => "Não Verificável",
            Classification::ProbablyFalse => "Provavelmente Falso",
            Classification::ProvenFalse => "Comprovadamente Falso",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Classification::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == label)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalLimitation {
    #[serde(rename = "afeta_analise", default)]
    pub affects_analysis: bool,
    #[serde(rename = "elementos_nao_verificaveis", default)]
    pub unverifiable_elements: Vec<String>,
    #[serde(rename = "sugestoes_verificacao", default)]
    pub verification_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub score: f64,
    #[serde(rename = "confiabilidade", default)]
    pub reliability: Option<f64>,
    /// `None` when the model used a label outside the scale
    #[serde(
        rename = "classificacao",
        default,
        deserialize_with = "lenient_classification"
    )]
    pub classification: Option<Classification>,
    #[serde(rename = "explicacao_score", default)]
    pub score_explanation: String,
    #[serde(rename = "elementos_verdadeiros", default)]
    pub true_elements: Vec<String>,
    #[serde(rename = "elementos_falsos", default)]
    pub false_elements: Vec<String>,
    #[serde(rename = "elementos_suspeitos", default)]
    pub suspicious_elements: Vec<String>,
    #[serde(rename = "fontes_confiaveis", default)]
    pub reliable_sources: Vec<String>,
    #[serde(rename = "indicadores_desinformacao", default)]
    pub misinformation_indicators: Vec<String>,
    #[serde(rename = "analise_detalhada", default)]
    pub detailed_analysis: String,
    #[serde(rename = "recomendacoes", default)]
    pub recommendations: Vec<String>,
    #[serde(rename = "limitacao_temporal", default)]
    pub temporal_limitation: Option<TemporalLimitation>,
}

impl Analysis {
    /// The stated classification, or one derived from the score
    pub fn verdict(&self) -> Classification {
        self.classification
            .unwrap_or_else(|| Classification::from_score(self.score))
    }

    pub fn score_percentage(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

fn lenient_classification<'de, D>(deserializer: D) -> Result<Option<Classification>, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(Classification::from_label))
}
