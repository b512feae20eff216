//! Cross-checking a model verdict against search snippets.
//!
//! The model's knowledge stops in 2022. For claims about later events the
//! verdict is adjusted: a trusted source mentioning the same date and a
//! confirming keyword upgrades it, and a post-2022 date with no such source
//! downgrades it to "not verifiable".

use crate::analysis::{Analysis, Classification};
use crate::search::SearchResult;
use regex::Regex;
use std::sync::LazyLock;

/// Last year covered by the model's knowledge
pub const KNOWLEDGE_CUTOFF_YEAR: u32 = 2022;

static RECENT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(202[3-9]|20[3-9][0-9]|21[0-9][0-9])\b").unwrap());
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20\d{2}").unwrap());
static NUMERIC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/20\d{2}").unwrap());
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(janeiro|fevereiro|março|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro) de 20\d{2}",
    )
    .unwrap()
});
static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][a-z]+\s[A-Z][a-z]+").unwrap());

const RECENCY_WORDS: &[&str] = &[
    "atualmente",
    "hoje",
    "neste ano",
    "últimas notícias",
    "recente",
    "agora",
];

/// Words that, next to a date and a name, confirm a reported death or case count
const CONFIRMATION_KEYWORDS: &[&str] = &[
    "morre",
    "morreu",
    "óbito",
    "falecimento",
    "faleceu",
    "morte",
    "perde a vida",
    "vem a óbito",
    "falecida",
    "falecido",
    "morta",
    "morto",
    "confirmada a morte",
    "confirma morte",
    "confirma óbito",
    "covid",
    "covid-19",
    "coronavírus",
    "pandemia",
    "mortes",
    "óbitos",
    "casos",
];

/// Whether the text is about something after the knowledge cutoff
pub fn mentions_recent_events(text: &str) -> bool {
    let lower = text.to_lowercase();
    RECENT_YEAR.is_match(&lower) || RECENCY_WORDS.iter().any(|word| lower.contains(word))
}

/// Years, `d/m/yyyy` dates and `<month> de <year>` phrases, in that order.
///
/// Month phrases are lowercased; a year inside a date is reported both on
/// its own and as part of the date.
pub fn extract_dates(text: &str) -> Vec<String> {
    let mut dates: Vec<String> = YEAR.find_iter(text).map(|m| m.as_str().to_string()).collect();
    dates.extend(NUMERIC_DATE.find_iter(text).map(|m| m.as_str().to_string()));
    dates.extend(MONTH_YEAR.find_iter(text).map(|m| m.as_str().to_lowercase()));
    dates
}

/// Capitalized two-word sequences, taken as candidate person names
pub fn extract_names(text: &str) -> Vec<String> {
    PERSON_NAME
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// First result that confirms the claim in `text`.
///
/// When the text carries dates, the result must mention one of them. It must
/// also contain a confirmation keyword and, when the text names someone, one
/// of those names.
pub fn find_confirmation<'a>(results: &'a [SearchResult], text: &str) -> Option<&'a SearchResult> {
    let dates = extract_dates(text);
    let names = extract_names(text);

    results.iter().find(|result| {
        let title = result.title.to_lowercase();
        let snippet = result.snippet.to_lowercase();
        let mentions = |needle: &str| title.contains(needle) || snippet.contains(needle);

        if !dates.is_empty() && !dates.iter().any(|date| mentions(date.as_str())) {
            return false;
        }
        CONFIRMATION_KEYWORDS.iter().any(|keyword| mentions(*keyword))
            && (names.is_empty() || names.iter().any(|name| mentions(name.as_str())))
    })
}

/// Whether any extracted date falls after the knowledge cutoff
pub fn has_date_after_cutoff(dates: &[String]) -> bool {
    dates.iter().any(|date| {
        YEAR.find(date)
            .and_then(|year| year.as_str().parse::<u32>().ok())
            .is_some_and(|year| year > KNOWLEDGE_CUTOFF_YEAR)
    })
}

/// Adjust `analysis` using search results for `text`
pub fn adjust_with_sources(analysis: Analysis, results: &[SearchResult], text: &str) -> Analysis {
    if results.is_empty() {
        return analysis;
    }

    if let Some(source) = find_confirmation(results, text) {
        return confirmed(analysis, source);
    }

    if has_date_after_cutoff(&extract_dates(text)) {
        return unverifiable(analysis);
    }

    analysis
}

fn confirmed(analysis: Analysis, source: &SearchResult) -> Analysis {
    let citation = format!("{} ({})", source.title, source.link);
    let mut true_elements = analysis.true_elements.clone();
    true_elements.push(format!("Confirmação encontrada em: {}", citation));

    let mut recommendations =
        vec!["Consulte as fontes recentes listadas para mais detalhes.".to_string()];
    recommendations.extend(analysis.recommendations.iter().cloned());

    Analysis {
        score: 0.98,
        classification: Some(Classification::ProvenTrue),
        score_explanation:
            "A informação foi confirmada por fontes confiáveis e recentes encontradas na busca."
                .to_string(),
        true_elements,
        false_elements: Vec::new(),
        suspicious_elements: Vec::new(),
        misinformation_indicators: Vec::new(),
        recommendations,
        detailed_analysis: format!(
            "A afirmação foi confirmada por fontes confiáveis e recentes, como {}. \
             Consulte a fonte para mais detalhes e contexto.",
            citation
        ),
        ..analysis
    }
}

fn unverifiable(analysis: Analysis) -> Analysis {
    let mut recommendations = vec![
        "Aguarde a publicação de dados oficiais ou notícias confiáveis para o período informado."
            .to_string(),
    ];
    recommendations.extend(analysis.recommendations.iter().cloned());

    Analysis {
        score: 0.3,
        classification: Some(Classification::NotVerifiable),
        score_explanation:
            "Não há fontes confiáveis que confirmem a afirmação para o período exato informado."
                .to_string(),
        true_elements: Vec::new(),
        false_elements: Vec::new(),
        suspicious_elements: vec![
            "Não foi encontrada confirmação para a data informada nas fontes pesquisadas."
                .to_string(),
        ],
        misinformation_indicators: Vec::new(),
        recommendations,
        detailed_analysis: "A análise não é conclusiva: nenhuma fonte confiável confirma ou nega \
                            a afirmação para o período informado."
            .to_string(),
        ..analysis
    }
}
