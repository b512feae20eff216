//! Phrase catalog keyed by the Portuguese source text.
//!
//! Dynamic messages (notifications, result headings) are written in
//! Portuguese in the code and looked up by their full text. A phrase missing
//! from the target language falls back to English, then to the source text.

use crate::params::{PLACEHOLDER, Params};
use regex::Captures;
use std::collections::HashMap;

/// Language whose table is consulted when the target table misses
pub const PHRASE_FALLBACK_LANGUAGE: &str = "en";
/// Language the phrases are written in
pub const PHRASE_SOURCE_LANGUAGE: &str = "pt";

#[derive(Debug, Clone, Default)]
pub struct PhraseCatalog {
    tables: HashMap<String, HashMap<String, String>>,
}

impl PhraseCatalog {
    pub fn new() -> Self {
        PhraseCatalog {
            tables: HashMap::new(),
        }
    }

    /// The catalog shipped with the application.
    ///
    /// Portuguese is the source language, so its table is empty.
    pub fn builtin() -> Self {
        let mut catalog = PhraseCatalog::new();
        for (source, english) in BUILTIN_ENGLISH {
            catalog.add_phrase(PHRASE_FALLBACK_LANGUAGE, source, english);
        }
        catalog.tables.entry(PHRASE_SOURCE_LANGUAGE.to_string()).or_default();
        catalog
    }

    pub fn add_phrase(&mut self, lang: &str, source: &str, translation: &str) -> &mut Self {
        self.tables
            .entry(lang.to_string())
            .or_default()
            .insert(source.to_owned(), translation.to_owned());
        self
    }

    /// Translate `text` into `target`, then fill `{name}` placeholders.
    ///
    /// Portuguese targets (`pt`, `pt-BR`) get the source text unless their
    /// table overrides it. Placeholders whose value is missing or empty are
    /// left verbatim.
    pub fn translate(&self, text: &str, target: &str, params: &Params) -> String {
        if text.is_empty() {
            return String::new();
        }

        let translation = match self.lookup(target, text) {
            Some(translation) => translation,
            None if is_source_language(target) => text,
            None => self.lookup(PHRASE_FALLBACK_LANGUAGE, text).unwrap_or(text),
        };

        PLACEHOLDER
            .replace_all(translation, |caps: &Captures| {
                match params.get(&caps[1]).filter(|value| !value.is_empty()) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Find the catalog key matching `text` once whitespace runs are collapsed
    pub fn find_key(&self, text: &str) -> Option<&str> {
        let wanted = collapse_whitespace(text);
        if wanted.is_empty() {
            return None;
        }
        self.tables
            .get(PHRASE_FALLBACK_LANGUAGE)?
            .keys()
            .find(|key| collapse_whitespace(key) == wanted)
            .map(String::as_str)
    }

    fn lookup(&self, lang: &str, text: &str) -> Option<&str> {
        self.tables.get(lang)?.get(text).map(String::as_str)
    }
}

fn is_source_language(lang: &str) -> bool {
    let primary = lang.split(['-', '_']).next().unwrap_or_default();
    primary.eq_ignore_ascii_case(PHRASE_SOURCE_LANGUAGE)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const BUILTIN_ENGLISH: &[(&str, &str)] = &[
    ("Verificador de Fake News", "Fake News Detector"),
    ("Como Funciona", "How It Works"),
    ("Dicas", "Tips"),
    ("Sobre", "About"),
    ("Alternar modo escuro", "Toggle dark mode"),
    ("Detecte Fake News com IA", "Detect Fake News with AI"),
    (
        "Verifique a credibilidade de notícias em segundos",
        "Check news credibility in seconds",
    ),
    ("Verificar Conteúdo", "Verify Content"),
    ("Verificar Agora", "Verify Now"),
    ("Verificando...", "Verifying..."),
    ("Nenhuma verificação realizada", "No verifications performed"),
    ("Obrigado pelo seu feedback!", "Thank you for your feedback!"),
    ("Histórico apagado com sucesso!", "History cleared successfully!"),
    ("Não foi possível apagar o histórico", "Could not clear history"),
    (
        "Você está offline. Algumas funcionalidades podem estar indisponíveis.",
        "You are offline. Some features may be unavailable.",
    ),
    ("Conexão restabelecida!", "Connection restored!"),
    (
        "Ocorreu um erro durante a verificação. Tente novamente.",
        "An error occurred during verification. Please try again.",
    ),
    (
        "Não foi possível realizar a análise. Tente novamente.",
        "Analysis could not be performed. Please try again.",
    ),
    ("Elementos Verificados", "Verified Elements"),
    ("Elementos Falsos", "False Elements"),
    ("Pontos Suspeitos", "Suspicious Points"),
    ("Recomendações", "Recommendations"),
    ("Análise Detalhada", "Detailed Analysis"),
    ("Esta análise foi útil?", "Was this analysis helpful?"),
    ("Comprovadamente Verdadeiro", "Proven True"),
    ("Parcialmente Verdadeiro", "Partially True"),
    ("Não Verificável", "Not Verifiable"),
    ("Provavelmente Falso", "Probably False"),
    ("Comprovadamente Falso", "Proven False"),
    ("Resultado da Análise", "Analysis Result"),
    ("Histórico de Verificações", "Verification History"),
    ("Limpar Histórico", "Clear History"),
    (
        "Muitas requisições. Tente novamente em {minutes} minuto(s)",
        "Too many requests. Try again in {minutes} minute(s)",
    ),
    (
        "Análise Gemini complementada e ajustada com base em fontes recentes (Google)",
        "AI analysis complemented and adjusted based on recent sources (Google)",
    ),
    ("Notificação", "Notification"),
    ("Texto é obrigatório", "Text is required"),
    (
        "Texto contém apenas conteúdo inválido",
        "Text contains only invalid content",
    ),
    (
        "Texto deve ter pelo menos 10 caracteres",
        "Text must be at least 10 characters long",
    ),
    (
        "Texto deve conter pelo menos algumas letras",
        "Text must contain at least some letters",
    ),
    (
        "Texto muito curto pode resultar em análise menos precisa",
        "Very short text may result in a less accurate analysis",
    ),
    (
        "Texto muito longo pode demorar mais para ser processado",
        "Very long text may take longer to process",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_to_english() {
        let catalog = PhraseCatalog::builtin();
        assert_eq!(
            catalog.translate("Verificar Agora", "en", &Params::new()),
            "Verify Now"
        );
    }

    #[test]
    fn test_unknown_target_falls_back_to_english() {
        let catalog = PhraseCatalog::builtin();
        assert_eq!(catalog.translate("Dicas", "fr", &Params::new()), "Tips");
    }

    #[test]
    fn test_source_language_keeps_text() {
        let catalog = PhraseCatalog::builtin();
        assert_eq!(catalog.translate("Dicas", "pt", &Params::new()), "Dicas");
        assert_eq!(catalog.translate("Dicas", "pt-BR", &Params::new()), "Dicas");
    }

    #[test]
    fn test_target_table_wins_over_english() {
        let mut catalog = PhraseCatalog::builtin();
        catalog.add_phrase("es", "Dicas", "Consejos");
        assert_eq!(catalog.translate("Dicas", "es", &Params::new()), "Consejos");
    }

    #[test]
    fn test_unknown_phrase_returns_source() {
        let catalog = PhraseCatalog::builtin();
        assert_eq!(
            catalog.translate("Frase desconhecida", "en", &Params::new()),
            "Frase desconhecida"
        );
        assert_eq!(catalog.translate("", "en", &Params::new()), "");
    }

    #[test]
    fn test_placeholders() {
        let catalog = PhraseCatalog::builtin();
        let text = "Muitas requisições. Tente novamente em {minutes} minuto(s)";
        assert_eq!(
            catalog.translate(text, "en", &Params::new().with("minutes", 2)),
            "Too many requests. Try again in 2 minute(s)"
        );
        // Empty values keep the placeholder
        assert_eq!(
            catalog.translate(text, "en", &Params::new().with("minutes", "")),
            "Too many requests. Try again in {minutes} minute(s)"
        );
    }

    #[test]
    fn test_find_key_collapses_whitespace() {
        let catalog = PhraseCatalog::builtin();
        assert_eq!(
            catalog.find_key("  Verificar\n   Agora "),
            Some("Verificar Agora")
        );
        assert_eq!(catalog.find_key("nothing like this"), None);
        assert_eq!(catalog.find_key("   "), None);
    }
}
