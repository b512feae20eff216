//! Hardcoded minimal translations used when no document can be fetched

use crate::tree::TranslationTree;
use std::collections::HashMap;

/// Language used when nothing else is known
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// Languages with a built-in fallback table
pub const SUPPORTED_LANGUAGES: &[&str] = &["pt-BR", "en", "es"];

/// Fallback trees keyed by lowercased language tag
#[derive(Debug, Clone, Default)]
pub struct FallbackTables {
    tables: HashMap<String, TranslationTree>,
}

impl FallbackTables {
    /// No tables; every language falls back to an empty tree
    pub fn empty() -> Self {
        FallbackTables {
            tables: HashMap::new(),
        }
    }

    /// The tables shipped with the application
    pub fn builtin() -> Self {
        FallbackTables::empty()
            .with_language("pt-BR", builtin_tree("pt-BR"))
            .with_language("en", builtin_tree("en"))
            .with_language("es", builtin_tree("es"))
    }

    pub fn with_language(mut self, lang: &str, tree: TranslationTree) -> Self {
        self.tables.insert(lang.to_lowercase(), tree);
        self
    }

    /// Exact table for `lang`, ignoring case
    pub fn get(&self, lang: &str) -> Option<&TranslationTree> {
        self.tables.get(&lang.to_lowercase())
    }

    /// Table for `lang`, or the default language's table when `lang` has none
    pub fn get_or_default(&self, lang: &str) -> Option<&TranslationTree> {
        self.get(lang).or_else(|| self.get(DEFAULT_LANGUAGE))
    }

    /// Owned copy of [`FallbackTables::get_or_default`], empty when neither exists
    pub fn tree_for(&self, lang: &str) -> TranslationTree {
        self.get_or_default(lang).cloned().unwrap_or_default()
    }
}

fn builtin_tree(lang: &str) -> TranslationTree {
    let (title, subtitle, language) = match lang {
        "en" => (
            "Detect Fake News with AI",
            "Check news credibility in seconds",
            "English",
        ),
        "es" => (
            "Detecta Fake News con IA",
            "Verifica la credibilidad de noticias en segundos",
            "Español",
        ),
        _ => (
            "Detecte Fake News com IA",
            "Verifique a credibilidade de notícias em segundos",
            "Português",
        ),
    };

    TranslationTree::new()
        .with_tree(
            "home",
            TranslationTree::new()
                .with_text("title", title)
                .with_text("subtitle", subtitle),
        )
        .with_text("language", language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;

    #[test]
    fn test_builtin_languages() {
        let tables = FallbackTables::builtin();
        for lang in SUPPORTED_LANGUAGES {
            assert!(tables.get(lang).is_some(), "missing table for {}", lang);
        }
        assert_eq!(
            tables.tree_for("en").lookup("home.title"),
            Some(Node::Text("Detect Fake News with AI"))
        );
        assert_eq!(
            tables.tree_for("es").lookup("language"),
            Some(Node::Text("Español"))
        );
    }

    #[test]
    fn test_lookup_ignores_case() {
        let tables = FallbackTables::builtin();
        assert!(tables.get("pt-br").is_some());
        assert!(tables.get("EN").is_some());
    }

    #[test]
    fn test_unknown_language_uses_default_table() {
        let tables = FallbackTables::builtin();
        assert_eq!(
            tables.tree_for("fr").lookup("language"),
            Some(Node::Text("Português"))
        );
    }

    #[test]
    fn test_empty_tables_give_empty_tree() {
        assert!(FallbackTables::empty().tree_for("en").is_empty());
    }
}
